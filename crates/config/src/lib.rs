//! Configuration loading, validation, and management for EstimAIt.
//!
//! Loads configuration from `~/.estimait/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.estimait/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the knowledge documents live
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Default query parameters for the router and the assessment engine
    #[serde(default)]
    pub defaults: QueryDefaults,
}

/// Locations of the externally maintained YAML documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding the registry and matrix files
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: String,

    /// Explicit registry file. When unset, the newest
    /// `KNOWLEDGE_PROMPT_REGISTRY_v*.yaml` in `knowledge_dir` is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<String>,

    /// Explicit geotechnical matrix file. When unset,
    /// `knowledge_dir/geotechnical_matrix_file` is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_path: Option<String>,

    /// File name of the geotechnical cost-driver matrix
    #[serde(default = "default_geotechnical_matrix_file")]
    pub geotechnical_matrix_file: String,

    /// File name of the renovation cost-factor matrix
    #[serde(default = "default_renovation_matrix_file")]
    pub renovation_matrix_file: String,
}

fn default_knowledge_dir() -> String {
    AppConfig::config_dir()
        .join("knowledge")
        .to_string_lossy()
        .into_owned()
}
fn default_geotechnical_matrix_file() -> String {
    "GEOTECHNICAL_COST_DRIVER_MATRIX_v1.0.yaml".into()
}
fn default_renovation_matrix_file() -> String {
    "RENOVATION_COST_FACTOR_MATRIX_v1.0.yaml".into()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            knowledge_dir: default_knowledge_dir(),
            registry_path: None,
            matrix_path: None,
            geotechnical_matrix_file: default_geotechnical_matrix_file(),
            renovation_matrix_file: default_renovation_matrix_file(),
        }
    }
}

impl KnowledgeConfig {
    /// Path of the geotechnical matrix to load.
    pub fn matrix_file(&self) -> PathBuf {
        match &self.matrix_path {
            Some(p) => PathBuf::from(p),
            None => Path::new(&self.knowledge_dir).join(&self.geotechnical_matrix_file),
        }
    }

    /// The knowledge directory as a path.
    pub fn dir(&self) -> PathBuf {
        PathBuf::from(&self.knowledge_dir)
    }
}

/// Default query parameters.
///
/// Every default the router or the engine falls back to lives here so it
/// can be seen and overridden from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDefaults {
    /// Region for assessments and factor lookups
    #[serde(default = "default_region")]
    pub region: String,

    /// Building type for assessments
    #[serde(default = "default_building_type")]
    pub building_type: String,

    /// Project stage
    #[serde(default = "default_stage")]
    pub stage: String,

    /// LAYER2 building category
    #[serde(default = "default_prompt_building_type")]
    pub prompt_building_type: String,

    /// LAYER2 prompt type: KNOWLEDGE, CASE_DATABASE, DECISION_MATRIX
    #[serde(default = "default_prompt_type")]
    pub prompt_type: String,

    /// LAYER3 verification tool
    #[serde(default = "default_tool_type")]
    pub tool_type: String,

    /// General contractor for GC_SPECIFIC prompts
    #[serde(default = "default_gc_type")]
    pub gc_type: String,

    /// Renovation scope: light, moderate, heavy
    #[serde(default = "default_renovation_scope")]
    pub renovation_scope: String,

    /// Building type for renovation factor lookups
    #[serde(default = "default_building_type")]
    pub renovation_building_type: String,

    /// Building type for geotechnical factor lookups
    #[serde(default = "default_prompt_building_type")]
    pub geotechnical_building_type: String,
}

fn default_region() -> String {
    "CA_Inland".into()
}
fn default_building_type() -> String {
    "commercial_office".into()
}
fn default_stage() -> String {
    "BIDDING".into()
}
fn default_prompt_building_type() -> String {
    "warehouse".into()
}
fn default_prompt_type() -> String {
    "KNOWLEDGE".into()
}
fn default_tool_type() -> String {
    "CASE_FEATURE_EXTRACTION".into()
}
fn default_gc_type() -> String {
    "UPRITE".into()
}
fn default_renovation_scope() -> String {
    "moderate".into()
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            region: default_region(),
            building_type: default_building_type(),
            stage: default_stage(),
            prompt_building_type: default_prompt_building_type(),
            prompt_type: default_prompt_type(),
            tool_type: default_tool_type(),
            gc_type: default_gc_type(),
            renovation_scope: default_renovation_scope(),
            renovation_building_type: default_building_type(),
            geotechnical_building_type: default_prompt_building_type(),
        }
    }
}

impl QueryDefaults {
    fn fields(&self) -> [(&'static str, &str); 10] {
        [
            ("region", self.region.as_str()),
            ("building_type", self.building_type.as_str()),
            ("stage", self.stage.as_str()),
            ("prompt_building_type", self.prompt_building_type.as_str()),
            ("prompt_type", self.prompt_type.as_str()),
            ("tool_type", self.tool_type.as_str()),
            ("gc_type", self.gc_type.as_str()),
            ("renovation_scope", self.renovation_scope.as_str()),
            ("renovation_building_type", self.renovation_building_type.as_str()),
            ("geotechnical_building_type", self.geotechnical_building_type.as_str()),
        ]
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.estimait/config.toml).
    ///
    /// Environment variables override the file:
    /// - `ESTIMAIT_REGISTRY` → `knowledge.registry_path`
    /// - `ESTIMAIT_MATRIX` → `knowledge.matrix_path`
    /// - `ESTIMAIT_REGION` → `defaults.region`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ESTIMAIT_REGISTRY") {
            self.knowledge.registry_path = Some(path);
        }
        if let Some(path) = lookup("ESTIMAIT_MATRIX") {
            self.knowledge.matrix_path = Some(path);
        }
        if let Some(region) = lookup("ESTIMAIT_REGION") {
            self.defaults.region = region;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".estimait")
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.defaults.fields() {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "defaults.{name} must not be empty"
                )));
            }
        }

        if self.knowledge.knowledge_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "knowledge.knowledge_dir must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `config show`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
