//! `estimait config`: configuration management commands.

use super::{config_file, load_config};
use estimait_config::AppConfig;
use estimait_geotech::CostDriverMatrix;
use estimait_registry::{RegistryTree, find_latest_registry};
use std::path::{Path, PathBuf};

pub fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    let config = match load_config(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");
            config
        }
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e);
        }
    };

    let mut warnings = Vec::new();
    let mut failed = false;

    match registry_file(&config) {
        Some(path) if path.exists() => match RegistryTree::load(&path) {
            Ok(tree) => println!(
                "   ✅ Registry: {} ({} sections)",
                path.display(),
                tree.sections().len()
            ),
            Err(e) => {
                println!("   ❌ Registry: {e}");
                failed = true;
            }
        },
        Some(path) => warnings.push(format!("Registry file not found: {}", path.display())),
        None => warnings.push(format!(
            "No KNOWLEDGE_PROMPT_REGISTRY_v*.yaml in {}",
            config.knowledge.knowledge_dir
        )),
    }

    let matrix_path = config.knowledge.matrix_file();
    if matrix_path.exists() {
        match CostDriverMatrix::load(&matrix_path) {
            Ok(matrix) => println!(
                "   ✅ Matrix: {} ({} regions, {} building types)",
                matrix_path.display(),
                matrix.regions.len(),
                matrix.building_type_adjustments.len()
            ),
            Err(e) => {
                println!("   ❌ Matrix: {e}");
                failed = true;
            }
        }
    } else {
        warnings.push(format!("Matrix file not found: {}", matrix_path.display()));
    }

    if !warnings.is_empty() {
        println!();
        for w in &warnings {
            println!("   ⚠️  {w}");
        }
    }

    println!();
    println!("   Region:        {}", config.defaults.region);
    println!("   Building type: {}", config.defaults.building_type);
    println!("   Stage:         {}", config.defaults.stage);

    if failed {
        return Err("knowledge files failed validation".into());
    }
    Ok(())
}

pub fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config_file(config_path).display());
    Ok(())
}

/// The registry file the router would load, if one can be determined.
pub fn registry_file(config: &AppConfig) -> Option<PathBuf> {
    match &config.knowledge.registry_path {
        Some(path) => Some(PathBuf::from(path)),
        None => find_latest_registry(&config.knowledge.dir()).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = config_file(None);
        assert!(path.to_string_lossy().contains(".estimait"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = config_file(Some(Path::new("/etc/estimait.toml")));
        assert_eq!(path, PathBuf::from("/etc/estimait.toml"));
    }

    #[test]
    fn registry_file_prefers_explicit_path() {
        let mut config = AppConfig::default();
        config.knowledge.registry_path = Some("/kb/custom.yaml".into());
        assert_eq!(registry_file(&config), Some(PathBuf::from("/kb/custom.yaml")));
    }

    #[test]
    fn registry_file_scans_knowledge_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("KNOWLEDGE_PROMPT_REGISTRY_v4.3.yaml"), "{}").unwrap();

        let mut config = AppConfig::default();
        config.knowledge.knowledge_dir = dir.path().to_string_lossy().into_owned();

        let found = registry_file(&config).unwrap();
        assert!(found.ends_with("KNOWLEDGE_PROMPT_REGISTRY_v4.3.yaml"));
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = AppConfig::default_toml();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.defaults.stage, "BIDDING");
    }
}
