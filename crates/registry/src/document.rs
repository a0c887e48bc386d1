//! Loading the prompt registry document.
//!
//! The registry is an externally authored YAML tree: layers at the top,
//! categories below them, and lists of prompt descriptors at the leaves.
//! A file may hold several YAML documents; their top-level keys are merged
//! in order, later documents overriding earlier ones.

use estimait_core::{KnowledgeError, RegistryError};
use regex_lite::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File-name prefix of versioned registry documents.
pub const REGISTRY_PREFIX: &str = "KNOWLEDGE_PROMPT_REGISTRY_";

/// The parsed registry tree. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryTree {
    root: Mapping,
}

impl RegistryTree {
    /// An empty registry: every lookup resolves to "not found".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse registry YAML. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, KnowledgeError> {
        let mut root = Mapping::new();

        for document in serde_yaml::Deserializer::from_str(content) {
            let value = Value::deserialize(document).map_err(|e| KnowledgeError::ParseError {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;

            match value {
                Value::Mapping(doc) => {
                    for (key, val) in doc {
                        root.insert(key, val);
                    }
                }
                Value::Null => {}
                other => {
                    return Err(KnowledgeError::ParseError {
                        path: origin.to_path_buf(),
                        reason: format!(
                            "top-level document must be a mapping, found {}",
                            kind_of(&other)
                        ),
                    });
                }
            }
        }

        Ok(Self { root })
    }

    /// Load a registry file. A missing file yields an empty registry.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        if !path.exists() {
            tracing::warn!("Registry file not found at {}, using empty registry", path.display());
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let tree = Self::parse(&content, path)?;
        tracing::info!(
            path = %path.display(),
            sections = tree.root.len(),
            "Loaded prompt registry"
        );
        Ok(tree)
    }

    /// The top-level mapping.
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Top-level section by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Top-level section names, in document order.
    pub fn sections(&self) -> Vec<String> {
        self.root
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Walk `path` from the root, one mapping key per segment.
    pub fn resolve(&self, path: &[&str]) -> Result<&Value, RegistryError> {
        let mut node: Option<&Value> = None;

        for (depth, segment) in path.iter().enumerate() {
            let mapping = match node {
                None => &self.root,
                Some(Value::Mapping(m)) => m,
                Some(_) => {
                    return Err(RegistryError::UnexpectedShape {
                        path: path[..depth].join("."),
                        expected: "mapping",
                    });
                }
            };

            node = Some(mapping.get(*segment).ok_or_else(|| RegistryError::MissingKey {
                path: path[..=depth].join("."),
            })?);
        }

        node.ok_or_else(|| RegistryError::MissingKey {
            path: String::new(),
        })
    }
}

/// Find the newest `KNOWLEDGE_PROMPT_REGISTRY_v<major>.<minor>*.yaml` in `dir`.
///
/// Versions compare numerically, so `v4.10` beats `v4.9`. Files without a
/// parseable version rank below every versioned file.
pub fn find_latest_registry(dir: &Path) -> Result<PathBuf, KnowledgeError> {
    let entries = std::fs::read_dir(dir).map_err(|e| KnowledgeError::ReadError {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut candidates: Vec<(Option<(u32, u32)>, String)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(REGISTRY_PREFIX) && name.ends_with(".yaml"))
        .map(|name| (registry_version(&name), name))
        .collect();

    // Highest version first; names break ties so the choice is deterministic.
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    let (_, chosen) = candidates
        .into_iter()
        .next()
        .ok_or_else(|| KnowledgeError::NoRegistry(dir.to_path_buf()))?;

    tracing::info!(registry = %chosen, "Using registry");
    Ok(dir.join(chosen))
}

/// Extract `(major, minor)` from names like `..._v4.7.yaml` or `..._v4_10.yaml`.
pub fn registry_version(file_name: &str) -> Option<(u32, u32)> {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let re = VERSION.get_or_init(|| Regex::new(r"(?i)v(\d+)[._](\d+)").expect("valid regex"));

    let caps = re.captures(file_name)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}

/// Short name of a YAML node's kind, for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
LAYER1:
  CORE_ENGINE:
    - name: Core Estimation Engine
      version: "2.5"
LAYER2:
  WAREHOUSE:
    KNOWLEDGE:
      - name: Warehouse Knowledge
"#;

    #[test]
    fn parses_single_document() {
        let tree = RegistryTree::parse(SAMPLE, Path::new("sample.yaml")).unwrap();
        assert_eq!(tree.sections(), vec!["LAYER1", "LAYER2"]);
        assert!(tree.get("LAYER3").is_none());
    }

    #[test]
    fn merges_multiple_documents() {
        let yaml = "LAYER1:\n  CORE_ENGINE: []\n---\nLAYER3:\n  TOOL: []\n---\nLAYER1:\n  CORE_ENGINE:\n    - name: Override\n";
        let tree = RegistryTree::parse(yaml, Path::new("multi.yaml")).unwrap();

        assert_eq!(tree.sections(), vec!["LAYER1", "LAYER3"]);
        let name = tree
            .resolve(&["LAYER1", "CORE_ENGINE"])
            .unwrap()
            .as_sequence()
            .and_then(|s| s.first())
            .and_then(|e| e.get("name"))
            .and_then(Value::as_str);
        assert_eq!(name, Some("Override"));
    }

    #[test]
    fn non_mapping_document_rejected() {
        let err = RegistryTree::parse("- just\n- a list\n", Path::new("list.yaml")).unwrap_err();
        assert!(matches!(err, KnowledgeError::ParseError { .. }));
        assert!(err.to_string().contains("list"));
    }

    #[test]
    fn empty_document_is_empty_registry() {
        let tree = RegistryTree::parse("", Path::new("empty.yaml")).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn resolve_reports_missing_segment() {
        let tree = RegistryTree::parse(SAMPLE, Path::new("sample.yaml")).unwrap();
        let err = tree.resolve(&["LAYER2", "HEALTHCARE", "KNOWLEDGE"]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::MissingKey {
                path: "LAYER2.HEALTHCARE".into()
            }
        );
    }

    #[test]
    fn resolve_reports_wrong_shape() {
        let tree = RegistryTree::parse(SAMPLE, Path::new("sample.yaml")).unwrap();
        let err = tree
            .resolve(&["LAYER1", "CORE_ENGINE", "name"])
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnexpectedShape {
                path: "LAYER1.CORE_ENGINE".into(),
                expected: "mapping",
            }
        );
    }

    #[test]
    fn missing_file_loads_empty() {
        let tree = RegistryTree::load(Path::new("/nonexistent/registry.yaml")).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn version_extraction() {
        assert_eq!(registry_version("KNOWLEDGE_PROMPT_REGISTRY_v4.3.yaml"), Some((4, 3)));
        assert_eq!(registry_version("KNOWLEDGE_PROMPT_REGISTRY_V4_10.yaml"), Some((4, 10)));
        assert_eq!(registry_version("KNOWLEDGE_PROMPT_REGISTRY_draft.yaml"), None);
    }

    #[test]
    fn latest_registry_uses_numeric_versions() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "KNOWLEDGE_PROMPT_REGISTRY_v4.9.yaml",
            "KNOWLEDGE_PROMPT_REGISTRY_v4.10.yaml",
            "KNOWLEDGE_PROMPT_REGISTRY_draft.yaml",
            "OTHER_v9.9.yaml",
            "KNOWLEDGE_PROMPT_REGISTRY_v5.0.yml",
        ] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }

        let latest = find_latest_registry(dir.path()).unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_str().unwrap(),
            "KNOWLEDGE_PROMPT_REGISTRY_v4.10.yaml"
        );
    }

    #[test]
    fn latest_registry_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_latest_registry(dir.path()).unwrap_err();
        assert!(matches!(err, KnowledgeError::NoRegistry(_)));
    }
}
