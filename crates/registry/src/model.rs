//! Registry data model: layers, queries, descriptors, and route outcomes.

use estimait_core::RegistryError;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// A routable section of the knowledge registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    /// Core estimation engine.
    #[serde(rename = "LAYER1")]
    Layer1,
    /// Domain knowledge per building type.
    #[serde(rename = "LAYER2")]
    Layer2,
    /// Optional deep-verification tools.
    #[serde(rename = "LAYER3")]
    Layer3,
    /// General-contractor specific knowledge.
    GcSpecific,
    /// Renovation cost factor matrix metadata.
    RenovationFactors,
    /// Geotechnical cost driver matrix metadata.
    GeotechnicalFactors,
}

impl Layer {
    pub const ALL: [Layer; 6] = [
        Layer::Layer1,
        Layer::Layer2,
        Layer::Layer3,
        Layer::GcSpecific,
        Layer::RenovationFactors,
        Layer::GeotechnicalFactors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Layer1 => "LAYER1",
            Self::Layer2 => "LAYER2",
            Self::Layer3 => "LAYER3",
            Self::GcSpecific => "GC_SPECIFIC",
            Self::RenovationFactors => "RENOVATION_FACTORS",
            Self::GeotechnicalFactors => "GEOTECHNICAL_FACTORS",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Layer {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownLayer(s.to_string()))
    }
}

/// Keyword filters for a registry query. Unset fields fall back to the
/// router's configured defaults; which fields matter depends on the layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptQuery {
    pub building_type: Option<String>,
    pub prompt_type: Option<String>,
    pub tool_type: Option<String>,
    pub gc_type: Option<String>,
    pub region: Option<String>,
    pub stage: Option<String>,
    pub renovation_scope: Option<String>,
}

impl PromptQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn building_type(mut self, v: impl Into<String>) -> Self {
        self.building_type = Some(v.into());
        self
    }

    pub fn prompt_type(mut self, v: impl Into<String>) -> Self {
        self.prompt_type = Some(v.into());
        self
    }

    pub fn tool_type(mut self, v: impl Into<String>) -> Self {
        self.tool_type = Some(v.into());
        self
    }

    pub fn gc_type(mut self, v: impl Into<String>) -> Self {
        self.gc_type = Some(v.into());
        self
    }

    pub fn region(mut self, v: impl Into<String>) -> Self {
        self.region = Some(v.into());
        self
    }

    pub fn stage(mut self, v: impl Into<String>) -> Self {
        self.stage = Some(v.into());
        self
    }

    pub fn renovation_scope(mut self, v: impl Into<String>) -> Self {
        self.renovation_scope = Some(v.into());
        self
    }
}

/// Which optional fields a layer projects from its descriptor entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// name, version, file_path, status, description
    Core,
    /// Core plus `type`
    Typed,
    /// Core plus `gc_type` and `building_type`
    GcSpecific,
}

/// A knowledge prompt record projected from a registry list entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub name: Option<String>,
    pub version: Option<String>,
    pub file_path: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    pub description: Option<String>,
    /// Normalized query echoed back by factor lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_parameters: Option<BTreeMap<String, String>>,
    /// Where the factor values themselves live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PromptDescriptor {
    /// Project the named fields out of one registry entry.
    pub fn from_entry(entry: &Mapping, projection: Projection) -> Self {
        let field = |key: &str| entry.get(key).and_then(scalar_text);

        let mut descriptor = Self {
            name: field("name"),
            version: field("version"),
            file_path: field("file_path"),
            status: field("status"),
            description: field("description"),
            ..Self::default()
        };

        match projection {
            Projection::Core => {}
            Projection::Typed => descriptor.kind = field("type"),
            Projection::GcSpecific => {
                descriptor.gc_type = field("gc_type");
                descriptor.building_type = field("building_type");
            }
        }

        descriptor
    }

    /// Select the first variant listed at `path`.
    ///
    /// Registry categories hold lists, but only the first entry is ever
    /// routed to; the rest are reachable through
    /// [`KnowledgeRouter::variants`](crate::KnowledgeRouter::variants).
    pub fn first_of(
        list: &Value,
        path: &str,
        projection: Projection,
    ) -> Result<Self, RegistryError> {
        let entries = variant_entries(list, path)?;
        let first = entries.first().ok_or_else(|| RegistryError::EmptyList {
            path: path.to_string(),
        })?;
        Ok(Self::from_entry(first, projection))
    }
}

/// All mapping entries of a variant list.
pub(crate) fn variant_entries<'a>(
    list: &'a Value,
    path: &str,
) -> Result<Vec<&'a Mapping>, RegistryError> {
    match list {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                item.as_mapping().ok_or_else(|| RegistryError::UnexpectedShape {
                    path: path.to_string(),
                    expected: "list of mappings",
                })
            })
            .collect(),
        _ => Err(RegistryError::UnexpectedShape {
            path: path.to_string(),
            expected: "list of prompt variants",
        }),
    }
}

/// Render a scalar node as text. `version: 2.3` arrives as a number.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The result of routing a registry query. Never an `Err`; callers
/// inspect the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// A descriptor was resolved.
    Found(PromptDescriptor),
    /// The path does not exist or lists no variants.
    NotFound(RegistryError),
    /// Bad layer tag or a malformed registry node.
    Error(RegistryError),
}

impl RouteOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn descriptor(&self) -> Option<&PromptDescriptor> {
        match self {
            Self::Found(d) => Some(d),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RegistryError> {
        match self {
            Self::Found(_) => None,
            Self::NotFound(e) | Self::Error(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<PromptDescriptor, RegistryError> {
        match self {
            Self::Found(d) => Ok(d),
            Self::NotFound(e) | Self::Error(e) => Err(e),
        }
    }

    /// JSON view: the descriptor's fields, or `{"error": "..."}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Found(d) => serde_json::to_value(d).unwrap_or_default(),
            Self::NotFound(e) | Self::Error(e) => {
                serde_json::json!({ "error": e.to_string() })
            }
        }
    }
}

impl From<Result<PromptDescriptor, RegistryError>> for RouteOutcome {
    fn from(result: Result<PromptDescriptor, RegistryError>) -> Self {
        match result {
            Ok(d) => Self::Found(d),
            Err(e) if e.is_not_found() => Self::NotFound(e),
            Err(e) => Self::Error(e),
        }
    }
}
