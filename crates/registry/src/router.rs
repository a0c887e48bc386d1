//! Knowledge prompt router.
//!
//! Maps a layer plus keyword filters to a single [`PromptDescriptor`].
//! Every lookup resolves a path in the registry tree and projects the first
//! variant listed there.

use crate::document::{RegistryTree, find_latest_registry};
use crate::model::{Layer, Projection, PromptDescriptor, PromptQuery, RouteOutcome, variant_entries};
use estimait_config::{AppConfig, QueryDefaults};
use estimait_core::{KnowledgeError, RegistryError};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Resolved location of one lookup: the tree path plus how to project it.
struct Route {
    path: Vec<String>,
    projection: Projection,
}

impl Route {
    fn new(path: &[&str], projection: Projection) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            projection,
        }
    }

    fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Routes structured queries to knowledge prompt descriptors.
///
/// Thread-safe. The registry tree is swapped whole on [`reload`](Self::reload)
/// and never mutated in place, so concurrent readers always see a complete
/// tree.
pub struct KnowledgeRouter {
    tree: RwLock<Arc<RegistryTree>>,
    defaults: QueryDefaults,
    renovation_matrix_file: String,
    geotechnical_matrix_file: String,
}

impl KnowledgeRouter {
    /// Create a router over an already-loaded tree.
    pub fn new(tree: RegistryTree, defaults: QueryDefaults) -> Self {
        let knowledge = estimait_config::KnowledgeConfig::default();
        Self {
            tree: RwLock::new(Arc::new(tree)),
            defaults,
            renovation_matrix_file: knowledge.renovation_matrix_file,
            geotechnical_matrix_file: knowledge.geotechnical_matrix_file,
        }
    }

    /// Load the registry at `path`. A missing file yields an empty router.
    pub fn open(path: &Path, defaults: QueryDefaults) -> Result<Self, KnowledgeError> {
        Ok(Self::new(RegistryTree::load(path)?, defaults))
    }

    /// Build a router from application config.
    ///
    /// Uses `knowledge.registry_path` when set, otherwise the newest
    /// versioned registry in `knowledge.knowledge_dir`. No registry at all
    /// degrades to an empty router.
    pub fn from_config(config: &AppConfig) -> Result<Self, KnowledgeError> {
        let knowledge = &config.knowledge;

        let tree = match &knowledge.registry_path {
            Some(path) => RegistryTree::load(Path::new(path))?,
            None => {
                let dir = knowledge.dir();
                if !dir.is_dir() {
                    warn!("Knowledge directory {} not found, using empty registry", dir.display());
                    RegistryTree::empty()
                } else {
                    match find_latest_registry(&dir) {
                        Ok(path) => RegistryTree::load(&path)?,
                        Err(KnowledgeError::NoRegistry(dir)) => {
                            warn!("No registry file in {}, using empty registry", dir.display());
                            RegistryTree::empty()
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        };

        Ok(Self {
            tree: RwLock::new(Arc::new(tree)),
            defaults: config.defaults.clone(),
            renovation_matrix_file: knowledge.renovation_matrix_file.clone(),
            geotechnical_matrix_file: knowledge.geotechnical_matrix_file.clone(),
        })
    }

    /// Swap in a new registry tree.
    pub fn reload(&self, tree: RegistryTree) {
        let sections = tree.root().len();
        *self.tree.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(tree);
        info!(sections, "Registry reloaded");
    }

    /// The current tree.
    pub fn snapshot(&self) -> Arc<RegistryTree> {
        self.tree.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Route a query given a raw layer tag. Unknown tags yield
    /// [`RouteOutcome::Error`].
    pub fn route(&self, layer: &str, query: &PromptQuery) -> RouteOutcome {
        match layer.parse::<Layer>() {
            Ok(layer) => self.get_knowledge_prompt(layer, query),
            Err(e) => {
                debug!(layer, "Unknown registry layer");
                RouteOutcome::Error(e)
            }
        }
    }

    /// Resolve a single knowledge prompt descriptor.
    pub fn get_knowledge_prompt(&self, layer: Layer, query: &PromptQuery) -> RouteOutcome {
        match layer {
            Layer::RenovationFactors => self.get_renovation_factor(query),
            Layer::GeotechnicalFactors => self.get_geotechnical_factor(query),
            _ => {
                let route = self.route_for(layer, query);
                let outcome = self.resolve_first(&route);
                debug!(%layer, path = %route.dotted(), found = outcome.is_found(), "Routed prompt query");
                outcome
            }
        }
    }

    /// Metadata for the renovation cost factor matrix, echoing the
    /// normalized query.
    pub fn get_renovation_factor(&self, query: &PromptQuery) -> RouteOutcome {
        let d = &self.defaults;
        let params = BTreeMap::from([
            (
                "building_type".to_string(),
                pick(&query.building_type, &d.renovation_building_type).to_lowercase(),
            ),
            (
                "renovation_scope".to_string(),
                pick(&query.renovation_scope, &d.renovation_scope).to_lowercase(),
            ),
            ("region".to_string(), pick(&query.region, &d.region).to_uppercase()),
            ("stage".to_string(), pick(&query.stage, &d.stage).to_uppercase()),
        ]);

        self.factor_descriptor("RENOVATION_FACTORS", params, &self.renovation_matrix_file)
    }

    /// Metadata for the geotechnical cost driver matrix, echoing the
    /// normalized query.
    pub fn get_geotechnical_factor(&self, query: &PromptQuery) -> RouteOutcome {
        let d = &self.defaults;
        let params = BTreeMap::from([
            ("region".to_string(), pick(&query.region, &d.region).to_uppercase()),
            (
                "building_type".to_string(),
                pick(&query.building_type, &d.geotechnical_building_type).to_lowercase(),
            ),
            ("stage".to_string(), pick(&query.stage, &d.stage).to_uppercase()),
        ]);

        self.factor_descriptor("GEOTECHNICAL_FACTORS", params, &self.geotechnical_matrix_file)
    }

    /// Every variant listed where `layer` + `query` routes to, in order.
    pub fn variants(
        &self,
        layer: Layer,
        query: &PromptQuery,
    ) -> Result<Vec<PromptDescriptor>, RegistryError> {
        let route = self.route_for(layer, query);
        let tree = self.snapshot();
        let path: Vec<&str> = route.path.iter().map(String::as_str).collect();
        let node = tree.resolve(&path)?;
        Ok(variant_entries(node, &route.dotted())?
            .into_iter()
            .map(|entry| PromptDescriptor::from_entry(entry, route.projection))
            .collect())
    }

    /// The whole subtree under a top-level section, or an empty mapping.
    pub fn list_available_prompts(&self, layer: &str) -> Value {
        self.snapshot()
            .get(layer)
            .cloned()
            .unwrap_or_else(|| Value::Mapping(Mapping::new()))
    }

    /// Condensed index of the registry.
    pub fn summary(&self) -> String {
        crate::summary::summarize(&self.snapshot())
    }

    fn route_for(&self, layer: Layer, query: &PromptQuery) -> Route {
        let d = &self.defaults;
        match layer {
            Layer::Layer1 => Route::new(&["LAYER1", "CORE_ENGINE"], Projection::Core),
            Layer::Layer2 => {
                let building = pick(&query.building_type, &d.prompt_building_type).to_uppercase();
                let prompt_type = pick(&query.prompt_type, &d.prompt_type);
                Route::new(&["LAYER2", &building, prompt_type], Projection::Typed)
            }
            Layer::Layer3 => {
                let tool = pick(&query.tool_type, &d.tool_type);
                Route::new(&["LAYER3", tool], Projection::Typed)
            }
            Layer::GcSpecific => {
                let gc = pick(&query.gc_type, &d.gc_type).to_uppercase();
                Route::new(&["GC_SPECIFIC", &gc], Projection::GcSpecific)
            }
            Layer::RenovationFactors => {
                Route::new(&["LAYER1", "RENOVATION_FACTORS"], Projection::Typed)
            }
            Layer::GeotechnicalFactors => {
                Route::new(&["LAYER1", "GEOTECHNICAL_FACTORS"], Projection::Typed)
            }
        }
    }

    fn resolve_first(&self, route: &Route) -> RouteOutcome {
        let tree = self.snapshot();
        let path: Vec<&str> = route.path.iter().map(String::as_str).collect();
        tree.resolve(&path)
            .and_then(|node| PromptDescriptor::first_of(node, &route.dotted(), route.projection))
            .into()
    }

    fn factor_descriptor(
        &self,
        key: &str,
        params: BTreeMap<String, String>,
        matrix_file: &str,
    ) -> RouteOutcome {
        let route = Route::new(&["LAYER1", key], Projection::Typed);
        match self.resolve_first(&route) {
            RouteOutcome::Found(mut descriptor) => {
                debug!(factor = key, ?params, "Resolved factor metadata");
                descriptor.query_parameters = Some(params);
                descriptor.note = Some(format!("Use {matrix_file} to query specific factors"));
                RouteOutcome::Found(descriptor)
            }
            other => other,
        }
    }
}

/// The query value if given, else the configured default.
fn pick<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"
LAYER1:
  CORE_ENGINE:
    - name: LAYER 1 Core Estimation Engine
      version: "2.5"
      file_path: /kb/layer1/core_engine_v2.5.md
      status: ACTIVE
      description: Core estimation methodology
      type: ENGINE
  RENOVATION_FACTORS:
    - name: Renovation Cost Factor Matrix
      version: "1.0"
      file_path: /kb/RENOVATION_COST_FACTOR_MATRIX_v1.0.yaml
      status: ACTIVE
      type: MATRIX
      description: Renovation premiums by scope
  GEOTECHNICAL_FACTORS:
    - name: Geotechnical Cost Driver Matrix
      version: "1.0"
      file_path: /kb/GEOTECHNICAL_COST_DRIVER_MATRIX_v1.0.yaml
      status: ACTIVE
      type: MATRIX
      description: Soil and seismic cost drivers
LAYER2:
  WAREHOUSE:
    KNOWLEDGE:
      - name: Warehouse Knowledge
        version: "1.4"
        file_path: /kb/layer2/warehouse_knowledge.md
        status: ACTIVE
        type: KNOWLEDGE
        description: Tilt-up warehouse knowledge
    DECISION_MATRIX:
      - name: Warehouse Decision Matrix
        version: "1.1"
        file_path: /kb/layer2/warehouse_dm.md
        status: ACTIVE
        type: DECISION_MATRIX
        description: Warehouse decisions
      - name: Warehouse Decision Matrix (legacy)
        version: "1.0"
        status: DEPRECATED
    CASE_DATABASE: []
LAYER3:
  CASE_FEATURE_EXTRACTION:
    - name: Case Feature Extraction
      version: "1.0"
      status: ACTIVE
      type: TOOL
GC_SPECIFIC:
  UPRITE:
    - name: Uprite General
      version: "3.0"
      file_path: /kb/gc/uprite.md
      status: ACTIVE
      gc_type: UPRITE
      building_type: WAREHOUSE
      description: Uprite pricing habits
"#;

    fn router() -> KnowledgeRouter {
        let tree = RegistryTree::parse(REGISTRY, Path::new("test.yaml")).unwrap();
        KnowledgeRouter::new(tree, QueryDefaults::default())
    }

    #[test]
    fn layer1_returns_core_engine() {
        let outcome = router().get_knowledge_prompt(Layer::Layer1, &PromptQuery::new());
        let d = outcome.descriptor().unwrap();
        assert_eq!(d.name.as_deref(), Some("LAYER 1 Core Estimation Engine"));
        assert_eq!(d.version.as_deref(), Some("2.5"));
        assert_eq!(d.status.as_deref(), Some("ACTIVE"));
        // LAYER1 projects the core fields only.
        assert!(d.kind.is_none());
    }

    #[test]
    fn layer2_defaults_to_warehouse_knowledge() {
        let d = router()
            .get_knowledge_prompt(Layer::Layer2, &PromptQuery::new())
            .into_result()
            .unwrap();
        assert_eq!(d.name.as_deref(), Some("Warehouse Knowledge"));
        assert_eq!(d.kind.as_deref(), Some("KNOWLEDGE"));
    }

    #[test]
    fn layer2_normalizes_building_type_case() {
        let query = PromptQuery::new()
            .building_type("warehouse")
            .prompt_type("DECISION_MATRIX");
        let d = router()
            .get_knowledge_prompt(Layer::Layer2, &query)
            .into_result()
            .unwrap();
        assert_eq!(d.name.as_deref(), Some("Warehouse Decision Matrix"));
    }

    #[test]
    fn layer2_missing_building_is_not_found() {
        let query = PromptQuery::new().building_type("healthcare");
        let outcome = router().get_knowledge_prompt(Layer::Layer2, &query);
        assert_eq!(
            outcome,
            RouteOutcome::NotFound(RegistryError::MissingKey {
                path: "LAYER2.HEALTHCARE".into()
            })
        );
    }

    #[test]
    fn layer2_empty_list_is_not_found() {
        let query = PromptQuery::new().prompt_type("CASE_DATABASE");
        let outcome = router().get_knowledge_prompt(Layer::Layer2, &query);
        assert!(matches!(
            outcome,
            RouteOutcome::NotFound(RegistryError::EmptyList { .. })
        ));
    }

    #[test]
    fn layer3_default_tool() {
        let d = router()
            .get_knowledge_prompt(Layer::Layer3, &PromptQuery::new())
            .into_result()
            .unwrap();
        assert_eq!(d.name.as_deref(), Some("Case Feature Extraction"));
        assert_eq!(d.kind.as_deref(), Some("TOOL"));
    }

    #[test]
    fn gc_specific_projects_gc_fields() {
        let query = PromptQuery::new().gc_type("uprite").building_type("warehouse");
        let d = router()
            .get_knowledge_prompt(Layer::GcSpecific, &query)
            .into_result()
            .unwrap();
        assert_eq!(d.gc_type.as_deref(), Some("UPRITE"));
        assert_eq!(d.building_type.as_deref(), Some("WAREHOUSE"));
        assert!(d.kind.is_none());
    }

    #[test]
    fn renovation_factor_echoes_normalized_query() {
        let query = PromptQuery::new()
            .building_type("Commercial_Office")
            .renovation_scope("MODERATE")
            .region("ca_bay_area")
            .stage("bidding");
        let d = router().get_renovation_factor(&query).into_result().unwrap();

        let params = d.query_parameters.unwrap();
        assert_eq!(params["building_type"], "commercial_office");
        assert_eq!(params["renovation_scope"], "moderate");
        assert_eq!(params["region"], "CA_BAY_AREA");
        assert_eq!(params["stage"], "BIDDING");
        assert_eq!(d.kind.as_deref(), Some("MATRIX"));
        assert!(d.note.unwrap().contains("RENOVATION_COST_FACTOR_MATRIX_v1.0.yaml"));
    }

    #[test]
    fn geotechnical_factor_uses_defaults() {
        let outcome = router().route("GEOTECHNICAL_FACTORS", &PromptQuery::new());
        let d = outcome.descriptor().unwrap();
        let params = d.query_parameters.as_ref().unwrap();
        assert_eq!(params["region"], "CA_INLAND");
        assert_eq!(params["building_type"], "warehouse");
        assert_eq!(params["stage"], "BIDDING");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn unknown_layer_is_error() {
        let outcome = router().route("LAYER4", &PromptQuery::new());
        assert_eq!(
            outcome,
            RouteOutcome::Error(RegistryError::UnknownLayer("LAYER4".into()))
        );
        assert!(outcome.to_json()["error"].as_str().unwrap().contains("LAYER4"));
    }

    #[test]
    fn lower_case_layer_is_error() {
        let outcome = router().route("layer1", &PromptQuery::new());
        assert_eq!(
            outcome,
            RouteOutcome::Error(RegistryError::UnknownLayer("layer1".into()))
        );
    }

    #[test]
    fn empty_registry_never_panics() {
        let router = KnowledgeRouter::new(RegistryTree::empty(), QueryDefaults::default());
        for layer in Layer::ALL {
            let outcome = router.get_knowledge_prompt(layer, &PromptQuery::new());
            assert!(matches!(outcome, RouteOutcome::NotFound(_)), "{layer}: {outcome:?}");
        }
    }

    #[test]
    fn malformed_node_is_error() {
        let tree = RegistryTree::parse("LAYER3:\n  CASE_FEATURE_EXTRACTION: oops\n", Path::new("bad.yaml"))
            .unwrap();
        let router = KnowledgeRouter::new(tree, QueryDefaults::default());
        let outcome = router.get_knowledge_prompt(Layer::Layer3, &PromptQuery::new());
        assert!(matches!(outcome, RouteOutcome::Error(RegistryError::UnexpectedShape { .. })));
    }

    #[test]
    fn variants_lists_every_entry() {
        let query = PromptQuery::new().prompt_type("DECISION_MATRIX");
        let all = router().variants(Layer::Layer2, &query).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].status.as_deref(), Some("DEPRECATED"));
    }

    #[test]
    fn list_available_prompts_subtree_or_empty() {
        let r = router();
        let layer2 = r.list_available_prompts("LAYER2");
        assert!(layer2.get("WAREHOUSE").is_some());

        let missing = r.list_available_prompts("LAYER9");
        assert_eq!(missing, Value::Mapping(Mapping::new()));
    }

    #[test]
    fn configured_defaults_are_used() {
        let tree = RegistryTree::parse(REGISTRY, Path::new("test.yaml")).unwrap();
        let defaults = QueryDefaults {
            prompt_type: "DECISION_MATRIX".into(),
            ..QueryDefaults::default()
        };
        let router = KnowledgeRouter::new(tree, defaults);
        let d = router
            .get_knowledge_prompt(Layer::Layer2, &PromptQuery::new())
            .into_result()
            .unwrap();
        assert_eq!(d.kind.as_deref(), Some("DECISION_MATRIX"));
    }

    #[test]
    fn reload_swaps_tree() {
        let r = router();
        let before = r.snapshot();
        r.reload(RegistryTree::empty());

        assert!(!before.is_empty());
        assert!(r.snapshot().is_empty());
        assert!(!r.get_knowledge_prompt(Layer::Layer1, &PromptQuery::new()).is_found());
    }

    #[test]
    fn from_config_discovers_latest_registry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("KNOWLEDGE_PROMPT_REGISTRY_v4.2.yaml"),
            "LAYER1:\n  CORE_ENGINE:\n    - name: old\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("KNOWLEDGE_PROMPT_REGISTRY_v4.3.yaml"),
            "LAYER1:\n  CORE_ENGINE:\n    - name: new\n",
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.knowledge.knowledge_dir = dir.path().to_string_lossy().into_owned();

        let router = KnowledgeRouter::from_config(&config).unwrap();
        let d = router
            .get_knowledge_prompt(Layer::Layer1, &PromptQuery::new())
            .into_result()
            .unwrap();
        assert_eq!(d.name.as_deref(), Some("new"));
    }

    #[test]
    fn from_config_missing_dir_is_empty() {
        let mut config = AppConfig::default();
        config.knowledge.knowledge_dir = "/nonexistent/estimait/knowledge".into();
        let router = KnowledgeRouter::from_config(&config).unwrap();
        assert!(router.snapshot().is_empty());
    }
}
