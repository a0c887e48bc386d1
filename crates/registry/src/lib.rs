//! Knowledge prompt registry.
//!
//! The registry is a YAML tree that tells an estimator which knowledge
//! prompt to load for a given situation. This crate loads that tree and
//! routes structured queries to a single prompt descriptor.
//!
//! # Layout
//!
//! ```text
//! LAYER1:
//!   CORE_ENGINE: [ {name, version, file_path, status, ...}, ... ]
//!   RENOVATION_FACTORS: [ ... ]
//!   GEOTECHNICAL_FACTORS: [ ... ]
//! LAYER2:
//!   <BUILDING_TYPE>:
//!     <PROMPT_TYPE>: [ ... ]
//! LAYER3:
//!   <TOOL_TYPE>: [ ... ]
//! GC_SPECIFIC:
//!   <GC_TYPE>: [ ... ]
//! ```
//!
//! Routing never fails with an `Err`. Every query yields a [`RouteOutcome`]
//! holding a descriptor or a typed reason why none was found.

mod detect;
mod document;
mod model;
mod router;
mod summary;

pub use detect::{BuildingCategory, detect_building_type, mentions_renovation, needs_price_list};
pub use document::{REGISTRY_PREFIX, RegistryTree, find_latest_registry, registry_version};
pub use model::{Layer, Projection, PromptDescriptor, PromptQuery, RouteOutcome};
pub use router::KnowledgeRouter;
pub use summary::{SUMMARY_MAX_LINES, summarize};
