//! Keyword classifiers for free-form project descriptions.
//!
//! Callers use these to pick the LAYER2 building category and to decide
//! whether renovation factors or the unit price list apply before querying
//! the router.

use serde::{Deserialize, Serialize};

/// Building categories that have their own LAYER2 knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildingCategory {
    Warehouse,
    Healthcare,
    Commercial,
    Lab,
}

impl BuildingCategory {
    /// The LAYER2 key for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warehouse => "WAREHOUSE",
            Self::Healthcare => "HEALTHCARE",
            Self::Commercial => "COMMERCIAL",
            Self::Lab => "LAB",
        }
    }
}

impl std::fmt::Display for BuildingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const HEALTHCARE_WORDS: &[&str] = &[
    "healthcare",
    "hospital",
    "clinic",
    "medical",
    "behavioral health",
];
const LAB_WORDS: &[&str] = &["cleanroom", "pharmaceutical", "semiconductor"];
const WAREHOUSE_WORDS: &[&str] = &["warehouse", "distribution", "logistics"];
const COMMERCIAL_WORDS: &[&str] = &["commercial", "office"];
const RENOVATION_WORDS: &[&str] = &[
    "renovation",
    "existing",
    "remodel",
    "retrofit",
    "tenant improvement",
    " ti ",
];
const PRICE_LIST_WORDS: &[&str] = &[
    "stage d",
    "stage e",
    "stage f",
    "unit cost",
    "price",
    "cost per",
    "takeoff",
    "quantities",
];

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Classify a project description by keyword.
///
/// Healthcare wins over lab: hospitals often contain laboratories. A bare
/// "laboratory" only counts when no hospital or medical context is present.
pub fn detect_building_type(text: &str) -> Option<BuildingCategory> {
    let t = text.to_lowercase();

    if mentions_any(&t, HEALTHCARE_WORDS) {
        return Some(BuildingCategory::Healthcare);
    }
    if mentions_any(&t, LAB_WORDS) || t.contains("laboratory") {
        return Some(BuildingCategory::Lab);
    }
    if mentions_any(&t, WAREHOUSE_WORDS) {
        return Some(BuildingCategory::Warehouse);
    }
    if mentions_any(&t, COMMERCIAL_WORDS) {
        return Some(BuildingCategory::Commercial);
    }
    None
}

/// Whether the description involves work on an existing structure.
pub fn mentions_renovation(text: &str) -> bool {
    mentions_any(&text.to_lowercase(), RENOVATION_WORDS)
}

/// Whether unit pricing is needed: a later design stage or an explicit
/// question about prices or quantities.
pub fn needs_price_list(text: &str) -> bool {
    mentions_any(&text.to_lowercase(), PRICE_LIST_WORDS)
}
