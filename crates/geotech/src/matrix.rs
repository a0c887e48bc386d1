//! The geotechnical cost driver matrix.
//!
//! Typed view of `GEOTECHNICAL_COST_DRIVER_MATRIX_*.yaml`:
//!
//! ```yaml
//! regions:
//!   CA_Inland:
//!     geotechnical_profile:
//!       expansive_soils: { cost_impact: "+1-2%", description: ..., confidence: HIGH }
//!     recommendations:
//!       bidding_stage:    { base_adjustment: 0.03, risk_premium: 0.01, total: 0.04 }
//!       post_award_stage: { ... }
//!       final_stage:      { ... }
//!     summary: { confidence: MEDIUM, notes: ... }
//!     historical_data:
//!       by_building_type:
//!         warehouse: { projects: 12, avg_adjustment: 0.028 }
//! building_type_adjustments:
//!   warehouse: { adjustment_multiplier: 0.8 }
//! ```

use estimait_core::{Confidence, KnowledgeError, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The whole matrix document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostDriverMatrix {
    #[serde(default)]
    pub regions: BTreeMap<String, RegionEntry>,
    #[serde(default)]
    pub building_type_adjustments: BTreeMap<String, BuildingTypeAdjustment>,
}

/// One geographic cost zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    #[serde(default)]
    pub geotechnical_profile: BTreeMap<String, CostDriver>,
    /// Keyed by `bidding_stage`, `post_award_stage`, `final_stage`.
    #[serde(default)]
    pub recommendations: BTreeMap<String, StageRecommendation>,
    #[serde(default)]
    pub summary: RegionSummary,
    #[serde(default)]
    pub historical_data: serde_json::Map<String, serde_json::Value>,
}

/// A single soil, seismic or groundwater cost driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostDriver {
    /// Free-form, usually a percentage range such as `"+1-2%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_impact: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

/// Adjustment fractions for one project stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecommendation {
    pub base_adjustment: f64,
    pub risk_premium: f64,
    /// Total as stated in the matrix; not recomputed.
    pub total: f64,
    /// Any other fields the matrix carries (rationale, ranges).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub notes: String,
}

/// How sensitive a building type is to geotechnical drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingTypeAdjustment {
    /// Applied to the base adjustment only, never to the risk premium.
    pub adjustment_multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl CostDriverMatrix {
    /// Parse and validate matrix YAML. `origin` is only used in error messages.
    pub fn from_yaml_str(content: &str, origin: &Path) -> Result<Self, KnowledgeError> {
        let matrix: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| KnowledgeError::ParseError {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Load a matrix file. A missing file yields an empty matrix, against
    /// which every assessment fails with "unknown region".
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        if !path.exists() {
            tracing::warn!("Matrix file not found at {}, using empty matrix", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let matrix = Self::from_yaml_str(&content, path)?;
        tracing::info!(
            path = %path.display(),
            regions = matrix.regions.len(),
            building_types = matrix.building_type_adjustments.len(),
            "Loaded cost driver matrix"
        );
        Ok(matrix)
    }

    /// Check the structural invariants every assessment relies on.
    ///
    /// Each region must carry all three stage recommendations and at least
    /// one cost driver; every multiplier must be a positive finite number.
    pub fn validate(&self) -> Result<(), KnowledgeError> {
        for (name, region) in &self.regions {
            for stage in Stage::ALL {
                if !region.recommendations.contains_key(stage.recommendation_key()) {
                    return Err(KnowledgeError::ValidationError(format!(
                        "region '{name}' is missing recommendations.{}",
                        stage.recommendation_key()
                    )));
                }
            }
            if region.geotechnical_profile.is_empty() {
                return Err(KnowledgeError::ValidationError(format!(
                    "region '{name}' has an empty geotechnical_profile"
                )));
            }
        }

        for (name, adj) in &self.building_type_adjustments {
            if !(adj.adjustment_multiplier.is_finite() && adj.adjustment_multiplier > 0.0) {
                return Err(KnowledgeError::ValidationError(format!(
                    "building type '{name}' has non-positive adjustment_multiplier {}",
                    adj.adjustment_multiplier
                )));
            }
        }

        Ok(())
    }

    /// Region identifiers, sorted.
    pub fn region_names(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }

    /// Building type identifiers, sorted.
    pub fn building_type_names(&self) -> Vec<String> {
        self.building_type_adjustments.keys().cloned().collect()
    }
}
