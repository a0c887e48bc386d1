//! Geotechnical cost assessment.
//!
//! Resolves a (region, building type, stage) tuple against the cost driver
//! matrix and applies one formula:
//!
//! ```text
//! final_adjustment = base_adjustment * building_type_multiplier + risk_premium
//! ```
//!
//! The risk premium reflects regional uncertainty and is never scaled by
//! building type. Optional dollar figures are `hard_cost * final_adjustment`.

mod engine;
mod matrix;
mod model;

pub use engine::GeotechnicalAssessment;
pub use matrix::{
    BuildingTypeAdjustment, CostDriver, CostDriverMatrix, RegionEntry, RegionSummary,
    StageRecommendation,
};
pub use model::{AssessmentResult, CostImpactEstimate, DriverBreakdown, RegionComparison};
