//! Assessment results.

use crate::matrix::StageRecommendation;
use estimait_core::Confidence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a single (region, building type, stage) assessment.
///
/// All adjustments are fractions: `0.034` means 3.4% of hard cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub region: String,
    pub building_type: String,
    pub stage: String,
    pub base_adjustment: f64,
    pub risk_premium: f64,
    /// Total as stated in the matrix, before the building-type multiplier.
    pub total_adjustment: f64,
    pub building_type_multiplier: f64,
    /// `base_adjustment * building_type_multiplier + risk_premium`
    pub final_adjustment: f64,
    /// Dollar impact, present only when a hard cost was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_impact: Option<f64>,
    pub confidence: Confidence,
    pub breakdown: BTreeMap<String, DriverBreakdown>,
    pub recommendations: StageRecommendation,
    pub notes: String,
}

/// One cost driver's contribution, as listed in the region profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverBreakdown {
    pub cost_impact: serde_json::Value,
    pub description: String,
    pub confidence: Confidence,
}

/// One row of a multi-region comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionComparison {
    pub region: String,
    pub final_adjustment: f64,
    pub confidence: Confidence,
    pub notes: String,
}

impl From<&AssessmentResult> for RegionComparison {
    fn from(result: &AssessmentResult) -> Self {
        Self {
            region: result.region.clone(),
            final_adjustment: result.final_adjustment,
            confidence: result.confidence.clone(),
            notes: result.notes.clone(),
        }
    }
}

/// Flat dollar summary of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostImpactEstimate {
    pub region: String,
    pub building_type: String,
    pub stage: String,
    pub base_hard_cost: f64,
    /// `final_adjustment * 100`
    pub geotechnical_adjustment_percent: f64,
    pub geotechnical_cost_impact: f64,
    pub total_cost_with_geo: f64,
    pub breakdown: BTreeMap<String, DriverBreakdown>,
    pub confidence: Confidence,
}

impl CostImpactEstimate {
    /// Derive the dollar summary from an assessment made at `hard_cost`.
    pub fn from_assessment(result: AssessmentResult, hard_cost: f64) -> Self {
        let impact = hard_cost * result.final_adjustment;
        Self {
            region: result.region,
            building_type: result.building_type,
            stage: result.stage,
            base_hard_cost: hard_cost,
            geotechnical_adjustment_percent: result.final_adjustment * 100.0,
            geotechnical_cost_impact: impact,
            total_cost_with_geo: hard_cost + impact,
            breakdown: result.breakdown,
            confidence: result.confidence,
        }
    }
}
