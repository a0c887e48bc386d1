//! Geotechnical cost assessment engine.

use crate::matrix::{CostDriverMatrix, RegionEntry};
use crate::model::{AssessmentResult, CostImpactEstimate, DriverBreakdown, RegionComparison};
use estimait_config::AppConfig;
use estimait_core::{AssessmentError, KnowledgeError, recommendation_key_for};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Computes cost adjustments from a loaded [`CostDriverMatrix`].
///
/// Every query is a pure function of the current matrix and its inputs.
/// Reloading swaps the matrix whole; in-flight queries keep the snapshot
/// they started with.
pub struct GeotechnicalAssessment {
    matrix: RwLock<Arc<CostDriverMatrix>>,
}

impl GeotechnicalAssessment {
    /// Create an engine over an already-validated matrix.
    pub fn new(matrix: CostDriverMatrix) -> Self {
        Self {
            matrix: RwLock::new(Arc::new(matrix)),
        }
    }

    /// Create an engine with no regions or building types.
    pub fn empty() -> Self {
        Self::new(CostDriverMatrix::default())
    }

    /// Load the matrix at `path`. A missing file yields an empty engine.
    pub fn open(path: &Path) -> Result<Self, KnowledgeError> {
        Ok(Self::new(CostDriverMatrix::load(path)?))
    }

    /// Load the matrix named by application config.
    pub fn from_config(config: &AppConfig) -> Result<Self, KnowledgeError> {
        Self::open(&config.knowledge.matrix_file())
    }

    /// Validate and swap in a new matrix. On error the current matrix stays.
    pub fn reload(&self, matrix: CostDriverMatrix) -> Result<(), KnowledgeError> {
        matrix.validate()?;
        let regions = matrix.regions.len();
        *self.matrix.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(matrix);
        info!(regions, "Cost driver matrix reloaded");
        Ok(())
    }

    /// The current matrix.
    pub fn snapshot(&self) -> Arc<CostDriverMatrix> {
        self.matrix.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Region identifiers the engine can assess.
    pub fn regions(&self) -> Vec<String> {
        self.snapshot().region_names()
    }

    /// Building types the engine has multipliers for.
    pub fn building_types(&self) -> Vec<String> {
        self.snapshot().building_type_names()
    }

    /// Assess one project.
    ///
    /// `stage` is matched case-insensitively (`BIDDING`, `post_award`,
    /// `final`); other labels are looked up verbatim among the region's
    /// recommendation keys. When `hard_cost` is given the result also carries
    /// the dollar impact.
    pub fn assess(
        &self,
        region: &str,
        building_type: &str,
        stage: &str,
        hard_cost: Option<f64>,
    ) -> Result<AssessmentResult, AssessmentError> {
        assess_in(&self.snapshot(), region, building_type, stage, hard_cost)
    }

    /// Assess each region and rank them, highest adjustment first.
    ///
    /// Regions that fail validation are logged and left out. Equal
    /// adjustments keep their input order.
    pub fn compare_regions<S: AsRef<str>>(
        &self,
        regions: &[S],
        building_type: &str,
        stage: &str,
    ) -> Vec<RegionComparison> {
        // One snapshot for the whole ranking.
        let matrix = self.snapshot();
        let mut rows: Vec<RegionComparison> = regions
            .iter()
            .filter_map(|region| {
                let region = region.as_ref();
                match assess_in(&matrix, region, building_type, stage, None) {
                    Ok(result) => Some(RegionComparison::from(&result)),
                    Err(e) => {
                        warn!(region, error = %e, "Skipping region in comparison");
                        None
                    }
                }
            })
            .collect();

        // `sort_by` is stable.
        rows.sort_by(|a, b| b.final_adjustment.total_cmp(&a.final_adjustment));
        rows
    }

    /// Historical project data for a region.
    ///
    /// Without a building type this is the region's whole `historical_data`
    /// mapping; with one it is that type's entry under `by_building_type`.
    pub fn get_historical_data(
        &self,
        region: &str,
        building_type: Option<&str>,
    ) -> Result<serde_json::Value, AssessmentError> {
        let matrix = self.snapshot();
        let region_data = matrix.regions.get(region).ok_or_else(|| AssessmentError::UnknownRegion {
            region: region.to_string(),
            available: matrix.region_names(),
        })?;

        let historical = &region_data.historical_data;
        let Some(building_type) = building_type else {
            return Ok(serde_json::Value::Object(historical.clone()));
        };

        let by_type = historical
            .get("by_building_type")
            .and_then(serde_json::Value::as_object);

        by_type
            .and_then(|m| m.get(building_type))
            .cloned()
            .ok_or_else(|| AssessmentError::NoHistoricalData {
                region: region.to_string(),
                building_type: building_type.to_string(),
                available: by_type.map(|m| m.keys().cloned().collect()).unwrap_or_default(),
            })
    }

    /// Dollar impact of the geotechnical adjustment on `hard_cost`.
    pub fn estimate_cost_impact(
        &self,
        region: &str,
        building_type: &str,
        hard_cost: f64,
        stage: &str,
    ) -> Result<CostImpactEstimate, AssessmentError> {
        let result = self.assess(region, building_type, stage, Some(hard_cost))?;
        Ok(CostImpactEstimate::from_assessment(result, hard_cost))
    }
}

impl Default for GeotechnicalAssessment {
    fn default() -> Self {
        Self::empty()
    }
}

/// One assessment against a fixed matrix.
fn assess_in(
    matrix: &CostDriverMatrix,
    region: &str,
    building_type: &str,
    stage: &str,
    hard_cost: Option<f64>,
) -> Result<AssessmentResult, AssessmentError> {
    let region_data = matrix.regions.get(region).ok_or_else(|| AssessmentError::UnknownRegion {
        region: region.to_string(),
        available: matrix.region_names(),
    })?;

    let adjustment = matrix.building_type_adjustments.get(building_type).ok_or_else(|| {
        AssessmentError::UnknownBuildingType {
            building_type: building_type.to_string(),
            available: matrix.building_type_names(),
        }
    })?;

    let key = recommendation_key_for(stage);
    let rec = region_data.recommendations.get(&key).ok_or_else(|| AssessmentError::UnknownStage {
        stage: stage.to_string(),
        available: region_data.recommendations.keys().cloned().collect(),
    })?;

    let multiplier = adjustment.adjustment_multiplier;
    // The risk premium is regional and is not scaled by building type.
    let final_adjustment = rec.base_adjustment * multiplier + rec.risk_premium;
    let cost_impact = hard_cost.map(|cost| cost * final_adjustment);

    debug!(
        region,
        building_type,
        stage,
        final_adjustment,
        "Assessed geotechnical adjustment"
    );

    Ok(AssessmentResult {
        region: region.to_string(),
        building_type: building_type.to_string(),
        stage: stage.to_string(),
        base_adjustment: rec.base_adjustment,
        risk_premium: rec.risk_premium,
        total_adjustment: rec.total,
        building_type_multiplier: multiplier,
        final_adjustment,
        cost_impact,
        confidence: region_data.summary.confidence.clone(),
        breakdown: breakdown(region_data),
        recommendations: rec.clone(),
        notes: region_data.summary.notes.clone(),
    })
}

/// Drivers that state a cost impact, with description and confidence filled in.
fn breakdown(region: &RegionEntry) -> BTreeMap<String, DriverBreakdown> {
    region
        .geotechnical_profile
        .iter()
        .filter_map(|(name, driver)| {
            let cost_impact = driver.cost_impact.clone()?;
            Some((
                name.clone(),
                DriverBreakdown {
                    cost_impact,
                    description: driver.description.clone().unwrap_or_default(),
                    confidence: driver.confidence.clone().unwrap_or_default(),
                },
            ))
        })
        .collect()
}
