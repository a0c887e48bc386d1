//! `estimait assess|compare|estimate|history`: geotechnical cost commands.

use super::load_config;
use estimait_geotech::{AssessmentResult, GeotechnicalAssessment, RegionComparison};
use std::path::Path;

const RULE_WIDTH: usize = 80;

pub fn assess(
    config_path: Option<&Path>,
    region: Option<String>,
    building_type: Option<String>,
    stage: Option<String>,
    hard_cost: Option<f64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let engine = GeotechnicalAssessment::from_config(&config)?;
    let d = &config.defaults;

    let result = engine.assess(
        region.as_deref().unwrap_or(&d.region),
        building_type.as_deref().unwrap_or(&d.building_type),
        stage.as_deref().unwrap_or(&d.stage),
        hard_cost,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_assessment(&result, hard_cost));
    }
    Ok(())
}

pub fn compare(
    config_path: Option<&Path>,
    regions: Vec<String>,
    building_type: Option<String>,
    stage: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let engine = GeotechnicalAssessment::from_config(&config)?;
    let d = &config.defaults;

    let rows = engine.compare_regions(
        regions.as_slice(),
        building_type.as_deref().unwrap_or(&d.building_type),
        stage.as_deref().unwrap_or(&d.stage),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", format_comparison(&rows));
    }
    Ok(())
}

pub fn estimate(
    config_path: Option<&Path>,
    region: Option<String>,
    building_type: Option<String>,
    hard_cost: f64,
    stage: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let engine = GeotechnicalAssessment::from_config(&config)?;
    let d = &config.defaults;

    let estimate = engine.estimate_cost_impact(
        region.as_deref().unwrap_or(&d.region),
        building_type.as_deref().unwrap_or(&d.building_type),
        hard_cost,
        stage.as_deref().unwrap_or(&d.stage),
    )?;

    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}

pub fn history(
    config_path: Option<&Path>,
    region: Option<String>,
    building_type: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let engine = GeotechnicalAssessment::from_config(&config)?;

    let data = engine.get_historical_data(
        region.as_deref().unwrap_or(&config.defaults.region),
        building_type.as_deref(),
    )?;

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

// ── Formatting ─────────────────────────────────────────────────────────

/// The assessment report block.
pub fn format_assessment(result: &AssessmentResult, hard_cost: Option<f64>) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("\n{heavy}\nGEOTECHNICAL COST ASSESSMENT\n{heavy}\n"));
    out.push_str(&format!("Region:           {}\n", result.region));
    out.push_str(&format!("Building Type:    {}\n", result.building_type));
    out.push_str(&format!("Stage:            {}\n", result.stage));
    out.push_str(&format!("Confidence:       {}\n", result.confidence));
    out.push_str(&format!("{light}\n"));
    out.push_str(&format!("Base Adjustment:  {}\n", percent(result.base_adjustment)));
    out.push_str(&format!("Risk Premium:     {}\n", percent(result.risk_premium)));
    out.push_str(&format!("Total Adjustment: {}\n", percent(result.total_adjustment)));
    out.push_str(&format!(
        "BT Multiplier:    {:.2}x\n",
        result.building_type_multiplier
    ));
    out.push_str(&format!("Final Adjustment: {}\n", percent(result.final_adjustment)));

    if let Some(hard_cost) = hard_cost {
        let impact = result.cost_impact.unwrap_or(hard_cost * result.final_adjustment);
        out.push_str(&format!("{light}\n"));
        out.push_str(&format!("Hard Cost:        {}\n", dollars(hard_cost)));
        out.push_str(&format!("Cost Impact:      {}\n", dollars(impact)));
        out.push_str(&format!("Total w/ Geo:     {}\n", dollars(hard_cost + impact)));
    }

    if !result.breakdown.is_empty() {
        out.push_str(&format!("{light}\n"));
        for (name, driver) in &result.breakdown {
            let impact = match &driver.cost_impact {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push_str(&format!("  {name:<24} {impact:<12} {}\n", driver.confidence));
        }
    }

    out.push_str(&format!("{light}\nNotes: {}\n{heavy}\n", result.notes));
    out
}

/// The region comparison table.
pub fn format_comparison(rows: &[RegionComparison]) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!(
        "\n{heavy}\nREGIONAL GEOTECHNICAL COST COMPARISON\n{heavy}\n"
    ));
    out.push_str(&format!(
        "{:<20} {:<15} {:<15} {:<30}\n",
        "Region", "Adjustment", "Confidence", "Notes"
    ));
    out.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH)));

    for row in rows {
        let notes: String = row.notes.chars().take(30).collect();
        out.push_str(&format!(
            "{:<20} {:>6}          {:<15} {}\n",
            row.region,
            percent(row.final_adjustment),
            row.confidence.to_string(),
            notes
        ));
    }

    out.push_str(&format!("{heavy}\n"));
    out
}

/// `0.034` → `3.4%`
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// `1700000.4` → `$1,700,000`
pub fn dollars(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
