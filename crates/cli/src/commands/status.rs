//! `estimait status`: show what is loaded.

use super::config_cmd::registry_file;
use super::{config_file, load_config};
use estimait_geotech::GeotechnicalAssessment;
use estimait_registry::KnowledgeRouter;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let router = KnowledgeRouter::from_config(&config)?;
    let engine = GeotechnicalAssessment::from_config(&config)?;

    let registry = registry_file(&config)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".into());
    let tree = router.snapshot();
    let regions = engine.regions();
    let building_types = engine.building_types();

    println!("📐 EstimAIt Status");
    println!("==================");
    println!("  Config dir:      {}", estimait_config::AppConfig::config_dir().display());
    println!("  Knowledge dir:   {}", config.knowledge.knowledge_dir);
    println!("  Registry:        {registry}");
    println!("  Sections:        {}", tree.sections().join(", "));
    println!("  Matrix:          {}", config.knowledge.matrix_file().display());
    println!("  Regions:         {}", regions.len());
    println!("  Building types:  {}", building_types.join(", "));
    println!(
        "  Default query:   {} / {} / {}",
        config.defaults.region, config.defaults.building_type, config.defaults.stage
    );

    if config_file(config_path).exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, using defaults");
    }

    Ok(())
}
