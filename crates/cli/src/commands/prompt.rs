//! `estimait prompt|prompts|summary|classify`: knowledge registry commands.

use super::load_config;
use clap::Args;
use estimait_registry::{
    KnowledgeRouter, Layer, PromptQuery, detect_building_type, mentions_renovation,
    needs_price_list,
};
use std::path::Path;

/// Keyword filters accepted by `estimait prompt`.
#[derive(Debug, Default, Args)]
pub struct QueryArgs {
    /// Building type (LAYER2, GC_SPECIFIC, factor layers)
    #[arg(long)]
    pub building_type: Option<String>,
    /// Prompt type under a LAYER2 building, e.g. KNOWLEDGE
    #[arg(long)]
    pub prompt_type: Option<String>,
    /// LAYER3 tool type
    #[arg(long)]
    pub tool_type: Option<String>,
    /// General contractor key
    #[arg(long)]
    pub gc_type: Option<String>,
    /// Region (factor layers)
    #[arg(long)]
    pub region: Option<String>,
    /// Stage (factor layers)
    #[arg(long)]
    pub stage: Option<String>,
    /// Renovation scope (RENOVATION_FACTORS)
    #[arg(long)]
    pub scope: Option<String>,
}

impl From<QueryArgs> for PromptQuery {
    fn from(args: QueryArgs) -> Self {
        PromptQuery {
            building_type: args.building_type,
            prompt_type: args.prompt_type,
            tool_type: args.tool_type,
            gc_type: args.gc_type,
            region: args.region,
            stage: args.stage,
            renovation_scope: args.scope,
        }
    }
}

pub fn prompt(
    config_path: Option<&Path>,
    layer: &str,
    args: QueryArgs,
    all: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let router = KnowledgeRouter::from_config(&config)?;
    let query = PromptQuery::from(args);

    if all {
        let layer: Layer = layer.parse()?;
        let variants = router.variants(layer, &query)?;
        println!("{}", serde_json::to_string_pretty(&variants)?);
        return Ok(());
    }

    let outcome = router.route(layer, &query);
    println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    if let Some(e) = outcome.error() {
        tracing::debug!(error = %e, "Prompt lookup did not resolve");
    }
    Ok(())
}

pub fn list(
    config_path: Option<&Path>,
    layer: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let router = KnowledgeRouter::from_config(&config)?;

    let subtree = router.list_available_prompts(layer);
    println!("{}", serde_json::to_string_pretty(&subtree)?);
    Ok(())
}

pub fn summary(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let router = KnowledgeRouter::from_config(&config)?;
    println!("{}", router.summary());
    Ok(())
}

pub fn classify(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&classification(text))?);
    Ok(())
}

/// Every keyword classifier's verdict on `text`.
pub fn classification(text: &str) -> serde_json::Value {
    serde_json::json!({
        "building_type": detect_building_type(text),
        "renovation": mentions_renovation(text),
        "price_list": needs_price_list(text),
    })
}
