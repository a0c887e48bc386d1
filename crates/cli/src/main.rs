//! EstimAIt CLI: the main entry point.
//!
//! Commands:
//! - `assess`    Geotechnical adjustment for one project
//! - `compare`   Rank regions by adjustment
//! - `estimate`  Dollar impact on a hard cost
//! - `history`   Historical project data for a region
//! - `prompt`    Route a query to a knowledge prompt
//! - `prompts`   List a registry section
//! - `summary`   Condensed registry index
//! - `classify`  Building category and renovation flag for a description
//! - `config`    Show, locate or validate configuration
//! - `status`    Show what is loaded

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "estimait",
    about = "EstimAIt: construction cost knowledge lookup and geotechnical assessment",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.estimait/config.toml
    #[arg(long, global = true, env = "ESTIMAIT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess the geotechnical cost adjustment for a project
    Assess {
        /// Region identifier, e.g. CA_Inland
        #[arg(short, long)]
        region: Option<String>,
        /// Building type, e.g. warehouse
        #[arg(short, long)]
        building_type: Option<String>,
        /// BIDDING, POST_AWARD or FINAL
        #[arg(short, long)]
        stage: Option<String>,
        /// Hard cost in dollars
        #[arg(long)]
        hard_cost: Option<f64>,
        /// Print JSON instead of the formatted report
        #[arg(long)]
        json: bool,
    },

    /// Compare regions, highest adjustment first
    Compare {
        /// Regions to compare
        #[arg(required = true)]
        regions: Vec<String>,
        #[arg(short, long)]
        building_type: Option<String>,
        #[arg(short, long)]
        stage: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Estimate the dollar impact of geotechnical factors
    Estimate {
        #[arg(short, long)]
        region: Option<String>,
        #[arg(short, long)]
        building_type: Option<String>,
        /// Hard cost in dollars
        #[arg(long)]
        hard_cost: f64,
        #[arg(short, long)]
        stage: Option<String>,
    },

    /// Show historical project data for a region
    History {
        #[arg(short, long)]
        region: Option<String>,
        /// Only this building type's entry
        #[arg(short, long)]
        building_type: Option<String>,
    },

    /// Route a query to a knowledge prompt descriptor
    Prompt {
        /// LAYER1, LAYER2, LAYER3, GC_SPECIFIC, RENOVATION_FACTORS or GEOTECHNICAL_FACTORS
        layer: String,
        #[command(flatten)]
        query: commands::prompt::QueryArgs,
        /// List every variant instead of the first
        #[arg(long)]
        all: bool,
    },

    /// List everything registered under a top-level section
    Prompts {
        /// Top-level section, e.g. LAYER2
        layer: String,
    },

    /// Print a condensed index of the registry
    Summary,

    /// Classify a free-form project description
    Classify {
        /// Project description
        text: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show what is loaded
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Validate configuration and knowledge files
    Validate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Assess {
            region,
            building_type,
            stage,
            hard_cost,
            json,
        } => {
            commands::assess::assess(config, region, building_type, stage, hard_cost, json)?
        }
        Commands::Compare {
            regions,
            building_type,
            stage,
            json,
        } => commands::assess::compare(config, regions, building_type, stage, json)?,
        Commands::Estimate {
            region,
            building_type,
            hard_cost,
            stage,
        } => commands::assess::estimate(config, region, building_type, hard_cost, stage)?,
        Commands::History {
            region,
            building_type,
        } => commands::assess::history(config, region, building_type)?,
        Commands::Prompt { layer, query, all } => {
            commands::prompt::prompt(config, &layer, query, all)?
        }
        Commands::Prompts { layer } => commands::prompt::list(config, &layer)?,
        Commands::Summary => commands::prompt::summary(config)?,
        Commands::Classify { text } => commands::prompt::classify(&text)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config)?,
            ConfigAction::Path => commands::config_cmd::path(config)?,
            ConfigAction::Validate => commands::config_cmd::validate(config)?,
        },
        Commands::Status => commands::status::run(config)?,
    }

    Ok(())
}
