use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_guide::{
    catalog::{ChannelCatalogBuilder, load_catalog_or_empty},
    config::Config,
    epg::EpgService,
};

#[derive(Parser)]
#[command(name = "iptv-guide")]
#[command(version)]
#[command(about = "Builds an IPTV channel catalog and a merged XMLTV guide for it")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the channel catalog and write the guide-id registry
    Catalog {
        /// Catalog JSON file (overrides config file)
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Registry file to write (overrides config file)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,

        /// Print the channel list as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Aggregate the configured feeds into one XMLTV guide
    Epg {
        /// Catalog JSON file, used when the registry file is missing
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Registry file to read (overrides config file)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,

        /// Output guide file (overrides config file)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("iptv_guide={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting iptv-guide v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    match cli.command {
        Command::Catalog {
            catalog,
            registry,
            json,
        } => {
            if let Some(path) = catalog {
                config.catalog.path = path;
            }
            if let Some(path) = registry {
                config.catalog.registry_path = path;
            }
            run_catalog(&config, json)
        }
        Command::Epg {
            catalog,
            registry,
            output,
        } => {
            if let Some(path) = catalog {
                config.catalog.path = path;
            }
            if let Some(path) = registry {
                config.catalog.registry_path = path;
            }
            if let Some(path) = output {
                config.epg.output_path = path;
            }
            let report = EpgService::from_config(config)?.run().await?;
            println!(
                "{}: {} channels ({} with data, {} placeholders), {} programmes, {}/{} sources ok",
                report.output_path.display(),
                report.registry_ids,
                report.channels_with_data,
                report.fallback_channels,
                report.programmes,
                report.sources.len() - report.sources_failed(),
                report.sources.len()
            );
            Ok(())
        }
    }
}

fn run_catalog(config: &Config, json: bool) -> Result<()> {
    let entries = load_catalog_or_empty(&config.catalog.path);
    let (catalog, registry) = ChannelCatalogBuilder::from_config(&config.catalog)
        .build(&entries, &config.catalog.builtin_specials);

    registry.save(&config.catalog.registry_path)?;
    info!(
        "Wrote {} guide ids to {}",
        registry.len(),
        config.catalog.registry_path.display()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.records())?);
    } else {
        let summary = catalog.summary(&registry);
        println!(
            "{} channels ({} builtin, {} from catalog), {} guide ids",
            summary.total, summary.builtin_specials, summary.from_catalog, summary.registry_ids
        );
    }
    Ok(())
}
