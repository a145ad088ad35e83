//! catcrawl CLI
//!
//! Local execution entry point: crawl a catalog tree, then classify the
//! inventoried dataset URLs into date-varying groups.

use std::path::PathBuf;

use catcrawl::{
    crawl::HttpSource,
    error::Result,
    models::Config,
    pipeline,
    utils::http,
};
use clap::{Parser, Subcommand};

/// catcrawl - Scientific dataset catalog crawler and classifier
#[derive(Parser, Debug)]
#[command(name = "catcrawl", version, about = "THREDDS catalog crawler and URL date classifier")]
struct Cli {
    /// Path to storage directory containing config and cache files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a catalog tree and inventory its dataset URLs
    Crawl {
        /// Seed catalog URL (required unless --resume)
        seed: Option<String>,

        /// Resume an interrupted crawl from saved frontier state
        #[arg(long)]
        resume: bool,
    },

    /// Group inventoried URLs and infer their date structure
    Classify,

    /// Validate the configuration file
    Validate,

    /// Show cache statistics
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    match cli.command {
        Command::Crawl { seed, resume } => {
            config.validate()?;
            let client = http::create_client(&config.crawler)?;
            let source = HttpSource::new(client);

            let stats =
                pipeline::run_crawl(&config, &cli.storage_dir, &source, seed.as_deref(), resume)
                    .await?;

            log::info!(
                "Visited {} catalogs and found {} datasets in {}s",
                stats.catalogs_visited,
                stats.datasets_found,
                (stats.end_time - stats.start_time).num_seconds()
            );
        }

        Command::Classify => {
            config.validate()?;
            let report = pipeline::run_classify(&config, &cli.storage_dir)?;

            for group in &report.groups {
                if group.date_varying {
                    log::info!(
                        "{} ({} members, {:?})",
                        group.signature,
                        group.member_count,
                        group.date_range
                    );
                }
            }
        }

        Command::Validate => match config.validate() {
            Ok(()) => log::info!("Configuration at {} is valid", config_path.display()),
            Err(e) => {
                log::error!("Configuration invalid: {e}");
                return Err(e);
            }
        },

        Command::Info => {
            let catalogs = pipeline::open_catalog_cache(&config, &cli.storage_dir, true)?;
            let docs = pipeline::open_doc_cache(&config, &cli.storage_dir, true)?;

            log::info!(
                "Catalog cache: {} visited, {} bodies",
                catalogs.visited_count(),
                catalogs.response_keys().len()
            );
            log::info!(
                "Document cache: {} visited, {} bodies",
                docs.visited_count(),
                docs.response_keys().len()
            );
        }
    }

    Ok(())
}
