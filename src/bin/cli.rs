//! timeschd CLI
//!
//! Parses time schedule course pages into JSON Lines, enriching instructors
//! from the faculty directory.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use timeschd::{
    error::Result,
    models::{BatchEntry, Config},
    pipeline,
    services::{
        DirectoryApi, DirectoryClient, FilePageSource, HttpPageSource, InstructorEnricher,
        PageSource, ScheduleParser,
    },
    storage::RedisCache,
    utils::{Retry, http},
};
use tokio::io::AsyncWriteExt;

/// timeschd - Time Schedule Scraper
#[derive(Parser, Debug)]
#[command(name = "timeschd", version, about = "University time schedule scraper")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "timeschd.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one saved course page
    Parse {
        /// Rendered HTML of the course page
        file: PathBuf,

        #[arg(long)]
        quarter: String,

        #[arg(long)]
        year: String,

        /// Skip the directory lookup for the instructor
        #[arg(long)]
        offline: bool,
    },

    /// Fetch and parse every page listed in a JSON Lines batch file
    Batch {
        /// Batch file with one {sln, quarter, year, url} object per line
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read saved `{sln}.html` pages from this directory instead of fetching
        #[arg(long)]
        pages_dir: Option<PathBuf>,

        /// Skip the directory lookup for instructors
        #[arg(long)]
        offline: bool,
    },

    /// Look up an instructor's contact details
    Lookup {
        first_name: String,

        #[arg(default_value = "")]
        last_name: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Connect to the cache and build the enricher.
///
/// An unreachable cache is fatal.
async fn build_enricher(config: &Config) -> Result<InstructorEnricher> {
    let cache = RedisCache::connect(&config.cache).await?;
    let client = http::create_client(&config.http)?;
    let directory: Arc<dyn DirectoryApi> =
        Arc::new(DirectoryClient::new(&config.directory, client));

    Ok(InstructorEnricher::new(
        Arc::new(cache),
        directory,
        config.cache.policy.clone(),
        Retry::from_config(&config.retry).with_logger("timeschd::directory"),
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    match cli.command {
        Command::Parse {
            file,
            quarter,
            year,
            offline,
        } => {
            let html = tokio::fs::read_to_string(&file).await?;
            let enricher = if offline {
                None
            } else {
                Some(build_enricher(&config).await?)
            };

            let parser = ScheduleParser::new(enricher.as_ref());
            let course = parser
                .parse_html(&html, &config.schedule, &quarter, &year)
                .await?;
            println!("{}", serde_json::to_string(&course)?);
        }

        Command::Batch {
            input,
            output,
            pages_dir,
            offline,
        } => {
            let entries = BatchEntry::load_all(&input)?;
            log::info!("Loaded {} entries from {}", entries.len(), input.display());

            let enricher = if offline {
                None
            } else {
                Some(build_enricher(&config).await?)
            };
            let parser = ScheduleParser::new(enricher.as_ref());

            let source: Box<dyn PageSource> = match pages_dir {
                Some(dir) => Box::new(FilePageSource::new(dir)),
                None => Box::new(HttpPageSource::new(
                    http::create_client(&config.http)?,
                    config.schedule.clone(),
                )),
            };

            let outcome = match output {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path).await?;
                    let outcome =
                        pipeline::run_batch(&config, &entries, source.as_ref(), &parser, &mut file)
                            .await?;
                    log::info!("Courses written to {}", path.display());
                    outcome
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    let outcome = pipeline::run_batch(
                        &config,
                        &entries,
                        source.as_ref(),
                        &parser,
                        &mut stdout,
                    )
                    .await?;
                    stdout.flush().await?;
                    outcome
                }
            };

            for failure in &outcome.failures {
                log::warn!("SLN {} skipped: {}", failure.sln, failure.error);
            }
        }

        Command::Lookup {
            first_name,
            last_name,
        } => {
            let enricher = build_enricher(&config).await?;
            let data = enricher.get_data(&first_name, &last_name).await?;
            if data.from_cache() {
                log::info!("Served from cache");
            }
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("Schedule URL template: {}", config.schedule.url_template);
            log::info!("Directory endpoint: {}", config.directory.base_url);
            log::info!("Cache: {}", config.cache.address());
        }
    }

    Ok(())
}
