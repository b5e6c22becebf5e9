//! Isekai dataset CLI application.

use anyhow::{bail, Context, Result};
use clap::Parser;
use isekai_dataset::{write_anime_csv, write_characters_csv, DatasetFetcher, FetchOptions, JikanClient};
use shared::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch and create a dataset of Isekai anime and their characters.",
    long_about = None
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of anime to fetch
    #[arg(short, long)]
    limit: Option<usize>,

    /// Number of characters to fetch per anime
    #[arg(short = 'n', long)]
    character_limit: Option<usize>,

    /// Output file for anime data
    #[arg(short, long)]
    anime_file: Option<PathBuf>,

    /// Output file for character data
    #[arg(short = 'o', long)]
    character_file: Option<PathBuf>,

    /// Skip fetching characters and writing the character file
    #[arg(long)]
    no_characters: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(short, long)]
    verbose: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(limit) = self.limit {
            config.dataset.anime_limit = limit;
        }
        if let Some(limit) = self.character_limit {
            config.dataset.character_limit = limit;
        }
        if let Some(path) = &self.anime_file {
            config.dataset.anime_file = path.clone();
        }
        if let Some(path) = &self.character_file {
            config.dataset.character_file = path.clone();
        }
        if self.no_characters {
            config.dataset.include_characters = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.default_level = level.clone();
        }
        if self.verbose {
            config.logging.default_level = "debug".to_string();
        }
    }

    /// Load, override and validate the configuration
    ///
    /// The flag reports whether the config file existed; logging is not up
    /// yet, so the caller reports a missing file itself.
    fn load_config(&self) -> Result<(Config, bool)> {
        let loaded = Config::from_file(&self.config)
            .with_context(|| format!("Failed to load config from {}", self.config.display()))?;
        let found = loaded.is_some();
        let mut config = loaded.unwrap_or_default();
        self.apply(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok((config, found))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let (config, config_found) = args.load_config()?;

    if let Some(path) = &args.write_config {
        return config.save(path);
    }

    // Initialize logging
    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "isekai-dataset".to_string(),
        default_level: shared::logging::parse_level(&config.logging.default_level)?,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    if !config_found {
        warn!(path = %args.config.display(), "Config file not found, using defaults");
    }

    info!(
        config_file = %args.config.display(),
        limit = config.dataset.anime_limit,
        character_limit = config.dataset.character_limit,
        characters = config.dataset.include_characters,
        "Isekai dataset starting"
    );

    let client = Arc::new(JikanClient::new(&config.jikan).context("Failed to create Jikan client")?);
    let fetcher = DatasetFetcher::new(Arc::clone(&client), FetchOptions::from(&config.dataset));

    let dataset = fetcher.run().await;

    // Export after all fetching is done; one failed file does not block the other
    let mut failed_outputs = Vec::new();

    if let Err(e) = write_anime_csv(&config.dataset.anime_file, &dataset.anime) {
        error!(error = %format!("{:#}", e), "Failed to write anime data");
        failed_outputs.push(config.dataset.anime_file.display().to_string());
    }

    if config.dataset.include_characters {
        if let Err(e) = write_characters_csv(&config.dataset.character_file, &dataset.characters) {
            error!(error = %format!("{:#}", e), "Failed to write character data");
            failed_outputs.push(config.dataset.character_file.display().to_string());
        }
    }

    let stats = &dataset.stats;
    let requests_this_minute = client.rate_limiter().current_minute_count().await;
    info!(
        pages_requested = stats.pages_requested,
        anime = stats.anime_fetched,
        characters = stats.characters_fetched,
        characters_skipped = stats.characters_skipped,
        character_lists_failed = stats.character_lists_failed,
        duplicate_anime = stats.duplicate_anime,
        requests_this_minute = requests_this_minute,
        "Isekai dataset complete"
    );

    if !failed_outputs.is_empty() {
        bail!("Failed to write output: {}", failed_outputs.join(", "));
    }

    Ok(())
}
