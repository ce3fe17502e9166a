use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "osmrefresh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Refresh previously downloaded OpenStreetMap extracts")]
#[command(
    long_about = "osmrefresh re-downloads every OpenStreetMap extract (.osm.pbf) found in a \
                       download directory, purging stale converted .gpkg files first so that \
                       downstream tools never read out-of-date data."
)]
#[command(before_help = "🌍 osmrefresh - OSM Extract Refresh Tool")]
#[command(after_help = "EXAMPLES:\n  \
    osmrefresh ~/osm/downloads\n  \
    osmrefresh ~/osm/downloads --keep-gpkg --verbose\n  \
    osmrefresh ~/osm/downloads --max-size 1000 --timeout 600\n  \
    osmrefresh --config my-config.toml --output-format json\n\n\
    The directory may also be given via the OSMREFRESH_DOWNLOAD_DIR environment variable.")]
pub struct Cli {
    /// Directory containing previously downloaded extracts
    #[arg(value_name = "DIRECTORY", env = "OSMREFRESH_DOWNLOAD_DIR")]
    pub directory: Option<PathBuf>,

    /// Keep converted geo-package files
    #[arg(long, help = "Keep .gpkg files instead of purging them before the refresh")]
    pub keep_gpkg: bool,

    /// Maximum download size in MB
    #[arg(long, help = "Maximum size per downloaded extract (in MB)")]
    pub max_size: Option<u64>,

    /// Download timeout in seconds
    #[arg(long, help = "Timeout for each download (seconds)")]
    pub timeout: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be purged and refreshed without doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size * 1024 * 1024); // Convert MB to bytes

        CliOverrides::new()
            .with_directory(self.directory.clone())
            .with_max_file_size(max_file_size)
            .with_timeout(self.timeout)
            .with_keep_gpkg(self.keep_gpkg.then_some(true))
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
