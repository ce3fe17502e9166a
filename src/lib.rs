pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod scanner;
pub mod ui;
pub mod updater;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DownloadConfig, ProviderConfig, UpdateConfig};
pub use error::{OsmRefreshError, Result, UserFriendlyError};

// Core functionality re-exports
pub use catalog::{Provider, ProviderCatalog};
pub use fetcher::{
    ExtractFetcher, FetchProgress, FetchRequest, FetchStatus, FetchedExtract, HttpFetcher, MatchBy,
};
pub use scanner::{
    DirectoryScanner, DirectorySnapshot, ExtractResolver, FileEntry, ResolvedExtract,
};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};
pub use updater::{
    ConfigSnapshot, FileReport, GpkgPurge, PurgedFile, RefreshedFile, UpdatePlan, UpdateReport,
    UpdateSummary,
};

use chrono::Utc;
use std::path::Path;
use std::time::Instant;

/// Main library interface for refreshing downloaded OSM extracts
pub struct OsmRefresh {
    config: Config,
    catalog: ProviderCatalog,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    fetcher: Option<Box<dyn ExtractFetcher>>,
}

impl OsmRefresh {
    /// Create a new OsmRefresh instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let catalog = ProviderCatalog::from_config(&config.providers);
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            catalog,
            output_formatter,
            progress_manager,
            shutdown,
            fetcher: None,
        })
    }

    /// Create a new OsmRefresh instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let catalog = ProviderCatalog::from_config(&config.providers);
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            catalog,
            output_formatter,
            progress_manager,
            shutdown,
            fetcher: None,
        }
    }

    /// Create OsmRefresh instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Replace the fetch collaborator (used to inject recording fetchers in tests)
    pub fn with_fetcher(mut self, fetcher: Box<dyn ExtractFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Re-download every managed extract found in `directory`
    pub async fn update_extracts<P: AsRef<Path>>(&self, directory: P) -> Result<UpdateReport> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        // Validate the operation can proceed
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .start_operation("Starting extract refresh");

        // Step 1: Snapshot the directory and decide what the run will touch
        let plan = self.plan_update(directory)?;
        self.shutdown.check_shutdown()?;

        let before: Vec<FileReport> = plan.before.iter().map(FileReport::from).collect();
        self.output_formatter.info(&format!(
            "Found {} files in {}",
            plan.before.len(),
            plan.directory.display()
        ));
        self.output_formatter
            .print_file_table("Files before refresh", &before);

        // Step 2: Purge stale converted files
        let purged = self.purge_converted_files(&plan)?;
        self.shutdown.check_shutdown()?;

        // Step 3: Re-download each resolved extract in listing order
        if plan.to_refresh.is_empty() {
            self.output_formatter
                .warning("No refreshable extracts found");
        }

        let (refreshed, after) = self.refresh_extracts(&plan).await?;
        self.shutdown.check_shutdown()?;

        // Step 4: Assemble the report
        self.output_formatter
            .print_file_table("Refreshed files", &after);

        let summary = UpdateSummary::new(
            plan.before.len(),
            &purged,
            &refreshed,
            &plan.skipped,
            start_time.elapsed(),
        );
        self.output_formatter.print_update_summary(&summary);

        Ok(UpdateReport {
            directory: plan.directory.display().to_string(),
            started_at,
            finished_at: Utc::now(),
            before,
            purged,
            refreshed,
            skipped: plan.skipped,
            after,
            summary,
            config_used: ConfigSnapshot::from_config(&self.config),
        })
    }

    /// Compute what a refresh run would do without modifying anything
    pub fn plan_update<P: AsRef<Path>>(&self, directory: P) -> Result<UpdatePlan> {
        let scanner = DirectoryScanner::new();
        let snapshot = scanner.scan_directory(directory)?;

        let purge = GpkgPurge::new(self.config.update.delete_gpkg);
        let resolver = ExtractResolver::new(&self.catalog)?;

        Ok(UpdatePlan::build(&snapshot, &purge, &resolver))
    }

    /// Delete stale converted files, reporting each removal
    fn purge_converted_files(&self, plan: &UpdatePlan) -> Result<Vec<PurgedFile>> {
        if plan.purge_candidates.is_empty() {
            return Ok(Vec::new());
        }

        self.output_formatter
            .start_operation("Purging converted files");

        let purge = GpkgPurge::new(self.config.update.delete_gpkg);
        let formatter = &self.output_formatter;
        let report_removal = |removed: &PurgedFile| {
            formatter.info(&format!("Deleted {} ({} bytes)", removed.name, removed.size));
        };

        let purged = purge.purge(&plan.before, Some(&report_removal))?;

        self.output_formatter
            .success(&format!("Purged {} converted file(s)", purged.len()));

        Ok(purged)
    }

    /// Re-download resolved extracts one at a time with progress indication
    async fn refresh_extracts(
        &self,
        plan: &UpdatePlan,
    ) -> Result<(Vec<RefreshedFile>, Vec<FileReport>)> {
        if plan.to_refresh.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        self.output_formatter.start_operation("Refreshing extracts");

        let extract_progress = self
            .progress_manager
            .create_extract_progress(plan.to_refresh.len() as u64);

        let scanner = DirectoryScanner::new();
        let mut refreshed = Vec::with_capacity(plan.to_refresh.len());
        let mut after = Vec::with_capacity(plan.to_refresh.len());

        for resolved in &plan.to_refresh {
            self.shutdown.check_shutdown()?;

            let request = FetchRequest::for_refresh(resolved, &plan.directory);
            let fetched = self.fetch_one(&request).await?;

            refreshed.push(RefreshedFile {
                name: fetched.file_name.clone(),
                provider: resolved.provider.clone(),
                place_id: resolved.place_id.clone(),
                bytes_written: fetched.bytes_written,
            });
            after.push(FileReport::from(&scanner.stat_file(&fetched.path)?));
            extract_progress.inc(1);
        }

        ui::progress::finish_progress_with_summary(
            &extract_progress,
            &format!("Refreshed {} extract(s)", refreshed.len()),
            extract_progress.elapsed(),
        );

        Ok((refreshed, after))
    }

    /// Run one fetch through the injected collaborator or a progress-wired HTTP fetcher
    async fn fetch_one(&self, request: &FetchRequest) -> Result<FetchedExtract> {
        if let Some(ref fetcher) = self.fetcher {
            return fetcher.fetch(request).await;
        }

        let download_progress = self
            .progress_manager
            .create_bytes_progress(0, &request.file_name);
        let progress_callback = {
            let pb = download_progress.clone();
            move |progress: FetchProgress| {
                ui::progress::update_download_progress(&pb, &progress);
            }
        };

        let fetcher = HttpFetcher::new(self.catalog.clone())?
            .with_timeout(self.config.download_timeout_duration())
            .with_max_file_size(self.config.download.max_file_size)
            .with_progress(progress_callback);

        match fetcher.fetch(request).await {
            Ok(fetched) => {
                ui::progress::finish_progress_with_summary(
                    &download_progress,
                    &format!("Refreshed {}", fetched.file_name),
                    download_progress.elapsed(),
                );
                Ok(fetched)
            }
            Err(e) => {
                download_progress.abandon_with_message(format!("Failed {}", request.file_name));
                Err(e)
            }
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(OsmRefreshError::Io)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get provider catalog reference
    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Get progress manager reference
    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &OsmRefreshError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Convenience function to refresh a directory of extracts with minimal setup
pub async fn update_extracts_simple(
    directory: &Path,
    keep_gpkg: bool,
    verbose: bool,
) -> Result<UpdateReport> {
    let mut config = Config::default();
    config.download.directory = directory.to_path_buf();
    config.update.delete_gpkg = !keep_gpkg;

    let osmrefresh = OsmRefresh::new(
        config,
        OutputMode::Human,
        if verbose { 1 } else { 0 },
        false,
    )?;

    osmrefresh.update_extracts(directory).await
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "osmrefresh {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
