use clap::Parser;
use osmrefresh::{
    Cli, OsmRefresh, OsmRefreshError, OutputFormat, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create OsmRefresh instance
    let osmrefresh = match OsmRefresh::from_cli(&cli) {
        Ok(osmrefresh) => osmrefresh,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&osmrefresh);
    }

    // Execute main refresh workflow
    let directory = osmrefresh.config().download.directory.clone();
    match osmrefresh.update_extracts(&directory).await {
        Ok(report) => {
            // The human and plain flows already reported everything as the
            // run progressed; JSON callers get the full report document
            if matches!(cli.output_format, OutputFormat::Json) {
                osmrefresh.output_formatter().print_update_report(&report);
            }
            0
        }
        Err(e) => {
            osmrefresh.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &OsmRefreshError) -> i32 {
    match error {
        OsmRefreshError::Cancelled => 130, // Interrupted (SIGINT)
        OsmRefreshError::InvalidPath { .. } => 2,
        OsmRefreshError::Config { .. } => 2,
        OsmRefreshError::EmptyDirectory { .. } => 3,
        OsmRefreshError::FileDeletionFailure { .. } => 4,
        OsmRefreshError::Fetch { .. } => 5,
        OsmRefreshError::Network { .. } => 5,
        OsmRefreshError::FileTooLarge { .. } => 6,
        OsmRefreshError::Timeout { .. } => 9,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "osmrefresh.toml".to_string());

    match OsmRefresh::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  osmrefresh <directory> --config {}", config_path);
            println!("\nEdit the file to customize providers and limits.");
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(osmrefresh: &OsmRefresh) -> i32 {
    let formatter = osmrefresh.output_formatter();

    formatter.info("DRY RUN MODE - No files will be deleted or downloaded");
    formatter.print_separator();

    // Display configuration that would be used
    formatter.info("Configuration that would be used:");
    let config = osmrefresh.config();

    println!("  Directory: {}", config.download.directory.display());
    println!("  Delete converted files: {}", config.update.delete_gpkg);
    println!("  Max file size: {} bytes", config.download.max_file_size);
    println!("  Download timeout: {} seconds", config.download.timeout);
    println!(
        "  Providers: {}",
        osmrefresh.catalog().names().collect::<Vec<_>>().join(", ")
    );

    formatter.print_separator();

    let plan = match osmrefresh.plan_update(&config.download.directory) {
        Ok(plan) => plan,
        Err(e) => {
            osmrefresh.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    formatter.info("Update plan:");
    if plan.purge_candidates.is_empty() {
        println!("  Nothing to purge");
    } else {
        for name in &plan.purge_candidates {
            println!("  Would purge: {}", name);
        }
    }
    if plan.to_refresh.is_empty() {
        println!("  Nothing to refresh");
    } else {
        for resolved in &plan.to_refresh {
            println!(
                "  Would refresh: {} ({} from {})",
                resolved.file_name, resolved.place_id, resolved.provider
            );
        }
    }
    if !plan.skipped.is_empty() {
        println!("  Untouched: {} file(s)", plan.skipped.len());
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the refresh");

    0
}

fn print_startup_error(error: &OsmRefreshError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
