use crate::error::{OsmRefreshError, UserFriendlyError};
use crate::updater::report::{FileReport, UpdateReport, UpdateSummary};
use console::{style, Emoji, Term};
use serde_json;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &OsmRefreshError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_update_summary(&self, summary: &UpdateSummary) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(summary),
            OutputMode::Json => self.print_json_summary(summary),
            OutputMode::Plain => self.print_plain_summary(summary),
        }
    }

    pub fn print_update_report(&self, report: &UpdateReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_file_table(&self, title: &str, files: &[FileReport]) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "file_table",
                    "title": title,
                    "files": files
                }));
            }
            _ => {
                println!("{}:", title);
                if files.is_empty() {
                    println!("  (none)");
                    println!();
                    return;
                }

                println!(
                    "  {:<42} {:>10}  {:<19}  {:<19}",
                    "file", "size", "modified", "changed"
                );
                for file in files {
                    println!(
                        "  {:<42} {:>10}  {}  {}",
                        file.name,
                        format_bytes(file.size),
                        file.modified.format("%Y-%m-%d %H:%M:%S"),
                        file.status_changed.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                println!();
            }
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, summary: &UpdateSummary) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Extract refresh completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Extract refresh completed!");
        }

        println!();
        println!(
            "  Files before:    {}",
            if self.use_colors {
                style(summary.files_before).cyan().bold().to_string()
            } else {
                summary.files_before.to_string()
            }
        );
        println!(
            "  Purged:          {}",
            if self.use_colors {
                style(summary.purged_files).cyan().bold().to_string()
            } else {
                summary.purged_files.to_string()
            }
        );
        println!(
            "  Refreshed:       {}",
            if self.use_colors {
                style(summary.refreshed_files).cyan().bold().to_string()
            } else {
                summary.refreshed_files.to_string()
            }
        );
        println!(
            "  Skipped:         {}",
            if self.use_colors {
                style(summary.skipped_files).cyan().bold().to_string()
            } else {
                summary.skipped_files.to_string()
            }
        );
        println!(
            "  Downloaded:      {}",
            if self.use_colors {
                style(format_bytes(summary.bytes_downloaded))
                    .cyan()
                    .bold()
                    .to_string()
            } else {
                format_bytes(summary.bytes_downloaded)
            }
        );
        println!(
            "  Time taken:      {}",
            if self.use_colors {
                style(format_duration(summary.update_duration))
                    .cyan()
                    .bold()
                    .to_string()
            } else {
                format_duration(summary.update_duration)
            }
        );

        self.print_separator();
    }

    fn print_json_summary(&self, summary: &UpdateSummary) {
        let summary = serde_json::json!({
            "type": "summary",
            "files_before": summary.files_before,
            "purged_files": summary.purged_files,
            "refreshed_files": summary.refreshed_files,
            "skipped_files": summary.skipped_files,
            "bytes_downloaded": summary.bytes_downloaded,
            "duration_ms": summary.update_duration.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, summary: &UpdateSummary) {
        println!("COMPLETED: Extract refresh");
        println!("Files before: {}", summary.files_before);
        println!("Purged: {}", summary.purged_files);
        println!("Refreshed: {}", summary.refreshed_files);
        println!("Skipped: {}", summary.skipped_files);
        println!("Bytes downloaded: {}", summary.bytes_downloaded);
        println!("Duration: {:?}", summary.update_duration);
    }

    fn print_human_report(&self, report: &UpdateReport) {
        self.print_header("Update Report");

        println!("Directory: {}", report.directory);
        println!(
            "Refreshed at: {}",
            report.finished_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!();

        self.print_file_table("Files before refresh", &report.before);

        if !report.purged.is_empty() {
            println!("Purged converted files:");
            for purged in &report.purged {
                println!("  - {} ({})", purged.name, format_bytes(purged.size));
            }
            println!();
        }

        if !report.refreshed.is_empty() {
            println!("Refreshed extracts:");
            for refreshed in &report.refreshed {
                println!(
                    "  - {} ({} from {})",
                    refreshed.name, refreshed.place_id, refreshed.provider
                );
            }
            println!();
        }

        if !report.skipped.is_empty() {
            println!("Left untouched: {} file(s)", report.skipped.len());
            println!();
        }

        self.print_file_table("Files after refresh", &report.after);
    }

    fn print_plain_report(&self, report: &UpdateReport) {
        println!("REPORT: Refresh completed");
        println!("Directory: {}", report.directory);
        println!("Files before: {}", report.summary.files_before);
        println!("Purged: {}", report.summary.purged_files);
        println!("Refreshed: {}", report.summary.refreshed_files);
        println!("Bytes downloaded: {}", report.summary.bytes_downloaded);
        println!("Duration: {:?}", report.summary.update_duration);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

// Progress-aware output wrapper
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn success(&self, message: &str) {
        self.suspend_and_print(|f| f.success(message));
    }

    pub fn error(&self, message: &str) {
        self.suspend_and_print(|f| f.error(message));
    }

    pub fn warning(&self, message: &str) {
        self.suspend_and_print(|f| f.warning(message));
    }

    pub fn info(&self, message: &str) {
        self.suspend_and_print(|f| f.info(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_parsing() {
        assert_eq!(OutputMode::from_string("human"), OutputMode::Human);
        assert_eq!(OutputMode::from_string("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_string("plain"), OutputMode::Plain);
        assert_eq!(OutputMode::from_string("invalid"), OutputMode::Human);
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert_eq!(formatter.mode, OutputMode::Human);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.quiet);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(1073741824), "1.0 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "61m 1s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(formatter.should_show_message(2));
        assert!(!formatter.should_show_message(3));

        let quiet_formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
        assert!(!quiet_formatter.should_show_message(1));
        assert!(!quiet_formatter.should_show_message(2));
    }

    #[test]
    fn test_report_printing_in_every_mode() {
        use crate::config::Config;
        use crate::updater::{ConfigSnapshot, PurgedFile, RefreshedFile};
        use chrono::Utc;

        let purged = vec![PurgedFile {
            name: "region.gpkg".to_string(),
            size: 512,
        }];
        let refreshed = vec![RefreshedFile {
            name: "geofabrik_italy-latest.osm.pbf".to_string(),
            provider: "geofabrik".to_string(),
            place_id: "italy".to_string(),
            bytes_written: 4096,
        }];
        let skipped = vec!["random.txt".to_string()];
        let summary = UpdateSummary::new(3, &purged, &refreshed, &skipped, Duration::from_secs(2));

        let report = UpdateReport {
            directory: "/data/extracts".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            before: vec![FileReport {
                name: "geofabrik_italy-latest.osm.pbf".to_string(),
                size: 2048,
                modified: Utc::now(),
                status_changed: Utc::now(),
            }],
            purged,
            refreshed,
            skipped,
            after: Vec::new(),
            summary,
            config_used: ConfigSnapshot::from_config(&Config::default()),
        };

        // Rendering must not panic in any mode; content goes to stdout
        for mode in [OutputMode::Human, OutputMode::Json, OutputMode::Plain] {
            let formatter = OutputFormatter::new(mode, 0, false);
            formatter.print_update_report(&report);
            formatter.print_file_table("Files before refresh", &report.before);
        }
    }

    #[test]
    fn test_progress_aware_output() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, true);
        let manager = crate::ui::ProgressManager::new(false);

        let with_progress = ProgressAwareOutput::new(&formatter, Some(&manager));
        with_progress.success("refreshed");
        with_progress.info("suppressed in quiet mode");

        let mut called = false;
        let without_progress = ProgressAwareOutput::new(&formatter, None);
        without_progress.suspend_and_print(|_| called = true);
        assert!(called);
    }
}
