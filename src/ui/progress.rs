use crate::fetcher::FetchProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_extract_progress(&self, total_extracts: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_extracts));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}/{len:3} extracts {msg}"
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        );
        pb.set_message("Refreshing extracts...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn create_bytes_progress(&self, total_bytes: u64, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_bytes));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes:>7}/{total_bytes:7} {msg}"
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

// Helper functions for updating progress bars based on application events
pub fn update_download_progress(pb: &ProgressBar, progress: &FetchProgress) {
    if let Some(total_bytes) = progress.total_bytes {
        if pb.length() != Some(total_bytes) {
            pb.set_length(total_bytes);
        }
        pb.set_position(progress.received_bytes);
    } else {
        pb.set_position(progress.received_bytes);
        pb.set_message(format!(
            "{:.1} MB received",
            progress.received_bytes as f64 / (1024.0 * 1024.0)
        ));
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_manager_creation() {
        let manager = ProgressManager::new(true);
        assert!(manager.is_enabled());

        let disabled_manager = ProgressManager::new(false);
        assert!(!disabled_manager.is_enabled());
    }

    #[test]
    fn test_progress_bar_creation() {
        let manager = ProgressManager::new(true);

        let extract_pb = manager.create_extract_progress(4);
        let bytes_pb = manager.create_bytes_progress(1024, "downloading");
        let spinner = manager.create_spinner("test");

        // In test environments, progress bars might be hidden due to no TTY
        // Just test that they are created without panicking
        // The visibility depends on the environment (TTY vs non-TTY)
        assert!(extract_pb.length().unwrap_or(0) > 0 || extract_pb.length().is_none());
        assert!(bytes_pb.length().unwrap_or(0) > 0 || bytes_pb.length().is_none());
        assert!(!spinner.message().is_empty());
    }

    #[test]
    fn test_disabled_progress_bars() {
        let manager = ProgressManager::new(false);

        let extract_pb = manager.create_extract_progress(4);
        assert!(extract_pb.is_hidden());

        let bytes_pb = manager.create_bytes_progress(1024, "downloading");
        assert!(bytes_pb.is_hidden());

        let spinner = manager.create_spinner("test");
        assert!(spinner.is_hidden());
    }

    #[test]
    fn test_update_download_progress() {
        let pb = ProgressBar::hidden();

        let with_total = FetchProgress {
            received_bytes: 512,
            total_bytes: Some(2048),
        };
        update_download_progress(&pb, &with_total);
        assert_eq!(pb.length(), Some(2048));
        assert_eq!(pb.position(), 512);

        let without_total = FetchProgress {
            received_bytes: 4096,
            total_bytes: None,
        };
        update_download_progress(&pb, &without_total);
        assert_eq!(pb.position(), 4096);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "61m 1s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
