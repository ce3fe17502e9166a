use crate::config::Config;
use crate::scanner::FileEntry;
use crate::updater::purge::PurgedFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result document of one refresh run. Returned to the caller; nothing in
/// here is printed unless the caller asks for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub directory: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub before: Vec<FileReport>,
    pub purged: Vec<PurgedFile>,
    pub refreshed: Vec<RefreshedFile>,
    pub skipped: Vec<String>,
    pub after: Vec<FileReport>,
    pub summary: UpdateSummary,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub status_changed: DateTime<Utc>,
}

impl From<&FileEntry> for FileReport {
    fn from(entry: &FileEntry) -> Self {
        Self {
            name: entry.name.clone(),
            size: entry.size,
            modified: entry.modified,
            status_changed: entry.status_changed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedFile {
    pub name: String,
    pub provider: String,
    pub place_id: String,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub files_before: usize,
    pub purged_files: usize,
    pub refreshed_files: usize,
    pub skipped_files: usize,
    pub bytes_downloaded: u64,
    pub update_duration: Duration,
}

impl UpdateSummary {
    pub fn new(
        files_before: usize,
        purged: &[PurgedFile],
        refreshed: &[RefreshedFile],
        skipped: &[String],
        update_duration: Duration,
    ) -> Self {
        Self {
            files_before,
            purged_files: purged.len(),
            refreshed_files: refreshed.len(),
            skipped_files: skipped.len(),
            bytes_downloaded: refreshed.iter().map(|r| r.bytes_written).sum(),
            update_duration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub directory: String,
    pub delete_gpkg: bool,
    pub max_file_size: u64,
    pub timeout: u64,
    pub providers: Vec<String>,
}

impl ConfigSnapshot {
    pub fn from_config(config: &Config) -> Self {
        Self {
            directory: config.download.directory.display().to_string(),
            delete_gpkg: config.update.delete_gpkg,
            max_file_size: config.download.max_file_size,
            timeout: config.download.timeout,
            providers: config.providers.endpoints.keys().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refreshed(name: &str, bytes: u64) -> RefreshedFile {
        RefreshedFile {
            name: name.to_string(),
            provider: "geofabrik".to_string(),
            place_id: "italy".to_string(),
            bytes_written: bytes,
        }
    }

    #[test]
    fn test_summary_counts() {
        let purged = vec![PurgedFile {
            name: "geofabrik_italy.gpkg".to_string(),
            size: 10,
        }];
        let refreshed = vec![refreshed("geofabrik_italy.osm.pbf", 100), refreshed("geofabrik_malta.osm.pbf", 50)];
        let skipped = vec!["random.txt".to_string()];

        let summary =
            UpdateSummary::new(4, &purged, &refreshed, &skipped, Duration::from_secs(3));

        assert_eq!(summary.files_before, 4);
        assert_eq!(summary.purged_files, 1);
        assert_eq!(summary.refreshed_files, 2);
        assert_eq!(summary.skipped_files, 1);
        assert_eq!(summary.bytes_downloaded, 150);
    }

    #[test]
    fn test_config_snapshot_lists_providers() {
        let snapshot = ConfigSnapshot::from_config(&Config::default());
        assert!(snapshot.delete_gpkg);
        assert!(snapshot.providers.contains(&"geofabrik".to_string()));
        assert_eq!(snapshot.timeout, 300);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = UpdateReport {
            directory: "/data/extracts".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            before: Vec::new(),
            purged: Vec::new(),
            refreshed: vec![refreshed("geofabrik_italy.osm.pbf", 100)],
            skipped: Vec::new(),
            after: Vec::new(),
            summary: UpdateSummary::new(1, &[], &[], &[], Duration::from_secs(1)),
            config_used: ConfigSnapshot::from_config(&Config::default()),
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: UpdateReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.refreshed.len(), 1);
        assert_eq!(parsed.refreshed[0].name, "geofabrik_italy.osm.pbf");
    }
}
