use crate::error::{OsmRefreshError, Result};
use crate::scanner::FileEntry;
use serde::{Deserialize, Serialize};

/// Files whose name contains this marker are converted copies of an extract
/// and go stale as soon as the extract is re-downloaded.
pub const GPKG_MARKER: &str = "gpkg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgedFile {
    pub name: String,
    pub size: u64,
}

pub struct GpkgPurge {
    enabled: bool,
}

impl GpkgPurge {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_marked(name: &str) -> bool {
        name.contains(GPKG_MARKER)
    }

    pub fn candidates<'a>(&self, files: &'a [FileEntry]) -> Vec<&'a FileEntry> {
        if !self.enabled {
            return Vec::new();
        }

        files
            .iter()
            .filter(|entry| Self::is_marked(&entry.name))
            .collect()
    }

    /// Deletes every marked file in listing order. The first deletion that
    /// fails aborts the purge; files already removed stay removed.
    pub fn purge(
        &self,
        files: &[FileEntry],
        progress_callback: Option<&dyn Fn(&PurgedFile)>,
    ) -> Result<Vec<PurgedFile>> {
        let mut purged = Vec::new();

        if !self.enabled {
            return Ok(purged);
        }

        for entry in files {
            if !Self::is_marked(&entry.name) {
                continue;
            }

            std::fs::remove_file(&entry.path).map_err(|source| {
                OsmRefreshError::FileDeletionFailure {
                    path: entry.path.display().to_string(),
                    source,
                }
            })?;

            let record = PurgedFile {
                name: entry.name.clone(),
                size: entry.size,
            };

            if let Some(callback) = progress_callback {
                callback(&record);
            }

            purged.push(record);
        }

        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn entry_for(dir: &Path, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        FileEntry::from_path(&path).unwrap()
    }

    #[test]
    fn test_marker_is_a_substring_match() {
        assert!(GpkgPurge::is_marked("geofabrik_italy.gpkg"));
        assert!(GpkgPurge::is_marked("notes.gpkg.backup"));
        assert!(GpkgPurge::is_marked("mygpkgthing.osm.pbf"));
        assert!(!GpkgPurge::is_marked("geofabrik_italy.osm.pbf"));
        assert!(!GpkgPurge::is_marked("random.txt"));
    }

    #[test]
    fn test_purge_deletes_only_marked_files() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            entry_for(temp_dir.path(), "geofabrik_italy.gpkg", b"stale"),
            entry_for(temp_dir.path(), "geofabrik_italy.osm.pbf", b"extract"),
            entry_for(temp_dir.path(), "random.txt", b"keep"),
        ];

        let purge = GpkgPurge::new(true);
        let purged = purge.purge(&files, None).unwrap();

        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].name, "geofabrik_italy.gpkg");
        assert!(!temp_dir.path().join("geofabrik_italy.gpkg").exists());
        assert!(temp_dir.path().join("geofabrik_italy.osm.pbf").exists());
        assert!(temp_dir.path().join("random.txt").exists());
    }

    #[test]
    fn test_disabled_purge_deletes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![entry_for(temp_dir.path(), "geofabrik_italy.gpkg", b"stale")];

        let purge = GpkgPurge::new(false);
        let purged = purge.purge(&files, None).unwrap();

        assert!(purged.is_empty());
        assert!(purge.candidates(&files).is_empty());
        assert!(temp_dir.path().join("geofabrik_italy.gpkg").exists());
    }

    #[test]
    fn test_purge_reports_each_deletion() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            entry_for(temp_dir.path(), "a.gpkg", b"1"),
            entry_for(temp_dir.path(), "b.gpkg", b"22"),
        ];

        let seen = std::sync::Mutex::new(Vec::new());
        let purge = GpkgPurge::new(true);
        purge
            .purge(&files, Some(&|record| {
                seen.lock().unwrap().push(record.name.clone());
            }))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a.gpkg", "b.gpkg"]);
    }

    #[test]
    fn test_failed_deletion_aborts_but_keeps_earlier_deletions() {
        let temp_dir = TempDir::new().unwrap();
        let first = entry_for(temp_dir.path(), "a.gpkg", b"1");
        let missing = entry_for(temp_dir.path(), "b.gpkg", b"2");
        fs::remove_file(&missing.path).unwrap();
        let files = vec![first, missing];

        let purge = GpkgPurge::new(true);
        let result = purge.purge(&files, None);

        assert!(matches!(
            result,
            Err(OsmRefreshError::FileDeletionFailure { .. })
        ));
        assert!(!temp_dir.path().join("a.gpkg").exists());
    }
}
