use crate::error::{OsmRefreshError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub status_changed: DateTime<Utc>,
}

impl FileEntry {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        Ok(Self {
            name,
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: modified_time(&metadata),
            status_changed: status_changed_time(&metadata),
        })
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.size)
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    pub directory: PathBuf,
    pub files: Vec<FileEntry>,
    pub total_entries: usize,
}

impl DirectorySnapshot {
    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries == 0
    }
}

#[derive(Debug, Default)]
pub struct DirectoryScanner;

impl DirectoryScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<DirectorySnapshot> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(OsmRefreshError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(OsmRefreshError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut files = Vec::new();
        let mut total_entries = 0;

        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| OsmRefreshError::Io(e.into()))?;
            total_entries += 1;

            if entry.file_type().is_file() {
                files.push(self.process_entry(&entry)?);
            }
        }

        if total_entries == 0 {
            return Err(OsmRefreshError::EmptyDirectory {
                path: root_path.display().to_string(),
            });
        }

        Ok(DirectorySnapshot {
            directory: root_path.to_path_buf(),
            files,
            total_entries,
        })
    }

    pub fn stat_file<P: AsRef<Path>>(&self, path: P) -> Result<FileEntry> {
        FileEntry::from_path(path)
    }

    fn process_entry(&self, entry: &DirEntry) -> Result<FileEntry> {
        let metadata = entry.metadata().map_err(|e| OsmRefreshError::Io(e.into()))?;

        let name = entry
            .file_name()
            .to_str()
            .unwrap_or("")
            .to_string();

        Ok(FileEntry {
            name,
            path: entry.path().to_path_buf(),
            size: metadata.len(),
            modified: modified_time(&metadata),
            status_changed: status_changed_time(&metadata),
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn modified_time(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_default()
}

#[cfg(unix)]
fn status_changed_time(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    use std::os::unix::fs::MetadataExt;
    DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32).unwrap_or_default()
}

#[cfg(not(unix))]
fn status_changed_time(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .created()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| modified_time(metadata))
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_entry_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("geofabrik_italy.osm.pbf");
        fs::write(&file_path, b"pbf bytes").unwrap();

        let entry = FileEntry::from_path(&file_path).unwrap();
        assert_eq!(entry.name, "geofabrik_italy.osm.pbf");
        assert_eq!(entry.size, 9);
    }

    #[test]
    fn test_reported_modified_time_matches_filesystem() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("geofabrik_italy.osm.pbf");
        fs::write(&file_path, b"pbf bytes").unwrap();

        let mtime = filetime::FileTime::from_unix_time(1_700_000_000, 0);
        filetime::set_file_mtime(&file_path, mtime).unwrap();

        let entry = FileEntry::from_path(&file_path).unwrap();
        assert_eq!(entry.modified.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_scan_sorts_and_skips_hidden() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("bbbike_Leeds.osm.pbf"), b"b").unwrap();
        fs::write(root.join("geofabrik_italy.osm.pbf"), b"a").unwrap();
        fs::write(root.join(".hidden"), b"x").unwrap();

        let scanner = DirectoryScanner::new();
        let snapshot = scanner.scan_directory(root).unwrap();

        assert_eq!(snapshot.total_entries, 2);
        assert_eq!(
            snapshot.file_names(),
            vec!["bbbike_Leeds.osm.pbf", "geofabrik_italy.osm.pbf"]
        );
    }

    #[test]
    fn test_scan_missing_directory() {
        let scanner = DirectoryScanner::new();
        let result = scanner.scan_directory("/definitely/not/here");
        assert!(matches!(result, Err(OsmRefreshError::InvalidPath { .. })));
    }

    #[test]
    fn test_scan_rejects_plain_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, b"x").unwrap();

        let scanner = DirectoryScanner::new();
        let result = scanner.scan_directory(&file_path);
        assert!(matches!(result, Err(OsmRefreshError::InvalidPath { .. })));
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new();
        let result = scanner.scan_directory(temp_dir.path());
        assert!(matches!(
            result,
            Err(OsmRefreshError::EmptyDirectory { .. })
        ));
    }

    #[test]
    fn test_subdirectory_counts_as_entry() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();

        let scanner = DirectoryScanner::new();
        let snapshot = scanner.scan_directory(temp_dir.path()).unwrap();

        assert_eq!(snapshot.total_entries, 1);
        assert!(snapshot.files.is_empty());
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_total_size() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.osm.pbf"), b"12345").unwrap();
        fs::write(temp_dir.path().join("b.osm.pbf"), b"123").unwrap();

        let scanner = DirectoryScanner::new();
        let snapshot = scanner.scan_directory(temp_dir.path()).unwrap();
        assert_eq!(snapshot.total_size(), 8);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
