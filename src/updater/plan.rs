use crate::scanner::{DirectorySnapshot, ExtractResolver, FileEntry, ResolvedExtract};
use crate::updater::purge::GpkgPurge;
use std::path::PathBuf;

/// Everything a refresh run would do, computed without touching any file.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub directory: PathBuf,
    pub before: Vec<FileEntry>,
    pub purge_candidates: Vec<String>,
    pub to_refresh: Vec<ResolvedExtract>,
    pub skipped: Vec<String>,
}

impl UpdatePlan {
    pub fn build(
        snapshot: &DirectorySnapshot,
        purge: &GpkgPurge,
        resolver: &ExtractResolver,
    ) -> Self {
        let purge_candidates: Vec<String> = purge
            .candidates(&snapshot.files)
            .iter()
            .map(|entry| entry.name.clone())
            .collect();

        let remaining: Vec<String> = snapshot
            .file_names()
            .into_iter()
            .filter(|name| !purge_candidates.contains(name))
            .collect();

        let to_refresh = resolver.select(&remaining);

        let skipped = remaining
            .into_iter()
            .filter(|name| !to_refresh.iter().any(|r| &r.file_name == name))
            .collect();

        Self {
            directory: snapshot.directory.clone(),
            before: snapshot.files.clone(),
            purge_candidates,
            to_refresh,
            skipped,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.purge_candidates.is_empty() && self.to_refresh.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProviderCatalog;
    use std::fs;
    use tempfile::TempDir;

    fn snapshot_of(names: &[&str]) -> (TempDir, DirectorySnapshot) {
        let temp_dir = TempDir::new().unwrap();
        for name in names {
            fs::write(temp_dir.path().join(name), b"x").unwrap();
        }
        let snapshot = crate::scanner::DirectoryScanner::new()
            .scan_directory(temp_dir.path())
            .unwrap();
        (temp_dir, snapshot)
    }

    #[test]
    fn test_plan_partitions_the_listing() {
        let (_guard, snapshot) = snapshot_of(&[
            "geofabrik_italy.gpkg",
            "geofabrik_italy.osm.pbf",
            "random.txt",
        ]);

        let purge = GpkgPurge::new(true);
        let resolver = ExtractResolver::new(&ProviderCatalog::default()).unwrap();
        let plan = UpdatePlan::build(&snapshot, &purge, &resolver);

        assert_eq!(plan.purge_candidates, vec!["geofabrik_italy.gpkg"]);
        assert_eq!(plan.to_refresh.len(), 1);
        assert_eq!(plan.to_refresh[0].file_name, "geofabrik_italy.osm.pbf");
        assert_eq!(plan.skipped, vec!["random.txt"]);
        assert!(!plan.is_noop());
    }

    #[test]
    fn test_plan_with_purge_disabled_keeps_gpkg_out_of_refresh() {
        let (_guard, snapshot) = snapshot_of(&["geofabrik_italy.gpkg"]);

        let purge = GpkgPurge::new(false);
        let resolver = ExtractResolver::new(&ProviderCatalog::default()).unwrap();
        let plan = UpdatePlan::build(&snapshot, &purge, &resolver);

        assert!(plan.purge_candidates.is_empty());
        assert!(plan.to_refresh.is_empty());
        assert_eq!(plan.skipped, vec!["geofabrik_italy.gpkg"]);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_plan_of_unrelated_files_is_a_noop() {
        let (_guard, snapshot) = snapshot_of(&["random.txt"]);

        let purge = GpkgPurge::new(true);
        let resolver = ExtractResolver::new(&ProviderCatalog::default()).unwrap();
        let plan = UpdatePlan::build(&snapshot, &purge, &resolver);

        assert!(plan.is_noop());
        assert_eq!(plan.skipped, vec!["random.txt"]);
    }
}
