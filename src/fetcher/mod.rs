use crate::error::Result;
use crate::scanner::ResolvedExtract;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod http_fetcher;

pub use http_fetcher::HttpFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBy {
    Id,
    Name,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub provider: String,
    pub place: String,
    pub match_by: MatchBy,
    pub force_download: bool,
    pub download_only: bool,
    pub skip_conversion: bool,
    pub download_directory: PathBuf,
    pub file_name: String,
}

impl FetchRequest {
    /// Request to re-download an already resolved extract onto its existing
    /// file name. A refresh always forces the download, skips any format
    /// conversion, and looks the place up by id.
    pub fn for_refresh(resolved: &ResolvedExtract, download_directory: &Path) -> Self {
        Self {
            provider: resolved.provider.clone(),
            place: resolved.place_id.clone(),
            match_by: MatchBy::Id,
            force_download: true,
            download_only: true,
            skip_conversion: true,
            download_directory: download_directory.to_path_buf(),
            file_name: resolved.file_name.clone(),
        }
    }

    pub fn target_path(&self) -> PathBuf {
        self.download_directory.join(&self.file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Downloaded,
    SkippedExisting,
}

#[derive(Debug, Clone)]
pub struct FetchedExtract {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes_written: u64,
    pub status: FetchStatus,
}

#[derive(Debug, Clone)]
pub struct FetchProgress {
    pub received_bytes: u64,
    pub total_bytes: Option<u64>,
}

#[async_trait]
pub trait ExtractFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedExtract>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_contract() {
        let resolved = ResolvedExtract {
            provider: "geofabrik".to_string(),
            place_id: "italy".to_string(),
            file_name: "geofabrik_italy.osm.pbf".to_string(),
        };

        let request = FetchRequest::for_refresh(&resolved, Path::new("/data/extracts"));

        assert_eq!(request.provider, "geofabrik");
        assert_eq!(request.place, "italy");
        assert_eq!(request.match_by, MatchBy::Id);
        assert!(request.force_download);
        assert!(request.download_only);
        assert!(request.skip_conversion);
        assert_eq!(
            request.target_path(),
            PathBuf::from("/data/extracts/geofabrik_italy.osm.pbf")
        );
    }
}
