use crate::error::{OsmRefreshError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub download: DownloadConfig,
    pub update: UpdateConfig,
    pub providers: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    pub directory: PathBuf,
    pub max_file_size: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateConfig {
    pub delete_gpkg: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub endpoints: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download: DownloadConfig::default(),
            update: UpdateConfig::default(),
            providers: ProviderConfig::default(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            max_file_size: 500 * 1000 * 1000, // 500MB
            timeout: 300,                     // 5 minutes
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self { delete_gpkg: true }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(
            "geofabrik".to_string(),
            "https://download.geofabrik.de/{place}-latest.osm.pbf".to_string(),
        );
        endpoints.insert(
            "bbbike".to_string(),
            "https://download.bbbike.org/osm/bbbike/{place}/{place}.osm.pbf".to_string(),
        );
        endpoints.insert(
            "openstreetmap_fr".to_string(),
            "https://download.openstreetmap.fr/extracts/{place}-latest.osm.pbf".to_string(),
        );
        Self { endpoints }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OsmRefreshError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| OsmRefreshError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| OsmRefreshError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                // Try to load from default locations
                let default_paths = [
                    "osmrefresh.toml",
                    "osmrefresh.config.toml",
                    ".osmrefresh.toml",
                ];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                // If no config file found, use defaults
                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref directory) = cli_args.directory {
            self.download.directory = directory.clone();
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.download.max_file_size = max_size;
        }

        if let Some(timeout) = cli_args.timeout {
            self.download.timeout = timeout;
        }

        if let Some(keep_gpkg) = cli_args.keep_gpkg {
            self.update.delete_gpkg = !keep_gpkg;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| OsmRefreshError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| OsmRefreshError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // Validate provider endpoints
        if self.providers.endpoints.is_empty() {
            return Err(OsmRefreshError::Config {
                message: "At least one provider endpoint must be configured".to_string(),
            });
        }

        for (provider, template) in &self.providers.endpoints {
            if provider.is_empty() {
                return Err(OsmRefreshError::Config {
                    message: "Provider names must not be empty".to_string(),
                });
            }

            if provider == crate::catalog::TEST_PROVIDER {
                return Err(OsmRefreshError::Config {
                    message: format!(
                        "'{}' is reserved for internal use and cannot be configured as a provider",
                        crate::catalog::TEST_PROVIDER
                    ),
                });
            }

            if !template.contains("{place}") {
                return Err(OsmRefreshError::Config {
                    message: format!(
                        "Endpoint for '{}' must contain the {{place}} placeholder: {}",
                        provider, template
                    ),
                });
            }

            let rendered = template.replace("{place}", "place");
            let parsed = Url::parse(&rendered).map_err(|e| OsmRefreshError::Config {
                message: format!("Endpoint for '{}' is not a valid URL: {}", provider, e),
            })?;

            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(OsmRefreshError::Config {
                    message: format!(
                        "Endpoint for '{}' must be an http(s) URL: {}",
                        provider, template
                    ),
                });
            }
        }

        // Validate max file size
        if self.download.max_file_size == 0 {
            return Err(OsmRefreshError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        // Validate timeout
        if self.download.timeout == 0 {
            return Err(OsmRefreshError::Config {
                message: "Download timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn download_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.download.timeout)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub directory: Option<PathBuf>,
    pub max_file_size: Option<u64>,
    pub timeout: Option<u64>,
    pub keep_gpkg: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_keep_gpkg(mut self, keep_gpkg: Option<bool>) -> Self {
        self.keep_gpkg = keep_gpkg;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.providers.endpoints.contains_key("geofabrik"));
        assert!(config.update.delete_gpkg);
        assert_eq!(config.download.timeout, 300);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.providers.endpoints.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_needs_place_placeholder() {
        let mut config = Config::default();
        config.providers.endpoints.insert(
            "broken".to_string(),
            "https://example.org/fixed.osm.pbf".to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reserved_provider_rejected() {
        let mut config = Config::default();
        config.providers.endpoints.insert(
            "test".to_string(),
            "https://example.org/{place}.osm.pbf".to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let mut config = Config::default();
        config.providers.endpoints.insert(
            "broken".to_string(),
            "ftp://example.org/{place}.osm.pbf".to_string(),
        );
        assert!(config.validate().is_err());

        config.providers.endpoints.insert(
            "broken".to_string(),
            "not a url/{place}".to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        // Test saving
        config.save_to_file(temp_file.path()).unwrap();

        // Test loading
        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.download.timeout, loaded_config.download.timeout);
        assert_eq!(
            config.providers.endpoints,
            loaded_config.providers.endpoints
        );
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        let original_timeout = config.download.timeout;

        let overrides = CliOverrides::new()
            .with_timeout(Some(600))
            .with_keep_gpkg(Some(true));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.download.timeout, 600);
        assert_ne!(config.download.timeout, original_timeout);
        assert!(!config.update.delete_gpkg);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[download]"));
        assert!(sample.contains("[update]"));
        assert!(sample.contains("[providers.endpoints]"));
    }
}
