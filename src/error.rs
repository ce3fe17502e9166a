use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsmRefreshError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("No files found in directory: {path}")]
    EmptyDirectory { path: String },

    #[error("Failed to delete file: {path}")]
    FileDeletionFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {place} from {provider}: {message}")]
    Fetch {
        provider: String,
        place: String,
        message: String,
    },

    #[error("Network error occurred")]
    Network { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for OsmRefreshError {
    fn user_message(&self) -> String {
        match self {
            OsmRefreshError::InvalidPath { path } => {
                format!("Invalid directory path: {}", path)
            }
            OsmRefreshError::EmptyDirectory { path } => {
                format!("No files found in directory: {}", path)
            }
            OsmRefreshError::FileDeletionFailure { path, source } => {
                format!("Failed to delete {}: {}", path, source)
            }
            OsmRefreshError::Fetch {
                provider,
                place,
                message,
            } => {
                format!("Failed to fetch '{}' from {}: {}", place, provider, message)
            }
            OsmRefreshError::Network { message } => {
                format!("Network error: {}", message)
            }
            OsmRefreshError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            OsmRefreshError::FileTooLarge { size, max_size } => {
                format!(
                    "File too large: {} (maximum allowed: {})",
                    format_bytes(*size),
                    format_bytes(*max_size)
                )
            }
            OsmRefreshError::Timeout { seconds } => {
                format!("Operation timed out after {} seconds", seconds)
            }
            OsmRefreshError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            OsmRefreshError::InvalidPath { .. } => Some(
                "Check that the directory exists and is readable. Pass it as an argument or set OSMREFRESH_DOWNLOAD_DIR.".to_string()
            ),
            OsmRefreshError::EmptyDirectory { .. } => Some(
                "The directory to refresh must contain previously downloaded extract files (e.g. geofabrik_italy.osm.pbf).".to_string()
            ),
            OsmRefreshError::FileDeletionFailure { .. } => Some(
                "Ensure you have write permission for the download directory, or rerun with --keep-gpkg to leave converted files in place.".to_string()
            ),
            OsmRefreshError::Fetch { .. } => Some(
                "Verify the place is still published by the provider. Provider endpoints can be overridden in the configuration file.".to_string()
            ),
            OsmRefreshError::Network { .. } => Some(
                "Check your internet connection and try again. If the problem persists, the provider server might be temporarily unavailable.".to_string()
            ),
            OsmRefreshError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            OsmRefreshError::FileTooLarge { .. } => Some(
                "Increase the maximum file size limit with --max-size or in the [download] section of the configuration file.".to_string()
            ),
            OsmRefreshError::Timeout { .. } => Some(
                "The download took longer than expected. Try again or increase the timeout with --timeout.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<url::ParseError> for OsmRefreshError {
    fn from(error: url::ParseError) -> Self {
        OsmRefreshError::Config {
            message: format!("invalid endpoint URL: {}", error),
        }
    }
}

impl From<toml::de::Error> for OsmRefreshError {
    fn from(error: toml::de::Error) -> Self {
        OsmRefreshError::Config {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for OsmRefreshError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() {
            OsmRefreshError::Network {
                message: "Connection to provider failed".to_string(),
            }
        } else {
            OsmRefreshError::Network {
                message: error.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, OsmRefreshError>;

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
