use crate::catalog::ProviderCatalog;
use crate::error::{OsmRefreshError, Result};
use crate::fetcher::{ExtractFetcher, FetchProgress, FetchRequest, FetchStatus, FetchedExtract};
use async_trait::async_trait;
use reqwest::Client;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

const USER_AGENT: &str = concat!("osmrefresh/", env!("CARGO_PKG_VERSION"));

pub struct HttpFetcher {
    catalog: ProviderCatalog,
    client: Client,
    timeout: Duration,
    max_file_size: u64,
    progress_callback: Option<Box<dyn Fn(FetchProgress) + Send + Sync>>,
    running: Arc<AtomicBool>,
}

impl HttpFetcher {
    pub fn new(catalog: ProviderCatalog) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            catalog,
            client,
            timeout: Duration::from_secs(300), // 5 minutes default
            max_file_size: 500 * 1000 * 1000,
            progress_callback: None,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(FetchProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn download_to_target(&self, request: &FetchRequest) -> Result<u64> {
        let url = self.catalog.download_url(&request.provider, &request.place)?;
        let target = request.target_path();

        let mut response = self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.handle_http_error(e, request))?
            .error_for_status()
            .map_err(|e| self.handle_http_error(e, request))?;

        let total_bytes = response.content_length();
        if let Some(length) = total_bytes {
            if length > self.max_file_size {
                return Err(OsmRefreshError::FileTooLarge {
                    size: length,
                    max_size: self.max_file_size,
                });
            }
        }

        // Stream into a temporary file beside the target; the old extract
        // survives a failed transfer.
        let mut temp_file = NamedTempFile::new_in(&request.download_directory)?;
        let mut received: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.handle_http_error(e, request))?
        {
            if !self.running.load(Ordering::SeqCst) {
                return Err(OsmRefreshError::Cancelled);
            }

            received += chunk.len() as u64;
            if received > self.max_file_size {
                return Err(OsmRefreshError::FileTooLarge {
                    size: received,
                    max_size: self.max_file_size,
                });
            }

            temp_file.write_all(&chunk)?;

            if let Some(ref callback) = self.progress_callback {
                callback(FetchProgress {
                    received_bytes: received,
                    total_bytes,
                });
            }
        }

        temp_file.flush()?;
        temp_file
            .persist(&target)
            .map_err(|e| OsmRefreshError::Io(e.error))?;

        Ok(received)
    }

    fn handle_http_error(&self, error: reqwest::Error, request: &FetchRequest) -> OsmRefreshError {
        if error.is_timeout() {
            return OsmRefreshError::Timeout {
                seconds: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return OsmRefreshError::Fetch {
                provider: request.provider.clone(),
                place: request.place.clone(),
                message: format!("server responded with {}", status),
            };
        }

        if error.is_connect() {
            return OsmRefreshError::Network {
                message: format!("Connection to provider '{}' failed", request.provider),
            };
        }

        OsmRefreshError::Fetch {
            provider: request.provider.clone(),
            place: request.place.clone(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl ExtractFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedExtract> {
        let target = request.target_path();

        if !request.force_download && target.exists() {
            return Ok(FetchedExtract {
                file_name: request.file_name.clone(),
                path: target,
                bytes_written: 0,
                status: FetchStatus::SkippedExisting,
            });
        }

        let bytes_written = self.download_to_target(request).await?;

        Ok(FetchedExtract {
            file_name: request.file_name.clone(),
            path: target,
            bytes_written,
            status: FetchStatus::Downloaded,
        })
    }
}
