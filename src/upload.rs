//! SnapshotUploader - posts captured frames to the snapshot endpoint.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::data_uri::{self, DataUriError, DecodedData};

/// Default server the panel talks to.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Path of the snapshot endpoint.
pub const DEFAULT_ENDPOINT: &str = "/camera";

/// Multipart field carrying the image.
pub const SNAPSHOT_FIELD: &str = "snapshot";

/// File name attached to the multipart field.
pub const SNAPSHOT_FILENAME: &str = "snapshot.jpg";

/// Default timeout for HTTP requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`SnapshotUploader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub base_url: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Successful upload response. The body is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

/// Errors that can occur while uploading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected snapshot with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Invalid media type '{0}'")]
    InvalidMime(String),

    #[error("Malformed snapshot data: {0}")]
    Malformed(#[from] DataUriError),

    #[error("Upload task failed: {0}")]
    TaskFailed(String),

    #[error("No async runtime available to run the upload")]
    NoRuntime,
}

/// HTTP client for the snapshot endpoint.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SnapshotUploader {
    base_url: String,
    endpoint: String,
    http_client: reqwest::Client,
}

impl SnapshotUploader {
    /// Create an uploader pointing at [`DEFAULT_BASE_URL`].
    pub fn new() -> Result<Self, UploadError> {
        Self::with_settings(UploadSettings::default())
    }

    /// Create an uploader for a custom server, e.g. a mock server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, UploadError> {
        Self::with_settings(UploadSettings {
            base_url: base_url.into(),
            ..UploadSettings::default()
        })
    }

    pub fn with_settings(settings: UploadSettings) -> Result<Self, UploadError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            endpoint: normalize_endpoint(&settings.endpoint),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL snapshots are posted to.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint)
    }

    /// Post one snapshot as a multipart file upload.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidMime` if the media type cannot be used as a
    /// part content type, `UploadError::Server` for non-2xx responses, or
    /// `UploadError::Http` if the request fails.
    pub async fn upload(&self, data: DecodedData) -> Result<UploadReceipt, UploadError> {
        let DecodedData { mime, bytes } = data;
        let size = bytes.len();

        let part = Part::bytes(bytes)
            .file_name(SNAPSHOT_FILENAME)
            .mime_str(&mime)
            .map_err(|_| UploadError::InvalidMime(mime.clone()))?;
        let form = Form::new().part(SNAPSHOT_FIELD, part);

        let url = self.url();
        log::debug!("Uploading {} byte snapshot ({}) to {}", size, mime, url);

        let response = self.http_client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(UploadError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(UploadReceipt {
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a data URI and upload its bytes.
    pub async fn upload_data_uri(&self, uri: &str) -> Result<UploadReceipt, UploadError> {
        let data = data_uri::decode(uri)?;
        self.upload(data).await
    }

    /// Upload in a background task and log the outcome.
    ///
    /// Returns `UploadError::NoRuntime` when called outside a tokio runtime.
    /// Dropping the returned handle detaches the task.
    pub fn spawn(&self, data: DecodedData) -> Result<UploadTask, UploadError> {
        let runtime = Handle::try_current().map_err(|_| UploadError::NoRuntime)?;
        let uploader = self.clone();
        let handle = runtime.spawn(async move {
            let result = uploader.upload(data).await;
            match &result {
                Ok(receipt) => log::info!("Snapshot saved successfully ({})", receipt.status),
                Err(e) => log::error!("Error saving snapshot: {}", e),
            }
            result
        });
        Ok(UploadTask { handle })
    }
}

/// Handle to an in-flight upload.
#[derive(Debug)]
pub struct UploadTask {
    handle: JoinHandle<Result<UploadReceipt, UploadError>>,
}

impl UploadTask {
    /// Wait for the upload to finish.
    pub async fn wait(self) -> Result<UploadReceipt, UploadError> {
        self.handle
            .await
            .map_err(|e| UploadError::TaskFailed(e.to_string()))?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    }
}
