//! Background removal service
//!
//! The matting call is the only suspension point of a pipeline run. It takes
//! the aligned photo as PNG bytes and returns a PNG with an alpha matte.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

use crate::options::MattingOptions;
use crate::types::{PhotoError, Result};

#[async_trait]
pub trait MattingService: Send + Sync {
    /// Remove the background from `image`, returning the matted image bytes.
    ///
    /// An empty successful response is reported as `EmptyMatte`.
    async fn remove_background(&self, image: Bytes) -> Result<Bytes>;
}

/// Client for the remove.bg v1 API
#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    client: Client,
    endpoint: String,
    api_key: String,
    size: String,
}

impl RemoveBgClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            size: "auto".to_string(),
        }
    }

    /// Build a client from configuration, reading the key from the environment
    pub fn from_options(options: &MattingOptions) -> Result<Self> {
        let api_key = std::env::var(&options.api_key_env).map_err(|_| {
            PhotoError::Config(format!(
                "Environment variable {} is not set",
                options.api_key_env
            ))
        })?;

        Ok(Self {
            size: options.size.clone(),
            ..Self::new(options.endpoint.clone(), api_key)
        })
    }
}

#[async_trait]
impl MattingService for RemoveBgClient {
    async fn remove_background(&self, image: Bytes) -> Result<Bytes> {
        let part = Part::bytes(image.to_vec())
            .file_name("aligned-image.png")
            .mime_str("image/png")
            .map_err(|e| PhotoError::MatteServiceFailure(e.to_string()))?;
        let form = Form::new()
            .part("image_file", part)
            .text("size", self.size.clone());

        log::debug!("Requesting background removal from {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PhotoError::MatteServiceFailure(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PhotoError::MatteServiceFailure(e.to_string()))?;

        if !status.is_success() {
            return Err(PhotoError::MatteServiceFailure(describe_failure(
                status, &body,
            )));
        }

        if body.is_empty() {
            return Err(PhotoError::EmptyMatte);
        }

        log::debug!("Background removal returned {} bytes", body.len());
        Ok(body)
    }
}

/// Human-readable message from an error response
///
/// remove.bg answers `{"errors":[{"title":"..."}]}`; a proxy may answer
/// `{"error":"..."}`. Anything else falls back to the status line.
fn describe_failure(status: StatusCode, body: &[u8]) -> String {
    let parsed = serde_json::from_slice::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        json.get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|first| first.get("title"))
            .or_else(|| json.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    match message {
        Some(message) => format!("Server Error ({}): {}", status.as_u16(), message),
        None => format!("Server Error ({})", status),
    }
}

/// Returns the image unchanged; for offline runs where the photo already
/// has the desired background or an alpha channel
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughMatting;

#[async_trait]
impl MattingService for PassthroughMatting {
    async fn remove_background(&self, image: Bytes) -> Result<Bytes> {
        if image.is_empty() {
            return Err(PhotoError::EmptyMatte);
        }
        Ok(image)
    }
}
