//! Image relay
//!
//! Downloads a client-supplied image, repackages it as multipart/form-data and
//! forwards it to the local analysis service. The JSON echo notification to the
//! same service is a separate operation with its own error label.

use crate::config::{
    RelayConfig, DEFAULT_IMAGE_MIME, MULTIPART_FIELD_NAME, MULTIPART_FILE_NAME,
};
use crate::error::{Result, SkincareError};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

/// Image bytes fetched from the source URL
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the source, or [`DEFAULT_IMAGE_MIME`]
    pub content_type: String,
}

/// Single-file multipart body sent to the analysis service
#[derive(Debug, Clone)]
pub struct MultipartPayload {
    pub field_name: &'static str,
    pub file_name: &'static str,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MultipartPayload {
    /// Wrap a downloaded image under the fixed field and file names
    pub fn from_image(image: DownloadedImage) -> Self {
        Self {
            field_name: MULTIPART_FIELD_NAME,
            file_name: MULTIPART_FILE_NAME,
            content_type: image.content_type,
            bytes: image.bytes,
        }
    }

    /// Build the form. The content type is written as a raw part header so
    /// values that are not well-formed MIME types still pass through.
    pub fn into_form(self) -> Form {
        let MultipartPayload {
            field_name,
            file_name,
            content_type,
            bytes,
        } = self;

        let value = HeaderValue::from_str(&content_type).unwrap_or_else(|_| {
            tracing::debug!(content_type = %content_type, "Unencodable content type, using default");
            HeaderValue::from_static(DEFAULT_IMAGE_MIME)
        });
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, value);

        let part = Part::bytes(bytes).file_name(file_name).headers(headers);
        Form::new().part(field_name, part)
    }
}

/// Parsed JSON body returned by the multipart submission.
///
/// The service's schema is undocumented, so the body is kept as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResponse(pub Value);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EchoNotification<'a> {
    image_url: &'a str,
}

/// HTTP client for the image source and the analysis service
#[derive(Debug, Clone)]
pub struct ImageRelay {
    client: reqwest::Client,
    echo_url: String,
}

impl ImageRelay {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| SkincareError::Startup(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            echo_url: config.echo_url.clone(),
        })
    }

    /// GET the image. Any non-2xx status is reported as [`SkincareError::DownloadFailed`].
    pub async fn fetch_image(&self, image_url: &str) -> Result<DownloadedImage> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(SkincareError::DownloadRequest)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(image_url, status = status.as_u16(), "Image download rejected");
            return Err(SkincareError::DownloadFailed);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(SkincareError::DownloadRequest)?
            .to_vec();

        tracing::debug!(
            image_url,
            content_type = %content_type,
            size = bytes.len(),
            "Image downloaded"
        );

        Ok(DownloadedImage {
            bytes,
            content_type,
        })
    }

    /// POST the multipart body and parse the JSON reply
    pub async fn submit(&self, payload: MultipartPayload) -> Result<AnalysisResponse> {
        let form = payload.into_form();

        let response = self
            .client
            .post(&self.echo_url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| SkincareError::Relay {
                call: "multipart upload",
                source,
            })?;

        let body: Value = response.json().await.map_err(|source| SkincareError::Relay {
            call: "multipart upload",
            source,
        })?;

        Ok(AnalysisResponse(body))
    }

    /// Download the image and forward it to the analysis service
    pub async fn send_image_from_url(&self, image_url: &str) -> Result<AnalysisResponse> {
        let image = self.fetch_image(image_url).await?;
        self.submit(MultipartPayload::from_image(image)).await
    }

    /// POST `{ "imageUrl": ... }` to the echo endpoint; the reply body is discarded
    pub async fn notify_echo(&self, image_url: &str) -> Result<()> {
        self.client
            .post(&self.echo_url)
            .json(&EchoNotification { image_url })
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| SkincareError::Relay {
                call: "echo",
                source,
            })?;

        Ok(())
    }
}
