//! Compiled-in endpoints, wire constants, and relay settings
//!
//! The analysis service address is fixed at build time. Only timeouts and
//! logging are adjustable from the command line.

use std::time::Duration;

// ============================================================================
// Downstream Service
// ============================================================================

/// Base address of the local analysis service
pub const API_BASE: &str = "http://localhost:2580";

/// Path shared by the multipart submission and the JSON echo notification
pub const ECHO_PATH: &str = "/echo";

/// Full echo endpoint URL
pub const ECHO_URL: &str = const_format::formatcp!("{}{}", API_BASE, ECHO_PATH);

// ============================================================================
// Multipart Payload
// ============================================================================

/// Form field carrying the image
pub const MULTIPART_FIELD_NAME: &str = "file";

/// Filename declared for the image part.
///
/// Always `image.jpg`, even when the source is a PNG or WebP.
pub const MULTIPART_FILE_NAME: &str = "image.jpg";

/// Content type used when the image source does not send one
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

// ============================================================================
// Tool Surface
// ============================================================================

pub const SERVER_NAME: &str = "skincare";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol revisions this server can speak, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-03-26", "2024-11-05", "2024-10-07"];

/// Revision answered when the client asks for one we don't know
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const SELFIE_TOOL_NAME: &str = "get-selfie-analysis";
pub const SELFIE_TOOL_DESCRIPTION: &str = "이미지URL을 받아 분석 결과를 반환합니다.";
pub const IMAGE_URL_DESCRIPTION: &str = "분석할 이미지의 URL";

/// Text returned on every successful analysis.
///
/// The analysis service response is not reflected here yet.
pub const ANALYSIS_SUCCESS_TEXT: &str = "피부좋음";

/// Prefix of the text returned when any relay step fails
pub const ANALYSIS_FAILURE_PREFIX: &str = "이미지 분석 요청 실패";

// ============================================================================
// Timeouts
// ============================================================================

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for the outbound HTTP client
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Endpoint receiving both the multipart upload and the echo notification
    pub echo_url: String,
    /// Upper bound for each individual request, including body transfer
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment
    pub use_system_proxy: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            echo_url: ECHO_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            use_system_proxy: true,
        }
    }
}

impl RelayConfig {
    /// Default endpoint with a custom per-request timeout
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_url_is_local_service() {
        assert_eq!(ECHO_URL, "http://localhost:2580/echo");
    }

    #[test]
    fn test_default_relay_config() {
        let config = RelayConfig::default();
        assert_eq!(config.echo_url, ECHO_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.use_system_proxy);
    }

    #[test]
    fn test_with_timeout_secs_keeps_endpoint() {
        let config = RelayConfig::with_timeout_secs(5);
        assert_eq!(config.echo_url, ECHO_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_protocol_version_is_supported() {
        assert!(SUPPORTED_PROTOCOL_VERSIONS.contains(&DEFAULT_PROTOCOL_VERSION));
    }
}
