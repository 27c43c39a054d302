use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkincareError {
    #[error("이미지 다운로드 실패")]
    DownloadFailed,

    #[error("이미지 다운로드 요청 실패: {0}")]
    DownloadRequest(#[source] reqwest::Error),

    #[error("{call} request to analysis service failed: {source}")]
    Relay {
        call: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to start MCP server: {0}")]
    Startup(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SkincareError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            SkincareError::DownloadFailed | SkincareError::DownloadRequest(_) => "DOWNLOAD_FAILED",
            SkincareError::Relay { .. } => "RELAY_FAILED",
            SkincareError::Startup(_) => "STARTUP_FAILED",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure happened while fetching the source image
    pub fn is_download_error(&self) -> bool {
        matches!(
            self,
            SkincareError::DownloadFailed | SkincareError::DownloadRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SkincareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_failed_has_no_detail() {
        assert_eq!(SkincareError::DownloadFailed.to_string(), "이미지 다운로드 실패");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SkincareError::DownloadFailed.to_error_code(), "DOWNLOAD_FAILED");
        assert_eq!(
            SkincareError::Startup("stdin closed".into()).to_error_code(),
            "STARTUP_FAILED"
        );
        let io = SkincareError::from(std::io::Error::other("boom"));
        assert_eq!(io.to_error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_is_download_error() {
        assert!(SkincareError::DownloadFailed.is_download_error());
        assert!(!SkincareError::Startup("x".into()).is_download_error());
    }
}
