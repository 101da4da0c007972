//! Error types for each stage of an analysis.

use thiserror::Error;

/// The fetched body could not be treated as markup.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unparsable document: {0}")]
    UnparsableDocument(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Response is not markup (content-type: {content_type})")]
    NotMarkup { content_type: String },
}

impl FetchError {
    /// Upstream status code, when the failure came from the remote server.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("GEMINI_API_KEY not set in environment")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("No text in model response")]
    EmptyResponse,

    #[error("Failed to decode model response: {0}")]
    Decode(String),
}

/// The single error reported for a failed analysis request.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Brain(#[from] BrainError),
}

impl AnalyzeError {
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AnalyzeError::Fetch(e) => e.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_status_carries_code() {
        let err = FetchError::Status {
            status: 404,
            url: "https://example.com/missing".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("HTTP 404"));
        assert_eq!(FetchError::Timeout(5).status(), None);
    }

    #[test]
    fn test_analyze_error_is_transparent() {
        let err: AnalyzeError = ExtractError::UnparsableDocument("binary content".into()).into();
        assert_eq!(err.to_string(), "Unparsable document: binary content");
        assert_eq!(err.upstream_status(), None);

        let err: AnalyzeError = FetchError::Status {
            status: 503,
            url: "https://example.com".into(),
        }
        .into();
        assert_eq!(err.upstream_status(), Some(503));
    }

    #[test]
    fn test_brain_api_error_message() {
        let err = BrainError::Api {
            status: 400,
            message: "API key not valid".into(),
        };
        assert_eq!(err.to_string(), "Gemini API error (400): API key not valid");
    }
}
