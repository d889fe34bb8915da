//! Failure taxonomy of a summarization request.
//!
//! The `Display` text of each variant is what the user sees in place of a summary.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    /// No URL was provided
    #[error("Please enter a YouTube URL")]
    EmptyInput,

    /// The URL did not yield a video ID
    #[error("Invalid YouTube URL. Please enter a valid YouTube link.")]
    InvalidUrl,

    /// The backend could not be reached at all
    #[error("Network Error: Cannot connect to backend server at {endpoint}. Please ensure the backend is running.")]
    NetworkUnreachable { endpoint: String },

    /// The request outlived the client-side timeout
    #[error(
        "Processing Timeout: The video is taking longer than expected to process. \
         Please try again or use a shorter video."
    )]
    Timeout,

    /// The backend answered with an explicit error payload
    #[error("Error: {0}")]
    BackendError(String),

    /// Anything else that went wrong on the way
    #[error("Error: Could not summarize this video ({0}). Please check the log for details.")]
    UnknownFailure(String),

    /// The backend answered without a usable summary
    #[error("No summary available. Try another video.")]
    EmptyResult,

    /// Another request is still in flight
    #[error("A summary request is already in progress.")]
    Busy,
}

impl SummarizeError {
    /// True for failures detected before any request is sent
    pub fn is_validation(&self) -> bool {
        matches!(self, SummarizeError::EmptyInput | SummarizeError::InvalidUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_is_verbatim() {
        let err = SummarizeError::BackendError("Transcript disabled".to_string());
        assert_eq!(err.to_string(), "Error: Transcript disabled");
    }

    #[test]
    fn test_network_message_names_endpoint() {
        let err = SummarizeError::NetworkUnreachable {
            endpoint: "http://127.0.0.1:8000/summarize".to_string(),
        };
        assert!(err.to_string().contains("http://127.0.0.1:8000/summarize"));
    }

    #[test]
    fn test_is_validation() {
        assert!(SummarizeError::EmptyInput.is_validation());
        assert!(SummarizeError::InvalidUrl.is_validation());
        assert!(!SummarizeError::Timeout.is_validation());
        assert!(!SummarizeError::EmptyResult.is_validation());
    }
}
