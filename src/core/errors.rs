use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("invalid url: {0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("analyze failed: {0}")]
    Remote(String),
    #[error("malformed analyze response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}{}", message_suffix(.message))]
    Http { status: u16, message: Option<String> },
    #[error("download failed: {0}")]
    Remote(String),
    #[error("malformed download response: {0}")]
    MalformedResponse(String),
    #[error("Cancelled")]
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("busy: {0}")]
    Busy(&'static str),
    #[error("{0}")]
    Validation(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AnalyzeError::MalformedResponse(e.to_string())
        } else {
            AnalyzeError::Network(e.to_string())
        }
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DownloadError::MalformedResponse(e.to_string())
        } else {
            DownloadError::Network(e.to_string())
        }
    }
}
