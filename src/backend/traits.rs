use async_trait::async_trait;

use crate::core::errors::{AnalyzeError, DownloadError};
use crate::models::media::{DownloadOutcome, DownloadRequest, VideoMetadata};

/// Looks up the variants a remote video offers. Implementations issue at
/// most one request per call and never retry.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    async fn analyze(&self, url: &str) -> Result<VideoMetadata, AnalyzeError>;
}

/// Performs exactly one download attempt for one job.
#[async_trait]
pub trait DownloadClient: Send + Sync {
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome, DownloadError>;
}
