use serde::{Deserialize, Serialize};

/// Result of one analyze call. Variant order is the order the backend
/// listed them in; the first entry of each is the default selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    pub url: String,
    pub title: String,
    pub duration_seconds: u64,
    pub thumbnail_url: Option<String>,
    pub video_variants: Vec<VideoVariant>,
    pub audio_variants: Vec<AudioVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoVariant {
    pub label: String,
    /// Opaque selector echoed back to the download endpoint.
    pub reference: String,
    pub format_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioVariant {
    pub code: String,
    pub name: String,
    pub reference: String,
}

impl VideoMetadata {
    pub fn default_video(&self) -> Option<&VideoVariant> {
        self.video_variants.first()
    }

    pub fn default_audio(&self) -> Option<&AudioVariant> {
        self.audio_variants.first()
    }

    pub fn find_video(&self, label: &str) -> Option<&VideoVariant> {
        self.video_variants.iter().find(|v| v.label == label)
    }

    pub fn find_audio(&self, code: &str) -> Option<&AudioVariant> {
        self.audio_variants.iter().find(|a| a.code == code)
    }
}

/// Everything the download endpoint needs for one job.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub title: String,
    pub quality: String,
    pub language: String,
    pub video_ref: String,
    pub audio_ref: String,
    pub include_subtitles: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    /// The caller fetches the file from this location itself.
    Redirect(String),
    Payload {
        bytes: Vec<u8>,
        suggested_filename: String,
    },
}
