use crate::core::errors::QueueError;
use crate::core::queue::NewQueueItem;
use crate::models::media::VideoMetadata;

/// The user's pending choice for one analyzed video. Starts on the first
/// quality and language the backend listed.
#[derive(Debug, Clone)]
pub struct Selection {
    metadata: VideoMetadata,
    quality: usize,
    language: usize,
    include_subtitles: bool,
}

impl Selection {
    /// `None` when the metadata carries no video or no audio variant.
    pub fn new(metadata: VideoMetadata, include_subtitles: bool) -> Option<Self> {
        if metadata.video_variants.is_empty() || metadata.audio_variants.is_empty() {
            return None;
        }
        Some(Self {
            metadata,
            quality: 0,
            language: 0,
            include_subtitles,
        })
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn quality(&self) -> &str {
        &self.metadata.video_variants[self.quality].label
    }

    pub fn language(&self) -> &str {
        &self.metadata.audio_variants[self.language].code
    }

    pub fn include_subtitles(&self) -> bool {
        self.include_subtitles
    }

    pub fn select_quality(&mut self, label: &str) -> Result<(), QueueError> {
        self.quality = self
            .metadata
            .video_variants
            .iter()
            .position(|v| v.label == label)
            .ok_or_else(|| QueueError::Validation(format!("unknown quality '{}'", label)))?;
        Ok(())
    }

    pub fn select_language(&mut self, code: &str) -> Result<(), QueueError> {
        self.language = self
            .metadata
            .audio_variants
            .iter()
            .position(|a| a.code == code)
            .ok_or_else(|| QueueError::Validation(format!("unknown language '{}'", code)))?;
        Ok(())
    }

    pub fn set_include_subtitles(&mut self, include: bool) {
        self.include_subtitles = include;
    }

    /// Consumes the selection; the metadata is not kept past this point.
    pub fn commit(self) -> NewQueueItem {
        let video = &self.metadata.video_variants[self.quality];
        let audio = &self.metadata.audio_variants[self.language];
        NewQueueItem {
            url: self.metadata.url.clone(),
            title: self.metadata.title.clone(),
            quality: video.label.clone(),
            language: audio.code.clone(),
            video_ref: video.reference.clone(),
            audio_ref: audio.reference.clone(),
            include_subtitles: self.include_subtitles,
        }
    }
}
