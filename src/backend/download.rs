use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use vidlingo_core::models::settings::ResponseMode;

use crate::backend::traits::DownloadClient;
use crate::core::errors::DownloadError;
use crate::core::filename::{payload_filename, pick_extension};
use crate::core::http_client::endpoint;
use crate::models::media::{DownloadOutcome, DownloadRequest};

const DOWNLOAD_PATH: &str = "/api/download";

#[derive(Serialize)]
struct DownloadBody<'a> {
    url: &'a str,
    video_quality: &'a str,
    audio_language: &'a str,
    include_subtitles: bool,
}

#[derive(Debug, Deserialize)]
struct JsonReply {
    #[serde(default)]
    success: bool,
    download_url: Option<String>,
    error: Option<String>,
}

pub struct HttpDownloadClient {
    client: reqwest::Client,
    base_url: String,
    mode: ResponseMode,
}

impl HttpDownloadClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, mode: ResponseMode) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            mode,
        }
    }
}

#[async_trait]
impl DownloadClient for HttpDownloadClient {
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome, DownloadError> {
        let target = endpoint(&self.base_url, DOWNLOAD_PATH);
        tracing::debug!(
            "POST {} url={} quality={} language={}",
            target,
            request.url,
            request.quality,
            request.language
        );

        let response = self
            .client
            .post(&target)
            .json(&DownloadBody {
                url: &request.url,
                video_quality: &request.video_ref,
                audio_language: &request.audio_ref,
                include_subtitles: request.include_subtitles,
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = header_str(&response, CONTENT_TYPE);
        let disposition = header_str(&response, CONTENT_DISPOSITION);
        let body = response.bytes().await?;

        download_reply(
            request,
            self.mode,
            status,
            body.to_vec(),
            content_type.as_deref(),
            disposition.as_deref(),
        )
    }
}

/// Maps a download reply onto an outcome. Any non-2xx status is an
/// [`DownloadError::Http`] whatever the mode; a 2xx body is read per `mode`.
pub fn download_reply(
    request: &DownloadRequest,
    mode: ResponseMode,
    status: u16,
    body: Vec<u8>,
    content_type: Option<&str>,
    disposition: Option<&str>,
) -> Result<DownloadOutcome, DownloadError> {
    if !(200..300).contains(&status) {
        return Err(DownloadError::Http {
            status,
            message: error_message(&body),
        });
    }

    match mode {
        ResponseMode::Redirect => parse_redirect_reply(&body),
        ResponseMode::Binary => binary_outcome(request, body, content_type, disposition),
    }
}

fn header_str(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<JsonReply>(body)
        .ok()
        .and_then(|r| r.error)
        .filter(|e| !e.is_empty())
}

pub fn parse_redirect_reply(body: &[u8]) -> Result<DownloadOutcome, DownloadError> {
    let reply: JsonReply = serde_json::from_slice(body)
        .map_err(|e| DownloadError::MalformedResponse(e.to_string()))?;
    if !reply.success {
        return Err(DownloadError::Remote(
            reply.error.unwrap_or_else(|| "unknown error".into()),
        ));
    }
    match reply.download_url {
        Some(url) if !url.trim().is_empty() => Ok(DownloadOutcome::Redirect(url)),
        _ => Err(DownloadError::MalformedResponse("missing download_url".into())),
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
}

pub fn binary_outcome(
    request: &DownloadRequest,
    bytes: Vec<u8>,
    content_type: Option<&str>,
    disposition: Option<&str>,
) -> Result<DownloadOutcome, DownloadError> {
    if is_json(content_type) {
        let reply: JsonReply = serde_json::from_slice(&bytes)
            .map_err(|e| DownloadError::MalformedResponse(e.to_string()))?;
        return Err(match reply.error {
            Some(e) if !reply.success => DownloadError::Remote(e),
            _ => DownloadError::MalformedResponse("expected a media body, got JSON".into()),
        });
    }
    if bytes.is_empty() {
        return Err(DownloadError::MalformedResponse("empty body".into()));
    }

    let ext = pick_extension(disposition, content_type);
    Ok(DownloadOutcome::Payload {
        bytes,
        suggested_filename: payload_filename(&request.title, &request.language, &request.quality, &ext),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request() -> DownloadRequest {
        DownloadRequest {
            url: "https://www.youtube.com/watch?v=abc".into(),
            title: "Lecture 1".into(),
            quality: "720p".into(),
            language: "en".into(),
            video_ref: "720p".into(),
            audio_ref: "en".into(),
            include_subtitles: true,
        }
    }

    #[test]
    fn request_body_uses_wire_names() {
        let r = request();
        let body = serde_json::to_value(DownloadBody {
            url: &r.url,
            video_quality: &r.video_ref,
            audio_language: &r.audio_ref,
            include_subtitles: r.include_subtitles,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "url": "https://www.youtube.com/watch?v=abc",
                "video_quality": "720p",
                "audio_language": "en",
                "include_subtitles": true
            })
        );
    }

    #[test]
    fn redirect_success() {
        let body = br#"{"success": true, "download_url": "https://cdn.example/f.mp4"}"#;
        assert_eq!(
            parse_redirect_reply(body),
            Ok(DownloadOutcome::Redirect("https://cdn.example/f.mp4".into()))
        );
    }

    #[test]
    fn redirect_failure_carries_message() {
        let body = br#"{"success": false, "error": "ffmpeg crashed"}"#;
        assert_eq!(
            parse_redirect_reply(body),
            Err(DownloadError::Remote("ffmpeg crashed".into()))
        );
    }

    #[test]
    fn redirect_without_url_is_malformed() {
        let body = br#"{"success": true}"#;
        assert!(matches!(
            parse_redirect_reply(body),
            Err(DownloadError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_redirect_reply(b"<html>"),
            Err(DownloadError::MalformedResponse(_))
        ));
    }

    #[test]
    fn binary_payload_gets_constructed_name() {
        let out = binary_outcome(&request(), vec![0, 1, 2], Some("video/webm"), None).unwrap();
        assert_eq!(
            out,
            DownloadOutcome::Payload {
                bytes: vec![0, 1, 2],
                suggested_filename: "Lecture 1_en_720p.webm".into(),
            }
        );
    }

    #[test]
    fn binary_mode_json_error_body() {
        let body = br#"{"success": false, "error": "quota exceeded"}"#.to_vec();
        assert_eq!(
            binary_outcome(&request(), body, Some("application/json"), None),
            Err(DownloadError::Remote("quota exceeded".into()))
        );
    }

    #[test]
    fn binary_mode_rejects_empty_body() {
        assert!(matches!(
            binary_outcome(&request(), Vec::new(), Some("video/mp4"), None),
            Err(DownloadError::MalformedResponse(_))
        ));
    }

    #[test]
    fn error_message_from_json_body() {
        assert_eq!(
            error_message(br#"{"success": false, "error": "not found"}"#),
            Some("not found".into())
        );
        assert_eq!(error_message(b"Bad Gateway"), None);
    }

    #[test]
    fn non_2xx_with_json_error_is_http_error_in_both_modes() {
        let body = br#"{"success": false, "error": "video unavailable"}"#;
        for mode in [ResponseMode::Redirect, ResponseMode::Binary] {
            let err = download_reply(&request(), mode, 404, body.to_vec(), Some("application/json"), None)
                .unwrap_err();
            assert_eq!(
                err,
                DownloadError::Http {
                    status: 404,
                    message: Some("video unavailable".into()),
                }
            );
            assert_eq!(err.to_string(), "HTTP 404: video unavailable");
        }
    }

    #[test]
    fn non_2xx_with_html_body_has_no_message() {
        let err = download_reply(
            &request(),
            ResponseMode::Binary,
            502,
            b"<html>Bad Gateway</html>".to_vec(),
            Some("text/html"),
            None,
        )
        .unwrap_err();
        assert_eq!(err, DownloadError::Http { status: 502, message: None });
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn ok_status_with_garbage_redirect_body_is_malformed() {
        assert!(matches!(
            download_reply(&request(), ResponseMode::Redirect, 200, b"oops".to_vec(), None, None),
            Err(DownloadError::MalformedResponse(_))
        ));
    }

    #[test]
    fn ok_status_routes_by_mode() {
        let body = br#"{"success": true, "download_url": "https://cdn.example/f.mp4"}"#;
        assert_eq!(
            download_reply(&request(), ResponseMode::Redirect, 200, body.to_vec(), Some("application/json"), None),
            Ok(DownloadOutcome::Redirect("https://cdn.example/f.mp4".into()))
        );
        assert!(matches!(
            download_reply(&request(), ResponseMode::Binary, 200, vec![1, 2], Some("video/mp4"), None),
            Ok(DownloadOutcome::Payload { .. })
        ));
    }
}
