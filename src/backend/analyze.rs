use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use vidlingo_core::core::events::ProcessingPhase;

use crate::backend::traits::MetadataClient;
use crate::core::errors::AnalyzeError;
use crate::core::http_client::endpoint;
use crate::core::status::StatusReporter;
use crate::core::url_parser::normalize_url;
use crate::models::media::{AudioVariant, VideoMetadata, VideoVariant};

const ANALYZE_PATH: &str = "/api/analyze";

#[derive(Serialize)]
struct AnalyzeBody<'a> {
    url: &'a str,
}

pub struct HttpMetadataClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMetadataClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn analyze(&self, url: &str) -> Result<VideoMetadata, AnalyzeError> {
        let url = normalize_url(url)?;
        let target = endpoint(&self.base_url, ANALYZE_PATH);
        tracing::debug!("POST {} url={}", target, url);

        let response = self
            .client
            .post(&target)
            .json(&AnalyzeBody { url: &url })
            .send()
            .await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        analyze_reply(&url, status, &bytes)
    }
}

/// Maps an analyze reply onto metadata or an error. A non-2xx status carries
/// the body's `error` field when there is one, else `HTTP <status>`.
pub fn analyze_reply(url: &str, status: u16, body: &[u8]) -> Result<VideoMetadata, AnalyzeError> {
    let success = (200..300).contains(&status);
    let json: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) if !success => return Err(AnalyzeError::Remote(format!("HTTP {}", status))),
        Err(e) => return Err(AnalyzeError::MalformedResponse(e.to_string())),
    };

    if !success {
        let message = json
            .get("error")
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(AnalyzeError::Remote(message));
    }

    parse_analyze_response(url, &json)
}

/// Maps the variant-keyed analyze payload onto [`VideoMetadata`]. Key order
/// of `video_formats` and `audio_formats` is preserved.
pub fn parse_analyze_response(url: &str, json: &Value) -> Result<VideoMetadata, AnalyzeError> {
    let success = json.get("success").and_then(|s| s.as_bool()).unwrap_or(false);
    if !success {
        let message = json
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown error");
        return Err(AnalyzeError::Remote(message.to_string()));
    }

    let data = json
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| AnalyzeError::MalformedResponse("missing data".into()))?;

    let title = data
        .get("title")
        .and_then(|t| t.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(url)
        .to_string();

    let thumbnail_url = data
        .get("thumbnail")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let video_formats = non_empty_object(data, "video_formats")?;
    let video_variants = video_formats
        .iter()
        .map(|(label, value)| VideoVariant {
            label: label.clone(),
            reference: label.clone(),
            format_id: value
                .as_str()
                .or_else(|| value.get("format_id").and_then(|f| f.as_str()))
                .map(str::to_string),
        })
        .collect();

    let audio_formats = non_empty_object(data, "audio_formats")?;
    let audio_variants = audio_formats
        .iter()
        .map(|(code, value)| AudioVariant {
            code: code.clone(),
            name: value
                .as_str()
                .or_else(|| value.get("name").and_then(|n| n.as_str()))
                .or_else(|| value.get("display_name").and_then(|n| n.as_str()))
                .unwrap_or(code)
                .to_string(),
            reference: code.clone(),
        })
        .collect();

    Ok(VideoMetadata {
        url: url.to_string(),
        title,
        duration_seconds: parse_duration(data.get("duration")),
        thumbnail_url,
        video_variants,
        audio_variants,
    })
}

fn non_empty_object<'a>(
    data: &'a Value,
    key: &str,
) -> Result<&'a serde_json::Map<String, Value>, AnalyzeError> {
    match data.get(key).and_then(|v| v.as_object()) {
        Some(map) if !map.is_empty() => Ok(map),
        Some(_) => Err(AnalyzeError::MalformedResponse(format!("{} is empty", key))),
        None => Err(AnalyzeError::MalformedResponse(format!("missing {}", key))),
    }
}

/// Seconds from a number, a numeric string or an `[h:]m:s` string.
fn parse_duration(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Ok(f) = s.parse::<f64>() {
                return f.max(0.0) as u64;
            }
            s.split(':')
                .try_fold(0u64, |acc, part| {
                    part.trim()
                        .parse::<u64>()
                        .ok()
                        .map(|p| acc.saturating_mul(60).saturating_add(p))
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Runs one analyze call and mirrors its progress into the status reporter.
/// Invalid input fails before the reporter is touched. During a queue run
/// only the detail text is updated.
pub async fn analyze_and_report(
    client: &dyn MetadataClient,
    status: &StatusReporter,
    input: &str,
) -> Result<VideoMetadata, AnalyzeError> {
    let url = normalize_url(input)?;

    status.set_outside_run(ProcessingPhase::Analyzing, "Analyzing video...", 30);
    match client.analyze(&url).await {
        Ok(meta) => {
            status.set_outside_run(
                ProcessingPhase::Idle,
                format!(
                    "Found {} quality options. Title: {}",
                    meta.video_variants.len(),
                    meta.title
                ),
                100,
            );
            Ok(meta)
        }
        Err(e) => {
            tracing::warn!("Analyze failed for {}: {}", url, e);
            status.set_outside_run(ProcessingPhase::Idle, e.to_string(), 0);
            Err(e)
        }
    }
}
