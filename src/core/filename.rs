use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISPOSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).unwrap());

const DEFAULT_EXT: &str = "mp4";

pub fn sanitize_path_component(name: &str) -> String {
    let name: String = name.nfc().collect();
    let name = WS_RE.replace_all(name.trim(), " ");
    let name = name.trim_end_matches([' ', '-', '.', ';']);

    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '<' => out.push('＜'),
            '>' => out.push('＞'),
            ':' => out.push('꞉'),
            '"' => out.push('＂'),
            '/' => out.push('⧸'),
            '\\' => out.push('＼'),
            '|' => out.push('｜'),
            '?' => out.push('？'),
            '*' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.trim().to_string()
}

/// `{title}_{language}_{quality}.{ext}`, every part made filesystem safe.
pub fn payload_filename(title: &str, language: &str, quality: &str, ext: &str) -> String {
    let title = match sanitize_path_component(title) {
        t if t.is_empty() => "video".to_string(),
        t => t,
    };
    let ext = ext.trim_start_matches('.');
    let ext = if ext.is_empty() { DEFAULT_EXT } else { ext };
    format!(
        "{}_{}_{}.{}",
        title,
        sanitize_path_component(language),
        sanitize_path_component(quality),
        ext
    )
}

pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "video/mp4" => Some("mp4"),
        "video/webm" | "audio/webm" => Some("webm"),
        "video/x-matroska" => Some("mkv"),
        "video/quicktime" => Some("mov"),
        "audio/mpeg" => Some("mp3"),
        "audio/mp4" => Some("m4a"),
        "audio/ogg" => Some("ogg"),
        _ => None,
    }
}

pub fn extension_from_disposition(disposition: &str) -> Option<String> {
    let caps = DISPOSITION_RE.captures(disposition)?;
    let name = caps.get(1)?.as_str().trim();
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Picks the payload extension from the response headers, falling back to mp4.
pub fn pick_extension(content_disposition: Option<&str>, content_type: Option<&str>) -> String {
    content_disposition
        .and_then(extension_from_disposition)
        .or_else(|| {
            content_type
                .and_then(extension_for_content_type)
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_EXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_basic_forbidden_chars() {
        assert_eq!(sanitize_path_component("a:b?c"), "a꞉b？c");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_path_component("hello \t  world"), "hello world");
    }

    #[test]
    fn sanitize_trims_trailing_punctuation() {
        assert_eq!(sanitize_path_component("file name - "), "file name");
    }

    #[test]
    fn sanitize_unicode_nfc_normalization() {
        assert_eq!(sanitize_path_component("e\u{0301}"), "\u{00e9}");
    }

    #[test]
    fn sanitize_windows_forbidden_chars() {
        for c in ['<', '>', ':', '"', '/', '\\', '|', '?', '*'] {
            let result = sanitize_path_component(&format!("test{}file", c));
            assert!(!result.contains(c), "char '{}' should be replaced", c);
        }
    }

    #[test]
    fn payload_filename_layout() {
        assert_eq!(
            payload_filename("My Video", "en", "720p", "mp4"),
            "My Video_en_720p.mp4"
        );
    }

    #[test]
    fn payload_filename_sanitizes_title() {
        assert_eq!(
            payload_filename("AC/DC: Live", "fr", "1080p", ".webm"),
            "AC⧸DC꞉ Live_fr_1080p.webm"
        );
    }

    #[test]
    fn payload_filename_empty_title_and_ext() {
        assert_eq!(payload_filename("  ", "en", "480p", ""), "video_en_480p.mp4");
    }

    #[test]
    fn content_type_mapping() {
        assert_eq!(extension_for_content_type("video/mp4"), Some("mp4"));
        assert_eq!(extension_for_content_type("Video/WebM; codecs=vp9"), Some("webm"));
        assert_eq!(extension_for_content_type("audio/mpeg"), Some("mp3"));
        assert_eq!(extension_for_content_type("application/octet-stream"), None);
    }

    #[test]
    fn disposition_extension() {
        assert_eq!(
            extension_from_disposition(r#"attachment; filename="clip_en_720p.MKV""#),
            Some("mkv".to_string())
        );
        assert_eq!(
            extension_from_disposition("attachment; filename*=UTF-8''v%C3%ADdeo.webm"),
            Some("webm".to_string())
        );
        assert_eq!(extension_from_disposition("attachment"), None);
        assert_eq!(extension_from_disposition(r#"attachment; filename="noext""#), None);
    }

    #[test]
    fn pick_extension_prefers_disposition() {
        assert_eq!(
            pick_extension(Some(r#"attachment; filename="a.webm""#), Some("video/mp4")),
            "webm"
        );
        assert_eq!(pick_extension(None, Some("video/x-matroska")), "mkv");
        assert_eq!(pick_extension(None, Some("application/octet-stream")), "mp4");
        assert_eq!(pick_extension(None, None), "mp4");
    }
}
