use crate::core::errors::AnalyzeError;

/// Trims and validates user input before any network call. Input without a
/// scheme is treated as `https://`.
pub fn normalize_url(input: &str) -> Result<String, AnalyzeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnalyzeError::Validation("url is empty".into()));
    }

    let with_https = || {
        url::Url::parse(&format!("https://{}", trimmed))
            .map_err(|e| AnalyzeError::Validation(format!("{}: {}", trimmed, e)))
    };

    // `host:port/path` parses with `host` as the scheme.
    let parsed = match url::Url::parse(trimmed) {
        Ok(u) if !is_web_scheme(u.scheme()) && !trimmed.contains("://") => with_https()?,
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => with_https()?,
        Err(e) => return Err(AnalyzeError::Validation(format!("{}: {}", trimmed, e))),
    };

    if !is_web_scheme(parsed.scheme()) {
        return Err(AnalyzeError::Validation(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    match parsed.host_str() {
        Some(h) if !h.is_empty() => Ok(parsed.to_string()),
        _ => Err(AnalyzeError::Validation(format!("{}: missing host", trimmed))),
    }
}

fn is_web_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}
