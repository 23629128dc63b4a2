//! Client-side input checks. Nothing that fails here is sent to the backend.

use crate::error::{AppError, AppResult};

/// Below this many typed characters no URL feedback is shown.
pub const URL_FEEDBACK_MIN_CHARS: usize = 3;
pub const NOTE_MIN_CHARS: usize = 10;

pub const ERR_URL_EMPTY: &str = "Please enter a URL";
pub const ERR_URL_SPACES: &str = "URL cannot contain spaces";
pub const ERR_URL_SCHEME: &str = "URL must start with http:// or https://";
pub const ERR_URL_FORMAT: &str = "Invalid URL format";
pub const ERR_URL_DOMAIN: &str = "Please enter a valid domain (e.g. example.com)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlValidation {
    pub is_valid: bool,
    pub normalized_url: Option<String>,
    pub error: Option<&'static str>,
}

impl UrlValidation {
    fn ok(url: String) -> Self {
        Self { is_valid: true, normalized_url: Some(url), error: None }
    }

    fn err(error: &'static str) -> Self {
        Self { is_valid: false, normalized_url: None, error: Some(error) }
    }

    pub fn into_result(self) -> AppResult<String> {
        match (self.is_valid, self.normalized_url) {
            (true, Some(url)) => Ok(url),
            _ => Err(AppError::Validation(self.error.unwrap_or(ERR_URL_FORMAT).to_string())),
        }
    }
}

/// What to show under the URL input while the user types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlFeedback {
    None,
    Error(&'static str),
    WillAdd(String),
}

/// Returns the `scheme` part when `input` starts with `scheme://`.
fn explicit_scheme(input: &str) -> Option<&str> {
    let (scheme, _) = input.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let well_formed = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    well_formed.then_some(scheme)
}

/// Normalize free-form input into an http(s) URL suitable for ingest.
pub fn validate_url(input: &str) -> UrlValidation {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return UrlValidation::err(ERR_URL_EMPTY);
    }
    if trimmed.contains(char::is_whitespace) {
        return UrlValidation::err(ERR_URL_SPACES);
    }

    let candidate = match explicit_scheme(trimmed) {
        Some(scheme) => {
            if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
                return UrlValidation::err(ERR_URL_SCHEME);
            }
            trimmed.to_string()
        }
        None => format!("https://{trimmed}"),
    };

    let parsed = match reqwest::Url::parse(&candidate) {
        Ok(u) => u,
        Err(_) => return UrlValidation::err(ERR_URL_FORMAT),
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return UrlValidation::err(ERR_URL_SCHEME);
    }

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h,
        _ => return UrlValidation::err(ERR_URL_DOMAIN),
    };
    if host != "localhost" && !host.contains('.') {
        return UrlValidation::err(ERR_URL_DOMAIN);
    }
    if host.starts_with('.') || host.ends_with('.') {
        return UrlValidation::err(ERR_URL_DOMAIN);
    }

    UrlValidation::ok(candidate)
}

/// Inline feedback: silent until enough characters are typed.
pub fn url_feedback(input: &str) -> UrlFeedback {
    if input.trim().chars().count() < URL_FEEDBACK_MIN_CHARS {
        return UrlFeedback::None;
    }
    let result = validate_url(input);
    match (result.normalized_url, result.error) {
        (Some(url), _) if result.is_valid => UrlFeedback::WillAdd(url),
        (_, Some(error)) => UrlFeedback::Error(error),
        _ => UrlFeedback::Error(ERR_URL_FORMAT),
    }
}

/// Notes must carry at least [`NOTE_MIN_CHARS`] non-blank characters.
pub fn validate_note(content: &str) -> AppResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Please enter a note".into()));
    }
    if trimmed.chars().count() < NOTE_MIN_CHARS {
        return Err(AppError::Validation(format!(
            "Note must be at least {NOTE_MIN_CHARS} characters"
        )));
    }
    Ok(trimmed)
}
