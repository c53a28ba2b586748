//! Target URL validation and normalization.

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL exceeds the maximum length of {0} characters")]
    TooLong(usize),

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Normalizes a target URL to the form stored in the database.
///
/// # Rules
///
/// 1. Input without a scheme is treated as `https://`
/// 2. Only `http` and `https` are accepted, and a host is required
/// 3. Hostname is lowercased, default ports are dropped
/// 4. An empty path becomes `/`; query and fragment are preserved
///
/// # Errors
///
/// Fails on empty input, input longer than `max_length`, unparsable input,
/// non-HTTP schemes (`javascript:`, `ftp:`, ...) and URLs without a host.
pub fn normalize_url(input: &str, max_length: usize) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }
    if trimmed.len() > max_length {
        return Err(UrlNormalizationError::TooLong(max_length));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else if has_explicit_scheme(trimmed) {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlNormalizationError::MissingHost),
    }

    // The WHATWG parser already lowercases hosts, drops default ports and turns
    // an empty path into "/" for special schemes.
    Ok(url.to_string())
}

/// Detects `scheme:rest` forms such as `javascript:alert(1)` or `mailto:a@b`.
///
/// `host:port/path` must not be mistaken for a scheme, so a digit right after the
/// colon means "port".
fn has_explicit_scheme(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };

    let looks_like_scheme = !scheme.is_empty()
        && scheme.chars().all(|c| c.is_ascii_alphabetic() || c == '+' || c == '.' || c == '-');
    let looks_like_port = rest.chars().next().is_some_and(|c| c.is_ascii_digit());

    looks_like_scheme && !looks_like_port
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 2048;

    #[test]
    fn test_normalize_adds_root_path() {
        assert_eq!(
            normalize_url("https://example.com", MAX).unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_normalize_defaults_to_https() {
        assert_eq!(
            normalize_url("example.com/page", MAX).unwrap(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_normalize_host_with_port_without_scheme() {
        assert_eq!(
            normalize_url("example.com:8080/x", MAX).unwrap(),
            "https://example.com:8080/x"
        );
    }

    #[test]
    fn test_normalize_lowercases_host_only() {
        assert_eq!(
            normalize_url("HTTPS://EXAMPLE.COM/Path?Q=1", MAX).unwrap(),
            "https://example.com/Path?Q=1"
        );
    }

    #[test]
    fn test_normalize_drops_default_port() {
        assert_eq!(
            normalize_url("http://example.com:80/a", MAX).unwrap(),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_url("https://example.com:8443/a", MAX).unwrap(),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn test_normalize_keeps_fragment() {
        assert_eq!(
            normalize_url("https://example.com/doc#intro", MAX).unwrap(),
            "https://example.com/doc#intro"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_url("  https://example.com/x  ", MAX).unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_reject_empty() {
        assert!(matches!(
            normalize_url("   ", MAX),
            Err(UrlNormalizationError::Empty)
        ));
    }

    #[test]
    fn test_reject_too_long() {
        let long = format!("https://example.com/{}", "a".repeat(100));
        assert!(matches!(
            normalize_url(&long, 50),
            Err(UrlNormalizationError::TooLong(50))
        ));
    }

    #[test]
    fn test_reject_dangerous_schemes() {
        for input in [
            "javascript:alert(1)",
            "data:text/html,hi",
            "ftp://example.com/file",
            "file:///etc/passwd",
            "mailto:someone@example.com",
        ] {
            assert!(normalize_url(input, MAX).is_err(), "{input} must be rejected");
        }
    }

    #[test]
    fn test_reject_garbage() {
        assert!(normalize_url("http://", MAX).is_err());
        assert!(normalize_url("https://exa mple.com", MAX).is_err());
    }
}
