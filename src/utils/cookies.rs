//! Minimal cookie parsing and `Set-Cookie` construction.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use std::time::Duration;

/// Name of the JWT cookie set by password login.
pub const TOKEN_COOKIE: &str = "token";
/// Name of the session cookie set by session login and the OAuth callback.
pub const SESSION_COOKIE: &str = "session_id";
/// Short-lived cookie holding the signed OAuth state token.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Reads a cookie value from the `Cookie` header(s).
///
/// Handles several cookies per header separated by semicolons; empty values are
/// treated as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

/// Builds an HttpOnly `Set-Cookie` value scoped to `/`.
pub fn build_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    secure: bool,
    same_site: SameSite,
) -> HeaderValue {
    let mut cookie = format!(
        "{name}={value}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
        max_age.as_secs(),
        same_site.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }

    // Names are constants and values are base64url / JWT / hex, all header-safe.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Builds a `Set-Cookie` value that removes the cookie.
pub fn clear_cookie(name: &str, secure: bool, same_site: SameSite) -> HeaderValue {
    build_cookie(name, "", Duration::ZERO, secure, same_site)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_read_single_cookie() {
        let headers = headers_with_cookie("session_id=abc123");
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("abc123".to_string()));
    }

    #[test]
    fn test_read_among_many() {
        let headers = headers_with_cookie("theme=dark; token=jwt.value.here; lang=en");
        assert_eq!(
            read_cookie(&headers, TOKEN_COOKIE),
            Some("jwt.value.here".to_string())
        );
    }

    #[test]
    fn test_read_missing_and_empty() {
        let headers = headers_with_cookie("token=; other=1");
        assert_eq!(read_cookie(&headers, TOKEN_COOKIE), None);
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), None);
        assert_eq!(read_cookie(&HeaderMap::new(), TOKEN_COOKIE), None);
    }

    #[test]
    fn test_prefix_name_does_not_match() {
        let headers = headers_with_cookie("session_id_old=zzz");
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn test_build_cookie() {
        let value = build_cookie(
            SESSION_COOKIE,
            "abc",
            Duration::from_secs(86_400),
            false,
            SameSite::Lax,
        );
        assert_eq!(
            value.to_str().unwrap(),
            "session_id=abc; Path=/; Max-Age=86400; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_build_secure_cookie() {
        let value = build_cookie(TOKEN_COOKIE, "t", Duration::from_secs(60), true, SameSite::Strict);
        assert!(value.to_str().unwrap().ends_with("SameSite=Strict; Secure"));
    }

    #[test]
    fn test_clear_cookie() {
        let value = clear_cookie(TOKEN_COOKIE, false, SameSite::Strict);
        assert!(value.to_str().unwrap().starts_with("token=; Path=/; Max-Age=0"));
    }
}
