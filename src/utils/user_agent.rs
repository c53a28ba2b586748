//! Coarse User-Agent classification for click analytics.
//!
//! Matching is case-insensitive substring search over small ordered rule tables;
//! the first matching rule wins.

/// Device, OS and browser family derived from a User-Agent header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub device: &'static str,
    pub os: &'static str,
    pub browser: &'static str,
}

const UNKNOWN: &str = "Unknown";
const DEFAULT_DEVICE: &str = "desktop";

const DEVICE_RULES: &[(&[&str], &str)] = &[
    (&["mobile", "android", "iphone"], "mobile"),
    (&["tablet", "ipad"], "tablet"),
];

const OS_RULES: &[(&[&str], &str)] = &[
    (&["windows"], "Windows"),
    (&["mac"], "macOS"),
    (&["linux"], "Linux"),
    (&["android"], "Android"),
    (&["iphone", "ipad"], "iOS"),
];

const BROWSER_RULES: &[(&[&str], &str)] = &[
    (&["chrome"], "Chrome"),
    (&["firefox"], "Firefox"),
    (&["safari"], "Safari"),
    (&["edge"], "Edge"),
    (&["opera"], "Opera"),
];

fn first_match(haystack: &str, rules: &[(&[&str], &'static str)], default: &'static str) -> &'static str {
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| haystack.contains(needle)))
        .map(|(_, label)| *label)
        .unwrap_or(default)
}

/// Classifies a User-Agent string.
///
/// An empty or unrecognized agent yields `desktop` / `Unknown` / `Unknown`.
pub fn classify(user_agent: &str) -> UserAgentInfo {
    let ua = user_agent.to_ascii_lowercase();

    UserAgentInfo {
        device: first_match(&ua, DEVICE_RULES, DEFAULT_DEVICE),
        os: first_match(&ua, OS_RULES, UNKNOWN),
        browser: first_match(&ua, BROWSER_RULES, UNKNOWN),
    }
}
