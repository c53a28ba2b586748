//! Short code generation and custom alias policy.

use crate::error::AppError;
use rand::{Rng, distr::Alphanumeric};
use serde_json::json;

/// Default length of generated short codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

pub const ALIAS_MIN_LENGTH: usize = 3;
pub const ALIAS_MAX_LENGTH: usize = 50;

/// Aliases that would shadow application routes or look official.
///
/// Compared case-insensitively.
pub const RESERVED_ALIASES: &[&str] = &[
    "api",
    "admin",
    "www",
    "app",
    "dashboard",
    "login",
    "register",
    "logout",
    "profile",
    "settings",
];

/// Produces random short codes over `[A-Za-z0-9]`.
///
/// Stateless apart from the configured length; each call draws from the
/// thread-local RNG, so the generator is freely shareable between tasks.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draws a uniformly distributed code of the configured length.
    pub fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

/// Validates a caller-supplied custom alias.
///
/// # Rules
///
/// - Length: 3-50 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Must not match a reserved word, ignoring case
///
/// # Errors
///
/// Returns [`AppError::Validation`] with code `invalid_alias` if any rule is violated.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if alias.len() < ALIAS_MIN_LENGTH || alias.len() > ALIAS_MAX_LENGTH {
        return Err(AppError::invalid_alias(
            "Custom alias must be 3-50 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::invalid_alias(
            "Custom alias can only contain letters, digits, hyphens and underscores",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(AppError::invalid_alias(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_default_length() {
        let code = CodeGenerator::default().generate();
        assert_eq!(code.len(), DEFAULT_CODE_LENGTH);
    }

    #[test]
    fn test_generate_configured_length() {
        let code = CodeGenerator::new(10).generate();
        assert_eq!(code.len(), 10);
    }

    #[test]
    fn test_generate_uses_alphanumeric_alphabet() {
        let generator = CodeGenerator::new(64);
        for _ in 0..100 {
            assert!(generator.generate().chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_rarely_collides() {
        let generator = CodeGenerator::new(8);
        let codes: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_alias_accepted() {
        assert!(validate_alias("good-alias_1").is_ok());
        assert!(validate_alias("abc").is_ok());
        assert!(validate_alias("MixedCase").is_ok());
    }

    #[test]
    fn test_alias_too_short() {
        let err = validate_alias("ab").unwrap_err();
        assert_eq!(err.code(), "invalid_alias");
        assert!(err.to_string().contains("3-50"));
    }

    #[test]
    fn test_alias_too_long() {
        let alias = "a".repeat(51);
        assert!(validate_alias(&alias).is_err());
        assert!(validate_alias(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_alias_invalid_characters() {
        assert!(validate_alias("my alias").is_err());
        assert!(validate_alias("promo@2025").is_err());
        assert!(validate_alias("päth").is_err());
    }

    #[test]
    fn test_alias_reserved_any_case() {
        for alias in ["api", "API", "Api", "aPi"] {
            let err = validate_alias(alias).unwrap_err();
            assert!(err.to_string().contains("reserved"), "{alias} must be reserved");
        }
    }

    #[test]
    fn test_all_reserved_words_rejected() {
        for &reserved in RESERVED_ALIASES {
            assert!(validate_alias(reserved).is_err());
            assert!(validate_alias(&reserved.to_uppercase()).is_err());
        }
    }

    #[test]
    fn test_reserved_word_as_substring_is_fine() {
        assert!(validate_alias("api-docs").is_ok());
        assert!(validate_alias("my_admin").is_ok());
    }
}
