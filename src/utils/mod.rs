//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation and alias policy
//! - [`url_normalizer`] - Target URL validation and normalization
//! - [`user_agent`] - Device/OS/browser classification
//! - [`client_ip`] - Client IP extraction (proxy aware)
//! - [`cookies`] - Cookie parsing and `Set-Cookie` construction
//! - [`password`] - Argon2id hashing
//! - [`state_token`] - Signed OAuth state tokens

pub mod client_ip;
pub mod code_generator;
pub mod cookies;
pub mod password;
pub mod state_token;
pub mod url_normalizer;
pub mod user_agent;
