//! Signed OAuth `state` tokens.
//!
//! A state token is `<nonce>.<mac>` where the nonce is 16 random bytes in hex and
//! the mac is HMAC-SHA256 of the nonce under the server secret. The callback
//! accepts a state only if it equals the value in the `oauth_state` cookie and the
//! MAC verifies, so neither a forged cookie nor a replayed foreign state passes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const NONCE_BYTES: usize = 16;

pub struct StateTokenSigner {
    secret: Vec<u8>,
}

impl StateTokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| {
            AppError::internal(
                "Invalid state token secret",
                serde_json::json!({ "reason": e.to_string() }),
            )
        })
    }

    /// Mints a fresh state token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the OS entropy source fails.
    pub fn issue(&self) -> Result<String, AppError> {
        let mut nonce = [0u8; NONCE_BYTES];
        getrandom::fill(&mut nonce).map_err(|e| {
            AppError::internal(
                "Failed to generate state token",
                serde_json::json!({ "reason": e.to_string() }),
            )
        })?;

        let nonce = hex::encode(nonce);
        let mut mac = self.mac()?;
        mac.update(nonce.as_bytes());
        let tag = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{nonce}.{tag}"))
    }

    /// Verifies a callback `state` against the value stored in the cookie.
    pub fn verify(&self, cookie_value: Option<&str>, state: &str) -> bool {
        let Some(stored) = cookie_value else {
            return false;
        };
        if stored.is_empty() || stored != state {
            return false;
        }

        let Some((nonce, tag)) = state.split_once('.') else {
            return false;
        };
        let Ok(tag) = hex::decode(tag) else {
            return false;
        };

        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(nonce.as_bytes());
        mac.verify_slice(&tag).is_ok()
    }
}
