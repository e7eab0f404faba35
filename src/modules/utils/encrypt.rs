// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use base64::{engine::general_purpose, Engine as _};
use ring::pbkdf2::{self, derive, verify};
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::raise_error;

const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = 32;
const ITERATIONS: u32 = 100_000;

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(ITERATIONS).unwrap_or(NonZeroU32::MIN)
}

/// Derives a salted PBKDF2-HMAC-SHA256 credential, encoded as `salt || hash` in URL-safe base64.
pub fn hash_password(password: &str) -> WebmailResult<String> {
    internal_hash_password(password)
        .map_err(|_| raise_error!("Failed to hash password.".into(), ErrorCode::InternalError))
}

/// Returns `false` for malformed stored credentials instead of an error.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(data) = general_purpose::URL_SAFE.decode(stored) else {
        return false;
    };
    if data.len() != SALT_LEN + CREDENTIAL_LEN {
        return false;
    }
    let (salt, expected) = data.split_at(SALT_LEN);
    verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        salt,
        password.as_bytes(),
        expected,
    )
    .is_ok()
}

fn internal_hash_password(password: &str) -> Result<String, ring::error::Unspecified> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)?;
    let mut credential = [0u8; CREDENTIAL_LEN];
    derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        &salt,
        password.as_bytes(),
        &mut credential,
    );
    let mut result = Vec::with_capacity(SALT_LEN + CREDENTIAL_LEN);
    result.extend_from_slice(&salt);
    result.extend_from_slice(&credential);
    Ok(general_purpose::URL_SAFE.encode(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("Secret#123").unwrap();
        assert!(verify_password("Secret#123", &stored));
        assert!(!verify_password("secret#123", &stored));
    }

    #[test]
    fn test_same_password_gets_different_salt() {
        let first = hash_password("Secret#123").unwrap();
        let second = hash_password("Secret#123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_credential_never_verifies() {
        assert!(!verify_password("anything", "not-base64!!"));
        assert!(!verify_password("anything", "c2hvcnQ="));
    }
}
