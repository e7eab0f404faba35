// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use base64::{engine::general_purpose, Engine};
use rand::{rng, Rng};

use super::error::code::ErrorCode;

pub mod encrypt;
pub mod net;
pub mod shutdown;
#[cfg(test)]
pub mod testing;

#[macro_export]
macro_rules! webmail_version {
    () => {
        env!("CARGO_PKG_VERSION")
    };
}

#[macro_export]
macro_rules! utc_now {
    () => {{
        use chrono::Utc;
        Utc::now().timestamp_millis()
    }};
}

#[macro_export]
macro_rules! after_n_hours_timestamp {
    ($start_ts:expr, $hours:expr) => {{
        const MILLIS_PER_HOUR: i64 = 3_600_000;
        $start_ts + ($hours as i64) * MILLIS_PER_HOUR
    }};
}

#[macro_export]
macro_rules! raise_error {
    ($msg:expr, $code:expr) => {
        $crate::modules::error::WebmailError::Generic {
            message: $msg,
            location: snafu::Location::default(),
            code: $code,
        }
    };
}

#[macro_export]
macro_rules! generate_token {
    ($bit_strength:expr) => {{
        $crate::modules::utils::generate_token_impl($bit_strength)
    }};
}

pub(crate) fn generate_token_impl(bit_strength: usize) -> String {
    let byte_length = (bit_strength + 23) / 24 * 3;
    let random_bytes: Vec<u8> = (0..byte_length).map(|_| rand::random::<u8>()).collect();
    let mut encoded = general_purpose::URL_SAFE.encode(&random_bytes);

    encoded = encoded
        .chars()
        .map(|c| {
            if c == '/' || c == '+' || c == '-' || c == '_' {
                make_single_random_char()
            } else {
                c
            }
        })
        .collect();

    encoded
}

fn make_single_random_char() -> char {
    let random_bytes: [u8; 3] = rng().random();
    let encoded = general_purpose::URL_SAFE.encode(random_bytes);
    encoded
        .chars()
        .find(|&c| c != '-' && c != '_' && c != '+' && c != '/')
        .unwrap_or('a')
}

#[macro_export]
macro_rules! validate_email {
    ($email:expr) => {{
        $crate::modules::utils::validate_email($email)
    }};
}

pub fn validate_email(email: &str) -> crate::modules::error::WebmailResult<()> {
    use std::str::FromStr;
    let email_address = email_address::EmailAddress::from_str(email).map_err(|_| {
        raise_error!(
            format!("Invalid email format : {}", email),
            ErrorCode::InvalidParameter
        )
    })?;
    if email != email_address.email() {
        return Err(raise_error!(
            format!("Invalid email format: {}", email),
            ErrorCode::InvalidParameter
        ));
    }
    Ok(())
}

#[macro_export]
macro_rules! calculate_hash {
    ($name:expr) => {
        $crate::modules::utils::hash($name)
    };
}

#[macro_export]
macro_rules! id {
    ($bit_strength:expr) => {{
        // Generate a token with the given bit strength
        let token = $crate::modules::utils::generate_token_impl($bit_strength);
        // Hash the generated token
        $crate::modules::utils::hash(&token)
    }};
}

/// Generates a 64-bit hash from a string, ensuring the output is within JavaScript's safe integer range (0 to 2^53 - 1).
pub fn hash(s: &str) -> u64 {
    let mut cursor = std::io::Cursor::new(s.as_bytes());
    // reading from an in-memory cursor cannot fail
    let hash = murmur3::murmur3_x64_128(&mut cursor, 0).unwrap_or_default();
    (hash & 0x1F_FFFF_FFFF_FFFF) as u64
}

/// Composite key for one user's rows about one mail.
pub fn owner_mail_hash(username: &str, mail_id: u64) -> u64 {
    let mut buffer = Vec::with_capacity(username.len() + 1 + 8);
    buffer.extend_from_slice(username.as_bytes());
    buffer.push(b':');
    buffer.extend_from_slice(&mail_id.to_be_bytes());
    let mut cursor = std::io::Cursor::new(buffer);
    let hash = murmur3::murmur3_x64_128(&mut cursor, 0).unwrap_or_default();
    hash as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_js_safe_and_stable() {
        let a = hash("alice@doar.com");
        assert_eq!(a, hash("alice@doar.com"));
        assert!(a <= 0x1F_FFFF_FFFF_FFFF);
        assert_ne!(a, hash("bob@doar.com"));
    }

    #[test]
    fn test_owner_mail_hash_depends_on_both_parts() {
        let base = owner_mail_hash("alice@doar.com", 7);
        assert_eq!(base, owner_mail_hash("alice@doar.com", 7));
        assert_ne!(base, owner_mail_hash("alice@doar.com", 8));
        assert_ne!(base, owner_mail_hash("bob@doar.com", 7));
    }

    #[test]
    fn test_generated_tokens_are_url_safe() {
        for _ in 0..20 {
            let token = generate_token!(128);
            assert!(token.len() >= 20);
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '='));
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@doar.com").is_ok());
        assert!(validate_email("not an address").is_err());
        assert!(validate_email("Alice <alice@doar.com>").is_err());
    }
}
