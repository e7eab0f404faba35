use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use poem_openapi::Object;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::user::{normalize_address, validate_local_address, Gender};
use crate::raise_error;

const PASSWORD_SPECIALS: &str = "!@#$%^&*";

static PHONE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^05\d{8}$").ok());

pub fn is_phone_number(value: &str) -> bool {
    PHONE_PATTERN
        .as_ref()
        .map(|pattern| pattern.is_match(value))
        .unwrap_or(false)
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[oai(validator(max_length = "64"))]
    pub first_name: String,
    #[oai(validator(max_length = "64"))]
    pub last_name: Option<String>,
    /// Mail address, or just its local part; the served domain is appended when missing.
    pub username: String,
    /// At least 8 characters with upper and lower case letters, a digit and one of `!@#$%^&*`.
    pub password: String,
    /// Mobile number in the form `05XXXXXXXX`.
    pub phone: Option<String>,
    /// Date of birth, `YYYY-MM-DD`, must be in the past.
    pub birthday: Option<String>,
    pub gender: Option<Gender>,
    /// Profile picture reference.
    pub picture: Option<String>,
}

impl RegisterRequest {
    /// Validates every field and returns the normalized username.
    pub fn validate(&self) -> WebmailResult<String> {
        if self.first_name.trim().is_empty() {
            return Err(raise_error!(
                "First name is required.".into(),
                ErrorCode::InvalidParameter
            ));
        }

        let username = normalize_address(&self.username);
        validate_local_address(&username)?;
        validate_password(&self.password)?;

        if let Some(phone) = &self.phone {
            if !is_phone_number(phone.trim()) {
                return Err(raise_error!(
                    format!("Invalid phone number '{}', expected 05XXXXXXXX.", phone),
                    ErrorCode::InvalidParameter
                ));
            }
        }

        if let Some(birthday) = &self.birthday {
            validate_birthday(birthday)?;
        }
        Ok(username)
    }
}

pub fn validate_password(password: &str) -> WebmailResult<()> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if long_enough && has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(raise_error!(
            format!(
                "Password must be at least 8 characters and contain upper case, lower case, a digit and one of {}.",
                PASSWORD_SPECIALS
            ),
            ErrorCode::InvalidParameter
        ))
    }
}

pub fn validate_birthday(birthday: &str) -> WebmailResult<()> {
    let date = NaiveDate::parse_from_str(birthday.trim(), "%Y-%m-%d").map_err(|_| {
        raise_error!(
            format!("Invalid birthday '{}', expected YYYY-MM-DD.", birthday),
            ErrorCode::InvalidParameter
        )
    })?;
    if date >= Local::now().date_naive() {
        return Err(raise_error!(
            "Birthday must be in the past.".into(),
            ErrorCode::InvalidParameter
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<Gender>,
    pub picture: Option<String>,
    pub created_at: i64,
}
