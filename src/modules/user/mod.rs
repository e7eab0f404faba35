// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{async_find_impl, insert_impl, list_all_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::user::payload::{is_phone_number, RegisterRequest, UserProfile};
use crate::modules::utils::encrypt::{hash_password, verify_password};
use crate::{raise_error, utc_now, validate_email};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod payload;
#[cfg(test)]
mod tests;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct User {
    /// Full mail address, always lower-case and inside the served domain.
    #[primary_key]
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<Gender>,
    pub picture: Option<String>,
    pub created_at: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
#[oai(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

/// Lower-cases an address and appends the served domain when no `@` is present.
pub fn normalize_address(input: &str) -> String {
    let address = input.trim().to_lowercase();
    if address.contains('@') {
        address
    } else {
        format!("{}@{}", address, SETTINGS.webmail_mail_domain)
    }
}

/// Accepts only well-formed addresses of the served domain.
pub fn validate_local_address(address: &str) -> WebmailResult<()> {
    validate_email!(address)?;
    let suffix = format!("@{}", SETTINGS.webmail_mail_domain);
    if !address.ends_with(&suffix) || address.len() == suffix.len() {
        return Err(raise_error!(
            format!(
                "Address '{}' is outside the served domain '{}'.",
                address, SETTINGS.webmail_mail_domain
            ),
            ErrorCode::InvalidParameter
        ));
    }
    Ok(())
}

impl User {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.trim().is_empty() => {
                format!("{} {}", self.first_name.trim(), last.trim())
            }
            _ => self.first_name.trim().to_string(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            birthday: self.birthday.clone(),
            gender: self.gender,
            picture: self.picture.clone(),
            created_at: self.created_at,
        }
    }

    pub async fn register(request: RegisterRequest) -> WebmailResult<User> {
        let username = request.validate()?;
        if Self::find(&username).await?.is_some() {
            return Err(raise_error!(
                format!("User '{}' already exists.", username),
                ErrorCode::AlreadyExists
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User {
            username,
            first_name: request.first_name.trim().to_string(),
            last_name: request
                .last_name
                .map(|last| last.trim().to_string())
                .filter(|last| !last.is_empty()),
            password_hash,
            phone: request.phone.map(|phone| phone.trim().to_string()),
            birthday: request.birthday,
            gender: request.gender,
            picture: request.picture,
            created_at: utc_now!(),
        };
        insert_impl(DB_MANAGER.mail_db(), user.clone()).await?;
        info!("Registered user '{}'", user.username);
        Ok(user)
    }

    pub async fn find(username: &str) -> WebmailResult<Option<User>> {
        async_find_impl(DB_MANAGER.mail_db(), username.to_string()).await
    }

    pub async fn get(username: &str) -> WebmailResult<User> {
        Self::find(username).await?.ok_or_else(|| {
            raise_error!(
                format!("User '{}' not found.", username),
                ErrorCode::ResourceNotFound
            )
        })
    }

    /// Resolves a login name (address, local part or phone number) and checks the password.
    pub async fn authenticate(login: &str, password: &str) -> WebmailResult<User> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(raise_error!(
                "Username and password are required.".into(),
                ErrorCode::InvalidParameter
            ));
        }

        let user = if is_phone_number(login) {
            let users: Vec<User> = list_all_impl(DB_MANAGER.mail_db()).await?;
            users
                .into_iter()
                .find(|user| user.phone.as_deref() == Some(login))
        } else {
            Self::find(&normalize_address(login)).await?
        };

        let user = user.ok_or_else(|| {
            raise_error!(
                format!("User '{}' not found.", login),
                ErrorCode::ResourceNotFound
            )
        })?;

        if !verify_password(password, &user.password_hash) {
            return Err(raise_error!(
                "Invalid username or password.".into(),
                ErrorCode::PermissionDenied
            ));
        }
        Ok(user)
    }
}
