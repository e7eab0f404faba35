// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{db_error, delete_impl, transaction_impl};
use crate::modules::error::WebmailResult;
use crate::modules::settings::cli::SETTINGS;
use crate::{after_n_hours_timestamp, generate_token, raise_error, utc_now};
use itertools::Itertools;
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::code::ErrorCode;

pub mod payload;
#[cfg(test)]
mod tests;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct AccessToken {
    /// The bearer value handed to the client.
    #[primary_key]
    pub token: String,
    /// Address of the user the token was issued to.
    #[secondary_key]
    pub username: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub last_access_at: i64,
}

impl AccessToken {
    pub fn new(username: &str) -> Self {
        let now = utc_now!();
        Self {
            token: generate_token!(128),
            username: username.to_string(),
            created_at: now,
            expires_at: after_n_hours_timestamp!(now, SETTINGS.webmail_access_token_ttl_hours),
            last_access_at: now,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Issues a new token for `username`, purging that user's expired ones.
    pub async fn issue(username: &str) -> WebmailResult<AccessToken> {
        let access_token = AccessToken::new(username);
        let username = username.to_string();
        let issued = access_token.clone();
        let purged = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let now = utc_now!();
            let expired: Vec<AccessToken> = rw
                .scan()
                .secondary::<AccessToken>(AccessTokenKey::username)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .start_with(username.clone())
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .try_collect()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            let expired: Vec<AccessToken> = expired
                .into_iter()
                .filter(|token| token.username == username && token.is_expired(now))
                .collect();
            let purged = expired.len();
            for token in expired {
                rw.remove(token).map_err(db_error)?;
            }
            rw.insert(issued).map_err(db_error)?;
            Ok(purged)
        })
        .await?;
        if purged > 0 {
            debug!(
                "Purged {} expired token(s) of '{}'",
                purged, access_token.username
            );
        }
        Ok(access_token)
    }

    /// Resolves a bearer value, refreshing its last access time.
    ///
    /// Unknown and expired tokens are both rejected with `PermissionDenied`;
    /// an expired token is removed on the way out.
    pub async fn validate(token: &str) -> WebmailResult<AccessToken> {
        let token = token.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let current = rw
                .get()
                .primary::<AccessToken>(token)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        "Invalid access token.".into(),
                        ErrorCode::PermissionDenied
                    )
                })?;
            let now = utc_now!();
            if current.is_expired(now) {
                rw.remove(current).map_err(db_error)?;
                return Ok(None);
            }
            let mut updated = current.clone();
            updated.last_access_at = now;
            rw.update(current, updated.clone()).map_err(db_error)?;
            Ok(Some(updated))
        })
        .await?
        .ok_or_else(|| {
            raise_error!(
                "Access token has expired.".into(),
                ErrorCode::PermissionDenied
            )
        })
    }

    pub async fn revoke(token: &str) -> WebmailResult<()> {
        let token = token.to_string();
        delete_impl(DB_MANAGER.mail_db(), move |rw| {
            rw.get()
                .primary::<AccessToken>(token.clone())
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!("Token '{}' not found during deletion process.", token),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }
}
