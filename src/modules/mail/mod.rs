// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::LazyLock;

use crate::modules::blacklist::{BlacklistClient, BLACKLIST};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailError;
use crate::raise_error;

pub mod attachment;
pub mod entity;
pub mod listing;
pub mod payload;
pub mod search;
pub mod send;
pub mod spam;
pub mod star;
pub mod store;
pub mod trash;
pub mod view;
#[cfg(test)]
mod tests;

pub static MAILBOX: LazyLock<Mailbox> = LazyLock::new(|| Mailbox::new(BLACKLIST.clone()));

/// Folder transitions and read models over the per-user views.
///
/// Every operation that writes more than one record does so inside a single
/// store transaction.
pub struct Mailbox {
    blacklist: BlacklistClient,
}

impl Mailbox {
    pub fn new(blacklist: BlacklistClient) -> Self {
        Self { blacklist }
    }

    pub fn blacklist(&self) -> &BlacklistClient {
        &self.blacklist
    }
}

pub(crate) fn mail_not_found(mail_id: u64) -> WebmailError {
    raise_error!(
        format!("Mail {} not found in your mailbox.", mail_id),
        ErrorCode::ResourceNotFound
    )
}
