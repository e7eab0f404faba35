// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::modules::blacklist::protocol::{send_command, Command, Reply};
use crate::modules::blacklist::urls::extract_urls_from;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::metrics::{
    ADD, CHECK, FAILURE, REMOVE, SUCCESS, WEBMAIL_BLACKLIST_COMMANDS_TOTAL,
};
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;

pub mod protocol;
pub mod urls;
#[cfg(test)]
mod tests;

pub static BLACKLIST: LazyLock<BlacklistClient> = LazyLock::new(BlacklistClient::from_settings);

/// URL blacklist used to route mail into spam.
#[derive(Clone, Debug)]
pub enum BlacklistClient {
    /// External line-protocol service, one connection per command.
    Remote { addr: String, timeout: Duration },
    /// In-process set, used when no service address is configured.
    Local(Arc<RwLock<HashSet<String>>>),
}

impl BlacklistClient {
    pub fn from_settings() -> Self {
        match &SETTINGS.webmail_blacklist_addr {
            Some(addr) => Self::remote(
                addr,
                Duration::from_secs(SETTINGS.webmail_blacklist_timeout_secs),
            ),
            None => Self::local(),
        }
    }

    pub fn remote(addr: &str, timeout: Duration) -> Self {
        Self::Remote {
            addr: addr.to_string(),
            timeout,
        }
    }

    pub fn local() -> Self {
        Self::Local(Arc::new(RwLock::new(HashSet::new())))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote { addr, .. } => format!("remote service at {}", addr),
            Self::Local(_) => "in-process set".into(),
        }
    }

    pub async fn is_blacklisted(&self, url: &str) -> WebmailResult<bool> {
        match self {
            Self::Remote { addr, timeout } => {
                let reply = Self::exchange(addr, *timeout, Command::Get, url, CHECK).await?;
                match reply.status {
                    200 => Ok(reply.body.as_deref() == Some("true true")),
                    400 | 404 => Ok(false),
                    other => Err(unexpected_status(Command::Get, other)),
                }
            }
            Self::Local(set) => Ok(set.read().await.contains(url)),
        }
    }

    pub async fn add(&self, url: &str) -> WebmailResult<()> {
        match self {
            Self::Remote { addr, timeout } => {
                let reply = Self::exchange(addr, *timeout, Command::Post, url, ADD).await?;
                match reply.status {
                    200 | 201 => Ok(()),
                    other => Err(unexpected_status(Command::Post, other)),
                }
            }
            Self::Local(set) => {
                set.write().await.insert(url.to_string());
                Ok(())
            }
        }
    }

    /// Returns whether the URL was present.
    pub async fn remove(&self, url: &str) -> WebmailResult<bool> {
        match self {
            Self::Remote { addr, timeout } => {
                let reply = Self::exchange(addr, *timeout, Command::Delete, url, REMOVE).await?;
                match reply.status {
                    200 | 204 => Ok(true),
                    404 => Ok(false),
                    other => Err(unexpected_status(Command::Delete, other)),
                }
            }
            Self::Local(set) => Ok(set.write().await.remove(url)),
        }
    }

    /// True when any URL found in `texts` is blacklisted. Lookup failures propagate.
    pub async fn has_blacklisted_urls(&self, texts: &[&str]) -> WebmailResult<bool> {
        for url in extract_urls_from(texts) {
            if self.is_blacklisted(&url).await? {
                debug!("Blacklisted URL found: {}", url);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Blacklists every URL concurrently; failures are logged and skipped.
    pub async fn register_all(&self, urls: &[String]) {
        let results = join_all(urls.iter().map(|url| self.add(url))).await;
        for (url, result) in urls.iter().zip(results) {
            if let Err(e) = result {
                warn!("Failed to blacklist URL '{}': {:?}", url, e);
            }
        }
    }

    pub async fn unregister_all(&self, urls: &[String]) {
        let results = join_all(urls.iter().map(|url| self.remove(url))).await;
        for (url, result) in urls.iter().zip(results) {
            if let Err(e) = result {
                warn!("Failed to remove URL '{}' from blacklist: {:?}", url, e);
            }
        }
    }

    async fn exchange(
        addr: &str,
        timeout: Duration,
        command: Command,
        url: &str,
        metric: &str,
    ) -> WebmailResult<Reply> {
        let result = send_command(addr, timeout, command, url).await;
        let outcome = if result.is_ok() { SUCCESS } else { FAILURE };
        WEBMAIL_BLACKLIST_COMMANDS_TOTAL
            .with_label_values(&[metric, outcome])
            .inc();
        result
    }
}

fn unexpected_status(command: Command, status: u16) -> crate::modules::error::WebmailError {
    raise_error!(
        format!("Unexpected blacklist reply {} to {}", status, command),
        ErrorCode::BlacklistProtocolError
    )
}
