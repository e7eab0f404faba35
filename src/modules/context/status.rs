use crate::modules::context::SERVER_CONTEXT;
use crate::modules::settings::cli::SETTINGS;
use chrono::Local;
use poem_openapi::Object;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;
use timeago::Formatter;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct ServerStatus {
    /// The service uptime in milliseconds since it started.
    pub uptime_ms: i64,
    /// Human readable form of the uptime (e.g., "2 hours ago").
    pub timeago: String,
    /// The timezone in which the service is operating.
    pub timezone: String,
    /// The mail domain served by this instance.
    pub domain: String,
    /// Whether URL checks go to a remote blacklist service.
    pub remote_blacklist: bool,
    pub version: String,
    pub commit: String,
}

impl ServerStatus {
    pub fn get() -> Self {
        let uptime_ms = SERVER_CONTEXT.uptime_ms().max(0);
        Self {
            uptime_ms,
            timeago: Formatter::new().convert(Duration::from_millis(uptime_ms as u64)),
            timezone: Local::now().offset().to_string(),
            domain: SETTINGS.webmail_mail_domain.clone(),
            remote_blacklist: SETTINGS.webmail_blacklist_addr.is_some(),
            version: env!("CARGO_PKG_VERSION").into(),
            commit: env!("GIT_HASH").into(),
        }
    }
}
