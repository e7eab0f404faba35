// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser};
use std::{collections::HashSet, path::PathBuf, sync::LazyLock};

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "webmail",
    about = "A webmail REST API server: users, mail delivery, per-user folders and hierarchical labels.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// webmail log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for webmail"
    )]
    pub webmail_log_level: String,

    /// webmail HTTP port (default: 3000)
    #[clap(
        long,
        default_value = "3000",
        env,
        help = "Set the HTTP port for webmail"
    )]
    pub webmail_http_port: i32,

    /// The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).
    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub webmail_bind_ip: Option<String>,

    /// CORS allowed origins (default: "*")
    #[clap(
        long,
        default_value = "http://localhost:3000, http://localhost:5173, *",
        env,
        help = "Set the allowed CORS origins (comma-separated list, e.g., \"https://example.com, https://another.com\")",
        value_parser = ValueParser::new(|s: &str| -> Result<HashSet<String>, String> {
            let set: HashSet<String> = s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
            Ok(set)
        })
    )]
    pub webmail_cors_origins: HashSet<String>,

    /// CORS max age in seconds (default: 86400)
    #[clap(
        long,
        default_value = "86400",
        env,
        help = "Set the CORS max age in seconds"
    )]
    pub webmail_cors_max_age: i32,

    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub webmail_ansi_logs: bool,

    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub webmail_log_to_file: bool,

    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable JSON formatted logs"
    )]
    pub webmail_json_logs: bool,

    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub webmail_max_server_log_files: usize,

    #[clap(
        long,
        env,
        help = "Set the data directory for webmail (database, logs and uploaded attachments)",
        value_parser = ValueParser::new(|s: &str| {
            let path = PathBuf::from(s);
            if !path.is_absolute() {
                return Err("Path must be an absolute directory path".to_string());
            }
            if !path.exists() {
                return Err(format!("Path {:?} does not exist", path));
            }
            if !path.is_dir() {
                return Err(format!("Path {:?} is not a directory", path));
            }
            Ok(s.to_string())
        })
    )]
    pub webmail_root_dir: String,

    #[clap(
        long,
        env,
        default_value = "134217728",
        help = "Set the cache size for the mail database in bytes"
    )]
    pub webmail_metadata_cache_size: Option<usize>,

    #[clap(
        long,
        env,
        default_value = "false",
        help = "Keep all data in memory only; nothing survives a restart"
    )]
    pub webmail_metadata_memory_mode_enabled: bool,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Enable compression for the open api server"
    )]
    pub webmail_http_compression_enabled: bool,

    #[clap(
        long,
        default_value = "doar.com",
        env,
        help = "The mail domain served by this instance; addresses without '@' get it appended",
        value_parser = ValueParser::new(|s: &str| {
            let domain = s.trim().trim_start_matches('@').to_lowercase();
            if domain.is_empty() || !domain.contains('.') {
                return Err(format!("Invalid mail domain: {}", s));
            }
            Ok(domain)
        })
    )]
    pub webmail_mail_domain: String,

    /// Address of the URL blacklist service, e.g. 127.0.0.1:12345.
    /// When unset an in-process blacklist is used.
    #[clap(
        long,
        env,
        help = "Set the host:port of the URL blacklist service (in-process blacklist when unset)",
        value_parser = ValueParser::new(|s: &str| {
            let trimmed = s.trim();
            match trimmed.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(trimmed.to_string()),
                _ => Err(format!("Blacklist address must look like host:port, got '{}'", s)),
            }
        })
    )]
    pub webmail_blacklist_addr: Option<String>,

    #[clap(
        long,
        env,
        default_value = "5",
        help = "Timeout in seconds for each blacklist service command",
        value_parser = clap::value_parser!(u64).range(1..=120)
    )]
    pub webmail_blacklist_timeout_secs: u64,

    #[clap(
        long,
        env,
        default_value = "24",
        help = "Lifetime of access tokens issued at login, in hours",
        value_parser = clap::value_parser!(u64).range(1..=8760)
    )]
    pub webmail_access_token_ttl_hours: u64,

    /// Accept an `id: <username>` header instead of a bearer token.
    /// Development only.
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Accept the 'id' header as the caller identity (development only)"
    )]
    pub webmail_dev_auth_bypass: bool,

    #[clap(
        long,
        env,
        default_value = "10485760",
        help = "Maximum size of a single uploaded attachment in bytes"
    )]
    pub webmail_max_attachment_size: u64,
}

impl Settings {
    #[cfg(test)]
    fn new_for_test() -> Self {
        Self {
            webmail_log_level: "info".to_string(),
            webmail_http_port: 3000,
            webmail_bind_ip: Default::default(),
            webmail_cors_origins: Default::default(),
            webmail_cors_max_age: 86400,
            webmail_ansi_logs: false,
            webmail_log_to_file: false,
            webmail_json_logs: false,
            webmail_max_server_log_files: 5,
            webmail_root_dir: std::env::temp_dir()
                .join("webmail_test_data")
                .to_string_lossy()
                .into_owned(),
            webmail_metadata_cache_size: None,
            webmail_metadata_memory_mode_enabled: true,
            webmail_http_compression_enabled: true,
            webmail_mail_domain: "doar.com".to_string(),
            webmail_blacklist_addr: None,
            webmail_blacklist_timeout_secs: 2,
            webmail_access_token_ttl_hours: 24,
            webmail_dev_auth_bypass: true,
            webmail_max_attachment_size: 1024 * 1024,
        }
    }
}
