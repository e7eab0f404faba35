use crate::modules::logger::{validate_log_level, LocalTimer};
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

pub static LOG_WORKER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn setup_file_logger() -> Result<(), tracing::dispatcher::SetGlobalDefaultError> {
    let level = validate_log_level(&SETTINGS.webmail_log_level);

    let (server_nonb, server_guard) = server_log_writer();
    // dropping the guard would stop the background writer
    let _ = LOG_WORKER_GUARD.set(server_guard);

    let registry = tracing_subscriber::registry().with(LevelFilter::from_level(level));

    if SETTINGS.webmail_json_logs {
        let server_layer = fmt::layer()
            .json()
            .with_timer(LocalTimer)
            .with_writer(server_nonb)
            .with_target(true);
        return tracing::subscriber::set_global_default(registry.with(server_layer));
    }

    // ANSI escapes make no sense in files
    let server_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_level(true)
        .with_writer(server_nonb)
        .with_target(true);

    tracing::subscriber::set_global_default(registry.with(server_layer))
}

fn server_log_writer() -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("webmail")
        .filename_suffix("log")
        .max_log_files(SETTINGS.webmail_max_server_log_files)
        .build(DATA_DIR_MANAGER.log_dir.clone());
    match appender {
        Ok(rolling) => tracing_appender::non_blocking(rolling),
        Err(e) => {
            eprintln!(
                "Failed to initialize rolling file appender in {:?}: {}",
                DATA_DIR_MANAGER.log_dir, e
            );
            std::process::exit(1);
        }
    }
}
