use mimalloc::MiMalloc;
use modules::{
    blacklist::BLACKLIST,
    context::{Initialize, ServerContext},
    database::manager::DatabaseManager,
    error::WebmailResult,
    logger,
    metrics::MetricsService,
    rest::start_http_server,
    settings::{cli::SETTINGS, dir::DataDirManager},
};
use tracing::{error, info};

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> WebmailResult<()> {
    logger::initialize_logging();
    info!("Starting webmail-server");
    info!("Version:  {}", webmail_version!());
    info!("Git:      [{}]", env!("GIT_HASH"));

    if let Err(error) = initialize().await {
        eprintln!("{:?}", error);
        return Err(error);
    }

    if let Err(e) = start_http_server().await {
        error!("Failed to start REST server: {}", e);
        return Err(e);
    }
    info!("Webmail server stopped");
    Ok(())
}

/// Prepares process wide state before the first request is accepted.
async fn initialize() -> WebmailResult<()> {
    ServerContext::initialize().await?;
    DataDirManager::initialize().await?;
    MetricsService::initialize().await?;
    DatabaseManager::initialize().await?;
    info!(
        "Serving mail domain '{}', URL checks via {}",
        SETTINGS.webmail_mail_domain,
        BLACKLIST.describe()
    );
    Ok(())
}
