use crate::modules::context::Initialize;
use crate::modules::database::META_MODELS;
use crate::modules::error::{code::ErrorCode, WebmailError, WebmailResult};
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use crate::raise_error;
use native_db::{Builder, Database};
use std::sync::{Arc, LazyLock};
use tracing::info;

pub static DB_MANAGER: LazyLock<DatabaseManager> = LazyLock::new(DatabaseManager::new);

pub struct DatabaseManager {
    /// Users, tokens, mails, per-user views and labels
    mail_db: Arc<Database<'static>>,
}

impl DatabaseManager {
    fn new() -> Self {
        let mail_db = Self::init_mail_database().expect("Failed to initialize mail database");
        DatabaseManager { mail_db }
    }

    pub fn mail_db(&self) -> &Arc<Database<'static>> {
        &self.mail_db
    }

    fn init_mail_database() -> WebmailResult<Arc<Database<'static>>> {
        if SETTINGS.webmail_metadata_memory_mode_enabled {
            let database = Builder::new()
                .create_in_memory(&META_MODELS)
                .map_err(Self::handle_database_error)?;
            return Ok(Arc::new(database));
        }
        let mut database = Builder::new()
            .set_cache_size(
                SETTINGS
                    .webmail_metadata_cache_size
                    .unwrap_or(134217728)
                    .max(67108864),
            ) //default 128MB
            .create(&META_MODELS, DATA_DIR_MANAGER.mail_db.clone())
            .map_err(Self::handle_database_error)?;
        database
            .compact()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(Arc::new(database))
    }

    fn handle_database_error(error: native_db::db_type::Error) -> WebmailError {
        match error {
            native_db::db_type::Error::RedbDatabaseError(database_error) => match database_error {
                redb::DatabaseError::DatabaseAlreadyOpen => {
                    raise_error!(
                        "Database is already open by another instance".into(),
                        ErrorCode::InternalError
                    )
                }
                other => {
                    raise_error!(
                        format!("Database error: {:?}", other),
                        ErrorCode::InternalError
                    )
                }
            },
            other => {
                raise_error!(
                    format!("Failed to create database: {:?}", other),
                    ErrorCode::InternalError
                )
            }
        }
    }
}

impl Initialize for DatabaseManager {
    async fn initialize() -> WebmailResult<()> {
        if SETTINGS.webmail_metadata_memory_mode_enabled {
            info!("Mail database running in memory mode, data will not survive a restart");
        } else {
            info!("Opening mail database at {:?}", DATA_DIR_MANAGER.mail_db);
        }
        // open (and compact) the database eagerly so start-up fails fast
        tokio::task::spawn_blocking(|| LazyLock::force(&DB_MANAGER).mail_db().clone())
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(())
    }
}
