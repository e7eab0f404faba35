use crate::modules::context::Initialize;
use crate::modules::settings::cli::SETTINGS;
use crate::{
    modules::error::{code::ErrorCode, WebmailResult},
    raise_error,
};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

pub const MAIL_DB_FILE: &str = "mail.db";
const LOG_DIR: &str = "logs";
const UPLOADS_DIR: &str = "uploads";

pub static DATA_DIR_MANAGER: LazyLock<DataDirManager> =
    LazyLock::new(|| DataDirManager::new(PathBuf::from(&SETTINGS.webmail_root_dir)));

#[derive(Debug)]
pub struct DataDirManager {
    pub root_dir: PathBuf,
    pub mail_db: PathBuf,
    pub log_dir: PathBuf,
    pub uploads_dir: PathBuf,
}

impl Initialize for DataDirManager {
    async fn initialize() -> WebmailResult<()> {
        DATA_DIR_MANAGER.ensure_dirs()?;
        info!("Data directory: {:?}", DATA_DIR_MANAGER.root_dir);
        Ok(())
    }
}

impl DataDirManager {
    pub fn new(root_dir: PathBuf) -> Self {
        Self {
            mail_db: root_dir.join(MAIL_DB_FILE),
            log_dir: root_dir.join(LOG_DIR),
            uploads_dir: root_dir.join(UPLOADS_DIR),
            root_dir,
        }
    }

    pub fn ensure_dirs(&self) -> WebmailResult<()> {
        for dir in [&self.root_dir, &self.log_dir, &self.uploads_dir] {
            std::fs::create_dir_all(dir)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        }
        Ok(())
    }

    /// Resolves a stored attachment key inside the uploads directory.
    ///
    /// Keys containing path separators or parent components are rejected.
    pub fn upload_path(&self, key: &str) -> Option<PathBuf> {
        let candidate = Path::new(key);
        let mut components = candidate.components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(name)), None) => Some(self.uploads_dir.join(name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_is_derived_from_root() {
        let temp_dir = tempdir().unwrap();
        let manager = DataDirManager::new(temp_dir.path().to_path_buf());
        assert!(manager.mail_db.ends_with("mail.db"));
        assert!(manager.log_dir.ends_with("logs"));
        assert!(manager.uploads_dir.ends_with("uploads"));
        assert!(manager.mail_db.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_ensure_dirs_creates_missing_directories() {
        let temp_dir = tempdir().unwrap();
        let manager = DataDirManager::new(temp_dir.path().join("nested").join("data"));
        manager.ensure_dirs().unwrap();
        assert!(manager.log_dir.is_dir());
        assert!(manager.uploads_dir.is_dir());
        // idempotent
        manager.ensure_dirs().unwrap();
    }

    #[test]
    fn test_upload_path_rejects_traversal() {
        let temp_dir = tempdir().unwrap();
        let manager = DataDirManager::new(temp_dir.path().to_path_buf());
        assert_eq!(
            manager.upload_path("abc-report.pdf"),
            Some(manager.uploads_dir.join("abc-report.pdf"))
        );
        assert!(manager.upload_path("../mail.db").is_none());
        assert!(manager.upload_path("a/b").is_none());
        assert!(manager.upload_path("").is_none());
    }
}
