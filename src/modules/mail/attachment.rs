use std::path::Path;

use poem_openapi::types::multipart::Upload;
use tracing::warn;

use crate::generate_token;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::mail::entity::Attachment;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::dir::{DataDirManager, DATA_DIR_MANAGER};
use crate::raise_error;

const UPLOADS_URL_PREFIX: &str = "/uploads/";

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "attachment".into()
    } else {
        cleaned
    }
}

fn check_size(name: &str, size: u64, max_size: u64) -> WebmailResult<()> {
    if size > max_size {
        return Err(raise_error!(
            format!(
                "Attachment '{}' is {} bytes, the limit is {} bytes.",
                name, size, max_size
            ),
            ErrorCode::PayloadTooLarge
        ));
    }
    Ok(())
}

/// Writes one attachment under `dir` with a generated, collision-free name.
pub async fn store_bytes(
    dir: &Path,
    name: &str,
    content_type: Option<&str>,
    bytes: Vec<u8>,
    max_size: u64,
) -> WebmailResult<Attachment> {
    let size = bytes.len() as u64;
    check_size(name, size, max_size)?;

    let key = format!("{}-{}", generate_token!(96), sanitize_file_name(name));
    let mimetype = content_type
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| mime_guess::from_path(name).first_or_octet_stream().to_string());

    tokio::fs::write(dir.join(&key), &bytes)
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

    Ok(Attachment {
        name: name.to_string(),
        mimetype,
        size,
        url: format!("{}{}", UPLOADS_URL_PREFIX, key),
    })
}

pub async fn store_uploads(uploads: Vec<Upload>) -> WebmailResult<Vec<Attachment>> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let name = upload.file_name().unwrap_or("attachment").to_string();
        let content_type = upload.content_type().map(str::to_string);
        // reject before buffering the body
        if let Err(e) = check_size(
            &name,
            upload.size() as u64,
            SETTINGS.webmail_max_attachment_size,
        ) {
            remove_stored(&DATA_DIR_MANAGER, &stored).await;
            return Err(e);
        }
        let bytes = upload
            .into_vec()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InvalidParameter))?;
        match store_bytes(
            &DATA_DIR_MANAGER.uploads_dir,
            &name,
            content_type.as_deref(),
            bytes,
            SETTINGS.webmail_max_attachment_size,
        )
        .await
        {
            Ok(attachment) => stored.push(attachment),
            Err(e) => {
                // nothing references the files written so far
                remove_stored(&DATA_DIR_MANAGER, &stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

/// Best-effort removal of stored attachment files; failures are only logged.
pub async fn remove_stored(manager: &DataDirManager, attachments: &[Attachment]) {
    for attachment in attachments {
        let Some(key) = attachment.url.strip_prefix(UPLOADS_URL_PREFIX) else {
            continue;
        };
        let Some(path) = manager.upload_path(key) else {
            warn!("Refusing to remove attachment outside uploads: {}", key);
            continue;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove attachment file {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn stores_and_removes_files() {
        let root = tempdir().unwrap();
        let manager = DataDirManager::new(root.path().to_path_buf());
        manager.ensure_dirs().unwrap();

        let attachment = store_bytes(
            &manager.uploads_dir,
            "report final.pdf",
            None,
            b"%PDF-1.4".to_vec(),
            1024,
        )
        .await
        .unwrap();
        assert_eq!(attachment.name, "report final.pdf");
        assert_eq!(attachment.mimetype, "application/pdf");
        assert_eq!(attachment.size, 8);
        assert!(attachment.url.starts_with("/uploads/"));
        assert!(attachment.url.ends_with("report_final.pdf"));

        let key = attachment.url.trim_start_matches("/uploads/");
        let path = manager.upload_path(key).unwrap();
        assert!(path.exists());

        remove_stored(&manager, std::slice::from_ref(&attachment)).await;
        assert!(!path.exists());
        // a second removal only logs
        remove_stored(&manager, &[attachment]).await;
    }

    #[tokio::test]
    async fn oversized_files_are_rejected() {
        let root = tempdir().unwrap();
        let err = store_bytes(root.path(), "big.bin", Some("application/octet-stream"), vec![0; 16], 8)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PayloadTooLarge);
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(check_size("a.txt", 8, 8).is_ok());
        let err = check_size("a.txt", 9, 8).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PayloadTooLarge);
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("..."), "attachment");
        assert_eq!(sanitize_file_name("ok-name_1.txt"), "ok-name_1.txt");
    }
}
