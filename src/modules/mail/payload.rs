use chrono::{DateTime, Local};
use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, Object};
use serde::{Deserialize, Serialize};

use crate::modules::common::paginated::Paginated;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::mail::entity::{Attachment, Mail};
use crate::modules::mail::view::{Folder, MailStatus, MailUserView};
use crate::raise_error;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComposeRequest {
    /// Recipient address; a bare local part gets the served domain appended.
    pub to: String,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    /// `sent` delivers immediately, `draft` (the default) keeps it editable.
    pub status: Option<MailStatus>,
}

impl ComposeRequest {
    pub fn status(&self) -> WebmailResult<MailStatus> {
        match self.status.unwrap_or(MailStatus::Draft) {
            MailStatus::Spam => Err(raise_error!(
                "Status must be \"sent\" or \"draft\".".into(),
                ErrorCode::InvalidParameter
            )),
            status => Ok(status),
        }
    }
}

/// Multipart form variant of [`ComposeRequest`] carrying file attachments.
#[derive(Debug, Multipart)]
pub struct ComposeForm {
    pub to: String,
    pub subject: Option<String>,
    #[oai(rename = "bodyPreview")]
    pub body_preview: Option<String>,
    pub status: Option<String>,
    pub attachments: Vec<Upload>,
}

impl ComposeForm {
    /// Splits the form into the compose fields and the uploaded files.
    pub fn into_parts(self) -> WebmailResult<(ComposeRequest, Vec<Upload>)> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some("draft") => Some(MailStatus::Draft),
            Some("sent") => Some(MailStatus::Sent),
            Some(other) => {
                return Err(raise_error!(
                    format!("Status must be \"sent\" or \"draft\", got '{}'.", other),
                    ErrorCode::InvalidParameter
                ))
            }
        };
        Ok((
            ComposeRequest {
                to: self.to,
                subject: self.subject,
                body_preview: self.body_preview,
                status,
            },
            self.attachments,
        ))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    /// Setting `sent` delivers the draft.
    pub status: Option<MailStatus>,
}

impl UpdateMailRequest {
    pub fn is_empty(&self) -> bool {
        self.to.is_none()
            && self.subject.is_none()
            && self.body_preview.is_none()
            && self.status.is_none()
    }
}

/// A mail as seen by one user: shared content joined with that user's view.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct MailItem {
    pub id: u64,
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body_preview: String,
    pub timestamp: i64,
    /// `dd/mm/yyyy`, server local time.
    pub date: String,
    /// `HH:MM`, server local time.
    pub time: String,
    pub attachments: Vec<Attachment>,
    pub label_ids: Vec<u64>,
    pub folder: Folder,
    pub status: MailStatus,
    pub read: bool,
    pub starred: bool,
    /// When the mail was moved to trash, for trashed mail only.
    pub deleted_at: Option<i64>,
}

impl MailItem {
    pub fn new(mail: &Mail, view: &MailUserView) -> Self {
        let (date, time) = format_timestamp(mail.timestamp);
        Self {
            id: mail.id,
            from: mail.from.clone(),
            from_name: mail.from_name.clone(),
            to: mail.to.clone(),
            to_name: mail.to_name.clone(),
            subject: mail.subject.clone(),
            body_preview: mail.body_preview.clone(),
            timestamp: mail.timestamp,
            date,
            time,
            attachments: mail.attachments.clone(),
            label_ids: mail.label_ids.iter().copied().collect(),
            folder: view.folder,
            status: view.status,
            read: view.read,
            starred: view.starred,
            deleted_at: view.deleted_at,
        }
    }
}

pub fn format_timestamp(timestamp: i64) -> (String, String) {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(utc) => {
            let local = utc.with_timezone(&Local);
            (
                local.format("%d/%m/%Y").to_string(),
                local.format("%H:%M").to_string(),
            )
        }
        None => (String::new(), String::new()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
pub struct MailPage {
    /// Zero-based page index.
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub mails: Vec<MailItem>,
}

impl From<Paginated<MailItem>> for MailPage {
    fn from(paginated: Paginated<MailItem>) -> Self {
        MailPage {
            page: paginated.page,
            limit: paginated.limit,
            total: paginated.total,
            mails: paginated.items,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Object)]
pub struct SearchParams {
    pub q: Option<String>,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub content: Option<String>,
}

impl SearchParams {
    pub fn is_advanced(&self) -> bool {
        [&self.subject, &self.from, &self.to, &self.content]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct SearchResults {
    pub results: Vec<MailItem>,
    pub count: u64,
    pub search_params: SearchParams,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
pub struct StarState {
    pub starred: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
pub struct EmptyTrashResult {
    /// Number of trashed mails removed.
    pub deleted: u64,
}
