// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

use crate::modules::utils::owner_mail_hash;
use crate::{calculate_hash, id, utc_now};

#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, Enum,
)]
#[serde(rename_all = "lowercase")]
#[oai(rename_all = "lowercase")]
pub enum Folder {
    Inbox,
    Sent,
    Draft,
    Spam,
    Trash,
}

/// Order in which a user's views of one mail are considered when only one can be shown.
pub const FOLDER_PRIORITY: [Folder; 5] = [
    Folder::Inbox,
    Folder::Sent,
    Folder::Draft,
    Folder::Spam,
    Folder::Trash,
];

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Inbox => "inbox",
            Folder::Sent => "sent",
            Folder::Draft => "draft",
            Folder::Spam => "spam",
            Folder::Trash => "trash",
        }
    }

    pub fn priority(&self) -> usize {
        FOLDER_PRIORITY
            .iter()
            .position(|folder| folder == self)
            .unwrap_or(FOLDER_PRIORITY.len())
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
#[oai(rename_all = "lowercase")]
pub enum MailStatus {
    Draft,
    Sent,
    Spam,
}

/// Snapshot of a view taken when it is moved to trash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewState {
    pub folder: Folder,
    pub status: MailStatus,
    pub read: bool,
    pub starred: bool,
}

/// One user's placement of one mail.
///
/// A user holds at most one view per mail per folder; the unique `placement`
/// key enforces it in the store.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[native_model(id = 4, version = 1)]
#[native_db(
    primary_key(pk -> u64),
    secondary_key(owner_key -> u64),
    secondary_key(owner_mail_key -> u64),
    secondary_key(placement -> String, unique)
)]
pub struct MailUserView {
    pub id: u64,
    pub username: String,
    #[secondary_key]
    pub mail_id: u64,
    pub folder: Folder,
    pub status: MailStatus,
    pub read: bool,
    pub starred: bool,
    /// Folders the mail occupied before trashing. Only set while in trash.
    pub original_folders: Vec<Folder>,
    /// Full state of every replaced view, restored together with the folders.
    pub original_states: Vec<ViewState>,
    /// When the mail was trashed.
    pub deleted_at: Option<i64>,
    pub created_at: i64,
}

pub fn placement_key(username: &str, mail_id: u64, folder: Folder) -> String {
    format!("{}:{}:{}", username, mail_id, folder.as_str())
}

impl MailUserView {
    pub fn new(username: &str, mail_id: u64, folder: Folder, status: MailStatus, read: bool) -> Self {
        Self {
            id: id!(64),
            username: username.to_string(),
            mail_id,
            folder,
            status,
            read,
            starred: false,
            original_folders: Vec::new(),
            original_states: Vec::new(),
            deleted_at: None,
            created_at: utc_now!(),
        }
    }

    pub fn from_state(username: &str, mail_id: u64, state: &ViewState) -> Self {
        let mut view = Self::new(username, mail_id, state.folder, state.status, state.read);
        view.starred = state.starred;
        view
    }

    pub fn pk(&self) -> u64 {
        self.id
    }

    pub fn owner_key(&self) -> u64 {
        calculate_hash!(&self.username)
    }

    pub fn owner_mail_key(&self) -> u64 {
        owner_mail_hash(&self.username, self.mail_id)
    }

    pub fn placement(&self) -> String {
        placement_key(&self.username, self.mail_id, self.folder)
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            folder: self.folder,
            status: self.status,
            read: self.read,
            starred: self.starred,
        }
    }
}

/// The view shown when a user has several views of the same mail.
pub fn preferred_view(views: &[MailUserView]) -> Option<&MailUserView> {
    views.iter().min_by_key(|view| view.folder.priority())
}
