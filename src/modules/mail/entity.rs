// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::{id, utc_now};

pub const NO_SUBJECT: &str = "(no subject)";

/// Shared mail content. One record per mail, whoever can see it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct Mail {
    #[primary_key]
    pub id: u64,
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body_preview: String,
    /// Send time, or creation time while still a draft. Milliseconds since epoch.
    pub timestamp: i64,
    pub attachments: Vec<Attachment>,
    /// Labels (of any user) currently holding this mail.
    pub label_ids: BTreeSet<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Object)]
pub struct Attachment {
    /// Original file name as uploaded.
    pub name: String,
    pub mimetype: String,
    /// Size in bytes.
    pub size: u64,
    /// Where the stored file can be fetched, e.g. `/uploads/<key>`.
    pub url: String,
}

impl Mail {
    pub fn new(
        from: String,
        from_name: String,
        to: String,
        to_name: String,
        subject: Option<String>,
        body_preview: Option<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id: id!(64),
            from,
            from_name,
            to,
            to_name,
            subject: normalize_subject(subject.as_deref()),
            body_preview: body_preview.unwrap_or_default(),
            timestamp: utc_now!(),
            attachments,
            label_ids: BTreeSet::new(),
        }
    }

    pub fn is_participant(&self, username: &str) -> bool {
        self.from == username || self.to == username
    }

    pub fn is_self_sent(&self) -> bool {
        self.from == self.to
    }
}

/// Blank subjects are stored as `(no subject)`.
pub fn normalize_subject(subject: Option<&str>) -> String {
    match subject.map(str::trim) {
        Some(subject) if !subject.is_empty() => subject.to_string(),
        _ => NO_SUBJECT.to_string(),
    }
}
