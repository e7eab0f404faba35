use std::collections::BTreeSet;

use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::calculate_hash;

pub const DEFAULT_COLOR: &str = "gray";

pub const ALLOWED_COLORS: [&str; 20] = [
    "gray", "red", "orange", "yellow", "green", "blue", "indigo", "purple", "pink", "#f28b82",
    "#fbbc04", "#fff475", "#ccff90", "#a7ffeb", "#cbf0f8", "#aecbfa", "#d7aefb", "#fdcfe8",
    "#e6c9a8", "#e8eaed",
];

pub fn is_allowed_color(color: &str) -> bool {
    ALLOWED_COLORS.contains(&color)
}

/// Per-owner key under which label names must be unique, ignoring case.
pub fn label_name_key(username: &str, name: &str) -> String {
    format!("{}:{}", username, name.trim().to_lowercase())
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
#[native_model(id = 5, version = 1)]
#[native_db(
    primary_key(pk -> u64),
    secondary_key(owner_key -> u64),
    secondary_key(name_key -> String, unique)
)]
pub struct Label {
    pub id: u64,
    /// Owner of the label.
    pub username: String,
    pub name: String,
    pub color: String,
    /// Parent label of the same owner; `None` for a top-level label.
    pub parent_id: Option<u64>,
    pub mail_ids: BTreeSet<u64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Label {
    pub fn pk(&self) -> u64 {
        self.id
    }

    pub fn owner_key(&self) -> u64 {
        calculate_hash!(&self.username)
    }

    pub fn name_key(&self) -> String {
        label_name_key(&self.username, &self.name)
    }
}
