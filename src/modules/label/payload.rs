use poem_openapi::types::MaybeUndefined;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::label::entity::{is_allowed_color, Label, ALLOWED_COLORS};
use crate::modules::mail::payload::MailItem;
use crate::raise_error;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateLabelRequest {
    #[oai(validator(max_length = "128"))]
    pub name: String,
    /// One of the allowed swatches; `gray` when omitted.
    pub color: Option<String>,
    pub parent_id: Option<u64>,
}

/// Partial label edit. An explicit `"parentId": null` moves the label to the top level.
#[derive(Clone, Debug, Default, Object)]
#[oai(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateLabelRequest {
    #[oai(validator(max_length = "128"))]
    pub name: Option<String>,
    pub color: Option<String>,
    pub parent_id: MaybeUndefined<u64>,
}

impl UpdateLabelRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.parent_id.is_undefined()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase", deny_unknown_fields)]
pub struct LabelMailRequest {
    pub mail_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
pub struct LabelMembership {
    /// `false` when the mail already carried the label.
    pub added: bool,
}

/// A label together with the mails it holds, each joined with the caller's view.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
pub struct LabelDetail {
    pub label: Label,
    pub mails: Vec<MailItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct LabelNode {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub parent_id: Option<u64>,
    pub mail_count: u64,
    pub children: Vec<LabelNode>,
}

impl From<&Label> for LabelNode {
    fn from(label: &Label) -> Self {
        LabelNode {
            id: label.id,
            name: label.name.clone(),
            color: label.color.clone(),
            parent_id: label.parent_id,
            mail_count: label.mail_ids.len() as u64,
            children: Vec::new(),
        }
    }
}

pub fn validate_name(name: &str) -> WebmailResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(raise_error!(
            "Label name is required.".into(),
            ErrorCode::InvalidParameter
        ));
    }
    Ok(name.to_string())
}

pub fn validate_color(color: &str) -> WebmailResult<()> {
    if is_allowed_color(color) {
        return Ok(());
    }
    Err(raise_error!(
        format!(
            "Invalid color: '{}'. Allowed colors are: {}",
            color,
            ALLOWED_COLORS.join(", ")
        ),
        ErrorCode::InvalidParameter
    ))
}
