// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use native_db::transaction::RwTransaction;
use poem_openapi::types::MaybeUndefined;
use tracing::info;

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{db_error, read_impl, transaction_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{WebmailError, WebmailResult};
use crate::modules::label::entity::{label_name_key, Label, DEFAULT_COLOR};
use crate::modules::label::payload::{
    validate_color, validate_name, CreateLabelRequest, LabelDetail, LabelNode,
    UpdateLabelRequest,
};
use crate::modules::label::tree::LabelIndex;
use crate::modules::mail::listing::{dedupe_by_mail, join_views};
use crate::modules::mail::mail_not_found;
use crate::modules::mail::store::MailStore;
use crate::{id, raise_error, utc_now};

pub mod entity;
pub mod payload;
pub mod tree;

fn label_not_found(label_id: u64) -> WebmailError {
    raise_error!(
        format!("Label {} not found.", label_id),
        ErrorCode::ResourceNotFound
    )
}

fn duplicate_name(name: &str) -> WebmailError {
    raise_error!(
        format!("A label named '{}' already exists.", name),
        ErrorCode::DuplicateName
    )
}

/// The unique name index reports a clash as `AlreadyExists`.
fn name_clash(name: &str) -> impl FnOnce(WebmailError) -> WebmailError + '_ {
    move |error| match error.code() {
        ErrorCode::AlreadyExists => duplicate_name(name),
        _ => error,
    }
}

fn owned_label<S: MailStore>(store: &S, username: &str, label_id: u64) -> WebmailResult<Label> {
    store
        .label(label_id)?
        .filter(|label| label.username == username)
        .ok_or_else(|| label_not_found(label_id))
}

fn ensure_unique_name(
    labels: &[Label],
    username: &str,
    name: &str,
    exclude: Option<u64>,
) -> WebmailResult<()> {
    let key = label_name_key(username, name);
    if labels
        .iter()
        .any(|label| Some(label.id) != exclude && label.name_key() == key)
    {
        return Err(duplicate_name(name));
    }
    Ok(())
}

fn parent_missing(parent_id: u64) -> WebmailError {
    raise_error!(
        format!("Parent label with ID {} not found.", parent_id),
        ErrorCode::InvalidParameter
    )
}

/// Keeps `Mail::label_ids` in step with a label's membership.
fn mirror_membership(
    rw: &RwTransaction,
    mail_id: u64,
    label_id: u64,
    member: bool,
) -> WebmailResult<()> {
    let Some(mail) = rw.mail(mail_id)? else {
        return Ok(());
    };
    if mail.label_ids.contains(&label_id) == member {
        return Ok(());
    }
    let mut updated = mail.clone();
    if member {
        updated.label_ids.insert(label_id);
    } else {
        updated.label_ids.remove(&label_id);
    }
    rw.update(mail, updated).map_err(db_error)
}

impl Label {
    /// The user's labels ordered by name.
    pub async fn list(username: &str) -> WebmailResult<Vec<Label>> {
        let owner = username.to_string();
        let mut labels =
            read_impl(DB_MANAGER.mail_db(), move |r| r.labels_of_user(&owner)).await?;
        labels.sort_by_key(|label| label.name.to_lowercase());
        Ok(labels)
    }

    pub async fn tree(username: &str) -> WebmailResult<Vec<LabelNode>> {
        let labels = Self::list(username).await?;
        Ok(LabelIndex::new(&labels).build_tree())
    }

    pub async fn get(username: &str, label_id: u64) -> WebmailResult<Label> {
        let owner = username.to_string();
        read_impl(DB_MANAGER.mail_db(), move |r| owned_label(r, &owner, label_id)).await
    }

    pub async fn create(username: &str, request: CreateLabelRequest) -> WebmailResult<Label> {
        let name = validate_name(&request.name)?;
        let color = request.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
        validate_color(&color)?;

        let owner = username.to_string();
        let label = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            if let Some(parent_id) = request.parent_id {
                owned_label(rw, &owner, parent_id).map_err(|_| parent_missing(parent_id))?;
            }
            ensure_unique_name(&rw.labels_of_user(&owner)?, &owner, &name, None)?;

            let now = utc_now!();
            let label = Label {
                id: id!(64),
                username: owner,
                name,
                color,
                parent_id: request.parent_id,
                mail_ids: Default::default(),
                created_at: now,
                updated_at: now,
            };
            rw.insert(label.clone())
                .map_err(db_error)
                .map_err(name_clash(&label.name))?;
            Ok(label)
        })
        .await?;
        info!("Label {} '{}' created by '{}'", label.id, label.name, label.username);
        Ok(label)
    }

    /// Renames, recolors or re-parents a label.
    pub async fn update(
        username: &str,
        label_id: u64,
        request: UpdateLabelRequest,
    ) -> WebmailResult<Label> {
        if request.is_empty() {
            return Err(raise_error!(
                "Missing or invalid request body.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        let name = request.name.as_deref().map(validate_name).transpose()?;
        if let Some(color) = &request.color {
            validate_color(color)?;
        }

        let owner = username.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let labels = rw.labels_of_user(&owner)?;
            let current = labels
                .iter()
                .find(|label| label.id == label_id)
                .cloned()
                .ok_or_else(|| label_not_found(label_id))?;
            let mut updated = current.clone();

            if let Some(name) = name {
                ensure_unique_name(&labels, &owner, &name, Some(label_id))?;
                updated.name = name;
            }
            if let Some(color) = request.color {
                updated.color = color;
            }
            match request.parent_id {
                MaybeUndefined::Undefined => {}
                MaybeUndefined::Null => updated.parent_id = None,
                MaybeUndefined::Value(parent_id) => {
                    if parent_id == label_id {
                        return Err(raise_error!(
                            "A label cannot be its own parent.".into(),
                            ErrorCode::CircularReference
                        ));
                    }
                    let index = LabelIndex::new(&labels);
                    if index.get(parent_id).is_none() {
                        return Err(parent_missing(parent_id));
                    }
                    if index.is_ancestor_or_self(label_id, parent_id) {
                        return Err(raise_error!(
                            "Cannot create circular reference: the selected parent is a child of this label.".into(),
                            ErrorCode::CircularReference
                        ));
                    }
                    updated.parent_id = Some(parent_id);
                }
            }

            if updated == current {
                return Ok(current);
            }
            updated.updated_at = utc_now!();
            let name = updated.name.clone();
            rw.update(current, updated.clone())
                .map_err(db_error)
                .map_err(name_clash(&name))?;
            Ok(updated)
        })
        .await
    }

    /// Deletes a label and all of its descendants, returning how many labels were removed.
    pub async fn delete(username: &str, label_id: u64) -> WebmailResult<usize> {
        let owner = username.to_string();
        let removed = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let labels = rw.labels_of_user(&owner)?;
            let index = LabelIndex::new(&labels);
            if index.get(label_id).is_none() {
                return Err(label_not_found(label_id));
            }
            let doomed = index.subtree_deepest_first(label_id);
            for id in &doomed {
                let Some(label) = index.get(*id).cloned() else {
                    continue;
                };
                for mail_id in &label.mail_ids {
                    mirror_membership(rw, *mail_id, label.id, false)?;
                }
                rw.remove(label).map_err(db_error)?;
            }
            Ok(doomed.len())
        })
        .await?;
        info!("Deleted label {} of '{}' ({} label(s) in total)", label_id, username, removed);
        Ok(removed)
    }

    /// Puts a mail the user can see under a label. Returns `false` if it was already there.
    pub async fn add_mail(username: &str, label_id: u64, mail_id: u64) -> WebmailResult<bool> {
        let owner = username.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let label = owned_label(rw, &owner, label_id)?;
            if rw.views_of_mail_for(&owner, mail_id)?.is_empty() || rw.mail(mail_id)?.is_none() {
                return Err(mail_not_found(mail_id));
            }
            if label.mail_ids.contains(&mail_id) {
                return Ok(false);
            }
            let mut updated = label.clone();
            updated.mail_ids.insert(mail_id);
            updated.updated_at = utc_now!();
            rw.update(label, updated).map_err(db_error)?;
            mirror_membership(rw, mail_id, label_id, true)?;
            Ok(true)
        })
        .await
    }

    /// Takes a mail off a label. Returns `false` if it was not there.
    pub async fn remove_mail(username: &str, label_id: u64, mail_id: u64) -> WebmailResult<bool> {
        let owner = username.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let label = owned_label(rw, &owner, label_id)?;
            if !label.mail_ids.contains(&mail_id) {
                return Ok(false);
            }
            let mut updated = label.clone();
            updated.mail_ids.remove(&mail_id);
            updated.updated_at = utc_now!();
            rw.update(label, updated).map_err(db_error)?;
            mirror_membership(rw, mail_id, label_id, false)?;
            Ok(true)
        })
        .await
    }

    /// The label with its mails, each seen through the caller's own views.
    pub async fn with_mails(username: &str, label_id: u64) -> WebmailResult<LabelDetail> {
        let owner = username.to_string();
        read_impl(DB_MANAGER.mail_db(), move |r| {
            let label = owned_label(r, &owner, label_id)?;
            let mut views = Vec::new();
            for mail_id in &label.mail_ids {
                views.extend(r.views_of_mail_for(&owner, *mail_id)?);
            }
            let mails = join_views(r, dedupe_by_mail(views))?;
            Ok(LabelDetail { label, mails })
        })
        .await
    }
}
