use native_db::transaction::RwTransaction;
use tracing::info;

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{db_error, transaction_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::mail::attachment::remove_stored;
use crate::modules::mail::entity::Attachment;
use crate::modules::mail::store::{detach_mail_from_labels, insert_view_if_absent, MailStore};
use crate::modules::mail::view::{preferred_view, Folder, MailStatus, MailUserView, ViewState};
use crate::modules::mail::{mail_not_found, Mailbox};
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use crate::{raise_error, utc_now};

fn not_in_trash(mail_id: u64) -> crate::modules::error::WebmailError {
    raise_error!(
        format!("Mail {} is not in your trash.", mail_id),
        ErrorCode::ResourceNotFound
    )
}

/// Status a restored view gets when only its folder was recorded.
fn status_for_folder(folder: Folder) -> MailStatus {
    match folder {
        Folder::Draft => MailStatus::Draft,
        Folder::Spam => MailStatus::Spam,
        _ => MailStatus::Sent,
    }
}

/// What a trash view should restore to.
fn states_to_restore(trash: &MailUserView, from: &str, to: &str) -> Vec<ViewState> {
    if !trash.original_states.is_empty() {
        // star and read may have changed while the mail sat in trash
        return trash
            .original_states
            .iter()
            .map(|state| ViewState {
                read: state.read || trash.read,
                starred: trash.starred,
                ..*state
            })
            .collect();
    }
    if !trash.original_folders.is_empty() {
        return trash
            .original_folders
            .iter()
            .map(|folder| ViewState {
                folder: *folder,
                status: status_for_folder(*folder),
                read: trash.read,
                starred: trash.starred,
            })
            .collect();
    }
    // nothing recorded: fall back to the user's role on the mail
    let mut states = Vec::new();
    if trash.username == from {
        states.push(ViewState {
            folder: Folder::Sent,
            status: MailStatus::Sent,
            read: true,
            starred: trash.starred,
        });
    }
    if trash.username == to {
        states.push(ViewState {
            folder: Folder::Inbox,
            status: MailStatus::Sent,
            read: trash.read,
            starred: trash.starred,
        });
    }
    states
}

/// Removes a trash view, detaching the mail from the owner's labels and
/// deleting the mail once nobody references it. Returns the attachments of a
/// deleted mail so their files can be removed after commit.
fn discard_trash_view(
    rw: &RwTransaction,
    trash: MailUserView,
) -> WebmailResult<Option<Vec<Attachment>>> {
    let mail_id = trash.mail_id;
    let username = trash.username.clone();
    rw.remove(trash).map_err(db_error)?;

    let Some(mail) = rw.mail(mail_id)? else {
        return Ok(None);
    };
    let detached = detach_mail_from_labels(rw, rw.labels_of_user(&username)?, mail_id)?;

    if rw.views_of_mail(mail_id)?.is_empty() {
        for label_id in mail.label_ids.iter() {
            if detached.contains(label_id) {
                continue;
            }
            if let Some(label) = rw.label(*label_id)? {
                detach_mail_from_labels(rw, vec![label], mail_id)?;
            }
        }
        let attachments = mail.attachments.clone();
        rw.remove(mail).map_err(db_error)?;
        return Ok(Some(attachments));
    }

    if !detached.is_empty() {
        let mut updated = mail.clone();
        updated.label_ids.retain(|id| !detached.contains(id));
        rw.update(mail, updated).map_err(db_error)?;
    }
    Ok(None)
}

impl Mailbox {
    /// Replaces all of the user's views of a mail with a single trash view.
    pub async fn move_to_trash(&self, username: &str, mail_id: u64) -> WebmailResult<()> {
        let username = username.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let mail = rw.mail(mail_id)?.ok_or_else(|| mail_not_found(mail_id))?;
            if !mail.is_participant(&username) {
                return Err(raise_error!(
                    "Access denied: you must be the sender or recipient.".into(),
                    ErrorCode::Forbidden
                ));
            }

            let (trashed, active): (Vec<MailUserView>, Vec<MailUserView>) = rw
                .views_of_mail_for(&username, mail_id)?
                .into_iter()
                .partition(|view| view.folder == Folder::Trash);
            let Some(shown) = preferred_view(&active).cloned() else {
                return Err(mail_not_found(mail_id));
            };

            let mut states: Vec<ViewState> = Vec::new();
            for previous in &trashed {
                states.extend(states_to_restore(previous, &mail.from, &mail.to));
            }
            states.extend(active.iter().map(MailUserView::state));
            let mut original_folders: Vec<Folder> = Vec::new();
            for state in &states {
                if !original_folders.contains(&state.folder) {
                    original_folders.push(state.folder);
                }
            }

            let mut trash =
                MailUserView::new(&username, mail_id, Folder::Trash, shown.status, shown.read);
            trash.starred = states.iter().any(|state| state.starred);
            trash.original_folders = original_folders;
            trash.original_states = states;
            trash.deleted_at = Some(utc_now!());

            for view in trashed.into_iter().chain(active) {
                rw.remove(view).map_err(db_error)?;
            }
            rw.insert(trash).map_err(db_error)?;
            Ok(())
        })
        .await
    }

    /// Puts a trashed mail back into every folder it occupied before.
    pub async fn restore(&self, username: &str, mail_id: u64) -> WebmailResult<usize> {
        let username = username.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let trash = rw
                .view_in_folder(&username, mail_id, Folder::Trash)?
                .ok_or_else(|| not_in_trash(mail_id))?;
            let mail = rw.mail(mail_id)?.ok_or_else(|| mail_not_found(mail_id))?;

            let states = states_to_restore(&trash, &mail.from, &mail.to);
            rw.remove(trash).map_err(db_error)?;
            let mut restored = 0;
            for state in &states {
                if insert_view_if_absent(rw, MailUserView::from_state(&username, mail_id, state))?
                {
                    restored += 1;
                }
            }
            Ok(restored)
        })
        .await
    }

    /// Deletes the user's trash view of a mail for good.
    pub async fn permanently_delete(&self, username: &str, mail_id: u64) -> WebmailResult<()> {
        let owner = username.to_string();
        let removed = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let trash = rw
                .view_in_folder(&owner, mail_id, Folder::Trash)?
                .ok_or_else(|| not_in_trash(mail_id))?;
            discard_trash_view(rw, trash)
        })
        .await?;

        if let Some(attachments) = removed {
            info!("Mail {} has no remaining views and was deleted", mail_id);
            remove_stored(&DATA_DIR_MANAGER, &attachments).await;
        }
        Ok(())
    }

    /// Permanently deletes everything in the user's trash and returns how many mails went.
    pub async fn empty_trash(&self, username: &str) -> WebmailResult<u64> {
        let owner = username.to_string();
        let (count, attachments) = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let trashed = rw.views_in_folder(&owner, Folder::Trash)?;
            let count = trashed.len() as u64;
            let mut attachments = Vec::new();
            for trash in trashed {
                if let Some(removed) = discard_trash_view(rw, trash)? {
                    attachments.extend(removed);
                }
            }
            Ok((count, attachments))
        })
        .await?;

        remove_stored(&DATA_DIR_MANAGER, &attachments).await;
        info!("Emptied trash of '{}': {} mail(s)", username, count);
        Ok(count)
    }
}
