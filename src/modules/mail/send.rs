// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::info;

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{db_error, read_impl, transaction_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::mail::attachment::remove_stored;
use crate::modules::mail::entity::{normalize_subject, Attachment, Mail};
use crate::modules::mail::payload::{ComposeRequest, MailItem, UpdateMailRequest};
use crate::modules::mail::store::MailStore;
use crate::modules::mail::view::{preferred_view, Folder, MailStatus, MailUserView};
use crate::modules::mail::{mail_not_found, Mailbox};
use crate::modules::metrics::WEBMAIL_MAIL_DELIVERY_TOTAL;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use crate::modules::user::{normalize_address, validate_local_address, User};
use crate::{raise_error, utc_now};

/// Folder and status of the recipient's view of a delivered mail.
fn recipient_placement(is_spam: bool) -> (Folder, MailStatus) {
    if is_spam {
        (Folder::Spam, MailStatus::Spam)
    } else {
        (Folder::Inbox, MailStatus::Sent)
    }
}

/// Resolves a recipient field to an existing local user.
async fn resolve_recipient(to: &str) -> WebmailResult<User> {
    let to = to.trim();
    if to.is_empty() {
        return Err(raise_error!(
            "Recipient email required.".into(),
            ErrorCode::InvalidParameter
        ));
    }
    let address = normalize_address(to);
    validate_local_address(&address)?;
    User::find(&address).await?.ok_or_else(|| {
        raise_error!(
            format!("Recipient '{}' does not exist.", address),
            ErrorCode::InvalidParameter
        )
    })
}

impl Mailbox {
    /// Creates a mail as a draft or sends it right away.
    ///
    /// Attachments already written to disk are removed again when the mail
    /// cannot be created.
    pub async fn compose(
        &self,
        sender: &str,
        request: ComposeRequest,
        attachments: Vec<Attachment>,
    ) -> WebmailResult<MailItem> {
        let stored = attachments.clone();
        let result = self.deliver(sender, request, attachments).await;
        if result.is_err() && !stored.is_empty() {
            remove_stored(&DATA_DIR_MANAGER, &stored).await;
        }
        result
    }

    async fn deliver(
        &self,
        sender: &str,
        request: ComposeRequest,
        attachments: Vec<Attachment>,
    ) -> WebmailResult<MailItem> {
        let status = request.status()?;
        let recipient = resolve_recipient(&request.to).await?;
        let sender = User::get(sender).await?;

        let mail = Mail::new(
            sender.username.clone(),
            sender.display_name(),
            recipient.username.clone(),
            recipient.display_name(),
            request.subject,
            request.body_preview,
            attachments,
        );

        let is_spam = status == MailStatus::Sent
            && self
                .blacklist()
                .has_blacklisted_urls(&[
                    mail.to.as_str(),
                    mail.subject.as_str(),
                    mail.body_preview.as_str(),
                ])
                .await?;

        let sender_folder = match status {
            MailStatus::Sent => Folder::Sent,
            _ => Folder::Draft,
        };
        let sender_view = MailUserView::new(
            &mail.from,
            mail.id,
            sender_folder,
            status,
            status == MailStatus::Sent,
        );
        let recipient_view = (status == MailStatus::Sent).then(|| {
            let (folder, status) = recipient_placement(is_spam);
            MailUserView::new(&mail.to, mail.id, folder, status, false)
        });

        let item = MailItem::new(&mail, &sender_view);
        let delivered_to = recipient_view.as_ref().map(|view| view.folder);
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            rw.insert(mail).map_err(db_error)?;
            rw.insert(sender_view).map_err(db_error)?;
            if let Some(view) = recipient_view {
                rw.insert(view).map_err(db_error)?;
            }
            Ok(())
        })
        .await?;

        if let Some(folder) = delivered_to {
            WEBMAIL_MAIL_DELIVERY_TOTAL
                .with_label_values(&[folder.as_str()])
                .inc();
            info!(
                "Mail {} sent from '{}' to '{}' ({})",
                item.id,
                item.from,
                item.to,
                folder.as_str()
            );
        }
        Ok(item)
    }

    /// Returns the mail joined with the caller's preferred view, marking it read for the recipient.
    pub async fn get(&self, username: &str, mail_id: u64) -> WebmailResult<MailItem> {
        let username = username.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let views = rw.views_of_mail_for(&username, mail_id)?;
            let view = preferred_view(&views)
                .cloned()
                .ok_or_else(|| mail_not_found(mail_id))?;
            let mail = rw.mail(mail_id)?.ok_or_else(|| mail_not_found(mail_id))?;

            if !view.read && mail.to == username {
                let mut updated = view.clone();
                updated.read = true;
                rw.update(view, updated.clone()).map_err(db_error)?;
                return Ok(MailItem::new(&mail, &updated));
            }
            Ok(MailItem::new(&mail, &view))
        })
        .await
    }

    /// Edits a draft, and delivers it when `status` becomes `sent`.
    pub async fn update_draft(
        &self,
        username: &str,
        mail_id: u64,
        request: UpdateMailRequest,
    ) -> WebmailResult<MailItem> {
        if request.is_empty() {
            return Err(raise_error!(
                "Missing request body.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        if request.status == Some(MailStatus::Spam) {
            return Err(raise_error!(
                "Status must be \"sent\" or \"draft\".".into(),
                ErrorCode::InvalidParameter
            ));
        }
        let recipient = match &request.to {
            Some(to) => Some(resolve_recipient(to).await?),
            None => None,
        };

        let owner = username.to_string();
        let current = read_impl(DB_MANAGER.mail_db(), move |r| {
            let views = r.views_of_mail_for(&owner, mail_id)?;
            if views.is_empty() {
                return Err(mail_not_found(mail_id));
            }
            let mail = r.mail(mail_id)?.ok_or_else(|| mail_not_found(mail_id))?;
            ensure_editable_draft(&owner, &mail, &views)?;
            Ok(mail)
        })
        .await?;

        let mut edited = current.clone();
        if let Some(subject) = &request.subject {
            edited.subject = normalize_subject(Some(subject));
        }
        if let Some(body) = &request.body_preview {
            edited.body_preview = body.clone();
        }
        if let Some(recipient) = &recipient {
            edited.to = recipient.username.clone();
            edited.to_name = recipient.display_name();
        }

        let sending = request.status == Some(MailStatus::Sent);
        let is_spam = sending
            && self
                .blacklist()
                .has_blacklisted_urls(&[
                    edited.to.as_str(),
                    edited.subject.as_str(),
                    edited.body_preview.as_str(),
                ])
                .await?;

        let owner = username.to_string();
        let (item, delivered_to) = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let stored = rw.mail(mail_id)?.ok_or_else(|| mail_not_found(mail_id))?;
            let views = rw.views_of_mail_for(&owner, mail_id)?;
            let draft = ensure_editable_draft(&owner, &stored, &views)?.clone();

            let mut mail = stored.clone();
            mail.subject = edited.subject;
            mail.body_preview = edited.body_preview;
            mail.to = edited.to;
            mail.to_name = edited.to_name;

            if !sending {
                rw.update(stored, mail.clone()).map_err(db_error)?;
                return Ok((MailItem::new(&mail, &draft), None));
            }

            mail.timestamp = utc_now!();
            rw.update(stored, mail.clone()).map_err(db_error)?;

            let mut sent_view =
                MailUserView::new(&owner, mail_id, Folder::Sent, MailStatus::Sent, true);
            sent_view.starred = draft.starred;
            rw.remove(draft).map_err(db_error)?;
            rw.insert(sent_view.clone()).map_err(db_error)?;

            let (folder, status) = recipient_placement(is_spam);
            let self_sent = mail.to == owner;
            let existing = rw
                .views_of_mail_for(&mail.to, mail_id)?
                .into_iter()
                // on a self-send the sender's own sent view is not the recipient copy
                .find(|view| !(self_sent && view.folder == Folder::Sent));
            match existing {
                Some(view) => {
                    let mut updated = view.clone();
                    updated.folder = folder;
                    updated.status = status;
                    updated.read = false;
                    rw.update(view, updated).map_err(db_error)?;
                }
                None => {
                    rw.insert(MailUserView::new(&mail.to, mail_id, folder, status, false))
                        .map_err(db_error)?;
                }
            }
            Ok((MailItem::new(&mail, &sent_view), Some(folder)))
        })
        .await?;

        if let Some(folder) = delivered_to {
            WEBMAIL_MAIL_DELIVERY_TOTAL
                .with_label_values(&[folder.as_str()])
                .inc();
            info!(
                "Draft {} sent from '{}' to '{}' ({})",
                item.id,
                item.from,
                item.to,
                folder.as_str()
            );
        }
        Ok(item)
    }
}

/// Only the sender may edit, and only while the mail sits in their drafts.
fn ensure_editable_draft<'a>(
    username: &str,
    mail: &Mail,
    views: &'a [MailUserView],
) -> WebmailResult<&'a MailUserView> {
    if mail.from != username {
        return Err(raise_error!(
            "Access denied: you must be the sender to edit this mail.".into(),
            ErrorCode::Forbidden
        ));
    }
    views
        .iter()
        .find(|view| view.folder == Folder::Draft)
        .ok_or_else(|| {
            raise_error!(
                "Only draft mails can be edited.".into(),
                ErrorCode::Forbidden
            )
        })
}
