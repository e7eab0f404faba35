use tracing::info;

use crate::modules::blacklist::urls::extract_urls_from;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{db_error, transaction_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::mail::entity::Mail;
use crate::modules::mail::store::{insert_view_if_absent, remove_views, MailStore};
use crate::modules::mail::view::{preferred_view, Folder, MailStatus, MailUserView, ViewState};
use crate::modules::mail::{mail_not_found, Mailbox};
use crate::raise_error;

fn mail_urls(mail: &Mail) -> Vec<String> {
    extract_urls_from(&[
        mail.to.as_str(),
        mail.subject.as_str(),
        mail.body_preview.as_str(),
    ])
}

/// Views an unspammed mail returns to, by the user's role on it.
fn unspam_states(username: &str, mail: &Mail, spam: &MailUserView) -> Vec<ViewState> {
    let inbox = ViewState {
        folder: Folder::Inbox,
        status: MailStatus::Sent,
        read: spam.read,
        starred: spam.starred,
    };
    let sent = ViewState {
        folder: Folder::Sent,
        status: MailStatus::Sent,
        read: true,
        starred: spam.starred,
    };
    if mail.is_self_sent() {
        vec![inbox, sent]
    } else if mail.to == username {
        vec![inbox]
    } else if mail.from == username {
        vec![sent]
    } else {
        Vec::new()
    }
}

impl Mailbox {
    /// Moves the user's inbox/sent views of a mail into spam and blacklists its URLs.
    pub async fn mark_spam(&self, username: &str, mail_id: u64) -> WebmailResult<()> {
        let owner = username.to_string();
        let mail = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let views = rw.views_of_mail_for(&owner, mail_id)?;
            if views.is_empty() {
                return Err(mail_not_found(mail_id));
            }
            let (targets, others): (Vec<MailUserView>, Vec<MailUserView>) = views
                .into_iter()
                .partition(|view| matches!(view.folder, Folder::Inbox | Folder::Sent));
            if targets.is_empty() {
                if others.iter().all(|view| view.folder == Folder::Draft) {
                    return Err(raise_error!(
                        "Drafts cannot be reported as spam.".into(),
                        ErrorCode::InvalidParameter
                    ));
                }
                return Err(raise_error!(
                    format!("Mail {} is not in your inbox or sent folder.", mail_id),
                    ErrorCode::ResourceNotFound
                ));
            }
            let mail = rw.mail(mail_id)?.ok_or_else(|| mail_not_found(mail_id))?;

            let already_spam = others.iter().any(|view| view.folder == Folder::Spam);
            let shown = preferred_view(&targets).cloned();
            let starred = targets.iter().any(|view| view.starred);
            remove_views(rw, targets)?;
            if !already_spam {
                if let Some(shown) = shown {
                    let mut spam =
                        MailUserView::new(&owner, mail_id, Folder::Spam, MailStatus::Spam, shown.read);
                    spam.starred = starred;
                    rw.insert(spam).map_err(db_error)?;
                }
            }
            Ok(mail)
        })
        .await?;

        let urls = mail_urls(&mail);
        if !urls.is_empty() {
            info!("Reporting {} URL(s) of mail {} as spam", urls.len(), mail_id);
            self.blacklist().register_all(&urls).await;
        }
        Ok(())
    }

    /// Moves a mail out of the user's spam folder and un-blacklists its URLs.
    ///
    /// A self-sent mail comes back as both its inbox and sent views.
    pub async fn unmark_spam(&self, username: &str, mail_id: u64) -> WebmailResult<()> {
        let owner = username.to_string();
        let mail = transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let spam = rw
                .view_in_folder(&owner, mail_id, Folder::Spam)?
                .ok_or_else(|| {
                    raise_error!(
                        format!("Mail {} is not in your spam folder.", mail_id),
                        ErrorCode::ResourceNotFound
                    )
                })?;
            let mail = rw.mail(mail_id)?.ok_or_else(|| mail_not_found(mail_id))?;

            let states = unspam_states(&owner, &mail, &spam);
            rw.remove(spam).map_err(db_error)?;
            for state in &states {
                insert_view_if_absent(rw, MailUserView::from_state(&owner, mail_id, state))?;
            }
            Ok(mail)
        })
        .await?;

        let urls = mail_urls(&mail);
        if !urls.is_empty() {
            self.blacklist().unregister_all(&urls).await;
        }
        Ok(())
    }
}
