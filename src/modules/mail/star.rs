use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{db_error, read_impl, transaction_impl};
use crate::modules::error::WebmailResult;
use crate::modules::mail::store::MailStore;
use crate::modules::mail::view::preferred_view;
use crate::modules::mail::{mail_not_found, Mailbox};

impl Mailbox {
    /// Flips the starred flag on every view the user has of the mail and returns the new state.
    pub async fn toggle_star(&self, username: &str, mail_id: u64) -> WebmailResult<bool> {
        let owner = username.to_string();
        transaction_impl(DB_MANAGER.mail_db(), move |rw| {
            let views = rw.views_of_mail_for(&owner, mail_id)?;
            let starred = !preferred_view(&views)
                .ok_or_else(|| mail_not_found(mail_id))?
                .starred;
            for view in views {
                if view.starred == starred {
                    continue;
                }
                let mut updated = view.clone();
                updated.starred = starred;
                rw.update(view, updated).map_err(db_error)?;
            }
            Ok(starred)
        })
        .await
    }

    pub async fn is_starred(&self, username: &str, mail_id: u64) -> WebmailResult<bool> {
        let owner = username.to_string();
        read_impl(DB_MANAGER.mail_db(), move |r| {
            let views = r.views_of_mail_for(&owner, mail_id)?;
            if views.is_empty() {
                return Err(mail_not_found(mail_id));
            }
            Ok(views.iter().any(|view| view.starred))
        })
        .await
    }
}
