use itertools::Itertools;
use native_db::transaction::{RTransaction, RwTransaction};

use crate::modules::database::db_error;
use crate::modules::error::WebmailResult;
use crate::modules::label::entity::{Label, LabelKey};
use crate::modules::mail::entity::Mail;
use crate::modules::mail::view::{Folder, MailUserView, MailUserViewKey};
use crate::modules::user::User;
use crate::modules::utils::owner_mail_hash;
use crate::calculate_hash;

/// Lookups shared by read-only and read-write transactions.
pub trait MailStore {
    fn mail(&self, id: u64) -> WebmailResult<Option<Mail>>;
    fn user(&self, username: &str) -> WebmailResult<Option<User>>;
    fn label(&self, id: u64) -> WebmailResult<Option<Label>>;
    /// Every view the user holds, in any folder.
    fn views_of_user(&self, username: &str) -> WebmailResult<Vec<MailUserView>>;
    /// The user's views of one mail.
    fn views_of_mail_for(&self, username: &str, mail_id: u64) -> WebmailResult<Vec<MailUserView>>;
    /// Every user's views of one mail.
    fn views_of_mail(&self, mail_id: u64) -> WebmailResult<Vec<MailUserView>>;
    fn labels_of_user(&self, username: &str) -> WebmailResult<Vec<Label>>;

    fn views_in_folder(&self, username: &str, folder: Folder) -> WebmailResult<Vec<MailUserView>> {
        Ok(self
            .views_of_user(username)?
            .into_iter()
            .filter(|view| view.folder == folder)
            .collect())
    }

    fn view_in_folder(
        &self,
        username: &str,
        mail_id: u64,
        folder: Folder,
    ) -> WebmailResult<Option<MailUserView>> {
        Ok(self
            .views_of_mail_for(username, mail_id)?
            .into_iter()
            .find(|view| view.folder == folder))
    }
}

macro_rules! impl_mail_store {
    ($($txn:ty),*) => {
        $(
            impl MailStore for $txn {
                fn mail(&self, id: u64) -> WebmailResult<Option<Mail>> {
                    self.get().primary::<Mail>(id).map_err(db_error)
                }

                fn user(&self, username: &str) -> WebmailResult<Option<User>> {
                    self.get().primary::<User>(username.to_string()).map_err(db_error)
                }

                fn label(&self, id: u64) -> WebmailResult<Option<Label>> {
                    self.get().primary::<Label>(id).map_err(db_error)
                }

                fn views_of_user(&self, username: &str) -> WebmailResult<Vec<MailUserView>> {
                    let views: Vec<MailUserView> = self
                        .scan()
                        .secondary::<MailUserView>(MailUserViewKey::owner_key)
                        .map_err(db_error)?
                        .start_with(calculate_hash!(username))
                        .map_err(db_error)?
                        .try_collect()
                        .map_err(db_error)?;
                    // the key is a hash, so confirm the owner
                    Ok(views.into_iter().filter(|view| view.username == username).collect())
                }

                fn views_of_mail_for(
                    &self,
                    username: &str,
                    mail_id: u64,
                ) -> WebmailResult<Vec<MailUserView>> {
                    let views: Vec<MailUserView> = self
                        .scan()
                        .secondary::<MailUserView>(MailUserViewKey::owner_mail_key)
                        .map_err(db_error)?
                        .start_with(owner_mail_hash(username, mail_id))
                        .map_err(db_error)?
                        .try_collect()
                        .map_err(db_error)?;
                    Ok(views
                        .into_iter()
                        .filter(|view| view.username == username && view.mail_id == mail_id)
                        .collect())
                }

                fn views_of_mail(&self, mail_id: u64) -> WebmailResult<Vec<MailUserView>> {
                    self.scan()
                        .secondary::<MailUserView>(MailUserViewKey::mail_id)
                        .map_err(db_error)?
                        .start_with(mail_id)
                        .map_err(db_error)?
                        .try_collect()
                        .map_err(db_error)
                }

                fn labels_of_user(&self, username: &str) -> WebmailResult<Vec<Label>> {
                    let labels: Vec<Label> = self
                        .scan()
                        .secondary::<Label>(LabelKey::owner_key)
                        .map_err(db_error)?
                        .start_with(calculate_hash!(username))
                        .map_err(db_error)?
                        .try_collect()
                        .map_err(db_error)?;
                    Ok(labels.into_iter().filter(|label| label.username == username).collect())
                }
            }
        )*
    };
}

impl_mail_store!(RTransaction<'_>, RwTransaction<'_>);

/// Deletes views inside an open transaction.
pub fn remove_views(rw: &RwTransaction, views: Vec<MailUserView>) -> WebmailResult<()> {
    for view in views {
        rw.remove(view).map_err(db_error)?;
    }
    Ok(())
}

/// Inserts a view unless the user already has one for that mail in that folder.
pub fn insert_view_if_absent(rw: &RwTransaction, view: MailUserView) -> WebmailResult<bool> {
    if rw
        .view_in_folder(&view.username, view.mail_id, view.folder)?
        .is_some()
    {
        return Ok(false);
    }
    rw.insert(view).map_err(db_error)?;
    Ok(true)
}

/// Drops `mail_id` from the given labels and returns the ids of the labels that held it.
///
/// The caller keeps the mail's `label_ids` mirror in step.
pub fn detach_mail_from_labels(
    rw: &RwTransaction,
    labels: Vec<Label>,
    mail_id: u64,
) -> WebmailResult<Vec<u64>> {
    let mut detached = Vec::new();
    for label in labels {
        if !label.mail_ids.contains(&mail_id) {
            continue;
        }
        let mut updated = label.clone();
        updated.mail_ids.remove(&mail_id);
        detached.push(label.id);
        rw.update(label, updated).map_err(db_error)?;
    }
    Ok(detached)
}
