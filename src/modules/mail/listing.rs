// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::modules::common::paginated::{paginate_vec, PAGE_SIZE};
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::read_impl;
use crate::modules::error::WebmailResult;
use crate::modules::mail::payload::{MailItem, MailPage};
use crate::modules::mail::store::MailStore;
use crate::modules::mail::view::{Folder, MailUserView};
use crate::modules::mail::Mailbox;

/// The folder-scoped read models a user can page through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FolderListing {
    Inbox,
    Sent,
    Drafts,
    Spam,
    Trash,
    /// Starred mail in any folder except trash.
    Starred,
    /// Inbox, sent and drafts merged.
    All,
}

impl FolderListing {
    pub fn folders(&self) -> &'static [Folder] {
        match self {
            FolderListing::Inbox => &[Folder::Inbox],
            FolderListing::Sent => &[Folder::Sent],
            FolderListing::Drafts => &[Folder::Draft],
            FolderListing::Spam => &[Folder::Spam],
            FolderListing::Trash => &[Folder::Trash],
            FolderListing::Starred => &[Folder::Inbox, Folder::Sent, Folder::Draft, Folder::Spam],
            FolderListing::All => &[Folder::Inbox, Folder::Sent, Folder::Draft],
        }
    }

    fn starred_only(&self) -> bool {
        matches!(self, FolderListing::Starred)
    }
}

/// Keeps one view per mail, the one with the highest folder priority.
pub fn dedupe_by_mail(views: Vec<MailUserView>) -> Vec<MailUserView> {
    let mut kept: BTreeMap<u64, MailUserView> = BTreeMap::new();
    for view in views {
        match kept.get(&view.mail_id) {
            Some(current) if current.folder.priority() <= view.folder.priority() => {}
            _ => {
                kept.insert(view.mail_id, view);
            }
        }
    }
    kept.into_values().collect()
}

/// Joins views to their mails, newest first. Views whose mail is gone are skipped.
pub fn join_views<S: MailStore>(store: &S, views: Vec<MailUserView>) -> WebmailResult<Vec<MailItem>> {
    let mut items = Vec::with_capacity(views.len());
    for view in views {
        if let Some(mail) = store.mail(view.mail_id)? {
            items.push(MailItem::new(&mail, &view));
        }
    }
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    Ok(items)
}

/// The user's views in the given folders, one per mail.
pub fn collect_views<S: MailStore>(
    store: &S,
    username: &str,
    folders: &[Folder],
) -> WebmailResult<Vec<MailUserView>> {
    let views = store
        .views_of_user(username)?
        .into_iter()
        .filter(|view| folders.contains(&view.folder))
        .collect();
    Ok(dedupe_by_mail(views))
}

impl Mailbox {
    pub async fn list(
        &self,
        username: &str,
        listing: FolderListing,
        page: u64,
    ) -> WebmailResult<MailPage> {
        let owner = username.to_string();
        let items = read_impl(DB_MANAGER.mail_db(), move |r| {
            let mut views = r
                .views_of_user(&owner)?
                .into_iter()
                .filter(|view| listing.folders().contains(&view.folder))
                .collect::<Vec<_>>();
            if listing.starred_only() {
                views.retain(|view| view.starred);
            }
            join_views(r, dedupe_by_mail(views))
        })
        .await?;
        Ok(paginate_vec(items, page, PAGE_SIZE).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::mail::view::MailStatus;

    #[test]
    fn dedupe_prefers_inbox_over_sent() {
        let views = vec![
            MailUserView::new("a@doar.com", 1, Folder::Sent, MailStatus::Sent, true),
            MailUserView::new("a@doar.com", 1, Folder::Inbox, MailStatus::Sent, false),
            MailUserView::new("a@doar.com", 2, Folder::Draft, MailStatus::Draft, true),
        ];
        let kept = dedupe_by_mail(views);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].mail_id, 1);
        assert_eq!(kept[0].folder, Folder::Inbox);
        assert_eq!(kept[1].folder, Folder::Draft);
    }

    #[test]
    fn starred_listing_excludes_trash() {
        assert!(!FolderListing::Starred.folders().contains(&Folder::Trash));
        assert!(FolderListing::Starred.folders().contains(&Folder::Spam));
        assert!(!FolderListing::All.folders().contains(&Folder::Spam));
    }
}
