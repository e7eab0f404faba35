use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::read_impl;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::mail::entity::Mail;
use crate::modules::mail::listing::{dedupe_by_mail, join_views};
use crate::modules::mail::payload::{MailItem, SearchParams, SearchResults};
use crate::modules::mail::store::MailStore;
use crate::modules::mail::view::{Folder, MailUserView};
use crate::modules::mail::Mailbox;
use crate::raise_error;

const QUICK_SEARCH_FOLDERS: [Folder; 3] = [Folder::Inbox, Folder::Sent, Folder::Draft];
const ADVANCED_SEARCH_FOLDERS: [Folder; 4] =
    [Folder::Inbox, Folder::Sent, Folder::Draft, Folder::Spam];

fn lower(value: &str) -> String {
    value.to_lowercase()
}

/// Every whitespace separated term must occur somewhere in the mail's text fields.
pub fn matches_query(mail: &Mail, query: &str) -> bool {
    let haystack = [
        mail.to.as_str(),
        mail.from.as_str(),
        mail.from_name.as_str(),
        mail.subject.as_str(),
        mail.body_preview.as_str(),
    ]
    .iter()
    .map(|field| lower(field))
    .collect::<Vec<_>>()
    .join(" ");
    let query = lower(query);
    let mut terms = query.split_whitespace().peekable();
    terms.peek().is_some() && terms.all(|term| haystack.contains(term))
}

/// The phrase as a whole, or all of its terms.
fn phrase_or_all(haystack: &str, phrase: &str) -> bool {
    let phrase = lower(phrase.trim());
    let haystack = lower(haystack);
    haystack.contains(&phrase) || phrase.split_whitespace().all(|term| haystack.contains(term))
}

/// The phrase as a whole, or any of its terms, in any of the fields.
fn phrase_or_any(fields: &[&str], phrase: &str) -> bool {
    let phrase = lower(phrase.trim());
    fields.iter().map(|field| lower(field)).any(|field| {
        field.contains(&phrase) || phrase.split_whitespace().any(|term| field.contains(term))
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Per-field matching; every supplied field must match.
pub fn matches_fields(mail: &Mail, params: &SearchParams) -> bool {
    if let Some(subject) = non_blank(&params.subject) {
        if !phrase_or_all(&mail.subject, subject) {
            return false;
        }
    }
    if let Some(from) = non_blank(&params.from) {
        if !phrase_or_any(&[mail.from.as_str(), mail.from_name.as_str()], from) {
            return false;
        }
    }
    if let Some(to) = non_blank(&params.to) {
        if !phrase_or_any(&[mail.to.as_str()], to) {
            return false;
        }
    }
    if let Some(content) = non_blank(&params.content) {
        if !phrase_or_all(&mail.body_preview, content) {
            return false;
        }
    }
    true
}

fn filter_views<S: MailStore>(
    store: &S,
    username: &str,
    folders: &[Folder],
    predicate: impl Fn(&Mail) -> bool,
) -> WebmailResult<Vec<MailItem>> {
    let mut matched: Vec<MailUserView> = Vec::new();
    for view in store.views_of_user(username)? {
        if !folders.contains(&view.folder) {
            continue;
        }
        if let Some(mail) = store.mail(view.mail_id)? {
            if predicate(&mail) {
                matched.push(view);
            }
        }
    }
    join_views(store, dedupe_by_mail(matched))
}

impl Mailbox {
    /// Quick search over inbox, sent and drafts.
    pub async fn search(&self, username: &str, query: &str) -> WebmailResult<Vec<MailItem>> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Err(raise_error!(
                "Search query must not be empty.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        let owner = username.to_string();
        read_impl(DB_MANAGER.mail_db(), move |r| {
            filter_views(r, &owner, &QUICK_SEARCH_FOLDERS, |mail| {
                matches_query(mail, &query)
            })
        })
        .await
    }

    /// Field search over inbox, sent, drafts and spam.
    pub async fn advanced_search(
        &self,
        username: &str,
        params: SearchParams,
    ) -> WebmailResult<Vec<MailItem>> {
        if !params.is_advanced() {
            return Err(raise_error!(
                "At least one of subject, from, to or content is required.".into(),
                ErrorCode::InvalidParameter
            ));
        }
        let owner = username.to_string();
        read_impl(DB_MANAGER.mail_db(), move |r| {
            filter_views(r, &owner, &ADVANCED_SEARCH_FOLDERS, |mail| {
                matches_fields(mail, &params)
            })
        })
        .await
    }

    /// `q` runs the quick search; otherwise the field search runs.
    pub async fn find(&self, username: &str, params: SearchParams) -> WebmailResult<SearchResults> {
        let results = match non_blank(&params.q) {
            Some(query) => self.search(username, query).await?,
            None if params.is_advanced() => self.advanced_search(username, params.clone()).await?,
            None => {
                return Err(raise_error!(
                    "Provide q or at least one of subject, from, to, content.".into(),
                    ErrorCode::InvalidParameter
                ))
            }
        };
        Ok(SearchResults {
            count: results.len() as u64,
            results,
            search_params: params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mail {
        Mail::new(
            "dana@doar.com".into(),
            "Dana Levi".into(),
            "omer@doar.com".into(),
            "Omer Cohen".into(),
            Some("Quarterly budget review".into()),
            Some("Please bring the spreadsheet to Sunday's meeting".into()),
            vec![],
        )
    }

    #[test]
    fn quick_search_requires_every_term() {
        let mail = sample();
        assert!(matches_query(&mail, "budget SPREADSHEET"));
        assert!(matches_query(&mail, "dana omer"));
        assert!(!matches_query(&mail, "budget invoice"));
        assert!(!matches_query(&mail, "   "));
    }

    #[test]
    fn subject_matches_all_terms_in_any_order() {
        let mail = sample();
        let params = SearchParams {
            subject: Some("review budget".into()),
            ..Default::default()
        };
        assert!(matches_fields(&mail, &params));
        let params = SearchParams {
            subject: Some("review invoice".into()),
            ..Default::default()
        };
        assert!(!matches_fields(&mail, &params));
    }

    #[test]
    fn sender_matches_any_term_in_address_or_name() {
        let mail = sample();
        let params = SearchParams {
            from: Some("levi unknown".into()),
            ..Default::default()
        };
        assert!(matches_fields(&mail, &params));
        let params = SearchParams {
            from: Some("omer".into()),
            ..Default::default()
        };
        assert!(!matches_fields(&mail, &params));
    }

    #[test]
    fn every_supplied_field_must_match() {
        let mail = sample();
        let params = SearchParams {
            to: Some("omer".into()),
            content: Some("meeting".into()),
            ..Default::default()
        };
        assert!(matches_fields(&mail, &params));
        let params = SearchParams {
            to: Some("omer".into()),
            content: Some("lunch".into()),
            ..Default::default()
        };
        assert!(!matches_fields(&mail, &params));
    }
}
