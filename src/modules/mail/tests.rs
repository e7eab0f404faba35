use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::read_impl;
use crate::modules::error::code::ErrorCode;
use crate::modules::mail::listing::FolderListing;
use crate::modules::mail::payload::{ComposeRequest, SearchParams, UpdateMailRequest};
use crate::modules::mail::store::MailStore;
use crate::modules::mail::view::{Folder, MailStatus, ViewState};
use crate::modules::mail::Mailbox;
use crate::modules::utils::testing::{local_blacklist, register_test_user};

fn mailbox() -> Mailbox {
    Mailbox::new(local_blacklist())
}

fn send_request(to: &str, subject: &str, body: &str) -> ComposeRequest {
    ComposeRequest {
        to: to.into(),
        subject: Some(subject.into()),
        body_preview: Some(body.into()),
        status: Some(MailStatus::Sent),
    }
}

/// The user's views of a mail, ordered by folder.
async fn states_of(username: &str, mail_id: u64) -> Vec<ViewState> {
    let owner = username.to_string();
    let mut states: Vec<ViewState> = read_impl(DB_MANAGER.mail_db(), move |r| {
        Ok(r.views_of_mail_for(&owner, mail_id)?
            .iter()
            .map(|view| view.state())
            .collect())
    })
    .await
    .unwrap();
    states.sort_by_key(|state| state.folder);
    states
}

async fn mail_exists(mail_id: u64) -> bool {
    read_impl(DB_MANAGER.mail_db(), move |r| Ok(r.mail(mail_id)?.is_some()))
        .await
        .unwrap()
}

#[tokio::test]
async fn send_creates_sender_and_recipient_views() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;

    let item = mailbox
        .compose(&alice, send_request(&bob, "Hello", "First mail"), vec![])
        .await
        .unwrap();
    assert_eq!(item.folder, Folder::Sent);
    assert_eq!(item.to_name, "Test User");

    let sender = states_of(&alice, item.id).await;
    assert_eq!(sender.len(), 1);
    assert_eq!(sender[0].folder, Folder::Sent);
    assert!(sender[0].read);

    let recipient = states_of(&bob, item.id).await;
    assert_eq!(recipient.len(), 1);
    assert_eq!(recipient[0].folder, Folder::Inbox);
    assert_eq!(recipient[0].status, MailStatus::Sent);
    assert!(!recipient[0].read);

    let inbox = mailbox.list(&bob, FolderListing::Inbox, 0).await.unwrap();
    assert_eq!(inbox.total, 1);
    assert_eq!(inbox.mails[0].subject, "Hello");
}

#[tokio::test]
async fn compose_defaults_to_draft() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;

    let mut request = send_request(&bob, "", "later");
    request.status = None;
    let item = mailbox.compose(&alice, request, vec![]).await.unwrap();
    assert_eq!(item.folder, Folder::Draft);
    assert_eq!(item.status, MailStatus::Draft);
    assert_eq!(item.subject, "(no subject)");
    assert!(states_of(&bob, item.id).await.is_empty());
}

#[tokio::test]
async fn compose_to_unknown_recipient_is_rejected() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let err = mailbox
        .compose(&alice, send_request("nobody-here", "Hi", ""), vec![])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn self_send_shares_star_across_views() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;

    let item = mailbox
        .compose(&alice, send_request(&alice, "Note", "to self"), vec![])
        .await
        .unwrap();
    let states = states_of(&alice, item.id).await;
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].folder, Folder::Inbox);
    assert!(!states[0].read);
    assert_eq!(states[1].folder, Folder::Sent);
    assert!(states[1].read);

    assert!(mailbox.toggle_star(&alice, item.id).await.unwrap());
    assert!(states_of(&alice, item.id)
        .await
        .iter()
        .all(|state| state.starred));
    assert!(mailbox.is_starred(&alice, item.id).await.unwrap());

    let starred = mailbox.list(&alice, FolderListing::Starred, 0).await.unwrap();
    assert_eq!(starred.total, 1);
    let all = mailbox.list(&alice, FolderListing::All, 0).await.unwrap();
    assert_eq!(all.total, 1);

    assert!(!mailbox.toggle_star(&alice, item.id).await.unwrap());
    assert!(!mailbox.is_starred(&alice, item.id).await.unwrap());
}

#[tokio::test]
async fn reading_marks_recipient_view_read() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    let item = mailbox
        .compose(&alice, send_request(&bob, "Read me", ""), vec![])
        .await
        .unwrap();

    let read = mailbox.get(&bob, item.id).await.unwrap();
    assert!(read.read);
    assert_eq!(read.folder, Folder::Inbox);

    let carol = register_test_user("carol").await;
    let err = mailbox.get(&carol, item.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn trash_then_restore_keeps_visible_state() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let item = mailbox
        .compose(&alice, send_request(&alice, "Round trip", ""), vec![])
        .await
        .unwrap();
    mailbox.toggle_star(&alice, item.id).await.unwrap();
    let before = states_of(&alice, item.id).await;

    mailbox.move_to_trash(&alice, item.id).await.unwrap();
    let trashed = states_of(&alice, item.id).await;
    assert_eq!(trashed.len(), 1);
    assert_eq!(trashed[0].folder, Folder::Trash);
    let trash = mailbox.list(&alice, FolderListing::Trash, 0).await.unwrap();
    assert_eq!(trash.total, 1);
    assert!(trash.mails[0].deleted_at.is_some());

    assert_eq!(mailbox.restore(&alice, item.id).await.unwrap(), 2);
    assert_eq!(states_of(&alice, item.id).await, before);

    let err = mailbox.restore(&alice, item.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn restore_keeps_star_and_read_changed_in_trash() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    let item = mailbox
        .compose(&alice, send_request(&bob, "Keep me", ""), vec![])
        .await
        .unwrap();

    mailbox.move_to_trash(&bob, item.id).await.unwrap();
    assert!(mailbox.toggle_star(&bob, item.id).await.unwrap());
    assert!(mailbox.get(&bob, item.id).await.unwrap().read);

    assert_eq!(mailbox.restore(&bob, item.id).await.unwrap(), 1);
    assert!(mailbox.is_starred(&bob, item.id).await.unwrap());
    let restored = states_of(&bob, item.id).await;
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].folder, Folder::Inbox);
    assert!(restored[0].read);
    assert!(restored[0].starred);
}

#[tokio::test]
async fn trash_by_outsider_is_forbidden() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    let mallory = register_test_user("mallory").await;
    let item = mailbox
        .compose(&alice, send_request(&bob, "Private", ""), vec![])
        .await
        .unwrap();

    let err = mailbox.move_to_trash(&mallory, item.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
    let err = mailbox.move_to_trash(&alice, 42).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn mail_is_deleted_once_no_view_remains() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    let item = mailbox
        .compose(&alice, send_request(&bob, "Bye", ""), vec![])
        .await
        .unwrap();

    mailbox.move_to_trash(&alice, item.id).await.unwrap();
    mailbox.permanently_delete(&alice, item.id).await.unwrap();
    assert!(mail_exists(item.id).await);
    assert!(states_of(&alice, item.id).await.is_empty());

    mailbox.move_to_trash(&bob, item.id).await.unwrap();
    assert_eq!(mailbox.empty_trash(&bob).await.unwrap(), 1);
    assert!(!mail_exists(item.id).await);

    let err = mailbox.permanently_delete(&bob, item.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn blacklisted_url_routes_delivery_to_spam() {
    let mailbox = mailbox();
    mailbox
        .blacklist()
        .add("http://phish.example.com/login")
        .await
        .unwrap();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;

    let item = mailbox
        .compose(
            &alice,
            send_request(&bob, "Urgent", "verify at http://phish.example.com/login now"),
            vec![],
        )
        .await
        .unwrap();
    assert_eq!(item.folder, Folder::Sent);
    let recipient = states_of(&bob, item.id).await;
    assert_eq!(recipient[0].folder, Folder::Spam);
    assert_eq!(recipient[0].status, MailStatus::Spam);

    mailbox.unmark_spam(&bob, item.id).await.unwrap();
    let recipient = states_of(&bob, item.id).await;
    assert_eq!(recipient.len(), 1);
    assert_eq!(recipient[0].folder, Folder::Inbox);
    assert!(!mailbox
        .blacklist()
        .is_blacklisted("http://phish.example.com/login")
        .await
        .unwrap());
}

#[tokio::test]
async fn self_send_with_blacklisted_url_lands_in_sent_and_spam() {
    let mailbox = mailbox();
    mailbox.blacklist().add("bad.example.net").await.unwrap();
    let alice = register_test_user("alice").await;
    let folders_of = |states: Vec<ViewState>| -> Vec<Folder> {
        states.iter().map(|state| state.folder).collect()
    };

    let sent = mailbox
        .compose(&alice, send_request(&alice, "Note", "see bad.example.net"), vec![])
        .await
        .unwrap();
    assert_eq!(
        folders_of(states_of(&alice, sent.id).await),
        vec![Folder::Sent, Folder::Spam]
    );

    let mut request = send_request(&alice, "Later", "see bad.example.net");
    request.status = Some(MailStatus::Draft);
    let draft = mailbox.compose(&alice, request, vec![]).await.unwrap();
    mailbox
        .update_draft(
            &alice,
            draft.id,
            UpdateMailRequest {
                status: Some(MailStatus::Sent),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        folders_of(states_of(&alice, draft.id).await),
        vec![Folder::Sent, Folder::Spam]
    );
}

#[tokio::test]
async fn reporting_spam_blacklists_urls() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    let item = mailbox
        .compose(
            &alice,
            send_request(&bob, "Deals", "cheap at https://deals.example.org today"),
            vec![],
        )
        .await
        .unwrap();

    mailbox.mark_spam(&bob, item.id).await.unwrap();
    let spam = mailbox.list(&bob, FolderListing::Spam, 0).await.unwrap();
    assert_eq!(spam.total, 1);
    assert!(mailbox
        .blacklist()
        .is_blacklisted("https://deals.example.org")
        .await
        .unwrap());

    let follow_up = mailbox
        .compose(
            &alice,
            send_request(&bob, "Again", "https://deals.example.org"),
            vec![],
        )
        .await
        .unwrap();
    assert_eq!(states_of(&bob, follow_up.id).await[0].folder, Folder::Spam);
}

#[tokio::test]
async fn self_sent_spam_comes_back_to_inbox_and_sent() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let item = mailbox
        .compose(&alice, send_request(&alice, "Loop", ""), vec![])
        .await
        .unwrap();

    mailbox.mark_spam(&alice, item.id).await.unwrap();
    let states = states_of(&alice, item.id).await;
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].folder, Folder::Spam);

    mailbox.unmark_spam(&alice, item.id).await.unwrap();
    let folders: Vec<Folder> = states_of(&alice, item.id)
        .await
        .iter()
        .map(|state| state.folder)
        .collect();
    assert_eq!(folders, vec![Folder::Inbox, Folder::Sent]);
}

#[tokio::test]
async fn drafts_cannot_be_reported() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    let mut request = send_request(&bob, "Draft", "");
    request.status = Some(MailStatus::Draft);
    let draft = mailbox.compose(&alice, request, vec![]).await.unwrap();
    let err = mailbox.mark_spam(&alice, draft.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn sending_a_draft_delivers_it() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    let mut request = send_request(&bob, "Plan", "v1");
    request.status = None;
    let draft = mailbox.compose(&alice, request, vec![]).await.unwrap();

    let edited = mailbox
        .update_draft(
            &alice,
            draft.id,
            UpdateMailRequest {
                body_preview: Some("v2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.body_preview, "v2");
    assert_eq!(edited.folder, Folder::Draft);

    let err = mailbox
        .update_draft(&bob, draft.id, UpdateMailRequest {
            subject: Some("hijack".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);

    let sent = mailbox
        .update_draft(
            &alice,
            draft.id,
            UpdateMailRequest {
                status: Some(MailStatus::Sent),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sent.folder, Folder::Sent);
    assert_eq!(sent.status, MailStatus::Sent);

    let folders: Vec<Folder> = states_of(&alice, draft.id)
        .await
        .iter()
        .map(|state| state.folder)
        .collect();
    assert_eq!(folders, vec![Folder::Sent]);
    assert_eq!(states_of(&bob, draft.id).await[0].folder, Folder::Inbox);

    let err = mailbox
        .update_draft(
            &alice,
            draft.id,
            UpdateMailRequest {
                subject: Some("too late".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn self_addressed_draft_becomes_two_views() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let mut request = send_request(&alice, "Reminder", "");
    request.status = Some(MailStatus::Draft);
    let draft = mailbox.compose(&alice, request, vec![]).await.unwrap();

    mailbox
        .update_draft(
            &alice,
            draft.id,
            UpdateMailRequest {
                status: Some(MailStatus::Sent),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let folders: Vec<Folder> = states_of(&alice, draft.id)
        .await
        .iter()
        .map(|state| state.folder)
        .collect();
    assert_eq!(folders, vec![Folder::Inbox, Folder::Sent]);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let err = mailbox
        .update_draft(&alice, 1, UpdateMailRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn listings_are_paged_newest_first() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    for n in 0..32 {
        mailbox
            .compose(&alice, send_request(&bob, &format!("mail {}", n), ""), vec![])
            .await
            .unwrap();
    }

    let first = mailbox.list(&bob, FolderListing::Inbox, 0).await.unwrap();
    assert_eq!(first.total, 32);
    assert_eq!(first.limit, 30);
    assert_eq!(first.mails.len(), 30);
    assert!(first
        .mails
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));

    let second = mailbox.list(&bob, FolderListing::Inbox, 1).await.unwrap();
    assert_eq!(second.mails.len(), 2);
    assert!(mailbox
        .list(&bob, FolderListing::Inbox, 5)
        .await
        .unwrap()
        .mails
        .is_empty());
}

#[tokio::test]
async fn search_requires_all_terms_and_dedupes() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    mailbox
        .compose(
            &alice,
            send_request(&alice, "Team offsite", "Agenda for the offsite in Eilat"),
            vec![],
        )
        .await
        .unwrap();
    mailbox
        .compose(&alice, send_request(&alice, "Lunch", "Eilat fish place"), vec![])
        .await
        .unwrap();

    let hits = mailbox.search(&alice, "OFFSITE eilat").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].subject, "Team offsite");

    assert_eq!(mailbox.search(&alice, "eilat").await.unwrap().len(), 2);
    assert!(mailbox.search(&alice, "eilat budget").await.unwrap().is_empty());

    let err = mailbox.search(&alice, "   ").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidParameter);
}

#[tokio::test]
async fn field_search_echoes_parameters() {
    let mailbox = mailbox();
    let alice = register_test_user("alice").await;
    let bob = register_test_user("bob").await;
    mailbox
        .compose(&alice, send_request(&bob, "Invoice 2041", "Payment due"), vec![])
        .await
        .unwrap();

    let params = SearchParams {
        subject: Some("invoice".into()),
        ..Default::default()
    };
    let found = mailbox.find(&bob, params.clone()).await.unwrap();
    assert_eq!(found.count, 1);
    assert_eq!(found.search_params, params);

    let err = mailbox.find(&bob, SearchParams::default()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidParameter);
}
