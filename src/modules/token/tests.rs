use crate::modules::database::insert_impl;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::error::code::ErrorCode;
use crate::modules::token::AccessToken;
use crate::modules::utils::testing::register_test_user;
use crate::utc_now;

#[tokio::test]
async fn issued_token_validates() {
    let username = register_test_user("tok").await;
    let issued = AccessToken::issue(&username).await.unwrap();
    assert!(issued.expires_at > issued.created_at);

    let validated = AccessToken::validate(&issued.token).await.unwrap();
    assert_eq!(validated.username, username);
    assert!(validated.last_access_at >= issued.last_access_at);
}

#[tokio::test]
async fn unknown_token_is_denied() {
    let err = AccessToken::validate("no-such-token").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn expired_token_is_denied_and_removed() {
    let username = register_test_user("exp").await;
    let mut expired = AccessToken::new(&username);
    expired.expires_at = utc_now!() - 1;
    insert_impl(DB_MANAGER.mail_db(), expired.clone())
        .await
        .unwrap();

    let err = AccessToken::validate(&expired.token).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PermissionDenied);
    let err = AccessToken::revoke(&expired.token).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn issuing_purges_expired_tokens() {
    let username = register_test_user("purge").await;
    let mut expired = AccessToken::new(&username);
    expired.expires_at = utc_now!() - 1;
    insert_impl(DB_MANAGER.mail_db(), expired.clone())
        .await
        .unwrap();

    AccessToken::issue(&username).await.unwrap();
    let err = AccessToken::revoke(&expired.token).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn revoked_token_no_longer_validates() {
    let username = register_test_user("rev").await;
    let issued = AccessToken::issue(&username).await.unwrap();
    AccessToken::revoke(&issued.token).await.unwrap();
    assert!(AccessToken::validate(&issued.token).await.is_err());
}
