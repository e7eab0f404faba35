use crate::modules::error::code::ErrorCode;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::user::payload::{validate_birthday, validate_password};
use crate::modules::user::{normalize_address, validate_local_address, Gender, User};
use crate::modules::utils::testing::{register_request, unique_local_part, TEST_PASSWORD};

#[test]
fn normalize_appends_domain_and_lowercases() {
    assert_eq!(
        normalize_address("  Alice "),
        format!("alice@{}", SETTINGS.webmail_mail_domain)
    );
    assert_eq!(normalize_address("Bob@Elsewhere.org"), "bob@elsewhere.org");
}

#[test]
fn foreign_domains_are_rejected() {
    let err = validate_local_address("bob@elsewhere.org").unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidParameter);
    assert!(validate_local_address(&normalize_address("bob")).is_ok());
}

#[test]
fn password_rules() {
    assert!(validate_password(TEST_PASSWORD).is_ok());
    assert!(validate_password("Sh0rt!").is_err());
    assert!(validate_password("alllower1!").is_err());
    assert!(validate_password("ALLUPPER1!").is_err());
    assert!(validate_password("NoDigits!!").is_err());
    assert!(validate_password("NoSpecial12").is_err());
}

#[test]
fn birthday_must_be_a_past_date() {
    assert!(validate_birthday("1990-04-12").is_ok());
    assert!(validate_birthday("12/04/1990").is_err());
    assert!(validate_birthday("2999-01-01").is_err());
}

#[tokio::test]
async fn register_then_authenticate() {
    let local = unique_local_part("reg");
    let mut request = register_request(&local);
    request.phone = Some("0521234567".into());
    request.gender = Some(Gender::PreferNotToSay);
    let user = User::register(request).await.unwrap();

    assert_eq!(user.username, normalize_address(&local));
    assert_eq!(user.display_name(), "Test User");
    assert_ne!(user.password_hash, TEST_PASSWORD);

    let by_local_part = User::authenticate(&local, TEST_PASSWORD).await.unwrap();
    assert_eq!(by_local_part.username, user.username);

    let by_phone = User::authenticate("0521234567", TEST_PASSWORD).await;
    // other tests never use this number, so the lookup is unambiguous
    assert_eq!(by_phone.unwrap().username, user.username);

    let wrong = User::authenticate(&user.username, "Wrong#Pass1").await.unwrap_err();
    assert_eq!(wrong.code(), ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let local = unique_local_part("dup");
    User::register(register_request(&local)).await.unwrap();
    let err = User::register(register_request(&local.to_uppercase()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyExists);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let err = User::authenticate(&unique_local_part("ghost"), TEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceNotFound);

    let invalid_phone = {
        let mut request = register_request(&unique_local_part("phone"));
        request.phone = Some("0612345678".into());
        User::register(request).await.unwrap_err()
    };
    assert_eq!(invalid_phone.code(), ErrorCode::InvalidParameter);
}
