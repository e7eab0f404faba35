use crate::generate_token;
use crate::modules::blacklist::BlacklistClient;
use crate::modules::user::payload::RegisterRequest;
use crate::modules::user::User;

pub const TEST_PASSWORD: &str = "Sunny#Day42";

pub fn unique_local_part(prefix: &str) -> String {
    format!("{}{}", prefix, generate_token!(64).to_lowercase())
}

pub fn register_request(local_part: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Test".into(),
        last_name: Some("User".into()),
        username: local_part.into(),
        password: TEST_PASSWORD.into(),
        ..Default::default()
    }
}

/// Registers a fresh user and returns its full address.
pub async fn register_test_user(prefix: &str) -> String {
    User::register(register_request(&unique_local_part(prefix)))
        .await
        .unwrap()
        .username
}

pub fn local_blacklist() -> BlacklistClient {
    BlacklistClient::local()
}
