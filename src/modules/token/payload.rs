use crate::modules::user::payload::UserProfile;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
pub struct LoginRequest {
    /// Mail address, its local part, or the registered phone number.
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Expiry, in milliseconds since epoch.
    pub expires_at: i64,
    pub user: UserProfile,
}
