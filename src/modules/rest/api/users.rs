// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::auth::ClientContext;
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::{NoContent, TokenIssued, UserCreated};
use crate::modules::rest::ApiResult;
use crate::modules::token::payload::{LoginRequest, TokenResponse};
use crate::modules::token::AccessToken;
use crate::modules::user::payload::{RegisterRequest, UserProfile};
use crate::modules::user::{normalize_address, User};
use crate::raise_error;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct UsersApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Users")]
impl UsersApi {
    /// Registers a new mailbox owner.
    ///
    /// A bare local part gets the served domain appended. Open to anonymous callers.
    #[oai(path = "/users", method = "post", operation_id = "register_user")]
    async fn register_user(&self, payload: Json<RegisterRequest>) -> ApiResult<UserCreated> {
        let user = User::register(payload.0).await?;
        let location = format!("/api/users/{}", user.username);
        Ok(UserCreated::Created(Json(user.profile()), location))
    }

    /// Returns the caller's own profile.
    #[oai(path = "/users/:id", method = "get", operation_id = "get_user")]
    async fn get_user(
        &self,
        /// Mail address or local part of the user.
        id: Path<String>,
        context: ClientContext,
    ) -> ApiResult<Json<UserProfile>> {
        let requested = normalize_address(&id.0);
        if requested != context.username {
            return Err(raise_error!(
                "You can only view your own profile.".into(),
                ErrorCode::Forbidden
            )
            .into());
        }
        Ok(Json(User::get(&requested).await?.profile()))
    }
}

pub struct TokensApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Tokens")]
impl TokensApi {
    /// Logs in with an address, local part or phone number and returns a bearer token.
    #[oai(path = "/tokens", method = "post", operation_id = "login")]
    async fn login(&self, payload: Json<LoginRequest>) -> ApiResult<TokenIssued> {
        let user = User::authenticate(&payload.0.username, &payload.0.password).await?;
        let token = AccessToken::issue(&user.username).await?;
        Ok(TokenIssued::Created(Json(TokenResponse {
            token: token.token,
            expires_at: token.expires_at,
            user: user.profile(),
        })))
    }

    /// Revokes the bearer token used for this request.
    #[oai(path = "/tokens", method = "delete", operation_id = "logout")]
    async fn logout(&self, context: ClientContext) -> ApiResult<NoContent> {
        let Some(token) = context.token else {
            return Err(raise_error!(
                "Logout requires a bearer token.".into(),
                ErrorCode::InvalidParameter
            )
            .into());
        };
        AccessToken::revoke(&token).await?;
        Ok(NoContent::Done)
    }
}
