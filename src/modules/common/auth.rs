// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{
    error::code::ErrorCode,
    settings::cli::SETTINGS,
    token::AccessToken,
    user::{normalize_address, User},
};
use http::Method;
use poem::{
    web::{
        headers::{authorization::Bearer, Authorization, HeaderMapExt},
        RealIp,
    },
    Endpoint, FromRequest, Middleware, Request, RequestBody, Result,
};
use std::{net::IpAddr, sync::Arc};

use super::create_api_error_response;

/// Header naming the acting user when the development bypass is enabled.
pub const DEV_USER_HEADER: &str = "id";

pub struct ApiGuard;

pub struct ApiGuardEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Middleware<E> for ApiGuard {
    type Output = ApiGuardEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ApiGuardEndpoint { ep }
    }
}

/// Registration and login are the only routes reachable without credentials.
pub fn is_public_route(method: &Method, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    matches!(
        (method, path),
        (&Method::POST, "/api/users") | (&Method::POST, "/api/tokens")
    )
}

impl<E: Endpoint> Endpoint for ApiGuardEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        if !is_public_route(req.method(), req.uri().path()) {
            let context = authenticate_request(&req).await?;
            req.set_data(Arc::new(context));
        }
        self.ep.call(req).await
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClientContext {
    /// Address of the authenticated user.
    pub username: String,
    pub ip_addr: Option<IpAddr>,
    /// The bearer token, absent when the development bypass was used.
    pub token: Option<String>,
}

impl<'a> FromRequest<'a> for ClientContext {
    async fn from_request(req: &'a Request, _body: &mut RequestBody) -> Result<Self> {
        if let Some(context) = req.data::<Arc<ClientContext>>() {
            return Ok(context.as_ref().clone());
        }
        authenticate_request(req).await
    }
}

pub async fn authenticate_request(req: &Request) -> Result<ClientContext> {
    let ip_addr = RealIp::from_request_without_body(req)
        .await
        .ok()
        .and_then(|real_ip| real_ip.0);

    if let Some(bearer) = req.headers().typed_get::<Authorization<Bearer>>() {
        let access_token = AccessToken::validate(bearer.token()).await?;
        return Ok(ClientContext {
            username: access_token.username,
            ip_addr,
            token: Some(access_token.token),
        });
    }

    if SETTINGS.webmail_dev_auth_bypass {
        if let Some(id) = req.header(DEV_USER_HEADER) {
            let username = normalize_address(id);
            if User::find(&username).await?.is_none() {
                return Err(create_api_error_response(
                    "Invalid user ID",
                    ErrorCode::PermissionDenied,
                ));
            }
            return Ok(ClientContext {
                username,
                ip_addr,
                token: None,
            });
        }
    }

    Err(create_api_error_response(
        "Valid access token not found",
        ErrorCode::PermissionDenied,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::token::AccessToken;
    use crate::modules::utils::testing::register_test_user;

    #[test]
    fn only_registration_and_login_are_public() {
        assert!(is_public_route(&Method::POST, "/api/users"));
        assert!(is_public_route(&Method::POST, "/api/tokens/"));
        assert!(!is_public_route(&Method::GET, "/api/users"));
        assert!(!is_public_route(&Method::DELETE, "/api/tokens"));
        assert!(!is_public_route(&Method::GET, "/api/inbox"));
    }

    #[tokio::test]
    async fn bearer_token_resolves_user() {
        let username = register_test_user("auth").await;
        let token = AccessToken::issue(&username).await.unwrap();
        let req = Request::builder()
            .header("Authorization", format!("Bearer {}", token.token))
            .finish();
        let context = authenticate_request(&req).await.unwrap();
        assert_eq!(context.username, username);
        assert_eq!(context.token.as_deref(), Some(token.token.as_str()));
    }

    #[tokio::test]
    async fn dev_header_requires_existing_user() {
        let username = register_test_user("devid").await;
        let req = Request::builder()
            .header(DEV_USER_HEADER, username.as_str())
            .finish();
        assert_eq!(
            authenticate_request(&req).await.unwrap().username,
            username
        );

        let req = Request::builder()
            .header(DEV_USER_HEADER, "nobody-at-all")
            .finish();
        assert!(authenticate_request(&req).await.is_err());

        let req = Request::builder().finish();
        assert!(authenticate_request(&req).await.is_err());
    }
}
