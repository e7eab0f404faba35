// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::error::ErrorCapture;
use crate::modules::common::log::Tracing;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::WebmailResult;
use crate::modules::metrics::endpoint::PrometheusEndpoint;
use crate::modules::rest::public::status::get_status;
use crate::modules::{settings::cli::SETTINGS, utils::shutdown::shutdown_signal};

use super::error::ApiErrorResponse;
use crate::modules::common::auth::{ApiGuard, DEV_USER_HEADER};
use crate::modules::common::timeout::{Timeout, TIMEOUT_HEADER};
use crate::raise_error;
use api::create_openapi_service;
use poem::get;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Compression};
use poem::{middleware::Cors, EndpointExt, Route, Server};
use std::time::Duration;
use tracing::info;

pub mod api;
pub mod public;
pub mod response;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

const DESCRIPTION: &str = r#"
    A webmail backend serving mailboxes for a single mail domain.

    - Every user holds their own view of each mail: folder, read and starred state.
    - Mail moves between inbox, sent, drafts, spam and trash; trash remembers where it came from.
    - Labels form a per-user tree and can be attached to any visible mail.
    - Outgoing mail is checked against a URL blacklist service and routed to spam on a hit.
"#;

pub async fn start_http_server() -> WebmailResult<()> {
    let listener = TcpListener::bind((
        SETTINGS
            .webmail_bind_ip
            .clone()
            .unwrap_or("0.0.0.0".into()),
        SETTINGS.webmail_http_port as u16,
    ));

    let api_service = create_openapi_service()
        .description(DESCRIPTION)
        .summary("REST API of the webmail server");

    let swagger = api_service.swagger_ui();
    let redoc = api_service.redoc();
    let scalar = api_service.scalar();
    let spec_json = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let openapi_explorer = api_service.openapi_explorer();

    let open_api_route = Route::new()
        .nest_no_strip("/api", api_service)
        .with(ApiGuard)
        .with(ErrorCapture)
        .with(Timeout)
        .with(Tracing);

    let mut cors_origins = SETTINGS.webmail_cors_origins.clone();
    if cors_origins.is_empty() {
        cors_origins = ["*".to_string()].into_iter().collect();
    }

    let cors = Cors::new()
        .allow_origins(cors_origins)
        .allow_credentials(true)
        .allow_methods(vec![
            "GET", "POST", "PATCH", "PUT", "DELETE", "OPTIONS", "HEAD",
        ])
        .allow_headers(vec![
            "Content-Type",
            "Authorization",
            DEV_USER_HEADER,
            TIMEOUT_HEADER,
        ])
        .expose_headers(vec!["Location"])
        .max_age(SETTINGS.webmail_cors_max_age);

    let route = Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/redoc", redoc)
        .nest("/api-docs/explorer", openapi_explorer)
        .nest("/api-docs/scalar", scalar)
        .nest("/api-docs/spec.json", spec_json)
        .nest("/api-docs/spec.yaml", spec_yaml)
        .nest("/metrics", PrometheusEndpoint)
        .nest("/status", get(get_status))
        .nest_no_strip("/api", open_api_route)
        .with(cors)
        .with_if(
            SETTINGS.webmail_http_compression_enabled,
            Compression::new(),
        )
        .with(CatchPanic::new());

    let server = Server::new(listener)
        .name("Webmail API Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            route.catch_all_error(error_handler),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    info!(
        "Webmail API Service is now running on port {}.",
        SETTINGS.webmail_http_port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
