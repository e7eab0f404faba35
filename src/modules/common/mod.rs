// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use super::error::code::ErrorCode;
use super::error::WebmailError;
use poem::error::ResponseError;
use poem::Body;
use poem::{http::StatusCode, Error, Response};
use tracing::{debug, error};

pub mod auth;
pub mod error;
pub mod log;
pub mod paginated;
pub mod timeout;

#[inline]
fn create_webmail_error(message: &str, code: ErrorCode) -> WebmailError {
    WebmailError::Generic {
        message: message.into(),
        location: snafu::Location::default(),
        code,
    }
}

#[inline]
pub fn create_api_error_response(message: &str, code: ErrorCode) -> Error {
    create_webmail_error(message, code).into()
}

impl ResponseError for WebmailError {
    fn status(&self) -> StatusCode {
        self.code().status()
    }

    fn as_response(&self) -> Response
    where
        Self: std::error::Error + Send + Sync + 'static,
    {
        match self {
            WebmailError::Generic {
                message,
                location,
                code,
            } => {
                if code.status().is_server_error() {
                    error!(
                        error_code = *code as u32,
                        error_message = %message,
                        error_location = ?location
                    );
                } else {
                    debug!(error_code = *code as u32, error_message = %message);
                }

                let body = Body::from_json(serde_json::json!({
                    "code": *code as u32,
                    "message": message.to_string(),
                }))
                .unwrap_or_else(|_| Body::from_string(message.to_string()));

                Response::builder().status(self.status()).body(body)
            }
        }
    }
}
