// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::{Endpoint, Middleware, Request, Result};
use std::time::Duration;
use tracing::error;

use crate::modules::error::code::ErrorCode;

use super::create_api_error_response;

pub const TIMEOUT_HEADER: &str = "X-Webmail-Timeout-Seconds";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 300;

pub struct Timeout;

impl<E: Endpoint> Middleware<E> for Timeout {
    type Output = TimeoutEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TimeoutEndpoint { ep }
    }
}

pub struct TimeoutEndpoint<E> {
    ep: E,
}

/// Requested timeout in seconds, defaulted and capped.
pub fn effective_timeout(header: Option<&str>) -> u64 {
    header
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|seconds| *seconds > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .min(MAX_TIMEOUT_SECS)
}

impl<E: Endpoint> Endpoint for TimeoutEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let seconds = effective_timeout(req.header(TIMEOUT_HEADER));
        match tokio::time::timeout(Duration::from_secs(seconds), self.ep.call(req)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Request timed out after {} seconds", seconds);
                Err(create_api_error_response(
                    &format!(
                        "Request timed out after {} seconds (set via {} header, max allowed: {} seconds)",
                        seconds, TIMEOUT_HEADER, MAX_TIMEOUT_SECS
                    ),
                    ErrorCode::RequestTimeout,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_header_is_defaulted_and_capped() {
        assert_eq!(effective_timeout(None), DEFAULT_TIMEOUT_SECS);
        assert_eq!(effective_timeout(Some("abc")), DEFAULT_TIMEOUT_SECS);
        assert_eq!(effective_timeout(Some("0")), DEFAULT_TIMEOUT_SECS);
        assert_eq!(effective_timeout(Some(" 5 ")), 5);
        assert_eq!(effective_timeout(Some("100000")), MAX_TIMEOUT_SECS);
    }
}
