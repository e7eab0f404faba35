use std::{
    num::NonZeroU32,
    sync::{Arc, LazyLock},
    time::Instant,
};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::InMemoryState,
    Quota, RateLimiter,
};
use poem::{
    http::header, web::RealIp, Endpoint, FromRequest, IntoResponse, Middleware, Request, Response,
    Result,
};
use poem_openapi::OperationId;
use tracing::{error, info, warn, Instrument};

use crate::modules::common::auth::ClientContext;
use crate::modules::metrics::{
    WEBMAIL_REQUEST_DURATION_BY_METHOD_AND_OPERATION, WEBMAIL_REQUEST_DURATION_BY_STATUS,
    WEBMAIL_REQUEST_TOTAL_BY_METHOD_AND_OPERATION,
};

pub type GovRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    InMemoryState,
    QuantaClock,
    NoOpMiddleware<QuantaInstant>,
>;

const LOG_BUDGET_PER_SECOND: NonZeroU32 = NonZeroU32::new(10).unwrap();
const COST_ERROR: NonZeroU32 = NonZeroU32::new(1).unwrap();
const COST_WARN: NonZeroU32 = NonZeroU32::new(3).unwrap();
const COST_INFO: NonZeroU32 = NonZeroU32::new(5).unwrap();

static RATE_LIMITER: LazyLock<LogRateLimiter> = LazyLock::new(LogRateLimiter::new);
pub struct LogRateLimiter {
    limiter: Arc<GovRateLimiter>,
}

impl LogRateLimiter {
    pub fn new() -> Self {
        let quota = Quota::per_second(LOG_BUDGET_PER_SECOND);
        let limiter = RateLimiter::direct(quota);
        Self {
            limiter: Arc::new(limiter),
        }
    }

    pub fn should_log(&self, status: u16) -> bool {
        let cost = match status {
            500_u16.. => COST_ERROR,
            400_u16..=499_u16 => COST_WARN,
            _ => COST_INFO,
        };

        matches!(self.limiter.check_n(cost), Ok(Ok(())))
    }
}

#[derive(Default)]
pub struct Tracing;

impl<E: Endpoint> Middleware<E> for Tracing {
    type Output = TracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TracingEndpoint { inner: ep }
    }
}

/// Endpoint for the `Tracing` middleware.
pub struct TracingEndpoint<E> {
    inner: E,
}

impl<E: Endpoint> Endpoint for TracingEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let remote_addr = RealIp::from_request_without_body(&req)
            .await
            .ok()
            .and_then(|real_ip| real_ip.0)
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| req.remote_addr().to_string());
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(|q| q.to_string());
        let referer = req
            .headers()
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok().map(|v| v.to_string()));
        let content_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok().map(|v| v.to_string()));

        let user = req
            .data::<Arc<ClientContext>>()
            .map(|context| context.username.clone());

        let span = tracing::info_span!(
            "request",
            remote_addr = %remote_addr,
            method = %method,
            path = %path,
            query = ?query,
            referer = ?referer,
            user = ?user,
            content_length = ?content_length,
        );

        async move {
            let now = Instant::now();
            let res = self.inner.call(req).await;
            let duration = now.elapsed();

            match res {
                Ok(resp) => {
                    let resp = resp.into_response();
                    let status = resp.status().as_u16();
                    if let Some(operation_id) = resp.data::<OperationId>() {
                        WEBMAIL_REQUEST_DURATION_BY_METHOD_AND_OPERATION
                            .with_label_values(&[
                                method.as_str(),
                                operation_id.0,
                                status.to_string().as_str(),
                            ])
                            .observe(duration.as_secs_f64());
                        WEBMAIL_REQUEST_DURATION_BY_STATUS
                            .with_label_values(&[status.to_string().as_str()])
                            .observe(duration.as_secs_f64());
                        WEBMAIL_REQUEST_TOTAL_BY_METHOD_AND_OPERATION
                            .with_label_values(&[
                                method.as_str(),
                                operation_id.0,
                                status.to_string().as_str(),
                            ])
                            .inc();
                    }
                    log_response(status, duration);
                    Ok(resp)
                }
                Err(err) => {
                    let status = err.status().as_u16();
                    log_response(status, duration);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[inline]
fn log_response(status: u16, duration: std::time::Duration) {
    if RATE_LIMITER.should_log(status) {
        match status {
            500.. => {
                error!(
                    status = %status,
                    duration = ?duration,
                    "request completed with server error"
                );
            }
            400..=499 => {
                warn!(
                    status = %status,
                    duration = ?duration,
                    "request completed with client error"
                );
            }
            _ => {
                info!(
                    status = %status,
                    duration = ?duration,
                    "request completed successfully"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_budget_favours_errors() {
        let limiter = LogRateLimiter::new();
        // ten cost units per second: two info lines exhaust the budget
        assert!(limiter.should_log(200));
        assert!(limiter.should_log(200));
        assert!(!limiter.should_log(200));
    }
}
