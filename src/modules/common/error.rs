use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};
use tracing::debug;

use crate::modules::error::handler::error_handler;

/// Renders every error escaping the routes as a `{code, message}` JSON body.
pub struct ErrorCapture;

pub struct ErrorCaptureEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Middleware<E> for ErrorCapture {
    type Output = ErrorCaptureEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ErrorCaptureEndpoint { ep }
    }
}

impl<E: Endpoint> Endpoint for ErrorCaptureEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let path = req.uri().path().to_string();
        match self.ep.call(req).await {
            Ok(response) => Ok(response.into_response()),
            Err(error) => {
                debug!(path = %path, status = %error.status(), "request failed");
                Ok(error_handler(error).await.into_response())
            }
        }
    }
}
