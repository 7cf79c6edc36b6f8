//! Request deadline middleware.
//!
//! Expired requests get a JSON 504 in the gateway's error shape. The
//! handler future is dropped, but a settlement transaction already handed
//! to the blocking pool runs to completion; a retry then sees
//! `ClaimAlreadyExists` instead of billing twice.

use crate::domain::error::ApiError;
use axum::{body::Body, http::Request, response::IntoResponse, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::timeout;
use tower::{Layer, Service};
use tracing::warn;

/// Timeout layer
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    deadline: Duration,
}

impl TimeoutLayer {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            deadline: self.deadline,
        }
    }
}

/// Timeout service
#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
    deadline: Duration,
}

impl<S> Service<Request<Body>> for TimeoutService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let deadline = self.deadline;
        let path = req.uri().path().to_string();
        // Take the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match timeout(deadline, inner.call(req)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        path = %path,
                        timeout_ms = deadline.as_millis() as u64,
                        "Request timed out"
                    );
                    Ok(ApiError::timeout(format!(
                        "Request exceeded {}ms deadline; it may still complete, retry to confirm",
                        deadline.as_millis()
                    ))
                    .into_response())
                }
            }
        })
    }
}
