//! Request tracking middleware.
//!
//! [`correlation_id_layer`] gives every request a correlation ID and wraps
//! its handling in an `http_request` span:
//!
//! 1. Take the ID from the `X-Correlation-ID` header, or generate a UUID v4
//! 2. Store it in request extensions as [`CorrelationId`]
//! 3. Run the inner service inside the span
//! 4. Log the status and latency, count the request, and echo the ID in the
//!    response header
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use fitbook_web::middleware::correlation_id_layer;
//!
//! let app = Router::new()
//!     .route("/classes", get(list_classes))
//!     .layer(correlation_id_layer());
//! ```

use crate::extractors::CorrelationId;
use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(CorrelationId(correlation_id));

        let method = req.method().clone();
        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %method,
            path = %req.uri().path(),
        );

        let started = Instant::now();
        let fut = self.inner.call(req).instrument(span.clone());

        Box::pin(async move {
            let mut response = fut.await?;

            let status = response.status();
            let latency_ms = started.elapsed().as_millis();
            span.in_scope(|| {
                if status.is_server_error() {
                    tracing::warn!(status = status.as_u16(), latency_ms, "Request failed");
                } else {
                    tracing::debug!(status = status.as_u16(), latency_ms, "Request completed");
                }
            });
            metrics::counter!(
                "fitbook_http_requests_total",
                "method" => method.to_string(),
                "status" => status.as_u16().to_string()
            )
            .increment(1);

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}
