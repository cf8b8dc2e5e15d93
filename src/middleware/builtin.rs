//! Ready-made middleware stages.
//!
//! Each function returns a closure that plugs straight into
//! [`Middleware::before_send`](crate::middleware::Middleware::before_send) or
//! [`Middleware::post_request`](crate::middleware::Middleware::post_request).

use uuid::Uuid;

use crate::error::BoxError;
use crate::http::request::RequestDescriptor;
use crate::http::response::ResponseEnvelope;
use crate::observability::metrics;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Attach a UUID v4 `x-request-id` unless one is already set.
pub fn request_id() -> impl Fn(RequestDescriptor) -> Result<RequestDescriptor, BoxError> + Send + Sync + 'static {
    |mut req: RequestDescriptor| {
        let present = req
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(X_REQUEST_ID));
        if !present {
            req.headers
                .insert(X_REQUEST_ID.to_string(), Uuid::new_v4().to_string());
        }
        Ok(req)
    }
}

/// Set `Authorization: Bearer <token>`.
pub fn bearer_auth(
    token: impl Into<String>,
) -> impl Fn(RequestDescriptor) -> Result<RequestDescriptor, BoxError> + Send + Sync + 'static {
    let value = format!("Bearer {}", token.into());
    move |mut req: RequestDescriptor| {
        req.headers
            .retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
        req.headers.insert("authorization".to_string(), value.clone());
        Ok(req)
    }
}

/// Log every settled request.
pub fn trace_responses() -> impl Fn(ResponseEnvelope, bool) -> Result<ResponseEnvelope, BoxError> + Send + Sync + 'static
{
    |res: ResponseEnvelope, succeeded: bool| {
        let request_id = res
            .request
            .headers
            .get(X_REQUEST_ID)
            .map(String::as_str)
            .unwrap_or("-");
        if succeeded {
            tracing::info!(
                request_id = %request_id,
                method = %res.request.method,
                url = %res.request.url,
                status = ?res.status_code(),
                latency_ms = res.latency.as_millis() as u64,
                "Request completed"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                method = %res.request.method,
                url = %res.request.url,
                status = ?res.status_code(),
                error = ?res.error,
                latency_ms = res.latency.as_millis() as u64,
                "Request failed"
            );
        }
        Ok(res)
    }
}

/// Record request count and latency through the `metrics` facade.
pub fn record_metrics() -> impl Fn(ResponseEnvelope, bool) -> Result<ResponseEnvelope, BoxError> + Send + Sync + 'static
{
    |res: ResponseEnvelope, _succeeded: bool| {
        metrics::record_request(res.request.method.as_str(), res.status_code(), res.latency);
        Ok(res)
    }
}
