//! Request spans, HTTP metrics and response hardening.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::AppState;

/// `GET /api/metrics`
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.prometheus_handle.as_ref().map_or_else(
        || "# metrics disabled\n".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    );

    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )],
        body,
    )
}

/// `2xx`, `4xx`, ... for the metrics label.
fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        _ => "5xx",
    }
}

/// Opens the per-request span. `user_id` starts empty and is filled in once
/// the bearer token has been resolved.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();

    // Raw paths carry contact and address ids; label by route template.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        route = %route,
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let elapsed = start.elapsed();

        let labels = [
            ("method", method.to_string()),
            ("route", route),
            ("status", status_class(status).to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        info!(
            status = status.as_u16(),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// JSON-only API: nothing here is framed, sniffed or cached.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::REFERRER_POLICY, "no-referrer"),
        (
            header::CONTENT_SECURITY_POLICY,
            "default-src 'none'; frame-ancestors 'none'",
        ),
        (header::CACHE_CONTROL, "no-store"),
    ] {
        headers.insert(name, HeaderValue::from_static(value));
    }

    response
}
