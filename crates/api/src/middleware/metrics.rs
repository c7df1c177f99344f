//! Prometheus recorder, HTTP request instrumentation and catalog counters.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

const REQUEST_DURATION: &str = "http_request_duration_seconds";
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if RECORDER.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)?
        .install_recorder()?;
    let _ = RECORDER.set(handle);
    Ok(())
}

/// Route label for a request: the matched route template when there is one,
/// so `/api/v1/media/42` and `/api/v1/media/43` share a series.
fn route_label(req: &Request<Body>) -> String {
    match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => "unmatched".to_owned(),
    }
}

/// Count requests and time them, labelled by method, route and status.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let route = route_label(&req);
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "route" => route.clone(), "status" => status)
        .increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "route" => route).record(elapsed);

    response
}

/// Count a catalog item creation.
pub fn record_catalog_item_created() {
    counter!("catalog_items_created_total").increment(1);
}

/// Count a catalog item update, split by whether anything changed.
pub fn record_catalog_item_updated(changed_fields: usize) {
    let outcome = if changed_fields == 0 { "unchanged" } else { "changed" };
    counter!("catalog_items_updated_total", "outcome" => outcome).increment(1);
    histogram!("catalog_item_changed_fields").record(changed_fields as f64);
}

/// `GET /metrics` in the Prometheus text exposition format.
pub async fn metrics_handler() -> Response {
    let Some(handle) = RECORDER.get() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response();
    };

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}
