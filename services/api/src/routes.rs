use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use nextstep::workflows::applications::{tracker_router, ApplicationRepository, ApplicationTracker};
use nextstep::workflows::apply_flow::{
    apply_flow_router, ApplicationContextLoader, ApplyFlowService, DocumentLibrary, SinkProvider,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_flow_routes<L, P, R>(
    flows: Arc<ApplyFlowService<L, P>>,
    tracker: Arc<ApplicationTracker<R>>,
) -> axum::Router
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
    R: ApplicationRepository + 'static,
{
    apply_flow_router(flows)
        .merge(tracker_router(tracker))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
