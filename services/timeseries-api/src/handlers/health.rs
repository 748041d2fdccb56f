//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    /// Name of the active dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Ready once a dataset has been uploaded
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let dataset = state.store.current().ok().map(|h| h.filename.clone());
    let status = if dataset.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = ReadyResponse {
        ready: dataset.is_some(),
        dataset,
    };
    (status, Json(response)).into_response()
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use grid_processor::DatasetHandle;
    use test_utils::scenario_dataset;

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn test_ready_follows_store() {
        let state = Arc::new(AppState::default());

        let response = ready_handler(Extension(state.clone())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state
            .store
            .replace(DatasetHandle::new(scenario_dataset(), "scenario.nc").unwrap());
        let response = ready_handler(Extension(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["dataset"], "scenario.nc");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let response = metrics_handler(Extension(Arc::new(AppState::default()))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
