//! End-to-end tests through the full router.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use test_utils::{no_time_netcdf_bytes, scenario_netcdf_bytes};
use timeseries_api::config::ServiceConfig;
use timeseries_api::state::AppState;
use tower::ServiceExt;

const BOUNDARY: &str = "----tsv-test-boundary";

fn app_with(config: ServiceConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, None));
    (timeseries_api::router(state.clone()), state)
}

fn multipart_request(filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_upload_then_query_scenario() {
    let (app, _) = app_with(ServiceConfig::default());

    let (status, upload) = send_json(&app, multipart_request("scenario.nc", &scenario_netcdf_bytes())).await;
    assert_eq!(status, StatusCode::OK, "{upload}");
    assert_eq!(upload["success"], true);
    assert_eq!(upload["gridLats"], json!([10.0, 20.0, 30.0]));
    assert_eq!(upload["gridLons"], json!([100.0, 110.0]));
    assert_eq!(upload["info"]["time_range"]["start"], "2020-01-01T00:00:00Z");
    assert!(upload["map_html"].as_str().unwrap().contains("leaflet"));

    let (status, series) = send_json(
        &app,
        json_request("/get_timeseries", json!({ "lat": 22, "lon": 101 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{series}");
    assert_eq!(series["coordinates"], json!({ "lat": 20.0, "lon": 100.0 }));
    assert_eq!(
        series["charts"]["temperature"],
        json!([
            { "timestamp": "2020-01-01T00:00:00Z", "value": 5.0 },
            { "timestamp": "2020-01-02T00:00:00Z", "value": null },
            { "timestamp": "2020-01-03T00:00:00Z", "value": 7.0 }
        ])
    );

    // Kelvin variable is presented in Celsius
    assert_eq!(series["units"]["t2m"], "C");
    let t2m_first = series["charts"]["t2m"][0]["value"].as_f64().unwrap();
    assert!((t2m_first - 5.0).abs() < 1e-9);

    let (status, filtered) = send_json(
        &app,
        json_request(
            "/get_timeseries",
            json!({ "lat": 22, "lon": 101, "startDate": "2020-01-02", "endDate": "2020-01-03" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["charts"]["temperature"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_query_before_upload() {
    let (app, _) = app_with(ServiceConfig::default());

    let (status, body) = send_json(
        &app,
        json_request("/get_timeseries", json!({ "lat": 1, "lon": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "No dataset loaded" }));
}

#[tokio::test]
async fn test_reversed_range_rejected() {
    let (app, _) = app_with(ServiceConfig::default());
    send(&app, multipart_request("scenario.nc", &scenario_netcdf_bytes())).await;

    let (status, body) = send_json(
        &app,
        json_request(
            "/get_timeseries",
            json!({ "lat": 20, "lon": 100, "startDate": "2020-01-03", "endDate": "2020-01-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("charts").is_none());
}

#[tokio::test]
async fn test_rejected_upload_keeps_active_dataset() {
    let (app, state) = app_with(ServiceConfig::default());
    send(&app, multipart_request("first.nc", &scenario_netcdf_bytes())).await;

    let (status, body) = send_json(&app, multipart_request("no_time.nc", &no_time_netcdf_bytes())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (status, _) = send_json(&app, multipart_request("notes.txt", b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(state.store.current().unwrap().filename, "first.nc");

    let (status, ready) = send_json(
        &app,
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["dataset"], "first.nc");
}

#[tokio::test]
async fn test_csv_download() {
    let (app, _) = app_with(ServiceConfig::default());
    send(&app, multipart_request("scenario.nc", &scenario_netcdf_bytes())).await;

    let (status, body) = send(
        &app,
        json_request("/download_timeseries_csv", json!({ "lat": 20, "lon": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let csv = String::from_utf8(body).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("time,lat,lon,t2m,temperature"));
    assert_eq!(lines.count(), 3);

    let (status, body) = send_json(
        &app,
        json_request(
            "/download_timeseries_csv",
            json!({ "lat": 20, "lon": 100, "filetype": "xlsx" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported filetype: xlsx");

    let (status, body) = send(
        &app,
        json_request(
            "/download_timeseries_csv",
            json!({ "lat": 20, "lon": 100, "filetype": "docx" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn test_upload_size_limit() {
    let mut config = ServiceConfig::default();
    config.upload.max_upload_mb = 1;
    let (app, state) = app_with(config);

    let oversized = vec![0u8; 2 * 1024 * 1024];
    let (status, body) = send_json(&app, multipart_request("big.nc", &oversized)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{body}");
    assert_eq!(body["success"], false);
    assert!(!state.store.is_loaded());
}

#[tokio::test]
async fn test_malformed_json() {
    let (app, _) = app_with(ServiceConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/get_timeseries")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
