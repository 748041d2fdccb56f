//! Time-series query handler.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use chrono::{DateTime, Utc};
use grid_common::{parse_datetime, GridPoint, TimeSeries};
use grid_processor::{convert_kelvin_series, Extraction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Body of `/get_timeseries` and `/download_timeseries_csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesRequest {
    /// Number or numeric string.
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lon: Option<Value>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Download format, `csv` (default) or `docx`.
    #[serde(default)]
    pub filetype: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeseriesResponse {
    pub success: bool,
    pub charts: BTreeMap<String, TimeSeries>,
    pub units: BTreeMap<String, String>,
    pub coordinates: GridPoint,
}

/// POST /get_timeseries - Series of every variable at the grid point nearest the click
pub async fn timeseries_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<TimeseriesRequest>, JsonRejection>,
) -> Result<Json<TimeseriesResponse>, ApiError> {
    let start = Instant::now();

    let result = body
        .map_err(|e| ApiError::InvalidRequest(e.body_text()))
        .and_then(|Json(request)| run_query(&state, &request));

    match result {
        Ok(extraction) => {
            metrics::record_timeseries_request("json", start.elapsed());
            let coordinates = extraction
                .point
                .ok_or_else(|| ApiError::Internal("extraction without grid point".to_string()))?;
            Ok(Json(TimeseriesResponse {
                success: true,
                charts: extraction.series,
                units: extraction.units,
                coordinates,
            }))
        }
        Err(e) => {
            metrics::record_timeseries_error("json", e.kind());
            Err(e)
        }
    }
}

/// Resolve the request to a grid point and extract its series.
pub(crate) fn run_query(
    state: &AppState,
    request: &TimeseriesRequest,
) -> Result<Extraction, ApiError> {
    let handle = state.store.current()?;

    let lat = parse_coordinate(request.lat.as_ref(), "lat")?;
    let lon = parse_coordinate(request.lon.as_ref(), "lon")?;
    let start = parse_optional_date(request.start_date.as_deref())?;
    let end = parse_optional_date(request.end_date.as_deref())?;

    let point = handle.nearest(lat, lon)?;
    debug!(lat, lon, grid_lat = point.lat, grid_lon = point.lon, "Snapped to grid");

    let mut extraction = handle.extract_between(point, start, end)?;
    if state.config.timeseries.convert_kelvin {
        convert_kelvin_series(&mut extraction);
    }

    info!(
        filename = %handle.filename,
        lat = point.lat,
        lon = point.lon,
        series = extraction.len(),
        filtered = start.is_some() && end.is_some(),
        "Extracted time series"
    );
    Ok(extraction)
}

/// Accept a JSON number or a numeric string.
fn parse_coordinate(value: Option<&Value>, name: &str) -> Result<f64, ApiError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(ApiError::MissingCoordinates),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Err(ApiError::MissingCoordinates),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::InvalidCoordinate(format!("{} = {}", name, value_text(value)))),
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Parse an optional date; empty strings count as absent.
fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_datetime(s).map(Some).map_err(ApiError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_processor::DatasetHandle;
    use serde_json::json;
    use test_utils::{scenario_dataset, GridDatasetBuilder};

    fn loaded_state() -> Arc<AppState> {
        let state = AppState::default();
        state
            .store
            .replace(DatasetHandle::new(scenario_dataset(), "scenario.nc").unwrap());
        Arc::new(state)
    }

    fn request(body: Value) -> Result<Json<TimeseriesRequest>, JsonRejection> {
        Ok(Json(serde_json::from_value(body).unwrap()))
    }

    #[tokio::test]
    async fn test_query_snaps_and_extracts() {
        let state = loaded_state();
        let Json(response) = timeseries_handler(
            Extension(state),
            request(json!({ "lat": 22, "lon": 101 })),
        )
        .await
        .unwrap();

        assert_eq!(response.coordinates, GridPoint::new(20.0, 100.0));
        let values: Vec<_> = response.charts["temperature"]
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec![Some(5.0), None, Some(7.0)]);
        assert_eq!(response.units["temperature"], "degC");
    }

    #[tokio::test]
    async fn test_query_with_dates_and_string_coordinates() {
        let state = loaded_state();
        let Json(response) = timeseries_handler(
            Extension(state),
            request(json!({
                "lat": "22.0",
                "lon": "101",
                "startDate": "2020-01-02",
                "endDate": "2020-01-03T00:00:00Z"
            })),
        )
        .await
        .unwrap();

        assert_eq!(response.charts["temperature"].len(), 2);
    }

    #[tokio::test]
    async fn test_empty_dates_mean_full_series() {
        let state = loaded_state();
        let Json(response) = timeseries_handler(
            Extension(state),
            request(json!({ "lat": 22, "lon": 101, "startDate": "", "endDate": "" })),
        )
        .await
        .unwrap();

        assert_eq!(response.charts["temperature"].len(), 3);
    }

    #[test]
    fn test_query_errors() {
        let state = loaded_state();

        let err = run_query(&state, &serde_json::from_value(json!({ "lat": 1 })).unwrap())
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingCoordinates));

        let err = run_query(
            &state,
            &serde_json::from_value(json!({ "lat": "north", "lon": 1 })).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCoordinate(_)));

        let err = run_query(
            &state,
            &serde_json::from_value(json!({
                "lat": 20, "lon": 100, "startDate": "2020-01-03", "endDate": "2020-01-01"
            }))
            .unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidDateRange { .. }));

        let err = run_query(
            &state,
            &serde_json::from_value(json!({
                "lat": 20, "lon": 100, "startDate": "soon", "endDate": "2020-01-01"
            }))
            .unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidDate(_)));
    }

    #[tokio::test]
    async fn test_no_dataset_loaded() {
        let state = Arc::new(AppState::default());
        let err = timeseries_handler(Extension(state), request(json!({ "lat": 1, "lon": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoDatasetLoaded));
    }

    #[test]
    fn test_kelvin_conversion_follows_config() {
        let dataset = GridDatasetBuilder::new(vec![0.0], vec![0.0], 1)
            .variable_fn("t2m", |_, _, _| 300.0)
            .with_units("t2m", "K")
            .build();

        let mut state = AppState::default();
        state
            .store
            .replace(DatasetHandle::new(dataset, "k.nc").unwrap());
        let body: TimeseriesRequest = serde_json::from_value(json!({ "lat": 0, "lon": 0 })).unwrap();

        let converted = run_query(&state, &body).unwrap();
        assert_eq!(converted.units["t2m"], "C");
        test_utils::assert_approx_eq!(converted.series["t2m"].samples[0].value.unwrap(), 26.85, 1e-9);

        state.config.timeseries.convert_kelvin = false;
        let raw = run_query(&state, &body).unwrap();
        assert_eq!(raw.units["t2m"], "K");
        assert_eq!(raw.series["t2m"].samples[0].value, Some(300.0));
    }
}
