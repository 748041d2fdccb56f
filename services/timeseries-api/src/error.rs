//! API error type and its JSON response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use grid_common::TimeParseError;
use grid_processor::GridError;
use netcdf_parser::NetCdfError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No file has been uploaded yet.
    #[error("No dataset loaded")]
    NoDatasetLoaded,

    /// The point is not on the grid of the loaded dataset.
    #[error("Lat/Lon not found in dataset: ({lat}, {lon})")]
    InvalidGridPoint { lat: f64, lon: f64 },

    /// The end date is before the start date.
    #[error("End date {end} is before start date {start}")]
    InvalidDateRange { start: String, end: String },

    /// The uploaded file could not be loaded as a gridded dataset.
    #[error("Failed to load dataset: {0}")]
    LoadError(String),

    /// A coordinate axis of the uploaded file is empty.
    #[error("Dataset has an empty {0} axis")]
    EmptyAxis(String),

    /// Latitude or longitude is not a finite number.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A date string could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Latitude or longitude is absent from the request.
    #[error("Coordinates not provided")]
    MissingCoordinates,

    /// The request body is not valid JSON for this endpoint.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upload is missing, misnamed or has the wrong extension.
    #[error("{0}")]
    InvalidUpload(String),

    /// The upload exceeds the configured size limit.
    #[error("File exceeds the {limit_mb} MB upload limit")]
    UploadTooLarge { limit_mb: usize },

    /// Export format other than CSV.
    #[error("Unsupported filetype: {0}")]
    UnsupportedFiletype(String),

    /// Unexpected server-side failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoDatasetLoaded => StatusCode::NOT_FOUND,
            ApiError::InvalidGridPoint { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidDateRange { .. } => StatusCode::BAD_REQUEST,
            ApiError::LoadError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EmptyAxis(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCoordinate(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingCoordinates => StatusCode::BAD_REQUEST,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedFiletype(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NoDatasetLoaded => "no_dataset_loaded",
            ApiError::InvalidGridPoint { .. } => "invalid_grid_point",
            ApiError::InvalidDateRange { .. } => "invalid_date_range",
            ApiError::LoadError(_) => "load_error",
            ApiError::EmptyAxis(_) => "empty_axis",
            ApiError::InvalidCoordinate(_) => "invalid_coordinate",
            ApiError::InvalidDate(_) => "invalid_date",
            ApiError::MissingCoordinates => "missing_coordinates",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::InvalidUpload(_) => "invalid_upload",
            ApiError::UploadTooLarge { .. } => "upload_too_large",
            ApiError::UnsupportedFiletype(_) => "unsupported_filetype",
            ApiError::Internal(_) => "internal",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<GridError> for ApiError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::NoDatasetLoaded => ApiError::NoDatasetLoaded,
            GridError::EmptyAxis(axis) => ApiError::EmptyAxis(axis),
            GridError::InvalidGridPoint { lat, lon } => ApiError::InvalidGridPoint { lat, lon },
            GridError::InvalidDateRange { start, end } => ApiError::InvalidDateRange {
                start: grid_common::format_timestamp(&start),
                end: grid_common::format_timestamp(&end),
            },
            GridError::InvalidDate(s) => ApiError::InvalidDate(s),
            GridError::InvalidCoordinate { lat, lon } => {
                ApiError::InvalidCoordinate(format!("({}, {})", lat, lon))
            }
            GridError::Export(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<NetCdfError> for ApiError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => ApiError::Internal(e.to_string()),
            other => ApiError::LoadError(other.to_string()),
        }
    }
}

impl From<TimeParseError> for ApiError {
    fn from(err: TimeParseError) -> Self {
        match err {
            TimeParseError::InvalidFormat(s) => ApiError::InvalidDate(s),
            TimeParseError::ReversedRange { start, end } => {
                GridError::InvalidDateRange { start, end }.into()
            }
        }
    }
}
