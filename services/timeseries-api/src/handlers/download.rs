//! CSV or Word download of the series at a grid point.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use grid_processor::{to_csv_string, to_docx_bytes};

use crate::error::ApiError;
use crate::handlers::timeseries::{run_query, TimeseriesRequest};
use crate::metrics;
use crate::state::AppState;

/// Download formats selected by the `filetype` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Docx,
}

impl ExportFormat {
    /// Parse `filetype`; absent means CSV.
    pub fn parse(filetype: Option<&str>) -> Result<Self, ApiError> {
        match filetype.map(str::trim) {
            None | Some("") => Ok(Self::Csv),
            Some(s) if s.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            Some(s) if s.eq_ignore_ascii_case("docx") => Ok(Self::Docx),
            Some(s) => Err(ApiError::UnsupportedFiletype(s.to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Docx => "docx",
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    fn filename(self) -> &'static str {
        match self {
            Self::Csv => "timeseries.csv",
            Self::Docx => "timeseries.docx",
        }
    }
}

/// POST /download_timeseries_csv - Same query as `/get_timeseries`, as a CSV or DOCX attachment
pub async fn download_csv_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<TimeseriesRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let start = Instant::now();

    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => {
            let err = ApiError::InvalidRequest(e.body_text());
            metrics::record_timeseries_error("download", err.kind());
            return Err(err);
        }
    };
    let format = match ExportFormat::parse(request.filetype.as_deref()) {
        Ok(format) => format,
        Err(e) => {
            metrics::record_timeseries_error("download", e.kind());
            return Err(e);
        }
    };

    match render(&state, &request, format) {
        Ok(body) => {
            metrics::record_timeseries_request(format.label(), start.elapsed());
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, format.content_type().to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", format.filename()),
                    ),
                ],
                body,
            )
                .into_response())
        }
        Err(e) => {
            metrics::record_timeseries_error(format.label(), e.kind());
            Err(e)
        }
    }
}

fn render(
    state: &AppState,
    request: &TimeseriesRequest,
    format: ExportFormat,
) -> Result<Vec<u8>, ApiError> {
    let extraction = run_query(state, request)?;
    let body = match format {
        ExportFormat::Csv => to_csv_string(&extraction)?.into_bytes(),
        ExportFormat::Docx => to_docx_bytes(&extraction)?,
    };
    Ok(body)
}
