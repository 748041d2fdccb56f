//! Upload handler: parse a NetCDF file and make it the active dataset.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use grid_common::DatasetInfo;
use grid_processor::DatasetHandle;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::map::coverage_map_html;
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub map_html: String,
    #[serde(rename = "gridLats")]
    pub grid_lats: Vec<f64>,
    #[serde(rename = "gridLons")]
    pub grid_lons: Vec<f64>,
    pub info: DatasetInfo,
}

/// POST /upload - Multipart upload of a NetCDF file
pub async fn upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let result = match multipart {
        Ok(multipart) => match read_file_field(multipart, state.config.upload.max_upload_mb).await
        {
            Ok((filename, data)) => process_upload(&state, &filename, data).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(ApiError::InvalidUpload(rejection.body_text())),
    };

    if let Err(e) = &result {
        metrics::record_upload_failure(e.kind());
    }
    result.map(Json)
}

/// Pull the `file` field out of the multipart body.
async fn read_file_field(
    mut multipart: Multipart,
    limit_mb: usize,
) -> Result<(String, Bytes), ApiError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::UploadTooLarge { limit_mb }
            } else {
                ApiError::InvalidUpload(e.body_text())
            }
        })?;

        let Some(field) = field else {
            return Err(ApiError::InvalidUpload("No file provided".to_string()));
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::UploadTooLarge { limit_mb }
            } else {
                ApiError::InvalidUpload(e.body_text())
            }
        })?;
        return Ok((filename, data));
    }
}

/// Validate, parse and activate an uploaded file.
///
/// The active dataset is replaced only when every step succeeds.
pub async fn process_upload(
    state: &AppState,
    filename: &str,
    data: Bytes,
) -> Result<UploadResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let start = Instant::now();
    let upload_config = &state.config.upload;

    let filename = sanitize_filename(filename);
    if filename.is_empty() {
        return Err(ApiError::InvalidUpload("No file selected".to_string()));
    }
    if !upload_config.is_allowed(&filename) {
        return Err(ApiError::InvalidUpload(format!(
            "Invalid file type. Allowed extensions: {}",
            upload_config.allowed_extensions.join(", ")
        )));
    }
    if data.len() > upload_config.max_upload_bytes() {
        return Err(ApiError::UploadTooLarge {
            limit_mb: upload_config.max_upload_mb,
        });
    }

    info!(
        request_id = %request_id,
        filename = %filename,
        size_bytes = data.len(),
        "Processing upload"
    );

    let dataset = tokio::task::spawn_blocking(move || netcdf_parser::load_dataset_from_bytes(&data))
        .await
        .map_err(|e| ApiError::Internal(format!("upload task failed: {}", e)))?
        .map_err(|e| {
            warn!(request_id = %request_id, filename = %filename, error = %e, "Rejected upload");
            ApiError::from(e)
        })?;

    let handle = DatasetHandle::new(dataset, filename.clone()).map_err(|e| {
        error!(request_id = %request_id, error = %e, "Dataset has no usable grid");
        ApiError::from(e)
    })?;

    let response = UploadResponse {
        success: true,
        filename: filename.clone(),
        map_html: coverage_map_html(&handle.index, &handle.dataset.bbox(), &state.config.map),
        grid_lats: handle.index.lats().to_vec(),
        grid_lons: handle.index.lons().to_vec(),
        info: handle.dataset.info(),
    };

    state.store.replace(handle);

    let elapsed = start.elapsed();
    metrics::record_upload(elapsed);
    info!(
        request_id = %request_id,
        filename = %filename,
        variables = response.info.variables.len(),
        duration_ms = elapsed.as_millis() as u64,
        "Upload complete"
    );

    Ok(response)
}

/// Reduce a client-supplied name to a safe base name.
fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    // Windows browsers may send full paths
    let base = base.rsplit('\\').next().unwrap_or_default();

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
