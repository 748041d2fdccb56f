//! Native NetCDF loading using the netcdf library.
//!
//! The netcdf library requires a file path (it wraps libnetcdf/HDF5 which need
//! file handles). When reading from bytes, we write to a temp file first.
//!
//! On Linux, we use `/dev/shm` (memory-backed tmpfs) to minimize I/O latency.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use grid_common::{CoordinateAxis, CoordinateSummary, GridDataset, TimeAxis, Variable};
use netcdf::AttributeValue;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cf_time::decode_times;
use crate::coords::{detect_roles, CoordinateCandidate};
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This function disables that output by calling
/// H5Eset_auto2 with null handlers. Safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Load a gridded dataset from the raw bytes of an uploaded NetCDF file.
pub fn load_dataset_from_bytes(data: &[u8]) -> NetCdfResult<GridDataset> {
    silence_hdf5_errors();

    let temp = TempNetCdf::write(data)?;
    load_dataset(temp.path())
}

/// Load a gridded dataset from a NetCDF file on disk.
///
/// Fails unless the file has latitude, longitude and time coordinates.
pub fn load_dataset(path: &Path) -> NetCdfResult<GridDataset> {
    silence_hdf5_errors();

    let file = netcdf::open(path)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let candidates = coordinate_candidates(&file);
    let roles = detect_roles(&candidates);

    let lat_candidate = roles
        .latitude
        .map(|i| &candidates[i])
        .ok_or_else(|| NetCdfError::MissingData("latitude coordinate".to_string()))?;
    let lon_candidate = roles
        .longitude
        .map(|i| &candidates[i])
        .ok_or_else(|| NetCdfError::MissingData("longitude coordinate".to_string()))?;
    let time_candidate = roles
        .time
        .map(|i| &candidates[i])
        .ok_or_else(|| NetCdfError::MissingData("time coordinate".to_string()))?;

    let lat = read_spatial_axis(&file, lat_candidate)?;
    let lon = read_spatial_axis(&file, lon_candidate)?;
    let time = read_time_axis(&file, time_candidate)?;

    debug!(
        lat = %lat.name,
        lon = %lon.name,
        time = %time.name,
        n_lat = lat.len(),
        n_lon = lon.len(),
        n_time = time.len(),
        "Detected grid coordinates"
    );

    let mut dataset = GridDataset::new(lat, lon, time);

    // Summaries for the remaining numeric coordinates (levels, depths, ...)
    for candidate in &candidates {
        if dataset.coordinates.contains_key(&candidate.name) || candidate.name == time_candidate.name
        {
            continue;
        }
        if let Some(summary) = read_coordinate_summary(&file, &candidate.name) {
            dataset.coordinates.insert(candidate.name.clone(), summary);
        }
    }

    let coordinate_names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
    for var in file.variables() {
        let name = var.name();
        if coordinate_names.contains(&name.as_str()) || var.dimensions().is_empty() {
            continue;
        }

        match read_data_variable(&var) {
            Ok(variable) => dataset.variables.push(variable),
            Err(e) => {
                debug!(variable = %name, error = %e, "Skipping non-numeric variable");
            }
        }
    }

    dataset.global_attributes = file
        .attributes()
        .filter_map(|attr| {
            let value = attr.value().ok()?;
            Some((attr.name().to_string(), attribute_to_json(value)))
        })
        .collect();

    info!(
        variables = dataset.variables.len(),
        grid_points = dataset.lat.len() * dataset.lon.len(),
        time_steps = dataset.time.len(),
        "Loaded NetCDF dataset"
    );

    Ok(dataset)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Collect every coordinate variable (1-D, named after its dimension).
fn coordinate_candidates(file: &netcdf::File) -> Vec<CoordinateCandidate> {
    file.variables()
        .filter_map(|var| {
            let dims = var.dimensions();
            if dims.len() != 1 || dims[0].name() != var.name() {
                return None;
            }
            Some(CoordinateCandidate {
                name: var.name(),
                dimension: dims[0].name(),
                standard_name: get_string_attr(&var, "standard_name"),
                units: get_string_attr(&var, "units"),
                axis: get_string_attr(&var, "axis"),
            })
        })
        .collect()
}

fn read_spatial_axis(
    file: &netcdf::File,
    candidate: &CoordinateCandidate,
) -> NetCdfResult<CoordinateAxis> {
    let var = file
        .variable(&candidate.name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", candidate.name)))?;

    let values: Vec<f64> = var.get_values(..).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to read {}: {}", candidate.name, e))
    })?;

    Ok(CoordinateAxis::new(
        candidate.name.clone(),
        candidate.dimension.clone(),
        candidate.units.clone(),
        values,
    )?)
}

fn read_time_axis(file: &netcdf::File, candidate: &CoordinateCandidate) -> NetCdfResult<TimeAxis> {
    let var = file
        .variable(&candidate.name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", candidate.name)))?;

    let units = candidate.units.as_deref().ok_or_else(|| {
        NetCdfError::InvalidTime(format!(
            "time variable '{}' has no 'units' attribute",
            candidate.name
        ))
    })?;
    let calendar = get_string_attr(&var, "calendar");

    let raw: Vec<f64> = var.get_values(..).map_err(|e| {
        NetCdfError::InvalidTime(format!("Failed to read {}: {}", candidate.name, e))
    })?;

    let times = decode_times(&raw, units, calendar.as_deref())?;
    Ok(TimeAxis::new(
        candidate.name.clone(),
        candidate.dimension.clone(),
        times,
    ))
}

fn read_coordinate_summary(file: &netcdf::File, name: &str) -> Option<CoordinateSummary> {
    let var = file.variable(name)?;
    let values: Vec<f64> = var.get_values(..).ok()?;
    if values.is_empty() {
        return None;
    }
    Some(CoordinateSummary {
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        size: values.len(),
    })
}

/// Read a data variable, unpacking and masking it.
fn read_data_variable(var: &netcdf::Variable) -> NetCdfResult<Variable> {
    let name = var.name();
    let dimensions: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let raw: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    let packing = Packing {
        scale_factor: get_f64_attr(var, "scale_factor").unwrap_or(1.0),
        add_offset: get_f64_attr(var, "add_offset").unwrap_or(0.0),
        fill_value: get_f64_attr(var, "_FillValue"),
        missing_value: get_f64_attr(var, "missing_value"),
    };
    let data = packing.unpack(raw);

    let attributes: BTreeMap<String, Value> = var
        .attributes()
        .filter_map(|attr| {
            let value = attr.value().ok()?;
            Some((attr.name().to_string(), attribute_to_json(value)))
        })
        .collect();

    Ok(Variable::new(name, dimensions, shape, data)?.with_attributes(attributes))
}

/// CF packing and masking attributes of a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Packing {
    pub scale_factor: f64,
    pub add_offset: f64,
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
}

impl Packing {
    /// Mask fill/missing values to NaN, then apply scale and offset.
    pub(crate) fn unpack(&self, raw: Vec<f64>) -> Vec<f64> {
        raw.into_iter()
            .map(|v| {
                if v.is_nan() || Some(v) == self.fill_value || Some(v) == self.missing_value {
                    f64::NAN
                } else {
                    v * self.scale_factor + self.add_offset
                }
            })
            .collect()
    }
}

/// Convert a NetCDF attribute to JSON for info payloads.
pub(crate) fn attribute_to_json(value: AttributeValue) -> Value {
    fn number(v: f64) -> Value {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    match value {
        AttributeValue::Str(s) => Value::String(s),
        AttributeValue::Strs(v) => Value::from(v),
        AttributeValue::Double(v) => number(v),
        AttributeValue::Doubles(v) => Value::Array(v.into_iter().map(number).collect()),
        AttributeValue::Float(v) => number(v as f64),
        AttributeValue::Floats(v) => Value::Array(v.into_iter().map(|x| number(x as f64)).collect()),
        AttributeValue::Int(v) => Value::from(v),
        AttributeValue::Ints(v) => Value::from(v),
        AttributeValue::Short(v) => Value::from(v),
        AttributeValue::Shorts(v) => Value::from(v),
        AttributeValue::Longlong(v) => Value::from(v),
        AttributeValue::Longlongs(v) => Value::from(v),
        AttributeValue::Uint(v) => Value::from(v),
        AttributeValue::Uints(v) => Value::from(v),
        AttributeValue::Ushort(v) => Value::from(v),
        AttributeValue::Ushorts(v) => Value::from(v),
        AttributeValue::Uchar(v) => Value::from(v),
        AttributeValue::Uchars(v) => Value::from(v),
        AttributeValue::Schar(v) => Value::from(v),
        AttributeValue::Schars(v) => Value::from(v),
        other => {
            warn!(value = ?other, "Unsupported attribute type");
            Value::Null
        }
    }
}

/// Get the optimal temp directory for NetCDF file operations.
///
/// On Linux, uses /dev/shm (memory-backed tmpfs) if available for faster I/O.
/// Falls back to the system temp directory on other platforms or if /dev/shm is unavailable.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm_path = Path::new("/dev/shm");
        if shm_path.exists() && shm_path.is_dir() {
            // Verify we can write to /dev/shm
            let test_path = shm_path.join(format!(".netcdf_test_{}", std::process::id()));
            if std::fs::write(&test_path, b"test").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Generate a unique temp file name for concurrent safety.
/// Uses process ID, thread ID, and a counter to ensure uniqueness.
fn generate_temp_filename() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let tid = std::thread::current().id();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("upload_{}_{:?}_{}.nc", pid, tid, count)
}

/// A temp copy of uploaded bytes, removed on drop.
struct TempNetCdf {
    path: PathBuf,
}

impl TempNetCdf {
    fn write(data: &[u8]) -> NetCdfResult<Self> {
        let path = get_optimal_temp_dir().join(generate_temp_filename());
        let temp = Self { path };

        let mut file = std::fs::File::create(&temp.path)?;
        file.write_all(data)?;
        Ok(temp)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempNetCdf {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get string attribute.
fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
