//! Service configuration loaded from YAML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub timeseries: TimeseriesConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            path = %path.display(),
            max_upload_mb = config.upload.max_upload_mb,
            "Loaded service configuration"
        );
        Ok(config)
    }
}

/// Upload restrictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted upload in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Accepted file extensions, without the dot, compared case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    /// Whether `filename` ends with an allowed extension.
    pub fn is_allowed(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: default_max_upload_mb(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_max_upload_mb() -> usize {
    100
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["nc".to_string(), "nc4".to_string(), "netcdf".to_string()]
}

/// Coverage map rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Padding around the dataset bounds, in degrees.
    #[serde(default = "default_padding_degrees")]
    pub padding_degrees: f64,

    /// Grid point markers are drawn only up to this many points.
    #[serde(default = "default_max_markers")]
    pub max_markers: usize,

    /// Optional limit on how far the map can be panned.
    #[serde(default)]
    pub max_bounds: Option<MapBounds>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            padding_degrees: default_padding_degrees(),
            max_markers: default_max_markers(),
            max_bounds: None,
        }
    }
}

fn default_padding_degrees() -> f64 {
    0.5
}

fn default_max_markers() -> usize {
    2500
}

/// Map view limits in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Time-series presentation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesConfig {
    /// Report Kelvin series in degrees Celsius.
    #[serde(default = "default_convert_kelvin")]
    pub convert_kelvin: bool,
}

impl Default for TimeseriesConfig {
    fn default() -> Self {
        Self {
            convert_kelvin: default_convert_kelvin(),
        }
    }
}

fn default_convert_kelvin() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.upload.max_upload_mb, 100);
        assert_eq!(config.upload.max_upload_bytes(), 100 * 1024 * 1024);
        assert_eq!(config.map.padding_degrees, 0.5);
        assert!(config.map.max_bounds.is_none());
        assert!(config.timeseries.convert_kelvin);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
upload:
  max_upload_mb: 5
map:
  max_bounds: { south: -60.0, west: -180.0, north: 85.0, east: 180.0 }
"#;
        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.upload.max_upload_mb, 5);
        assert_eq!(config.upload.allowed_extensions, default_allowed_extensions());
        assert_eq!(config.map.max_bounds.unwrap().north, 85.0);
        assert_eq!(config.map.max_markers, 2500);
        assert!(config.timeseries.convert_kelvin);
    }

    #[test]
    fn test_allowed_extensions() {
        let upload = UploadConfig::default();
        assert!(upload.is_allowed("era5.nc"));
        assert!(upload.is_allowed("ERA5.NC"));
        assert!(upload.is_allowed("data.v2.nc4"));
        assert!(!upload.is_allowed("data.grib"));
        assert!(!upload.is_allowed("nc"));
        assert!(!upload.is_allowed(""));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.yaml");
        std::fs::write(&path, "timeseries:\n  convert_kelvin: false\n").unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert!(!config.timeseries.convert_kelvin);
        assert_eq!(config.upload, UploadConfig::default());
    }
}
