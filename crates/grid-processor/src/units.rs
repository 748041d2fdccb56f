//! Unit presentation for extracted series.

use crate::extract::Extraction;

const KELVIN_OFFSET: f64 = 273.15;

/// Whether a units string denotes Kelvin.
pub fn is_kelvin(units: &str) -> bool {
    matches!(
        units.trim().to_ascii_lowercase().as_str(),
        "k" | "kelvin" | "degk" | "deg_k" | "kelvins"
    )
}

pub fn kelvin_to_celsius(value: f64) -> f64 {
    value - KELVIN_OFFSET
}

/// Convert every Kelvin series to Celsius and relabel its units as `C`.
///
/// Returns the number of series converted.
pub fn convert_kelvin_series(extraction: &mut Extraction) -> usize {
    let mut converted = 0;

    for (key, units) in extraction.units.iter_mut() {
        if !is_kelvin(units) {
            continue;
        }
        if let Some(series) = extraction.series.get_mut(key) {
            series.map_values(kelvin_to_celsius);
            *units = "C".to_string();
            converted += 1;
        }
    }

    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::GridIndex;
    use crate::extract::extract;
    use grid_common::GridPoint;
    use test_utils::GridDatasetBuilder;

    #[test]
    fn test_is_kelvin() {
        for units in ["K", "kelvin", "degK", "deg_K", " k "] {
            assert!(is_kelvin(units), "{units}");
        }
        for units in ["degC", "C", "m s-1", "kg m-2"] {
            assert!(!is_kelvin(units), "{units}");
        }
    }

    #[test]
    fn test_convert_only_kelvin_series() {
        let dataset = GridDatasetBuilder::new(vec![0.0], vec![0.0], 2)
            .variable_fn("t2m", |t, _, _| 273.15 + t as f64)
            .with_units("t2m", "K")
            .variable_fn("tp", |_, _, _| 0.5)
            .with_units("tp", "m")
            .variable_fn("u10", |_, _, _| f64::NAN)
            .with_units("u10", "kelvin")
            .build();
        let index = GridIndex::from_dataset(&dataset).unwrap();
        let mut result = extract(&dataset, &index, GridPoint::new(0.0, 0.0), None).unwrap();

        assert_eq!(convert_kelvin_series(&mut result), 2);

        let t2m: Vec<_> = result.series["t2m"].iter().map(|s| s.value).collect();
        assert!((t2m[0].unwrap()).abs() < 1e-9);
        assert!((t2m[1].unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(result.units["t2m"], "C");

        assert_eq!(result.series["tp"].samples[0].value, Some(0.5));
        assert_eq!(result.units["tp"], "m");

        // Missing values stay missing
        assert!(result.series["u10"].iter().all(|s| s.value.is_none()));
    }
}
