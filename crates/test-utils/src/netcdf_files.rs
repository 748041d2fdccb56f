//! NetCDF files for loader and upload tests.
//!
//! Files are written with the `netcdf` crate so tests need no committed data.

use std::path::Path;

use crate::fixtures::{scenario_temperature, SCENARIO_LATS, SCENARIO_LONS};

/// Write the scenario dataset as a NetCDF file.
pub fn write_scenario_netcdf(path: &Path) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("time", 3)?;
    file.add_dimension("lat", SCENARIO_LATS.len())?;
    file.add_dimension("lon", SCENARIO_LONS.len())?;
    file.add_attribute("title", "scenario")?;

    let mut time = file.add_variable::<f64>("time", &["time"])?;
    time.put_values(&[0.0, 1.0, 2.0], ..)?;
    time.put_attribute("units", "days since 2020-01-01 00:00:00")?;
    time.put_attribute("calendar", "standard")?;

    let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
    lat.put_values(&SCENARIO_LATS[..], ..)?;
    lat.put_attribute("units", "degrees_north")?;

    let mut lon = file.add_variable::<f64>("lon", &["lon"])?;
    lon.put_values(&SCENARIO_LONS[..], ..)?;
    lon.put_attribute("units", "degrees_east")?;

    let mut data = Vec::new();
    for t in 0..3 {
        for i in 0..SCENARIO_LATS.len() {
            for j in 0..SCENARIO_LONS.len() {
                data.push(scenario_temperature(t, i, j));
            }
        }
    }
    let mut temp = file.add_variable::<f64>("temperature", &["time", "lat", "lon"])?;
    temp.put_values(&data, ..)?;
    temp.put_attribute("units", "degC")?;

    // Kelvin copy for unit presentation tests
    let kelvin: Vec<f64> = data.iter().map(|v| v + 273.15).collect();
    let mut t2m = file.add_variable::<f64>("t2m", &["time", "lat", "lon"])?;
    t2m.put_values(&kelvin, ..)?;
    t2m.put_attribute("units", "K")?;

    Ok(())
}

/// Bytes of the scenario NetCDF file.
pub fn scenario_netcdf_bytes() -> Vec<u8> {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("scenario.nc");
    write_scenario_netcdf(&path).expect("write scenario file");
    std::fs::read(&path).expect("read scenario file")
}

/// Bytes of a valid NetCDF file that has no time coordinate.
pub fn no_time_netcdf_bytes() -> Vec<u8> {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("no_time.nc");
    {
        let mut file = netcdf::create(&path).expect("create file");
        file.add_dimension("lat", 2).expect("lat dim");
        file.add_dimension("lon", 2).expect("lon dim");
        let mut lat = file.add_variable::<f64>("lat", &["lat"]).expect("lat var");
        lat.put_values(&[0.0, 1.0], ..).expect("lat values");
        let mut lon = file.add_variable::<f64>("lon", &["lon"]).expect("lon var");
        lon.put_values(&[0.0, 1.0], ..).expect("lon values");
        let mut field = file
            .add_variable::<f64>("elevation", &["lat", "lon"])
            .expect("field var");
        field.put_values(&[1.0, 2.0, 3.0, 4.0], ..).expect("field values");
    }
    std::fs::read(&path).expect("read file")
}

/// Bytes of a NetCDF file with time and longitude but an unlabelled `y` axis
/// in place of latitude.
pub fn no_lat_netcdf_bytes() -> Vec<u8> {
    partial_grid_bytes("no_lat.nc", ("y", None), ("lon", Some("degrees_east")))
}

/// Bytes of a NetCDF file with time and latitude but an unlabelled `x` axis
/// in place of longitude.
pub fn no_lon_netcdf_bytes() -> Vec<u8> {
    partial_grid_bytes("no_lon.nc", ("lat", Some("degrees_north")), ("x", None))
}

fn partial_grid_bytes(
    file_name: &str,
    (y_name, y_units): (&str, Option<&str>),
    (x_name, x_units): (&str, Option<&str>),
) -> Vec<u8> {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(file_name);
    {
        let mut file = netcdf::create(&path).expect("create file");
        file.add_dimension("time", 2).expect("time dim");
        file.add_dimension(y_name, 2).expect("y dim");
        file.add_dimension(x_name, 2).expect("x dim");

        let mut time = file.add_variable::<f64>("time", &["time"]).expect("time var");
        time.put_values(&[0.0, 1.0], ..).expect("time values");
        time.put_attribute("units", "days since 2020-01-01")
            .expect("time units");

        let axes = [
            (y_name, y_units, [10.0, 20.0]),
            (x_name, x_units, [100.0, 110.0]),
        ];
        for (name, units, values) in axes {
            let mut var = file.add_variable::<f64>(name, &[name]).expect("axis var");
            var.put_values(&values, ..).expect("axis values");
            if let Some(units) = units {
                var.put_attribute("units", units).expect("axis units");
            }
        }

        let mut field = file
            .add_variable::<f64>("temperature", &["time", y_name, x_name])
            .expect("field var");
        field
            .put_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], ..)
            .expect("field values");
    }
    std::fs::read(&path).expect("read file")
}
