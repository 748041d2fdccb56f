//! Detection of latitude, longitude and time coordinate variables.
//!
//! Only coordinate variables are considered: one-dimensional variables named
//! after their own dimension. CF attributes (`standard_name`, `units`,
//! `axis`) are trusted first; variable names are the fallback.

/// Role a coordinate variable plays in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateRole {
    Latitude,
    Longitude,
    Time,
}

/// Metadata of a coordinate variable relevant to role detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateCandidate {
    pub name: String,
    pub dimension: String,
    pub standard_name: Option<String>,
    pub units: Option<String>,
    pub axis: Option<String>,
}

/// Indices into the candidate list for each detected role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateRoles {
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
    pub time: Option<usize>,
}

const LAT_UNITS: &[&str] = &[
    "degrees_north",
    "degree_north",
    "degree_n",
    "degrees_n",
    "degreen",
    "degreesn",
];
const LON_UNITS: &[&str] = &[
    "degrees_east",
    "degree_east",
    "degree_e",
    "degrees_e",
    "degreee",
    "degreese",
];

impl CoordinateCandidate {
    /// Role implied by CF attributes alone.
    fn attribute_role(&self) -> Option<CoordinateRole> {
        let standard_name = self.standard_name.as_deref().map(str::to_ascii_lowercase);
        let units = self.units.as_deref().map(|u| u.trim().to_ascii_lowercase());
        let axis = self.axis.as_deref().map(|a| a.trim().to_ascii_uppercase());

        match standard_name.as_deref() {
            Some("latitude") => return Some(CoordinateRole::Latitude),
            Some("longitude") => return Some(CoordinateRole::Longitude),
            Some("time") => return Some(CoordinateRole::Time),
            _ => {}
        }

        if let Some(units) = units.as_deref() {
            if LAT_UNITS.contains(&units) {
                return Some(CoordinateRole::Latitude);
            }
            if LON_UNITS.contains(&units) {
                return Some(CoordinateRole::Longitude);
            }
            if units.contains(" since ") {
                return Some(CoordinateRole::Time);
            }
        }

        match axis.as_deref() {
            Some("T") => Some(CoordinateRole::Time),
            _ => None,
        }
    }

    /// Role implied by the variable name.
    fn name_role(&self) -> Option<CoordinateRole> {
        let name = self.name.to_ascii_lowercase();
        if name.contains("lat") {
            Some(CoordinateRole::Latitude)
        } else if name.contains("lon") {
            Some(CoordinateRole::Longitude)
        } else if name.contains("time") || name.contains("date") {
            Some(CoordinateRole::Time)
        } else {
            None
        }
    }
}

/// Assign latitude, longitude and time roles to coordinate candidates.
///
/// For each role the first candidate whose attributes identify it wins; if
/// none does, the first candidate whose name matches and that has not
/// already been assigned another role is used.
pub fn detect_roles(candidates: &[CoordinateCandidate]) -> CoordinateRoles {
    let mut roles = CoordinateRoles::default();

    for (i, candidate) in candidates.iter().enumerate() {
        match candidate.attribute_role() {
            Some(CoordinateRole::Latitude) if roles.latitude.is_none() => roles.latitude = Some(i),
            Some(CoordinateRole::Longitude) if roles.longitude.is_none() => {
                roles.longitude = Some(i)
            }
            Some(CoordinateRole::Time) if roles.time.is_none() => roles.time = Some(i),
            _ => {}
        }
    }

    for (i, candidate) in candidates.iter().enumerate() {
        let taken = [roles.latitude, roles.longitude, roles.time].contains(&Some(i));
        if taken {
            continue;
        }
        match candidate.name_role() {
            Some(CoordinateRole::Latitude) if roles.latitude.is_none() => roles.latitude = Some(i),
            Some(CoordinateRole::Longitude) if roles.longitude.is_none() => {
                roles.longitude = Some(i)
            }
            Some(CoordinateRole::Time) if roles.time.is_none() => roles.time = Some(i),
            _ => {}
        }
    }

    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CoordinateCandidate {
        CoordinateCandidate {
            name: name.to_string(),
            dimension: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_by_name() {
        let candidates = vec![named("time"), named("latitude"), named("longitude")];
        let roles = detect_roles(&candidates);
        assert_eq!(roles.time, Some(0));
        assert_eq!(roles.latitude, Some(1));
        assert_eq!(roles.longitude, Some(2));
    }

    #[test]
    fn test_detect_valid_time_and_date() {
        let roles = detect_roles(&[named("valid_time"), named("lat"), named("lon")]);
        assert_eq!(roles.time, Some(0));

        let roles = detect_roles(&[named("date"), named("lat"), named("lon")]);
        assert_eq!(roles.time, Some(0));
    }

    #[test]
    fn test_attributes_beat_names() {
        let candidates = vec![
            named("lat_bounds_index"),
            CoordinateCandidate {
                name: "y".to_string(),
                dimension: "y".to_string(),
                units: Some("degrees_north".to_string()),
                ..Default::default()
            },
            CoordinateCandidate {
                name: "x".to_string(),
                dimension: "x".to_string(),
                standard_name: Some("longitude".to_string()),
                ..Default::default()
            },
            CoordinateCandidate {
                name: "t".to_string(),
                dimension: "t".to_string(),
                units: Some("hours since 1900-01-01".to_string()),
                ..Default::default()
            },
        ];

        let roles = detect_roles(&candidates);
        assert_eq!(roles.latitude, Some(1));
        assert_eq!(roles.longitude, Some(2));
        assert_eq!(roles.time, Some(3));
    }

    #[test]
    fn test_axis_t_attribute() {
        let candidates = vec![CoordinateCandidate {
            name: "step".to_string(),
            dimension: "step".to_string(),
            axis: Some("T".to_string()),
            ..Default::default()
        }];
        assert_eq!(detect_roles(&candidates).time, Some(0));
    }

    #[test]
    fn test_missing_roles() {
        let roles = detect_roles(&[named("level"), named("lat")]);
        assert_eq!(roles.latitude, Some(1));
        assert_eq!(roles.longitude, None);
        assert_eq!(roles.time, None);
    }
}
