//! Great-circle distance between two positions.
//!
//! Haversine on a spherical Earth. A run uses one `DistanceUnit` for every
//! watch point radius and every reported distance.

use std::fmt;
use std::str::FromStr;

use crate::types::{round3, ConfigError, LatLon};

const EARTH_RADIUS_KM: f64 = 6371.0088;
const EARTH_RADIUS_MI: f64 = 3958.7613;
const EARTH_RADIUS_NM: f64 = 3440.065;

/// Unit for radii and reported distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
    NauticalMiles,
}

impl DistanceUnit {
    fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
            DistanceUnit::Miles => EARTH_RADIUS_MI,
            DistanceUnit::NauticalMiles => EARTH_RADIUS_NM,
        }
    }

    /// Short label used in reports ("km", "mi", "nm").
    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::NauticalMiles => "nm",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DistanceUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            "nm" | "nmi" | "nautical_miles" => Ok(DistanceUnit::NauticalMiles),
            _ => Err(ConfigError::Unit(s.to_string())),
        }
    }
}

/// Great-circle distance from `center` to `target`, rounded to 3 decimals.
pub fn distance(center: LatLon, target: LatLon, unit: DistanceUnit) -> f64 {
    let (lat1, lon1) = center;
    let (lat2, lon2) = target;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards against a > 1 from rounding on near-antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    round3(unit.earth_radius() * c)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
