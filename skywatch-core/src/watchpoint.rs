//! Watch point (geofence) definitions.
//!
//! A `WatchPoint` is validated and its callsign patterns compiled when it is
//! built. After that it is immutable for the rest of the run.

use regex::Regex;

use crate::types::{LatLon, WatchPointError};

/// One monitored geofence.
#[derive(Debug, Clone)]
pub struct WatchPoint {
    name: String,
    center: LatLon,
    altitude_low: i32,
    altitude_high: i32,
    radius_limit: f64,
    friendly_name: String,
    callsign_patterns: Vec<Regex>,
}

impl WatchPoint {
    /// Validate the fields and compile the callsign patterns.
    ///
    /// Each pattern is anchored at the start of the callsign but may match a
    /// prefix only, so `DAL` matches `DAL123  `.
    pub fn new(
        name: impl Into<String>,
        center: LatLon,
        altitude_low: i32,
        altitude_high: i32,
        radius_limit: f64,
        friendly_name: impl Into<String>,
        callsign_patterns: &[String],
    ) -> Result<Self, WatchPointError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WatchPointError::EmptyName);
        }
        let (lat, lon) = center;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(WatchPointError::Latitude { name, lat });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(WatchPointError::Longitude { name, lon });
        }
        if altitude_low >= altitude_high {
            return Err(WatchPointError::AltitudeBand {
                name,
                low: altitude_low,
                high: altitude_high,
            });
        }
        if !radius_limit.is_finite() || radius_limit <= 0.0 {
            return Err(WatchPointError::Radius {
                name,
                radius: radius_limit,
            });
        }

        let mut compiled = Vec::with_capacity(callsign_patterns.len());
        for pattern in callsign_patterns {
            match Regex::new(&format!("^(?:{pattern})")) {
                Ok(re) => compiled.push(re),
                Err(source) => {
                    return Err(WatchPointError::Pattern {
                        name,
                        pattern: pattern.clone(),
                        source,
                    })
                }
            }
        }

        Ok(WatchPoint {
            name,
            center,
            altitude_low,
            altitude_high,
            radius_limit,
            friendly_name: friendly_name.into(),
            callsign_patterns: compiled,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn altitude_low(&self) -> i32 {
        self.altitude_low
    }

    pub fn altitude_high(&self) -> i32 {
        self.altitude_high
    }

    pub fn radius_limit(&self) -> f64 {
        self.radius_limit
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Number of callsign patterns. Zero means any callsign is accepted.
    pub fn pattern_count(&self) -> usize {
        self.callsign_patterns.len()
    }

    /// True if `flight` starts with a match of any pattern, or if there are
    /// no patterns at all.
    pub fn accepts_callsign(&self, flight: &str) -> bool {
        self.callsign_patterns.is_empty()
            || self.callsign_patterns.iter().any(|re| re.is_match(flight))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
