//! Membership evaluation for one (watch point, aircraft) pair.
//!
//! Three checks, AND-ed:
//! - radius: fail-closed, an aircraft without a position is outside
//! - altitude: fail-open, an aircraft without `alt_baro` is inside the band
//! - callsign: pass if any pattern matches the start of the flight string
//!
//! All three are always computed so the distance and altitude diagnostics are
//! populated even when an earlier check failed.

use crate::aircraft::Aircraft;
use crate::geo::{distance, DistanceUnit};
use crate::watchpoint::WatchPoint;

/// Outcome of each individual check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    pub radius: bool,
    pub altitude: bool,
    pub callsign: bool,
}

impl Checks {
    pub fn all(&self) -> bool {
        self.radius && self.altitude && self.callsign
    }
}

/// Result of evaluating one aircraft against one watch point.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    /// Distance to the center, 3 decimals. 0 when the position is unknown.
    pub distance: f64,
    /// `alt_baro` as reported when it is known and inside the band, else 0.
    pub altitude: f64,
    pub flight: String,
    pub checks: Checks,
}

/// Radius check. `(passed, distance)`.
fn check_radius(wp: &WatchPoint, ac: &Aircraft, unit: DistanceUnit) -> (bool, f64) {
    match ac.position() {
        Some(target) => {
            let d = distance(wp.center(), target, unit);
            (d <= wp.radius_limit(), d)
        }
        None => (false, 0.0),
    }
}

/// Altitude check, strict on both bounds. `(passed, reported altitude)`.
fn check_altitude(wp: &WatchPoint, ac: &Aircraft) -> (bool, f64) {
    let low = f64::from(wp.altitude_low());
    let high = f64::from(wp.altitude_high());
    match ac.alt_baro {
        Some(alt) if low < alt && alt < high => (true, alt),
        Some(_) => (false, 0.0),
        None => (true, 0.0),
    }
}

/// Evaluate one aircraft against one watch point.
pub fn evaluate(wp: &WatchPoint, ac: &Aircraft, unit: DistanceUnit) -> MatchResult {
    let (radius, dist) = check_radius(wp, ac, unit);
    let (altitude, alt) = check_altitude(wp, ac);
    let callsign = wp.accepts_callsign(&ac.flight);

    let checks = Checks {
        radius,
        altitude,
        callsign,
    };

    MatchResult {
        matched: checks.all(),
        distance: dist,
        altitude: alt,
        flight: ac.flight.clone(),
        checks,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BLANK_FLIGHT;

    fn wp(patterns: &[&str]) -> WatchPoint {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        WatchPoint::new(
            "KRDU",
            (35.879204, -78.787162),
            0,
            1_000_000,
            5.0,
            "RDU Airport",
            &patterns,
        )
        .unwrap()
    }

    fn ac(hex: &str, flight: &str, pos: Option<(f64, f64)>, alt: Option<f64>) -> Aircraft {
        Aircraft {
            hex: hex.to_string(),
            flight: flight.to_string(),
            lat: pos.map(|p| p.0),
            lon: pos.map(|p| p.1),
            alt_baro: alt,
        }
    }

    #[test]
    fn test_match_near_krdu() {
        let a = ac("A1B2C3", BLANK_FLIGHT, Some((35.88, -78.79)), Some(3000.0));
        let r = evaluate(&wp(&[]), &a, DistanceUnit::Miles);
        assert!(r.matched);
        assert!(r.distance > 0.1 && r.distance < 0.2, "got {}", r.distance);
        assert_eq!(r.altitude, 3000.0);
        assert_eq!(r.flight, "        ");
    }

    #[test]
    fn test_no_position_never_matches() {
        let a = ac("D4E5F6", BLANK_FLIGHT, None, Some(3000.0));
        let r = evaluate(&wp(&[]), &a, DistanceUnit::Miles);
        assert!(!r.matched);
        assert_eq!(r.distance, 0.0);
        assert!(!r.checks.radius);
        assert!(r.checks.altitude);
    }

    #[test]
    fn test_half_position_never_matches() {
        let mut a = ac("D4E5F6", BLANK_FLIGHT, Some((35.88, -78.79)), None);
        a.lon = None;
        let r = evaluate(&wp(&[]), &a, DistanceUnit::Miles);
        assert!(!r.matched);
        assert_eq!(r.distance, 0.0);
    }

    #[test]
    fn test_missing_altitude_fails_open() {
        let a = ac("A1B2C3", BLANK_FLIGHT, Some((35.88, -78.79)), None);
        let r = evaluate(&wp(&[]), &a, DistanceUnit::Miles);
        assert!(r.matched);
        assert_eq!(r.altitude, 0.0);
        assert!(r.checks.altitude);
    }

    #[test]
    fn test_altitude_bounds_are_strict() {
        let w = WatchPoint::new("X", (35.879204, -78.787162), 1000, 5000, 5.0, "X", &[]).unwrap();
        let pos = Some((35.88, -78.79));
        for (alt, expect) in [(1000.0, false), (1001.0, true), (4999.0, true), (5000.0, false)] {
            let r = evaluate(&w, &ac("A", BLANK_FLIGHT, pos, Some(alt)), DistanceUnit::Miles);
            assert_eq!(r.matched, expect, "alt {alt}");
            assert_eq!(r.altitude, if expect { alt } else { 0.0 });
        }
    }

    #[test]
    fn test_fractional_altitude_near_bounds() {
        let w = WatchPoint::new("X", (35.879204, -78.787162), 0, 1000, 5.0, "X", &[]).unwrap();
        let pos = Some((35.88, -78.79));
        for (alt, expect) in [
            (999.6, true),
            (0.4, true),
            (1000.0, false),
            (1000.4, false),
            (0.0, false),
            (-0.4, false),
        ] {
            let r = evaluate(&w, &ac("A", BLANK_FLIGHT, pos, Some(alt)), DistanceUnit::Miles);
            assert_eq!(r.matched, expect, "alt {alt}");
            assert_eq!(r.altitude, if expect { alt } else { 0.0 });
        }
    }

    #[test]
    fn test_ground_aircraft_outside_zero_floor() {
        let a = ac("A1B2C3", BLANK_FLIGHT, Some((35.88, -78.79)), Some(0.0));
        let r = evaluate(&wp(&[]), &a, DistanceUnit::Miles);
        assert!(!r.matched);
        assert!(!r.checks.altitude);
    }

    #[test]
    fn test_outside_radius_still_reports_distance() {
        let a = ac("A1B2C3", BLANK_FLIGHT, Some((36.5, -78.79)), Some(3000.0));
        let r = evaluate(&wp(&[]), &a, DistanceUnit::Miles);
        assert!(!r.matched);
        assert!(r.distance > 5.0);
        assert!(r.checks.altitude);
        assert_eq!(r.altitude, 3000.0);
    }

    #[test]
    fn test_radius_is_inclusive() {
        let a = ac("A1B2C3", BLANK_FLIGHT, Some((35.88, -78.79)), Some(3000.0));
        let d = evaluate(&wp(&[]), &a, DistanceUnit::Miles).distance;
        let w = WatchPoint::new("X", (35.879204, -78.787162), 0, 10_000, d, "X", &[]).unwrap();
        assert!(evaluate(&w, &a, DistanceUnit::Miles).matched);
    }

    #[test]
    fn test_callsign_pattern() {
        let w = wp(&["^DAL"]);
        let pos = Some((35.88, -78.79));
        let dal = evaluate(&w, &ac("1", "DAL123  ", pos, Some(3000.0)), DistanceUnit::Miles);
        let ual = evaluate(&w, &ac("2", "UAL456  ", pos, Some(3000.0)), DistanceUnit::Miles);
        assert!(dal.matched);
        assert!(!ual.matched);
        assert!(ual.checks.radius && ual.checks.altitude && !ual.checks.callsign);
        assert_eq!(ual.distance, dal.distance);
    }

    #[test]
    fn test_blank_flight_fails_patterns() {
        let a = ac("A1B2C3", BLANK_FLIGHT, Some((35.88, -78.79)), Some(3000.0));
        assert!(!evaluate(&wp(&["^DAL"]), &a, DistanceUnit::Miles).matched);
    }

    #[test]
    fn test_unit_changes_outcome() {
        // ~0.27 km / ~0.17 mi from center; radius 0.2 only covers it in miles.
        let w = WatchPoint::new("X", (35.879204, -78.787162), 0, 10_000, 0.2, "X", &[]).unwrap();
        let a = ac("A1B2C3", BLANK_FLIGHT, Some((35.88, -78.79)), Some(3000.0));
        assert!(evaluate(&w, &a, DistanceUnit::Miles).matched);
        assert!(!evaluate(&w, &a, DistanceUnit::Kilometers).matched);
    }
}
