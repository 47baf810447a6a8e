//! Alert aggregation over one snapshot.
//!
//! Every watch point is evaluated against every aircraft. Matches for one
//! watch point are collected locally and turned into an `AlertRecord` once
//! the inner loop is done; watch points without matches produce nothing.

use std::collections::BTreeMap;

use log::{debug, trace};
use serde::{Serialize, Serializer};

use crate::aircraft::{normalize, Aircraft, FeedEntry};
use crate::geo::DistanceUnit;
use crate::matcher::evaluate;
use crate::types::LatLon;
use crate::watchpoint::WatchPoint;

/// Diagnostic values for one matched aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftHit {
    pub distance: f64,
    #[serde(serialize_with = "serialize_feet")]
    pub altitude: f64,
    pub flight: String,
}

/// Whole feet go out as JSON integers, the way the feed reports them.
fn serialize_feet<S: Serializer>(feet: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if feet.fract() == 0.0 && feet.abs() < 1e15 {
        serializer.serialize_i64(*feet as i64)
    } else {
        serializer.serialize_f64(*feet)
    }
}

/// Everything that matched one watch point in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub friendly_name: String,
    pub alt_low: i32,
    pub alt_high: i32,
    pub radius_limit: f64,
    pub coord_center: LatLon,
    /// Keyed by aircraft hex.
    pub aircraft: BTreeMap<String, AircraftHit>,
}

/// Watch point name -> alert. Only watch points with at least one match.
pub type AlertReport = BTreeMap<String, AlertRecord>;

/// Counters from one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Records that normalized and were evaluated.
    pub evaluated: usize,
    /// Records skipped as malformed: no hex, or a field of the wrong type.
    pub skipped: usize,
}

/// Evaluate every watch point against every aircraft in `snapshot`.
pub fn aggregate(
    watch_points: &[WatchPoint],
    snapshot: &[FeedEntry],
    unit: DistanceUnit,
) -> AlertReport {
    aggregate_with_stats(watch_points, snapshot, unit).0
}

/// Like [`aggregate`], also returning how many records were skipped.
pub fn aggregate_with_stats(
    watch_points: &[WatchPoint],
    snapshot: &[FeedEntry],
    unit: DistanceUnit,
) -> (AlertReport, AggregateStats) {
    let mut stats = AggregateStats::default();
    let aircraft: Vec<Aircraft> = snapshot
        .iter()
        .filter_map(|entry| match normalize(entry) {
            Ok(ac) => Some(ac),
            Err(e) => {
                debug!("skipping aircraft record: {e}");
                stats.skipped += 1;
                None
            }
        })
        .collect();
    stats.evaluated = aircraft.len();

    let report = watch_points
        .iter()
        .filter_map(|wp| {
            alert_for(wp, &aircraft, unit).map(|record| (wp.name().to_string(), record))
        })
        .collect();

    (report, stats)
}

/// Matches for a single watch point, or `None` if nothing matched.
fn alert_for(wp: &WatchPoint, aircraft: &[Aircraft], unit: DistanceUnit) -> Option<AlertRecord> {
    debug!(
        "{}: center ({}, {}), alt {}..{} ft, radius {} {}, {} callsign pattern(s)",
        wp.name(),
        wp.center().0,
        wp.center().1,
        wp.altitude_low(),
        wp.altitude_high(),
        wp.radius_limit(),
        unit,
        wp.pattern_count()
    );

    let mut hits = BTreeMap::new();
    for ac in aircraft {
        let result = evaluate(wp, ac, unit);
        trace!(
            "{} vs {}: matched={} {:?} distance={} altitude={}",
            wp.name(),
            ac.hex,
            result.matched,
            result.checks,
            result.distance,
            result.altitude
        );
        if result.matched {
            hits.insert(
                ac.hex.clone(),
                AircraftHit {
                    distance: result.distance,
                    altitude: result.altitude,
                    flight: result.flight,
                },
            );
        }
    }

    if hits.is_empty() {
        return None;
    }

    Some(AlertRecord {
        friendly_name: wp.friendly_name().to_string(),
        alt_low: wp.altitude_low(),
        alt_high: wp.altitude_high(),
        radius_limit: wp.radius_limit(),
        coord_center: wp.center(),
        aircraft: hits,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
