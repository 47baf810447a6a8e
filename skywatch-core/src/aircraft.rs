//! Feed snapshot types and the aircraft record normalizer.
//!
//! `Snapshot` mirrors the `aircraft.json` document served by dump1090 and
//! SkyAware. Only the fields evaluation needs are decoded; everything else
//! in the document is ignored. An entry whose known fields carry the wrong
//! JSON type is kept as `FeedEntry::Invalid` so the rest of the document
//! still evaluates.

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::types::{MalformedRecord, BLANK_FLIGHT};

/// One polled feed document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    /// Feed clock, epoch seconds.
    #[serde(default)]
    pub now: Option<f64>,
    /// Total Mode S messages received by the feeder.
    #[serde(default)]
    pub messages: Option<u64>,
    #[serde(default)]
    pub aircraft: Vec<FeedEntry>,
}

/// One element of the `aircraft` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedEntry {
    Record(RawAircraft),
    Invalid(IgnoredAny),
}

impl FeedEntry {
    /// The decoded record, or `InvalidFields` when the entry did not decode.
    pub fn record(&self) -> Result<&RawAircraft, MalformedRecord> {
        match self {
            FeedEntry::Record(raw) => Ok(raw),
            FeedEntry::Invalid(_) => Err(MalformedRecord::InvalidFields),
        }
    }
}

/// One aircraft entry as it appears in the feed. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAircraft {
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub alt_baro: Option<RawAltitude>,
}

/// `alt_baro` is a number of feet, or the string `"ground"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAltitude {
    Feet(f64),
    Label(String),
}

impl RawAltitude {
    /// Altitude in feet as reported. `"ground"` is 0; other labels carry no
    /// altitude.
    pub fn feet(&self) -> Option<f64> {
        match self {
            RawAltitude::Feet(ft) if ft.is_finite() => Some(*ft),
            RawAltitude::Feet(_) => None,
            RawAltitude::Label(label) if label.eq_ignore_ascii_case("ground") => Some(0.0),
            RawAltitude::Label(_) => None,
        }
    }
}

/// A normalized aircraft record. Downstream checks never branch on a missing
/// callsign or identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Aircraft {
    pub hex: String,
    pub flight: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt_baro: Option<f64>,
}

impl Aircraft {
    /// Position, only when both coordinates are known.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Fill defaulted fields of a raw feed entry.
///
/// A missing `flight` becomes eight spaces. A missing or empty `hex` makes
/// the record unusable.
pub fn normalize(entry: &FeedEntry) -> Result<Aircraft, MalformedRecord> {
    let raw = entry.record()?;
    let hex = match raw.hex.as_deref() {
        Some(h) if !h.trim().is_empty() => h.to_string(),
        _ => return Err(MalformedRecord::MissingHex),
    };

    Ok(Aircraft {
        hex,
        flight: raw
            .flight
            .clone()
            .unwrap_or_else(|| BLANK_FLIGHT.to_string()),
        lat: raw.lat,
        lon: raw.lon,
        alt_baro: raw.alt_baro.as_ref().and_then(RawAltitude::feet),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> FeedEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_full_record() {
        let ac = normalize(&raw(json!({
            "hex": "a1b2c3",
            "flight": "DAL123  ",
            "lat": 35.88,
            "lon": -78.79,
            "alt_baro": 3000
        })))
        .unwrap();
        assert_eq!(ac.hex, "a1b2c3");
        assert_eq!(ac.flight, "DAL123  ");
        assert_eq!(ac.position(), Some((35.88, -78.79)));
        assert_eq!(ac.alt_baro, Some(3000.0));
    }

    #[test]
    fn test_missing_flight_is_blank() {
        let ac = normalize(&raw(json!({"hex": "A1B2C3"}))).unwrap();
        assert_eq!(ac.flight, "        ");
        assert_eq!(ac.lat, None);
        assert_eq!(ac.alt_baro, None);
    }

    #[test]
    fn test_missing_hex_is_malformed() {
        let err = normalize(&raw(json!({"flight": "DAL1", "lat": 1.0, "lon": 2.0}))).unwrap_err();
        assert_eq!(err, MalformedRecord::MissingHex);
        assert!(normalize(&raw(json!({"hex": ""}))).is_err());
    }

    #[test]
    fn test_partial_position() {
        let ac = normalize(&raw(json!({"hex": "abc123", "lat": 35.0}))).unwrap();
        assert_eq!(ac.position(), None);
    }

    #[test]
    fn test_ground_altitude() {
        let ac = normalize(&raw(json!({"hex": "abc123", "alt_baro": "ground"}))).unwrap();
        assert_eq!(ac.alt_baro, Some(0.0));
    }

    #[test]
    fn test_unknown_altitude_label() {
        let ac = normalize(&raw(json!({"hex": "abc123", "alt_baro": "n/a"}))).unwrap();
        assert_eq!(ac.alt_baro, None);
    }

    #[test]
    fn test_fractional_altitude_kept() {
        let ac = normalize(&raw(json!({"hex": "abc123", "alt_baro": 2999.6}))).unwrap();
        assert_eq!(ac.alt_baro, Some(2999.6));
    }

    #[test]
    fn test_wrong_field_type_is_malformed() {
        for value in [
            json!({"hex": 12345, "lat": 35.88, "lon": -78.79}),
            json!({"hex": "abc123", "lat": "north"}),
            json!({"hex": "abc123", "flight": ["DAL1"]}),
            json!("a1b2c3"),
        ] {
            let entry = raw(value.clone());
            assert!(matches!(entry, FeedEntry::Invalid(_)), "{value}");
            assert_eq!(normalize(&entry).unwrap_err(), MalformedRecord::InvalidFields);
        }
    }

    #[test]
    fn test_snapshot_ignores_extra_fields() {
        let snap: Snapshot = serde_json::from_value(json!({
            "now": 1700000000.5,
            "messages": 123456,
            "aircraft": [
                {"hex": "a1b2c3", "squawk": "1200", "rssi": -20.5, "seen": 0.1},
                {"flight": "NOHEX   "}
            ]
        }))
        .unwrap();
        assert_eq!(snap.now, Some(1700000000.5));
        assert_eq!(snap.messages, Some(123456));
        assert_eq!(snap.aircraft.len(), 2);
        assert!(snap.aircraft[1].record().unwrap().hex.is_none());
    }

    #[test]
    fn test_snapshot_survives_bad_entry() {
        let snap: Snapshot = serde_json::from_value(json!({
            "aircraft": [
                {"hex": 12345, "lat": 35.88, "lon": -78.79, "alt_baro": 3000},
                {"hex": "a1b2c3", "lat": 35.88, "lon": -78.79, "alt_baro": 3000}
            ]
        }))
        .unwrap();
        assert_eq!(snap.aircraft.len(), 2);
        assert!(normalize(&snap.aircraft[0]).is_err());
        assert_eq!(normalize(&snap.aircraft[1]).unwrap().hex, "a1b2c3");
    }

    #[test]
    fn test_empty_document() {
        let snap: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snap.aircraft.is_empty());
    }
}
