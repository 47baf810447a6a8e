//! Shared error enums and small value types for skywatch-core.

use thiserror::Error;

/// A watch point definition that cannot be used for evaluation.
#[derive(Debug, Error)]
pub enum WatchPointError {
    #[error("watch point name must not be empty")]
    EmptyName,
    #[error("watch point '{name}': altitude band {low}..{high} is empty (low must be below high)")]
    AltitudeBand { name: String, low: i32, high: i32 },
    #[error("watch point '{name}': radius must be a positive number, got {radius}")]
    Radius { name: String, radius: f64 },
    #[error("watch point '{name}': latitude {lat} outside -90..=90")]
    Latitude { name: String, lat: f64 },
    #[error("watch point '{name}': longitude {lon} outside -180..=180")]
    Longitude { name: String, lon: f64 },
    #[error("watch point '{name}': invalid callsign pattern '{pattern}': {source}")]
    Pattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors produced while loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {0} already exists (use --force to overwrite)")]
    Exists(String),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    WatchPoint(#[from] WatchPointError),
    #[error("duplicate watch point name '{0}'")]
    DuplicateWatchPoint(String),
    #[error("unknown distance unit '{0}' (expected km, mi, or nm)")]
    Unit(String),
    #[error("target group '{group}': unsupported target URL '{url}'")]
    TargetUrl { group: String, url: String },
    #[error("feed url must not be empty")]
    FeedUrl,
}

/// A raw feed record that cannot take part in evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("aircraft record has no hex identifier")]
    MissingHex,
    #[error("aircraft record has a field of the wrong type")]
    InvalidFields,
}

/// Callsign used when the feed does not report one. Eight spaces, the width
/// of an ADS-B identification field.
pub const BLANK_FLIGHT: &str = "        ";

/// (latitude, longitude) in decimal degrees.
pub type LatLon = (f64, f64);

/// Round to 3 decimal places, the precision every reported distance uses.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
