//! skywatch-core: geofence evaluation and alert aggregation for aircraft feeds.
//!
//! No async, no network. Given an already decoded `aircraft.json` snapshot and
//! a set of watch points, decides which aircraft are inside which geofence and
//! renders the alert text. The `skywatch` binary does the fetching and sending.

pub mod aircraft;
pub mod alert;
pub mod config;
pub mod geo;
pub mod matcher;
pub mod template;
pub mod types;
pub mod watchpoint;

// Re-export commonly used types at crate root
pub use aircraft::{normalize, Aircraft, FeedEntry, RawAircraft, Snapshot};
pub use alert::{aggregate, aggregate_with_stats, AircraftHit, AlertRecord, AlertReport};
pub use config::Config;
pub use geo::{distance, DistanceUnit};
pub use matcher::{evaluate, MatchResult};
pub use template::{render, Notification, Template, TemplateError};
pub use types::*;
pub use watchpoint::WatchPoint;
