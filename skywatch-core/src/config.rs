//! Configuration file management for skywatch.
//!
//! Reads `~/.skywatch/config.yaml`: the feed URL, distance unit, output
//! switches, watch points, and notification target groups. Everything is
//! validated here so evaluation never sees a bad watch point.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::geo::DistanceUnit;
use crate::types::ConfigError;
use crate::watchpoint::WatchPoint;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Full, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub units: DistanceUnit,
    pub output: OutputConfig,
    pub notify: bool,
    pub watch_points: Vec<WatchPoint>,
    /// Sorted by group name.
    pub targets: Vec<TargetGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub url: String,
    pub cache_bust: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub json: bool,
    pub table: bool,
}

/// Where one notification goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetUrl {
    /// `http(s)://…`: JSON POST.
    Webhook(String),
    /// `discord://id/token`: Discord webhook.
    Discord { id: String, token: String },
    /// `log://`: write the message to the log only.
    Log,
}

impl TargetUrl {
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            return Some(TargetUrl::Webhook(url.to_string()));
        }
        if let Some(rest) = url.strip_prefix("discord://") {
            let (id, token) = rest.trim_end_matches('/').split_once('/')?;
            if id.is_empty() || token.is_empty() || token.contains('/') {
                return None;
            }
            return Some(TargetUrl::Discord {
                id: id.to_string(),
                token: token.to_string(),
            });
        }
        if url == "log://" {
            return Some(TargetUrl::Log);
        }
        None
    }
}

/// Notification settings for the watch point with the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroup {
    pub name: String,
    pub urls: Vec<TargetUrl>,
    pub title: String,
    pub message: String,
}

impl Config {
    /// Target groups whose name matches a watch point, sorted by name.
    pub fn active_targets(&self) -> impl Iterator<Item = &TargetGroup> {
        self.targets
            .iter()
            .filter(|t| self.watch_points.iter().any(|wp| wp.name() == t.name))
    }
}

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    feed: RawFeed,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    output: RawOutput,
    #[serde(default = "default_true")]
    notify: bool,
    #[serde(default)]
    watch_points: Vec<RawWatchPoint>,
    #[serde(default)]
    targets: BTreeMap<String, RawTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFeed {
    url: String,
    #[serde(default = "default_true")]
    cache_bust: bool,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    #[serde(default = "default_true")]
    json: bool,
    #[serde(default)]
    table: bool,
}

impl Default for RawOutput {
    fn default() -> Self {
        RawOutput {
            json: true,
            table: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWatchPoint {
    name: String,
    lat: f64,
    lon: f64,
    alt_low: i32,
    alt_high: i32,
    radius: f64,
    #[serde(default)]
    friendly_name: Option<String>,
    #[serde(default)]
    callsign_patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    urls: Vec<String>,
    title: String,
    message: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Get the config directory path (`~/.skywatch/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".skywatch")
}

/// Get the default config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load and validate the config at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text)
}

/// Parse and validate config text.
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(text)?;

    if raw.feed.url.trim().is_empty() {
        return Err(ConfigError::FeedUrl);
    }

    let units = match raw.units.as_deref() {
        Some(u) => u.parse()?,
        None => DistanceUnit::default(),
    };

    let mut seen = HashSet::new();
    let mut watch_points = Vec::with_capacity(raw.watch_points.len());
    for wp in raw.watch_points {
        if !seen.insert(wp.name.clone()) {
            return Err(ConfigError::DuplicateWatchPoint(wp.name));
        }
        let friendly = wp.friendly_name.unwrap_or_else(|| wp.name.clone());
        watch_points.push(WatchPoint::new(
            wp.name,
            (wp.lat, wp.lon),
            wp.alt_low,
            wp.alt_high,
            wp.radius,
            friendly,
            &wp.callsign_patterns,
        )?);
    }

    let mut targets = Vec::with_capacity(raw.targets.len());
    for (name, target) in raw.targets {
        let mut urls = Vec::with_capacity(target.urls.len());
        for url in &target.urls {
            match TargetUrl::parse(url) {
                Some(t) => urls.push(t),
                None => {
                    return Err(ConfigError::TargetUrl {
                        group: name,
                        url: url.clone(),
                    })
                }
            }
        }
        if !seen.contains(&name) {
            warn!("target group '{name}' has no matching watch point and will never fire");
        }
        targets.push(TargetGroup {
            name,
            urls,
            title: target.title,
            message: target.message,
        });
    }

    Ok(Config {
        feed: FeedConfig {
            url: raw.feed.url,
            cache_bust: raw.feed.cache_bust,
            timeout_secs: raw.feed.timeout_secs,
        },
        units,
        output: OutputConfig {
            json: raw.output.json,
            table: raw.output.table,
        },
        notify: raw.notify,
        watch_points,
        targets,
    })
}

/// Sample config written by `skywatch init`.
pub const SAMPLE_CONFIG: &str = r#"# skywatch configuration

feed:
  # dump1090 / SkyAware aircraft.json
  url: "http://localhost:8080/data/aircraft.json"
  cache_bust: true
  timeout_secs: 10

# Unit for every radius and reported distance: km, mi, or nm
units: km

output:
  json: true
  table: false

notify: true

watch_points:
  - name: KRDU
    lat: 35.879204
    lon: -78.787162
    alt_low: 0
    alt_high: 1000000
    radius: 30
    friendly_name: "RDU Airport"
    callsign_patterns: []

# Group names must match a watch point name
targets:
  KRDU:
    urls:
      - "log://"
    title: "Aircraft Alert"
    message: "Aircraft $hex ($flight) is near by!  It is $distance km away at $altitude ft"
"#;

/// Write `SAMPLE_CONFIG` to `path`, creating parent directories.
pub fn write_sample(path: &Path, force: bool) -> Result<(), ConfigError> {
    let display = path.display().to_string();
    if path.exists() && !force {
        return Err(ConfigError::Exists(display));
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: display.clone(),
            source,
        })?;
    }
    std::fs::write(path, SAMPLE_CONFIG).map_err(|source| ConfigError::Write {
        path: display,
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
