//! Snapshot provider: fetches `aircraft.json` over HTTP or reads it from disk.

use std::io::Read;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;
use thiserror::Error;

use skywatch_core::Snapshot;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("feed is not valid aircraft JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Append a `_=<timestamp>` query parameter so caches in front of the
/// feeder never hand back a stale document.
pub fn cache_bust_url(url: &str, timestamp: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}_={timestamp}")
}

/// GET the feed and decode it.
pub async fn fetch_snapshot(
    url: &str,
    timeout_secs: u64,
    cache_bust: bool,
) -> Result<Snapshot, FeedError> {
    let url = if cache_bust {
        cache_bust_url(url, now_secs())
    } else {
        url.to_string()
    };
    debug!("Generated URL: {url}");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let body = response.bytes().await?;
    let snapshot: Snapshot = serde_json::from_slice(&body)?;
    debug!(
        "Loaded aircraft data: {} aircraft, {} bytes",
        snapshot.aircraft.len(),
        body.len()
    );
    Ok(snapshot)
}

/// Read a snapshot from a file, or stdin when `path` is `-`.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, FeedError> {
    let display = path.display().to_string();
    let io_err = |source: std::io::Error| FeedError::Io {
        path: display.clone(),
        source,
    };

    let text = if path.to_str() == Some("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(io_err)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(io_err)?
    };

    let snapshot: Snapshot = serde_json::from_str(&text)?;
    debug!("Loaded {} aircraft from {display}", snapshot.aircraft.len());
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
