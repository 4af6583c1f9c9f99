//! The per-target outcome record and its tab-separated output form.

use std::fmt;

use super::constants::SENTINEL_LOCATION;

/// The classified outcome of resolving one target.
///
/// Produced exactly once per target by the retriever and written exactly once
/// by the sink. `locations` is never empty: when no real location is known it
/// holds the single [`SENTINEL_LOCATION`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// An internal error code (`E_REQ`, `E_READ`, `E_JSON`) or the HTTP status line.
    pub status: String,
    /// The target address.
    pub url: String,
    /// Fetch duration in seconds.
    pub elapsed: f64,
    /// Resolved locations, or the sentinel.
    pub locations: Vec<String>,
    /// Completion time in seconds since the Unix epoch.
    pub timestamp: i64,
}

impl Record {
    /// Creates a record stamped with the current time.
    ///
    /// An empty `locations` is replaced by the sentinel.
    #[must_use]
    pub fn new(
        status: impl Into<String>,
        url: impl Into<String>,
        elapsed: f64,
        locations: Vec<String>,
    ) -> Self {
        let locations = if locations.is_empty() {
            sentinel_locations()
        } else {
            locations
        };
        Self {
            status: status.into(),
            url: url.into(),
            elapsed,
            locations,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Creates a record that carries no locations (failure or non-success status).
    #[must_use]
    pub fn without_locations(
        status: impl Into<String>,
        url: impl Into<String>,
        elapsed: f64,
    ) -> Self {
        Self::new(status, url, elapsed, Vec::new())
    }

    /// Returns true if `status` is a `200` HTTP status line.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status
            .get(..3)
            .and_then(|code| code.parse::<u16>().ok())
            .is_some_and(|code| code == 200)
    }

    /// Returns true if `locations` holds only the sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.locations.len() == 1 && self.locations[0] == SENTINEL_LOCATION
    }
}

/// Returns the one-element sentinel location sequence.
#[must_use]
pub fn sentinel_locations() -> Vec<String> {
    vec![SENTINEL_LOCATION.to_string()]
}

impl fmt::Display for Record {
    /// Renders `status, elapsed, epoch, url, locations` separated by tabs,
    /// with a trailing tab and no newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.4}\t{}\t{}\t{}\t",
            self.status,
            self.elapsed,
            self.timestamp,
            self.url,
            self.locations.join("|")
        )
    }
}
