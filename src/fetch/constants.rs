//! Constants for the fetch module (timeouts, status codes, sentinel).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (60 seconds; handle records are small).
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Placeholder location used whenever no real location is available.
pub const SENTINEL_LOCATION: &str = "NOT_AVAILABLE";

/// Status for request construction failure or exhausted transport retries.
pub const STATUS_REQUEST: &str = "E_REQ";

/// Status for a response body that could not be fully read.
pub const STATUS_READ: &str = "E_READ";

/// Status for a response body or nested value that failed to parse.
pub const STATUS_JSON: &str = "E_JSON";

/// Handle value type tag whose data carries a location.
pub const URL_VALUE_TYPE: &str = "URL";
