//! Target normalization: turning input lines into fully-qualified addresses.
//!
//! Each non-blank input line is either a bare identifier (for example a DOI
//! such as `10.1000/182`) or a full address that already starts with the
//! configured prefix. Bare identifiers are joined onto the prefix with a `/`;
//! full addresses pass through unchanged, so prefixing is idempotent.
//!
//! # Example
//!
//! ```
//! use handlefetch::target::Target;
//!
//! let prefix = "http://api.example/handles";
//! let target = Target::from_line("10.1/182", prefix).unwrap();
//! assert_eq!(target.as_str(), "http://api.example/handles/10.1/182");
//!
//! let again = Target::from_line(target.as_str(), prefix).unwrap();
//! assert_eq!(again, target);
//! ```

mod error;

pub use error::TargetError;

use std::fmt;

use url::Url;

/// Default base endpoint for handle lookups.
pub const DEFAULT_PREFIX: &str = "http://doi.org/api/handles";

/// A resolved, fully-qualified request address derived from one input line.
///
/// Immutable once constructed; consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
}

impl Target {
    /// Normalizes one input line against `prefix`.
    ///
    /// Surrounding whitespace is trimmed first. Lines that already start with
    /// `prefix` are used verbatim; anything else becomes `prefix + "/" + line`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Blank`] for empty lines and
    /// [`TargetError::Malformed`] when the joined address is not a valid
    /// `http`/`https` URL with a host.
    pub fn from_line(line: &str, prefix: &str) -> Result<Self, TargetError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(TargetError::Blank);
        }

        let address = if line.starts_with(prefix) {
            line.to_string()
        } else {
            format!("{prefix}/{line}")
        };

        let url = Url::parse(&address).map_err(|e| TargetError::malformed(&address, e))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(TargetError::unsupported_scheme(&address, other)),
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(TargetError::malformed(&address, "URL has no host"));
        }

        Ok(Self { url })
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
