//! User-Agent string for outbound handle API requests.
//!
//! Single source for the project URL and UA format so every request the
//! retrieval engine sends identifies the tool the same way (RFC 9308).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/handlefetch";

/// Default User-Agent for handle API requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("handlefetch/{version} (bulk-handle-resolver; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_contains_project_url_and_version() {
        let ua = default_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert_eq!(
            Some(env!("CARGO_PKG_VERSION")),
            ua.strip_prefix("handlefetch/")
                .and_then(|s| s.split(' ').next()),
            "UA must contain crate version: {ua}"
        );
    }
}
