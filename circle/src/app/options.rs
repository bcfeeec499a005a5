//! Client configuration options

use std::time::Duration;

/// Default Circle API host
pub const DEFAULT_BASE_URL: &str = "https://video.logi.com";

/// Web app origin the API expects on every request
pub const DEFAULT_ORIGIN: &str = "https://circle.logi.com";

/// Largest page the activity listing hands out
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Options for talking to the Circle API
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API base URL
    pub base_url: String,

    /// Value sent in the `Origin` header
    pub origin: String,

    /// Scheme used to reach accessory nodes for live snapshots
    pub node_scheme: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Activities requested per page
    pub page_limit: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            node_scheme: "https".to_string(),
            timeout: Duration::from_secs(30),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ClientOptions {
    /// Options pointed at a different API host, e.g. a local test server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
