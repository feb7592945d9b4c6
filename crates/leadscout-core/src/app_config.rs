use std::net::SocketAddr;
use std::path::PathBuf;

use crate::phone::Region;

/// Which reachability backend the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationProvider {
    /// Heuristic probe against the public click-to-chat page.
    ClickToChat,
    /// Paid batch verification API (requires `WHAPI_TOKEN`).
    Whapi,
    /// No probing; every number is reported as `unknown`.
    None,
}

impl std::fmt::Display for ValidationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationProvider::ClickToChat => write!(f, "click2chat"),
            ValidationProvider::Whapi => write!(f, "whapi"),
            ValidationProvider::None => write!(f, "none"),
        }
    }
}

#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub default_region: Region,
    pub default_segment: String,
    pub default_volume: usize,
    pub max_volume: usize,
    pub min_discovery_results: usize,
    pub discovery_ceiling: usize,
    pub max_page_visits: usize,
    pub request_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub user_agent: String,
    pub page_delay_ms: u64,
    pub probe_delay_ms: u64,
    pub validation_provider: ValidationProvider,
    pub validate_inline: bool,
    pub whapi_token: Option<String>,
    pub whapi_base_url: String,
    pub places_api_key: Option<String>,
    pub browser_enabled: bool,
    pub browser_headless: bool,
    pub browser_max_pages: usize,
    pub chrome_executable: Option<PathBuf>,
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("default_region", &self.default_region)
            .field("default_segment", &self.default_segment)
            .field("default_volume", &self.default_volume)
            .field("max_volume", &self.max_volume)
            .field("min_discovery_results", &self.min_discovery_results)
            .field("discovery_ceiling", &self.discovery_ceiling)
            .field("max_page_visits", &self.max_page_visits)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("probe_delay_ms", &self.probe_delay_ms)
            .field("validation_provider", &self.validation_provider)
            .field("validate_inline", &self.validate_inline)
            .field(
                "whapi_token",
                &self.whapi_token.as_ref().map(|_| "[redacted]"),
            )
            .field("whapi_base_url", &self.whapi_base_url)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("browser_enabled", &self.browser_enabled)
            .field("browser_headless", &self.browser_headless)
            .field("browser_max_pages", &self.browser_max_pages)
            .field("chrome_executable", &self.chrome_executable)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}
