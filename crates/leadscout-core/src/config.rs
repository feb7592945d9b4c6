use crate::app_config::{AppConfig, ValidationProvider};
use crate::phone::Region;
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// All parsing and validation lives here so tests (and embedders such as the
/// server's route tests) can drive it with a plain `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
#[allow(clippy::too_many_lines)]
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got \"{raw}\""))
            }),
        }
    };

    let bind_addr = or_default("LEADSCOUT_BIND_ADDR", "0.0.0.0:5173")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("LEADSCOUT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("LEADSCOUT_LOG_LEVEL", "info");

    let region_raw = or_default("LEADSCOUT_DEFAULT_REGION", "BR");
    let default_region = Region::from_code(region_raw.trim()).ok_or_else(|| {
        invalid(
            "LEADSCOUT_DEFAULT_REGION",
            format!("unsupported region \"{region_raw}\""),
        )
    })?;

    let default_segment =
        optional("LEADSCOUT_DEFAULT_SEGMENT").unwrap_or_else(|| "empresas".into());

    let max_volume = parse_positive_usize("LEADSCOUT_MAX_VOLUME", "200")?;
    let default_volume = parse_positive_usize("LEADSCOUT_DEFAULT_VOLUME", "50")?.min(max_volume);
    let min_discovery_results = parse_positive_usize("LEADSCOUT_MIN_DISCOVERY_RESULTS", "6")?;
    let discovery_ceiling = parse_positive_usize("LEADSCOUT_DISCOVERY_CEILING", "80")?;
    let max_page_visits = parse_positive_usize("LEADSCOUT_MAX_PAGE_VISITS", "80")?;

    let request_timeout_secs = parse_positive_u64("LEADSCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let page_timeout_secs = parse_positive_u64("LEADSCOUT_PAGE_TIMEOUT_SECS", "45")?;
    let user_agent = optional("LEADSCOUT_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.into());
    let page_delay_ms = parse_u64("LEADSCOUT_PAGE_DELAY_MS", "250")?;
    let probe_delay_ms = parse_u64("LEADSCOUT_PROBE_DELAY_MS", "200")?;

    let validation_provider =
        parse_validation_provider(&or_default("LEADSCOUT_VALIDATION_PROVIDER", "click2chat"))?;
    let validate_inline = parse_bool("LEADSCOUT_VALIDATE_INLINE", false)?;
    let whapi_token = optional("WHAPI_TOKEN");
    let whapi_base_url = optional("WHAPI_BASE_URL")
        .unwrap_or_else(|| "https://gate.whapi.cloud".into())
        .trim_end_matches('/')
        .to_string();
    let places_api_key = optional("GOOGLE_PLACES_API_KEY");

    let browser_enabled = parse_bool("LEADSCOUT_BROWSER_ENABLED", true)?;
    let browser_headless = parse_bool("LEADSCOUT_BROWSER_HEADLESS", true)?;
    let browser_max_pages = parse_positive_usize("LEADSCOUT_BROWSER_MAX_PAGES", "2")?;
    let chrome_executable = optional("CHROME_BIN").map(PathBuf::from);

    let cors_origins = or_default("LEADSCOUT_CORS_ORIGINS", "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    Ok(AppConfig {
        bind_addr,
        log_level,
        default_region,
        default_segment,
        default_volume,
        max_volume,
        min_discovery_results,
        discovery_ceiling,
        max_page_visits,
        request_timeout_secs,
        page_timeout_secs,
        user_agent,
        page_delay_ms,
        probe_delay_ms,
        validation_provider,
        validate_inline,
        whapi_token,
        whapi_base_url,
        places_api_key,
        browser_enabled,
        browser_headless,
        browser_max_pages,
        chrome_executable,
        cors_origins,
    })
}

/// Parse a validation provider name, case-insensitively.
fn parse_validation_provider(s: &str) -> Result<ValidationProvider, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "click2chat" | "clicktochat" => Ok(ValidationProvider::ClickToChat),
        "whapi" => Ok(ValidationProvider::Whapi),
        "none" => Ok(ValidationProvider::None),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADSCOUT_VALIDATION_PROVIDER".to_string(),
            reason: format!("unknown provider \"{other}\" (expected click2chat, whapi or none)"),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
