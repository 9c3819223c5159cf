use crate::app_config::AppConfig;
use crate::ConfigError;

/// Upper bound on keywords per trends request; the upstream rejects larger payloads.
const MAX_TRENDS_BATCH_SIZE: usize = 5;
/// Upper bound on the spacing between trends requests.
const MAX_TRENDS_MIN_DELAY_MS: u64 = 300_000;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let log_level = or_default("TRENDSEO_LOG_LEVEL", "info");
    let market_path = optional("TRENDSEO_MARKET_PATH").map(PathBuf::from);

    let trends_base_url = or_default("TRENDSEO_TRENDS_BASE_URL", "http://localhost:8085")
        .trim_end_matches('/')
        .to_string();
    let trends_geo = or_default("TRENDSEO_TRENDS_GEO", "DK");
    let trends_timeframe = or_default("TRENDSEO_TRENDS_TIMEFRAME", "today 12-m");
    let trends_hl = or_default("TRENDSEO_TRENDS_HL", "da-DK");

    let trends_batch_size = parse_usize("TRENDSEO_TRENDS_BATCH_SIZE", "3")?;
    if !(1..=MAX_TRENDS_BATCH_SIZE).contains(&trends_batch_size) {
        return Err(invalid(
            "TRENDSEO_TRENDS_BATCH_SIZE",
            format!("must be between 1 and {MAX_TRENDS_BATCH_SIZE}, got {trends_batch_size}"),
        ));
    }

    let trends_min_delay_ms = parse_u64("TRENDSEO_TRENDS_MIN_DELAY_MS", "3000")?;
    if trends_min_delay_ms > MAX_TRENDS_MIN_DELAY_MS {
        return Err(invalid(
            "TRENDSEO_TRENDS_MIN_DELAY_MS",
            format!("must be at most {MAX_TRENDS_MIN_DELAY_MS}, got {trends_min_delay_ms}"),
        ));
    }
    let trends_timeout_secs = parse_u64("TRENDSEO_TRENDS_TIMEOUT_SECS", "20")?;
    let trends_max_retries = parse_u32("TRENDSEO_TRENDS_MAX_RETRIES", "3")?;
    let trends_backoff_base_ms = parse_u64("TRENDSEO_TRENDS_BACKOFF_BASE_MS", "1000")?;
    let trends_cache = parse_bool("TRENDSEO_TRENDS_CACHE", "false")?;
    let display_limit = parse_usize("TRENDSEO_DISPLAY_LIMIT", "8")?;

    let shopify_store_name = optional("SHOPIFY_STORE_NAME");
    let shopify_admin_token = optional("SHOPIFY_ADMIN_TOKEN");
    let catalog_api_version = or_default("TRENDSEO_CATALOG_API_VERSION", "2023-07");
    let catalog_page_delay_ms = parse_u64("TRENDSEO_CATALOG_PAGE_DELAY_MS", "300")?;
    let catalog_update_tag = or_default("TRENDSEO_CATALOG_UPDATE_TAG", "needs_update");

    Ok(AppConfig {
        log_level,
        market_path,
        trends_base_url,
        trends_geo,
        trends_timeframe,
        trends_hl,
        trends_batch_size,
        trends_min_delay_ms,
        trends_timeout_secs,
        trends_max_retries,
        trends_backoff_base_ms,
        trends_cache,
        display_limit,
        shopify_store_name,
        shopify_admin_token,
        catalog_api_version,
        catalog_page_delay_ms,
        catalog_update_tag,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
