use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://10.0.2.2:5006/api";
pub const DEFAULT_MAP_STYLE_URL: &str =
    "https://raw.githubusercontent.com/go2garret/maps/main/src/assets/json/openStreetMap.json";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
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
/// Returns `ConfigError` if a value is present but malformed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain
/// `HashMap` instead of mutating global state.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("POIMAP_ENV", "development"))?;

    let api_base_url = or_default("POIMAP_API_BASE_URL", DEFAULT_API_BASE_URL);
    if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "POIMAP_API_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{api_base_url}'"),
        });
    }

    let log_level = or_default("POIMAP_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("POIMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("POIMAP_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("POIMAP_RETRY_BACKOFF_BASE_MS", "500")?;
    let poi_refetch_interval_secs = parse_u64("POIMAP_POI_REFETCH_INTERVAL_SECS", "60")?;
    if poi_refetch_interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "POIMAP_POI_REFETCH_INTERVAL_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let map_style_url = or_default("POIMAP_MAP_STYLE_URL", DEFAULT_MAP_STYLE_URL);
    let emulator_host = or_default("POIMAP_EMULATOR_HOST", "10.0.2.2");

    Ok(AppConfig {
        env,
        api_base_url,
        log_level,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        poi_refetch_interval_secs,
        map_style_url,
        emulator_host,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POIMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
