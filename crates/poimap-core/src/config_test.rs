use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "POIMAP_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.api_base_url, "http://10.0.2.2:5006/api");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.max_retries, 3);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.poi_refetch_interval_secs, 60);
    assert_eq!(cfg.map_style_url, DEFAULT_MAP_STYLE_URL);
    assert_eq!(cfg.emulator_host, "10.0.2.2");
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("POIMAP_ENV", "production");
    map.insert("POIMAP_API_BASE_URL", "https://poi.example.com/api");
    map.insert("POIMAP_MAX_RETRIES", "0");
    map.insert("POIMAP_POI_REFETCH_INTERVAL_SECS", "15");
    map.insert("POIMAP_EMULATOR_HOST", "192.168.1.20");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.api_base_url, "https://poi.example.com/api");
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.poi_refetch_interval_secs, 15);
    assert_eq!(cfg.emulator_host, "192.168.1.20");
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = HashMap::new();
    map.insert("POIMAP_API_BASE_URL", "ftp://poi.example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POIMAP_API_BASE_URL"),
        "expected InvalidEnvVar(POIMAP_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("POIMAP_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POIMAP_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(POIMAP_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_refetch_interval() {
    let mut map = HashMap::new();
    map.insert("POIMAP_POI_REFETCH_INTERVAL_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POIMAP_POI_REFETCH_INTERVAL_SECS"),
        "expected InvalidEnvVar(POIMAP_POI_REFETCH_INTERVAL_SECS), got: {result:?}"
    );
}
