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

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SHELTER_API_BASE_URL", "http://localhost:8080");
    m
}

#[test]
fn parse_environment_variants() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_fails_without_api_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHELTER_API_BASE_URL"),
        "expected MissingEnvVar(SHELTER_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = full_env();
    map.insert("SHELTER_API_BASE_URL", "localhost:8080");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELTER_API_BASE_URL"),
        "expected InvalidEnvVar(SHELTER_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.api_base_url, "http://localhost:8080");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "shelter-finder/0.1");
    assert_eq!(cfg.location_timeout_secs, 10);
    assert_eq!(cfg.nearest_limit, 10);
    assert_eq!(cfg.focus_zoom, 3);
    assert!((cfg.default_center.latitude - 37.5665).abs() < 1e-9);
    assert!((cfg.default_center.longitude - 126.9780).abs() < 1e-9);
    assert_eq!(cfg.map_link_base, "https://map.kakao.com/link");
}

#[test]
fn build_app_config_overrides() {
    let mut map = full_env();
    map.insert("SHELTER_ENV", "production");
    map.insert("SHELTER_LOCATION_TIMEOUT_SECS", "5");
    map.insert("SHELTER_NEAREST_LIMIT", "25");
    map.insert("SHELTER_FOCUS_ZOOM", "5");
    map.insert("SHELTER_DEFAULT_CENTER", "35.1796, 129.0756");
    map.insert("SHELTER_MAP_LINK_BASE", "https://maps.example.com/link/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.location_timeout_secs, 5);
    assert_eq!(cfg.nearest_limit, 25);
    assert_eq!(cfg.focus_zoom, 5);
    assert!((cfg.default_center.latitude - 35.1796).abs() < 1e-9);
    assert_eq!(cfg.map_link_base, "https://maps.example.com/link");
}

#[test]
fn build_app_config_rejects_invalid_numbers() {
    for var in [
        "SHELTER_REQUEST_TIMEOUT_SECS",
        "SHELTER_LOCATION_TIMEOUT_SECS",
        "SHELTER_NEAREST_LIMIT",
        "SHELTER_FOCUS_ZOOM",
    ] {
        let mut map = full_env();
        map.insert(var, "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { var: ref v, .. }) if v == var),
            "expected InvalidEnvVar({var}), got: {result:?}"
        );
    }
}

#[test]
fn build_app_config_rejects_zero_nearest_limit() {
    let mut map = full_env();
    map.insert("SHELTER_NEAREST_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELTER_NEAREST_LIMIT"),
        "expected InvalidEnvVar(SHELTER_NEAREST_LIMIT), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_bad_default_center() {
    for raw in ["37.5", "abc,127.0", "95.0,127.0"] {
        let mut map = full_env();
        map.insert("SHELTER_DEFAULT_CENTER", raw);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELTER_DEFAULT_CENTER"),
            "expected InvalidEnvVar(SHELTER_DEFAULT_CENTER) for {raw}, got: {result:?}"
        );
    }
}
