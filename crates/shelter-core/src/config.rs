use crate::app_config::{AppConfig, Environment};
use crate::geo::GeoPoint;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u8 = |var: &str, default: &str| -> Result<u8, ConfigError> {
        or_default(var, default)
            .parse::<u8>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base_url = require("SHELTER_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "SHELTER_API_BASE_URL",
            format!("expected an http(s) URL, got '{api_base_url}'"),
        ));
    }

    let env = parse_environment(&or_default("SHELTER_ENV", "development"));
    let log_level = or_default("SHELTER_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("SHELTER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SHELTER_USER_AGENT", "shelter-finder/0.1");
    let location_timeout_secs = parse_u64("SHELTER_LOCATION_TIMEOUT_SECS", "10")?;
    let nearest_limit = parse_u32("SHELTER_NEAREST_LIMIT", "10")?;
    let focus_zoom = parse_u8("SHELTER_FOCUS_ZOOM", "3")?;
    let default_center = parse_point(&or_default("SHELTER_DEFAULT_CENTER", "37.5665,126.9780"))
        .map_err(|reason| invalid("SHELTER_DEFAULT_CENTER", reason))?;
    let map_link_base = or_default("SHELTER_MAP_LINK_BASE", "https://map.kakao.com/link")
        .trim_end_matches('/')
        .to_string();

    if nearest_limit == 0 {
        return Err(invalid("SHELTER_NEAREST_LIMIT", "must be at least 1".to_string()));
    }

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        request_timeout_secs,
        user_agent,
        location_timeout_secs,
        nearest_limit,
        focus_zoom,
        default_center,
        map_link_base,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Parse `"<lat>,<lng>"` into a validated point.
fn parse_point(raw: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected '<lat>,<lng>', got '{raw}'"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let lng = lng.trim().parse::<f64>().map_err(|e| e.to_string())?;
    GeoPoint::new(lat, lng).map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
