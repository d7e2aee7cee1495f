use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Root URL of the shelter backend, e.g. `http://localhost:8080`.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Longest wait for a position fix before the attempt counts as timed out.
    pub location_timeout_secs: u64,
    /// Result count requested by nearest-shelter queries.
    pub nearest_limit: u32,
    /// Zoom level applied when a shelter is focused from the list.
    pub focus_zoom: u8,
    /// Where the map starts before any user location is known.
    pub default_center: GeoPoint,
    /// Base of outbound map application links.
    pub map_link_base: String,
}
