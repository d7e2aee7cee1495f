pub mod app_config;
pub mod backend;
pub mod config;
pub mod geo;
pub mod shelter;

pub use app_config::{AppConfig, Environment};
pub use backend::{BackendFailure, SearchKind, ShelterBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, GeoBounds, GeoError, GeoPoint, EARTH_RADIUS_KM};
pub use shelter::ShelterRecord;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
