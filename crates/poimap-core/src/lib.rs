pub mod app_config;
pub mod config;
pub mod geometry;
pub mod maps;
pub mod poi;
pub mod rfc;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use maps::{MapConfig, MapSummary, DEFAULT_CENTER, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
pub use poi::{Category, Coordinate, MapRef, OpeningHours, Poi};
pub use rfc::{ChangeRfc, SuggestionRfc};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
