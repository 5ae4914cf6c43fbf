//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file overlaid with `PRESENCE__`-prefixed environment
//! variables. Every field has a built-in default, so a missing file, a
//! missing section or a missing key all degrade to defaults.
//!
//! Settings are read once at engine start; changing them requires a new
//! engine.

pub mod bus;
pub mod display;
pub mod focus;
pub mod logging;
pub mod notifications;
pub mod presence;

use serde::{Deserialize, Serialize};

use self::bus::BusConfig;
use self::display::DisplayConfig;
use self::focus::FocusConfig;
use self::logging::LoggingConfig;
use self::notifications::NotificationsConfig;
use self::presence::PresenceConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides, e.g.
/// `PRESENCE__PRESENCE__HEARTBEAT_INTERVAL_SECONDS=15`.
const ENV_PREFIX: &str = "PRESENCE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Liveness windows and polling intervals.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Session clock (focus) settings.
    #[serde(default)]
    pub focus: FocusConfig,
    /// Per-category notification toggles.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Display projection settings.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Event bus selection.
    #[serde(default)]
    pub bus: BusConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file plus the environment.
    ///
    /// When `path` is given the file must exist.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config.try_deserialize().map_err(|e| {
            AppError::configuration(format!(
                "Failed to deserialize config from {}: {e}",
                source_name(path)
            ))
        })
    }

    /// Load configuration, falling back to built-in defaults on any failure.
    ///
    /// Degraded presence is preferable to no presence, so a broken settings
    /// source never stops the engine from starting.
    pub fn load_or_default(path: Option<&str>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    source = source_name(path),
                    error = %e,
                    "Settings rejected; every presence setting falls back to its default"
                );
                Self::default()
            }
        }
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

fn source_name(path: Option<&str>) -> &str {
    path.unwrap_or("environment")
}
