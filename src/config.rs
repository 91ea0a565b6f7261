//! # Planner Configuration
//!
//! Settings shared by the `otg` CLI and embedding control loops: the control
//! cycle, default limits applied to jobs that omit them, logging and the
//! waypoint worker.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [control]
//! delta_time = 0.001
//! degrees_of_freedom = 3
//!
//! [limits]
//! max_velocity = [1.0, 1.0, 0.5]
//! max_acceleration = [2.0, 2.0, 1.0]
//! max_jerk = [10.0, 10.0, 5.0]
//!
//! [logging]
//! level = "debug"
//!
//! [offload]
//! queue_depth = 8
//! ```

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::motion::InputParameter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OtgConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub offload: OffloadConfig,
}

/// Control loop timing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Control cycle (s)
    #[serde(default = "default_delta_time")]
    pub delta_time: f64,
    #[serde(default = "default_degrees_of_freedom")]
    pub degrees_of_freedom: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { delta_time: default_delta_time(), degrees_of_freedom: default_degrees_of_freedom() }
    }
}

/// Per-DOF limits used when a job leaves them empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default)]
    pub max_velocity: Vec<f64>,
    #[serde(default)]
    pub max_acceleration: Vec<f64>,
    #[serde(default)]
    pub max_jerk: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_velocity: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_acceleration: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Result<tracing::Level, ConfigError> {
        self.level.parse().map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }
}

/// Waypoint worker settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OffloadConfig {
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self { queue_depth: default_queue_depth() }
    }
}

fn default_delta_time() -> f64 { 0.001 }
fn default_degrees_of_freedom() -> usize { 1 }
fn default_level() -> String { "info".to_string() }
fn default_queue_depth() -> usize { 4 }

impl OtgConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dt = self.control.delta_time;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigError::Invalid(format!("control cycle must be > 0, got {dt}")));
        }
        if self.control.degrees_of_freedom == 0 {
            return Err(ConfigError::Invalid("degrees_of_freedom must be at least 1".into()));
        }
        if self.offload.queue_depth == 0 {
            return Err(ConfigError::Invalid("offload queue_depth must be at least 1".into()));
        }
        self.logging.tracing_level()?;

        let dofs = self.control.degrees_of_freedom;
        let limits = &self.limits;
        let named = [
            ("max_velocity", Some(&limits.max_velocity)),
            ("max_acceleration", Some(&limits.max_acceleration)),
            ("max_jerk", Some(&limits.max_jerk)),
            ("min_velocity", limits.min_velocity.as_ref()),
            ("min_acceleration", limits.min_acceleration.as_ref()),
        ];
        for (name, values) in named {
            let Some(values) = values else { continue };
            if !values.is_empty() && values.len() != dofs {
                return Err(ConfigError::Invalid(format!("{name} has {} entries, expected {dofs}", values.len())));
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }
        let maxima = [&limits.max_velocity, &limits.max_acceleration, &limits.max_jerk];
        if maxima.iter().any(|values| values.iter().any(|&v| v < 0.0)) {
            return Err(ConfigError::Invalid("maximum limits must not be negative".into()));
        }
        Ok(())
    }

    /// Fills the limits a job left empty with the configured defaults.
    pub fn apply_limits(&self, input: &mut InputParameter) {
        let limits = &self.limits;
        if input.max_velocity.is_empty() {
            input.max_velocity.clone_from(&limits.max_velocity);
        }
        if input.max_acceleration.is_empty() {
            input.max_acceleration.clone_from(&limits.max_acceleration);
        }
        if input.max_jerk.is_empty() {
            input.max_jerk.clone_from(&limits.max_jerk);
        }
        if input.min_velocity.is_none() {
            input.min_velocity.clone_from(&limits.min_velocity);
        }
        if input.min_acceleration.is_none() {
            input.min_acceleration.clone_from(&limits.min_acceleration);
        }
    }
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: impl AsRef<Path>) -> Result<OtgConfig, ConfigError> {
    let path = path.as_ref();
    let config: OtgConfig = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path.display(), e);
            return Err(ConfigError::Io(e));
        }
    };
    config.validate()?;
    Ok(config)
}
