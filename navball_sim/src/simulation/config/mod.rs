// navball_sim/src/simulation/config/mod.rs

//! This module handles loading the application settings and the persisted
//! panel state from disk.

mod state;

pub use state::StateStore;

use bevy::prelude::Resource;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use navball_core::config::PanelSchemas;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::HostError;

// =========================================================================
// == Top-Level Settings Resource ==
// =========================================================================

/// # AppSettings
/// Everything configurable about a navball run that is not the panel's own
/// topic selection. Loaded once at startup from defaults plus an optional
/// TOML file.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    pub window_title: String,
    /// Schema identifiers used to filter the topic dropdowns.
    pub schemas: PanelSchemas,
    pub vehicle: VehicleSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_title: "Navball".to_string(),
            schemas: PanelSchemas::default(),
            vehicle: VehicleSettings::default(),
        }
    }
}

/// Rates and noise of the simulated telemetry source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleSettings {
    /// Optional seed for the noise generator, for repeatable runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub attitude_rate_hz: f32,
    pub imu_rate_hz: f32,
    pub velocity_rate_hz: f32,
    /// Standard deviation of the per-axis attitude noise on the IMU topic.
    pub imu_noise_std_rad: f64,
    /// Messages kept per topic on the telemetry bus.
    pub buffer_capacity: usize,
}

impl Default for VehicleSettings {
    fn default() -> Self {
        Self {
            seed: None,
            attitude_rate_hz: 30.0,
            imu_rate_hz: 100.0,
            velocity_rate_hz: 10.0,
            imu_noise_std_rad: 0.01,
            buffer_capacity: 256,
        }
    }
}

impl AppSettings {
    /// The settings figment: serialized defaults, overridden by `path` if given.
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(AppSettings::default()));
        match path {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, HostError> {
        Self::from_figment(Self::figment(path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, HostError> {
        figment
            .extract()
            .map_err(|e| HostError::Settings(Box::new(e)))
    }
}
