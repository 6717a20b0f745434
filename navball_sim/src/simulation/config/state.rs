// navball_sim/src/simulation/config/state.rs

use figment::{
    providers::{Format, Toml},
    Figment,
};
use navball_core::config::PanelConfig;
use std::path::{Path, PathBuf};

use crate::error::HostError;

/// The panel's persisted topic selection, kept in a small TOML file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no state has been saved yet.
    pub fn load(&self) -> Result<Option<PanelConfig>, HostError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Figment::new()
            .merge(Toml::file(&self.path))
            .extract()
            .map(Some)
            .map_err(|e| HostError::Load {
                path: self.path.clone(),
                source: Box::new(e),
            })
    }

    pub fn save(&self, config: &PanelConfig) -> Result<(), HostError> {
        let text = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, text).map_err(|source| HostError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
