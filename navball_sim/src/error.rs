// navball_sim/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures on the host side of the panel: settings and state files.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to load '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("invalid settings: {0}")]
    Settings(#[source] Box<figment::Error>),

    #[error("failed to encode panel state: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
