use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Navball: a live 3D attitude indicator driven by telemetry topics.
///
/// This struct defines the command-line arguments that can be passed to any
/// binary application that uses the navball simulation library.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional TOML file overriding the application settings.
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Where the panel's topic selection is saved between sessions.
    #[arg(long, default_value = "navball_state.toml")]
    pub state: PathBuf,

    /// Start without restoring or saving the panel state.
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,
}

impl Cli {
    /// The state file to use, or `None` when running ephemeral.
    pub fn state_file(&self) -> Option<PathBuf> {
        (!self.ephemeral).then(|| self.state.clone())
    }
}
