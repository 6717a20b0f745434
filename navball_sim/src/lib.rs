// navball_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::host::NavballHostPlugin;
use crate::simulation::plugins::scene::SceneMirrorPlugin;
use crate::simulation::plugins::settings_ui::SettingsUiPlugin;
use crate::simulation::plugins::vehicle::SimulatedVehiclePlugin;

// This prelude is for convenience for other files WITHIN the navball_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;
pub mod simulation;

/// The main plugin that brings together all the navball parts.
/// The app only needs to insert `AppSettings` (and optionally `Cli`) and add this.
pub struct NavballSimulationPlugin;

impl Plugin for NavballSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Resources, telemetry bus and the Update set ordering.
            SimulationSetupPlugin,
            // Publishes attitude and velocity telemetry onto the bus.
            SimulatedVehiclePlugin,
            // Mounts the panel and drives it once per frame.
            NavballHostPlugin,
            // Mirrors the panel's scene into Bevy entities.
            SceneMirrorPlugin,
            // Text overlay and hotkeys for the settings form.
            SettingsUiPlugin,
        ));
    }
}
