// navball_sim/src/simulation/core/app_state.rs

use bevy::ecs::schedule::SystemSet;

// =========================================================================
// == Per-Frame Sets (The "Data Flow Graph") ==
// =========================================================================

/// Orders the work done in every `Update`, which is one host tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavballSet {
    /// The simulated vehicle publishes onto the telemetry bus.
    Telemetry,
    /// Resizes and the frame batch reach the panel.
    Delivery,
    /// The panel's scene mirror is copied into Bevy entities.
    SceneSync,
    /// Settings hotkeys are handled and the overlay is redrawn.
    Ui,
}
