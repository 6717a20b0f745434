// navball_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the navball_core prelude so the pure types (`NavballPanel`,
// `RenderHost`, `SceneRenderer`, ...) are one import away.
pub use navball_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::{AppSettings, VehicleSettings};
pub use crate::simulation::core::app_state::NavballSet;
pub use crate::simulation::core::topics::TelemetryBus;
pub use crate::simulation::plugins::host::{BevyHost, NavballPanelResource};
pub use crate::simulation::plugins::scene::MirrorRenderer;
