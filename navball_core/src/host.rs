// navball_core/src/host.rs

use crate::config::{PanelConfig, SettingsTree};

/// The contract the surrounding application fulfils for a navball panel.
///
/// The host drives the panel (it calls `NavballPanel::on_frame` once per
/// tick); this trait is the other direction, the requests the panel makes of
/// the host. The Bevy adapter implements it, as does a mock for testing.
pub trait RenderHost {
    /// Requests messages for exactly these topics in future frame batches.
    /// Repeating the same list must be harmless.
    fn subscribe(&mut self, topics: &[String]);

    /// Persists the panel configuration. Called synchronously after every change.
    fn save_state(&mut self, config: &PanelConfig);

    /// The configuration saved by a previous session, if any.
    fn restore_state(&self) -> Option<PanelConfig>;

    /// Publishes a fresh description of the settings form.
    fn update_settings(&mut self, tree: SettingsTree);
}
