// navball_sim/src/simulation/plugins/mod.rs

pub mod host;
pub mod scene;
pub mod settings_ui;
pub mod vehicle;
