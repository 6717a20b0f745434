// navball_sim/examples/01_live_navball.rs

//! A live navball driven by a simulated vehicle.
//!
//! This example demonstrates how to:
//! 1. Parse the command line and load the application settings.
//! 2. Set up the core Bevy application and plugins.
//! 3. Add the `NavballSimulationPlugin`, which mounts the panel and feeds it telemetry.
//!
//! Press `O` to cycle the orientation topic and `H` to cycle the heading topic.
//!
//! To run this example:
//! `cargo run --example 01_live_navball -- --settings navball.toml`

// --- Bevy Imports ---
use bevy::{log::LogPlugin, prelude::*};
use clap::Parser;

// --- Project-Specific Imports ---
use navball_sim::cli::Cli;
use navball_sim::simulation::config::AppSettings;
use navball_sim::NavballSimulationPlugin;

fn main() {
    // --- 1. Load Settings ---
    let cli = Cli::parse();
    let settings = match AppSettings::load(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::new();

    // --- 2. Add Core Bevy Plugins & Resources ---
    app.add_plugins(
        DefaultPlugins
            .set(LogPlugin {
                level: bevy::log::Level::INFO,
                // Keep the renderer quiet and our own crates verbose.
                filter: "info,wgpu_core=error,wgpu_hal=error,navball_sim=debug,navball_core=debug"
                    .to_string(),
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: settings.window_title.clone(),
                    ..default()
                }),
                ..default()
            }),
    )
    .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)))
    .insert_resource(settings)
    .insert_resource(cli);

    // --- 3. Add the Navball Plugin ---
    app.add_plugins(NavballSimulationPlugin);

    // --- 4. Run the App ---
    app.run();
}
