// navball_sim/src/simulation/core/simulation_setup.rs

use rand::rngs::OsRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::prelude::*;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::topics::DeliveryCursor;

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // Apps that skip settings loading run on the defaults.
        if !app.world().contains_resource::<AppSettings>() {
            warn!("AppSettings not inserted, using defaults.");
            app.init_resource::<AppSettings>();
        }
        let seed = app.world().resource::<AppSettings>().vehicle.seed;

        // --- 1. Add the Deterministic PRNG Resource ---
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(OsRng).unwrap_or_else(|e| {
                warn!("OS RNG failed ({}), falling back to seed 0.", e);
                ChaCha8Rng::seed_from_u64(0)
            }),
        };
        app.insert_resource(SimulationRng(rng));

        // --- INITIALIZE RESOURCES ---
        app
            // The render host's message store.
            .init_resource::<TelemetryBus>()
            // How far frame delivery has read the bus.
            .init_resource::<DeliveryCursor>();

        // --- CONFIGURE THE FRAME PIPELINE ---
        // Telemetry is published before it is delivered, and the scene mirror
        // and the overlay always see the panel's state from this frame.
        app.configure_sets(
            Update,
            (
                NavballSet::Telemetry,
                NavballSet::Delivery,
                NavballSet::SceneSync,
                NavballSet::Ui,
            )
                .chain(),
        );
    }
}
