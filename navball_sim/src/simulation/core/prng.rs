// navball_sim/src/simulation/core/prng.rs

use bevy::prelude::Resource;
use rand_chacha::ChaCha8Rng;

/// A newtype wrapper around `ChaCha8Rng` to make it a Bevy Resource.
/// Every bit of simulated sensor noise is drawn from this one generator.
#[derive(Resource)]
pub struct SimulationRng(pub ChaCha8Rng);
