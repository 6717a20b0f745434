// navball_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod error;
pub mod extraction;
pub mod frames;
pub mod host;
pub mod messages;
pub mod panel;
pub mod prelude;
pub mod scene;
pub mod subscription;

#[cfg(test)]
pub(crate) mod testing;
