// navball_core/src/error.rs

use thiserror::Error;

/// Every failure the navball pipeline reports to its caller.
///
/// Missing or malformed telemetry is deliberately absent from this list: a
/// frame without a usable sample is a normal frame, not an error.
#[derive(Debug, Error)]
pub enum NavballError {
    /// The render engine could not create one of the scene objects. Fatal for
    /// the panel; it is never retried.
    #[error("scene could not be created: {0}")]
    SceneUnavailable(String),

    /// A callback arrived after the panel was torn down.
    #[error("panel has been unmounted")]
    Unmounted,

    /// The configuration UI sent an action for a field the panel does not expose.
    #[error("unknown setting path '{0}'")]
    UnknownSetting(String),

    #[error("invalid value for setting '{path}': {reason}")]
    InvalidSettingValue { path: String, reason: String },
}
