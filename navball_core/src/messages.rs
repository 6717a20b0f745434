// navball_core/src/messages.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =========================================================================
// == Host-Supplied Data ==
// =========================================================================

/// A named telemetry stream as advertised by the render host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    /// The schema identifier of the records published on this topic,
    /// e.g. `"Quaternion"` or `"Vector3"`.
    pub schema: String,
}

impl Topic {
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
        }
    }
}

/// A single decoded record delivered by the host.
///
/// The payload is kept as an opaque structured value; samples are read out of
/// it field by field when (and only when) the panel needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub topic: String,
    pub payload: Value,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

/// Everything the host hands over for one update tick.
///
/// A `None` field means "unchanged since the previous tick": the host only
/// sends the parts of the render state that actually changed.
#[derive(Debug, Clone, Default)]
pub struct FrameBatch {
    pub topics: Option<Vec<Topic>>,
    pub messages: Option<Vec<Message>>,
}

impl FrameBatch {
    pub fn new(topics: Option<Vec<Topic>>, messages: Option<Vec<Message>>) -> Self {
        Self { topics, messages }
    }

    /// A tick that only carries messages.
    pub fn messages(messages: Vec<Message>) -> Self {
        Self {
            topics: None,
            messages: Some(messages),
        }
    }
}

// =========================================================================
// == Decoded Samples ==
// =========================================================================

/// An attitude sample as published on an orientation topic.
///
/// Expected to be a unit quaternion. It is never re-normalized here; whatever
/// the source publishes is what gets displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl OrientationSample {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Reads the four numeric fields out of a message payload.
    /// Extra fields are ignored; a missing or non-numeric field yields `None`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        Self::deserialize(payload).ok()
    }
}

/// A horizontal direction sample. Only `x` and `y` carry meaning; `z` is
/// accepted but ignored, so payloads without it decode as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingSample {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl HeadingSample {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_payload(payload: &Value) -> Option<Self> {
        Self::deserialize(payload).ok()
    }
}
