// navball_core/src/extraction.rs

//! Pulls the samples the navball needs out of one frame's message batch.

use tracing::warn;

use crate::messages::{HeadingSample, Message, OrientationSample};

/// Returns the first message in `messages` published on `topic`.
///
/// The batch is taken in host-delivered order and never reordered, so when a
/// topic appears more than once in a batch the first occurrence wins. An unset
/// topic, or one that no longer exists, simply matches nothing.
pub fn extract_latest<'a>(messages: &'a [Message], topic: Option<&str>) -> Option<&'a Message> {
    let topic = topic?;
    messages.iter().find(|message| message.topic == topic)
}

/// The orientation sample for `topic` in this batch, if there is a decodable one.
pub fn latest_orientation(messages: &[Message], topic: Option<&str>) -> Option<OrientationSample> {
    let message = extract_latest(messages, topic)?;
    let sample = OrientationSample::from_payload(&message.payload);
    if sample.is_none() {
        warn!(
            "Message on '{}' is not an orientation record, skipping it.",
            message.topic
        );
    }
    sample
}

/// The heading sample for `topic` in this batch, if there is a decodable one.
pub fn latest_heading(messages: &[Message], topic: Option<&str>) -> Option<HeadingSample> {
    let message = extract_latest(messages, topic)?;
    let sample = HeadingSample::from_payload(&message.payload);
    if sample.is_none() {
        warn!(
            "Message on '{}' is not a heading vector, skipping it.",
            message.topic
        );
    }
    sample
}

/// Rotation of the heading indicator about the render engine's vertical axis.
///
/// Only the horizontal (x, y) projection is used. A zero-length projection has
/// no direction, so the indicator must be hidden and `None` is returned.
///
/// The argument order is `atan2(x, y)` on the normalized components: this is
/// what puts "north" (+y) at zero rotation in the rendered scene, and it is
/// not interchangeable with the usual `atan2(y, x)` bearing formula.
pub fn heading_angle(sample: &HeadingSample) -> Option<f64> {
    let length = (sample.x * sample.x + sample.y * sample.y).sqrt();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    let x = sample.x / length;
    let y = sample.y / length;
    Some(x.atan2(y))
}
