// navball_sim/src/simulation/core/topics.rs

use bevy::prelude::*;
use navball_core::messages::{Message, Topic};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

// --- Core Topic Structs ---

/// A message stored within a topic, wrapped with a bus-wide id for cursor tracking.
/// Ids increase across all topics, so sorting by id restores publish order.
#[derive(Clone, Debug)]
pub struct StampedMessage {
    pub id: u64,
    pub message: Message,
}

/// A single bounded topic buffer. This is what's stored inside the TelemetryBus.
#[derive(Debug)]
struct TopicBuffer {
    schema: String,
    buffer: VecDeque<StampedMessage>,
    capacity: usize,
}

impl TopicBuffer {
    fn new(schema: &str, capacity: usize) -> Self {
        Self {
            schema: schema.to_string(),
            buffer: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    fn push(&mut self, message: StampedMessage) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(message);
    }
}

// --- The Main TelemetryBus Resource ---

/// The render host's message store: every topic the simulated vehicle
/// publishes, in creation order, with its recent history.
#[derive(Resource, Default, Debug)]
pub struct TelemetryBus {
    order: Vec<String>,
    topics: HashMap<String, TopicBuffer>,
    next_id: u64,
    /// Bumped whenever the topic list changes.
    revision: u64,
}

impl TelemetryBus {
    /// Returns `false` (and leaves the existing topic alone) if `name` is taken.
    pub fn create_topic(&mut self, name: &str, schema: &str, capacity: usize) -> bool {
        if self.topics.contains_key(name) {
            warn!("Topic '{}' already exists, keeping the original.", name);
            return false;
        }
        self.topics
            .insert(name.to_string(), TopicBuffer::new(schema, capacity));
        self.order.push(name.to_string());
        self.revision += 1;
        true
    }

    pub fn publish(&mut self, topic_name: &str, payload: Value) -> bool {
        let Some(topic) = self.topics.get_mut(topic_name) else {
            return false;
        };
        topic.push(StampedMessage {
            id: self.next_id,
            message: Message::new(topic_name, payload),
        });
        self.next_id += 1;
        true
    }

    /// The topic list in the order topics were created.
    pub fn topic_list(&self) -> Vec<Topic> {
        self.order
            .iter()
            .filter_map(|name| {
                self.topics
                    .get(name)
                    .map(|topic| Topic::new(name.clone(), topic.schema.clone()))
            })
            .collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The id of the most recent message on any topic.
    pub fn newest_id(&self) -> Option<u64> {
        self.next_id.checked_sub(1)
    }

    /// What the render host hands over for one frame: the newest message
    /// of each topic in `topics`, so a burst between frames shows its latest
    /// sample and slow topics do not drop out between samples. Sorted by id,
    /// i.e. in publish order.
    pub fn frame_messages(&self, topics: &[String]) -> Vec<StampedMessage> {
        let mut messages: Vec<StampedMessage> = topics
            .iter()
            .filter_map(|name| self.topics.get(name))
            .filter_map(|topic| topic.buffer.back().cloned())
            .collect();
        messages.sort_by_key(|stamped| stamped.id);
        messages
    }
}

/// How far the frame delivery has read the bus.
#[derive(Resource, Default, Debug)]
pub struct DeliveryCursor {
    pub last_id: Option<u64>,
    pub topics_revision: Option<u64>,
}
