// navball_core/src/subscription.rs

//! Tracks which topics the panel is interested in and keeps the host's
//! subscriptions in line with that selection.

use tracing::{debug, info};

use crate::config::{PanelConfig, PanelSchemas, SettingsField};
use crate::host::RenderHost;
use crate::messages::Topic;

/// Topics whose schema is exactly `schema`, in the order the host listed them.
pub fn list_candidate_topics(all_topics: &[Topic], schema: &str) -> Vec<Topic> {
    all_topics
        .iter()
        .filter(|topic| topic.schema == schema)
        .cloned()
        .collect()
}

/// Fills in an orientation topic when none is selected yet.
///
/// The first candidate is taken. An existing selection is never replaced, and
/// the heading topic is left alone: heading display is opt-in.
pub fn default_selection(orientation_candidates: &[Topic], current: &PanelConfig) -> PanelConfig {
    let mut selection = current.clone();
    if selection.orientation_topic.is_none() {
        selection.orientation_topic = orientation_candidates.first().map(|t| t.name.clone());
    }
    selection
}

/// Owns the panel configuration and the candidate lists derived from the
/// host's topic list.
#[derive(Debug)]
pub struct SubscriptionManager {
    config: PanelConfig,
    schemas: PanelSchemas,
    orientation_candidates: Vec<Topic>,
    heading_candidates: Vec<Topic>,
    /// The topic list last sent to the host, `None` before the first request.
    subscribed: Option<Vec<String>>,
}

impl SubscriptionManager {
    pub fn new(config: PanelConfig, schemas: PanelSchemas) -> Self {
        Self {
            config,
            schemas,
            orientation_candidates: Vec::new(),
            heading_candidates: Vec::new(),
            subscribed: None,
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn orientation_candidates(&self) -> &[Topic] {
        &self.orientation_candidates
    }

    pub fn heading_candidates(&self) -> &[Topic] {
        &self.heading_candidates
    }

    /// Recomputes both candidate lists from a new host topic list and applies
    /// the default selection.
    ///
    /// Returns `true` if the candidates or the configuration changed.
    pub fn update_topics<H: RenderHost>(&mut self, host: &mut H, topics: &[Topic]) -> bool {
        let orientation = list_candidate_topics(topics, &self.schemas.orientation);
        let heading = list_candidate_topics(topics, &self.schemas.heading);
        let candidates_changed =
            orientation != self.orientation_candidates || heading != self.heading_candidates;
        self.orientation_candidates = orientation;
        self.heading_candidates = heading;

        let selection = default_selection(&self.orientation_candidates, &self.config);
        let config_changed = self.set_config(host, selection);
        if config_changed {
            info!(
                "Defaulted orientation topic to '{}'.",
                self.config.orientation_topic.as_deref().unwrap_or_default()
            );
        }
        candidates_changed || config_changed
    }

    pub fn select_orientation_topic<H: RenderHost>(&mut self, host: &mut H, name: Option<String>) -> bool {
        self.select(host, SettingsField::OrientationTopic, name)
    }

    pub fn select_heading_topic<H: RenderHost>(&mut self, host: &mut H, name: Option<String>) -> bool {
        self.select(host, SettingsField::HeadingTopic, name)
    }

    /// Updates one field, persisting and re-subscribing if it actually changed.
    pub fn select<H: RenderHost>(&mut self, host: &mut H, field: SettingsField, name: Option<String>) -> bool {
        let mut selection = self.config.clone();
        match field {
            SettingsField::OrientationTopic => selection.orientation_topic = name,
            SettingsField::HeadingTopic => selection.heading_topic = name,
        }
        let changed = self.set_config(host, selection);
        if changed {
            info!("Selected {:?}: {:?}", field, self.config);
            self.sync_subscriptions(host);
        }
        changed
    }

    /// Sends the current selection to the host unless it already has it.
    /// Both topics go out together; the host treats repeats as no-ops.
    pub fn sync_subscriptions<H: RenderHost>(&mut self, host: &mut H) -> bool {
        let wanted = self.config.selected_topics();
        if self.subscribed.as_ref() == Some(&wanted) {
            return false;
        }
        debug!("Subscribing to {:?}", wanted);
        host.subscribe(&wanted);
        self.subscribed = Some(wanted);
        true
    }

    /// Drops every subscription. Used at teardown.
    pub fn clear_subscriptions<H: RenderHost>(&mut self, host: &mut H) {
        if self.subscribed.as_ref().is_some_and(|topics| topics.is_empty()) {
            return;
        }
        host.subscribe(&[]);
        self.subscribed = Some(Vec::new());
    }

    fn set_config<H: RenderHost>(&mut self, host: &mut H, config: PanelConfig) -> bool {
        if config == self.config {
            return false;
        }
        self.config = config;
        host.save_state(&self.config);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;

    fn sample_topics() -> Vec<Topic> {
        vec![
            Topic::new("/a", "Quaternion"),
            Topic::new("/velocity", "Vector3"),
            Topic::new("/b", "Quaternion"),
            Topic::new("/camera", "Image"),
        ]
    }

    #[test]
    fn candidates_keep_host_order_and_filter_by_schema() {
        let names: Vec<_> = list_candidate_topics(&sample_topics(), "Quaternion")
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["/a", "/b"]);
        assert!(list_candidate_topics(&sample_topics(), "PointCloud").is_empty());
        assert!(list_candidate_topics(&[], "Quaternion").is_empty());
    }

    #[test]
    fn default_picks_first_candidate_only_when_unset() {
        let candidates = list_candidate_topics(&sample_topics(), "Quaternion");

        let defaulted = default_selection(&candidates, &PanelConfig::default());
        assert_eq!(defaulted.orientation_topic.as_deref(), Some("/a"));
        assert_eq!(defaulted.heading_topic, None);

        let chosen = PanelConfig {
            orientation_topic: Some("/b".to_string()),
            heading_topic: None,
        };
        assert_eq!(default_selection(&candidates, &chosen), chosen);

        assert_eq!(default_selection(&[], &PanelConfig::default()), PanelConfig::default());
    }

    #[test]
    fn update_topics_persists_the_default() {
        let mut host = MockHost::default();
        let mut manager = SubscriptionManager::new(PanelConfig::default(), PanelSchemas::default());

        assert!(manager.update_topics(&mut host, &sample_topics()));
        assert_eq!(manager.config().orientation_topic.as_deref(), Some("/a"));
        assert_eq!(host.saved.len(), 1);

        // Same list again: nothing to do.
        assert!(!manager.update_topics(&mut host, &sample_topics()));
        assert_eq!(host.saved.len(), 1);
    }

    #[test]
    fn selection_change_resubscribes_both_topics() {
        let mut host = MockHost::default();
        let mut manager = SubscriptionManager::new(PanelConfig::default(), PanelSchemas::default());
        manager.update_topics(&mut host, &sample_topics());
        manager.sync_subscriptions(&mut host);
        assert_eq!(host.last_subscription(), Some(&["/a".to_string()][..]));

        assert!(manager.select_heading_topic(&mut host, Some("/velocity".to_string())));
        assert_eq!(
            host.last_subscription(),
            Some(&["/a".to_string(), "/velocity".to_string()][..])
        );
        assert_eq!(host.saved.last().unwrap().heading_topic.as_deref(), Some("/velocity"));

        // Re-selecting the same topic is not a change.
        let requests = host.subscriptions.len();
        assert!(!manager.select_heading_topic(&mut host, Some("/velocity".to_string())));
        assert_eq!(host.subscriptions.len(), requests);
    }

    #[test]
    fn stale_topic_is_preserved() {
        let mut host = MockHost::default();
        let stale = PanelConfig {
            orientation_topic: Some("/gone".to_string()),
            heading_topic: None,
        };
        let mut manager = SubscriptionManager::new(stale.clone(), PanelSchemas::default());
        manager.update_topics(&mut host, &sample_topics());
        assert_eq!(manager.config(), &stale);
        assert!(host.saved.is_empty());
    }

    #[test]
    fn clearing_subscriptions_sends_an_empty_list_once() {
        let mut host = MockHost::default();
        let mut manager = SubscriptionManager::new(PanelConfig::default(), PanelSchemas::default());
        manager.update_topics(&mut host, &sample_topics());
        manager.sync_subscriptions(&mut host);

        manager.clear_subscriptions(&mut host);
        manager.clear_subscriptions(&mut host);
        assert_eq!(host.subscriptions.len(), 2);
        assert_eq!(host.last_subscription(), Some(&[][..]));
    }
}
