// navball_core/src/config.rs

//! The persisted panel configuration and the declarative description of its
//! settings form.

use serde::{Deserialize, Serialize};

use crate::error::NavballError;
use crate::messages::Topic;

// =========================================================================
// == Persisted Configuration ==
// =========================================================================

/// The user's topic selection. This is the only state that survives a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_topic: Option<String>,
}

impl PanelConfig {
    /// The topics that should currently be subscribed, orientation first.
    pub fn selected_topics(&self) -> Vec<String> {
        self.orientation_topic
            .iter()
            .chain(self.heading_topic.iter())
            .cloned()
            .collect()
    }
}

/// The schema identifiers a topic must carry to be offered for each field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSchemas {
    pub orientation: String,
    pub heading: String,
}

impl Default for PanelSchemas {
    fn default() -> Self {
        Self {
            orientation: "Quaternion".to_string(),
            heading: "Vector3".to_string(),
        }
    }
}

// =========================================================================
// == Settings Form ==
// =========================================================================

pub const GENERAL_NODE: &str = "general";

/// The label shown for the "no heading topic" option.
pub const NO_TOPIC_LABEL: &str = "None";

/// The two user-editable fields of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    OrientationTopic,
    HeadingTopic,
}

impl SettingsField {
    pub const ALL: [SettingsField; 2] = [SettingsField::OrientationTopic, SettingsField::HeadingTopic];

    pub fn key(&self) -> &'static str {
        match self {
            SettingsField::OrientationTopic => "orientation_topic",
            SettingsField::HeadingTopic => "heading_topic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::OrientationTopic => "Orientation topic",
            SettingsField::HeadingTopic => "Heading topic",
        }
    }

    /// The full path the host uses to address this field in actions.
    pub fn path(&self) -> Vec<String> {
        vec![GENERAL_NODE.to_string(), self.key().to_string()]
    }

    pub fn from_path(path: &[String]) -> Option<Self> {
        match path {
            [node, key] if node == GENERAL_NODE => {
                Self::ALL.into_iter().find(|field| field.key() == key)
            }
            _ => None,
        }
    }
}

/// One selectable entry of a field's dropdown. `value: None` means "unset".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsOption {
    pub label: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFieldView {
    pub field: SettingsField,
    pub label: &'static str,
    pub value: Option<String>,
    pub options: Vec<SettingsOption>,
}

impl SettingsFieldView {
    /// The option after the current value, wrapping around. Used by hosts that
    /// drive the form with a single "cycle" control instead of a dropdown.
    pub fn next_option(&self) -> Option<&SettingsOption> {
        if self.options.is_empty() {
            return None;
        }
        let next = self
            .options
            .iter()
            .position(|option| option.value == self.value)
            .map_or(0, |index| (index + 1) % self.options.len());
        self.options.get(next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsNode {
    pub name: &'static str,
    pub fields: Vec<SettingsFieldView>,
}

/// The full declarative description handed to the host's settings UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsTree {
    pub nodes: Vec<SettingsNode>,
}

impl SettingsTree {
    pub fn field(&self, field: SettingsField) -> Option<&SettingsFieldView> {
        self.nodes
            .iter()
            .flat_map(|node| node.fields.iter())
            .find(|view| view.field == field)
    }
}

/// An edit coming back from the settings UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    Update {
        path: Vec<String>,
        value: Option<String>,
    },
}

impl SettingsAction {
    pub fn update(field: SettingsField, value: Option<String>) -> Self {
        SettingsAction::Update {
            path: field.path(),
            value,
        }
    }
}

/// Builds the settings form from the current configuration and candidates.
///
/// A configured topic that is missing from the candidates is still reported as
/// the field's value; it is kept until the user picks something else.
pub fn settings_tree(
    config: &PanelConfig,
    orientation_candidates: &[Topic],
    heading_candidates: &[Topic],
) -> SettingsTree {
    let topic_options = |candidates: &[Topic]| -> Vec<SettingsOption> {
        candidates
            .iter()
            .map(|topic| SettingsOption {
                label: topic.name.clone(),
                value: Some(topic.name.clone()),
            })
            .collect()
    };

    let mut heading_options = vec![SettingsOption {
        label: NO_TOPIC_LABEL.to_string(),
        value: None,
    }];
    heading_options.extend(topic_options(heading_candidates));

    SettingsTree {
        nodes: vec![SettingsNode {
            name: GENERAL_NODE,
            fields: vec![
                SettingsFieldView {
                    field: SettingsField::OrientationTopic,
                    label: SettingsField::OrientationTopic.label(),
                    value: config.orientation_topic.clone(),
                    options: topic_options(orientation_candidates),
                },
                SettingsFieldView {
                    field: SettingsField::HeadingTopic,
                    label: SettingsField::HeadingTopic.label(),
                    value: config.heading_topic.clone(),
                    options: heading_options,
                },
            ],
        }],
    }
}

/// Resolves an action into the field it edits and its new value.
/// The configuration itself is not touched here.
pub fn parse_action(action: &SettingsAction) -> Result<(SettingsField, Option<String>), NavballError> {
    let SettingsAction::Update { path, value } = action;
    let field =
        SettingsField::from_path(path).ok_or_else(|| NavballError::UnknownSetting(path.join(".")))?;

    if let Some(name) = value {
        if name.trim().is_empty() {
            return Err(NavballError::InvalidSettingValue {
                path: path.join("."),
                reason: "topic name is empty".to_string(),
            });
        }
    }
    Ok((field, value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(names: &[&str], schema: &str) -> Vec<Topic> {
        names.iter().map(|name| Topic::new(*name, schema)).collect()
    }

    #[test]
    fn config_round_trips_through_serde_without_unset_fields() {
        let config = PanelConfig {
            orientation_topic: Some("/att".to_string()),
            heading_topic: None,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"orientation_topic": "/att"}));
        assert_eq!(serde_json::from_value::<PanelConfig>(json).unwrap(), config);
    }

    #[test]
    fn tree_lists_candidates_and_a_none_heading_option() {
        let config = PanelConfig {
            orientation_topic: Some("/b".to_string()),
            heading_topic: None,
        };
        let tree = settings_tree(&config, &topics(&["/a", "/b"], "Quaternion"), &topics(&["/v"], "Vector3"));

        let orientation = tree.field(SettingsField::OrientationTopic).unwrap();
        assert_eq!(orientation.value.as_deref(), Some("/b"));
        let names: Vec<_> = orientation.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(names, ["/a", "/b"]);

        let heading = tree.field(SettingsField::HeadingTopic).unwrap();
        assert_eq!(heading.value, None);
        assert_eq!(heading.options[0].value, None);
        assert_eq!(heading.options[1].value.as_deref(), Some("/v"));
    }

    #[test]
    fn stale_value_is_still_reported() {
        let config = PanelConfig {
            orientation_topic: Some("/from_last_session".to_string()),
            heading_topic: None,
        };
        let tree = settings_tree(&config, &topics(&["/a"], "Quaternion"), &[]);
        let orientation = tree.field(SettingsField::OrientationTopic).unwrap();
        assert_eq!(orientation.value.as_deref(), Some("/from_last_session"));
    }

    #[test]
    fn next_option_cycles_and_wraps() {
        let config = PanelConfig {
            orientation_topic: None,
            heading_topic: Some("/v".to_string()),
        };
        let tree = settings_tree(&config, &[], &topics(&["/u", "/v"], "Vector3"));
        let heading = tree.field(SettingsField::HeadingTopic).unwrap();
        assert_eq!(heading.next_option().unwrap().value, None);

        let orientation = tree.field(SettingsField::OrientationTopic).unwrap();
        assert!(orientation.next_option().is_none());
    }

    #[test]
    fn parse_action_rejects_unknown_paths_and_empty_names() {
        let unknown = SettingsAction::Update {
            path: vec!["general".to_string(), "color".to_string()],
            value: None,
        };
        assert!(matches!(parse_action(&unknown), Err(NavballError::UnknownSetting(p)) if p == "general.color"));

        let empty = SettingsAction::update(SettingsField::OrientationTopic, Some("  ".to_string()));
        assert!(matches!(
            parse_action(&empty),
            Err(NavballError::InvalidSettingValue { .. })
        ));

        let clear = SettingsAction::update(SettingsField::HeadingTopic, None);
        assert_eq!(parse_action(&clear).unwrap(), (SettingsField::HeadingTopic, None));
    }
}
