// navball_sim/src/simulation/plugins/settings_ui/mod.rs

use navball_core::config::SettingsFieldView;

use crate::prelude::*;

/// Marker for the text node showing the settings form.
#[derive(Component)]
pub struct SettingsOverlay;

pub struct SettingsUiPlugin;

impl Plugin for SettingsUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_settings_overlay).add_systems(
            Update,
            (cycle_settings_with_keys, refresh_settings_overlay)
                .chain()
                .in_set(NavballSet::Ui),
        );
    }
}

/// Which key cycles which field.
const HOTKEYS: [(KeyCode, SettingsField, &str); 2] = [
    (KeyCode::KeyO, SettingsField::OrientationTopic, "O"),
    (KeyCode::KeyH, SettingsField::HeadingTopic, "H"),
];

fn value_label(view: &SettingsFieldView) -> String {
    match &view.value {
        Some(name) => {
            let listed = view.options.iter().any(|o| o.value.as_deref() == Some(name.as_str()));
            if listed {
                name.clone()
            } else {
                format!("{} (not available)", name)
            }
        }
        None => navball_core::config::NO_TOPIC_LABEL.to_string(),
    }
}

/// The overlay text for a settings form.
pub fn overlay_text(tree: &SettingsTree) -> String {
    let mut lines = Vec::new();
    for node in &tree.nodes {
        lines.push(format!("[{}]", node.name));
        for view in &node.fields {
            let key = HOTKEYS
                .iter()
                .find(|(_, field, _)| *field == view.field)
                .map_or("", |(_, _, key)| key);
            lines.push(format!(
                "{}: {}  ({} options, press {})",
                view.label,
                value_label(view),
                view.options.len(),
                key
            ));
        }
    }
    lines.join("\n")
}

fn spawn_settings_overlay(mut commands: Commands) {
    commands.spawn((
        Name::new("Navball Settings"),
        SettingsOverlay,
        Text::new("Waiting for the navball panel..."),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

/// Steps a field to its next option and hands the edit to the panel.
fn cycle_settings_with_keys(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut panel_res: ResMut<NavballPanelResource>,
) {
    let Some(keys) = keys else {
        return;
    };
    let Some(panel) = panel_res.get_mut() else {
        return;
    };

    for (key, field, _) in HOTKEYS {
        if !keys.just_pressed(key) {
            continue;
        }
        let Some(next) = panel
            .host()
            .settings()
            .and_then(|tree| tree.field(field))
            .and_then(|view| view.next_option())
        else {
            debug!("No options to cycle for {:?}", field);
            continue;
        };
        let action = SettingsAction::update(field, next.value.clone());
        if let Err(e) = panel.handle_settings_action(&action) {
            warn!("Settings edit rejected: {}", e);
        }
    }
}

fn refresh_settings_overlay(
    panel_res: Res<NavballPanelResource>,
    mut shown_revision: Local<Option<u64>>,
    mut overlays: Query<&mut Text, With<SettingsOverlay>>,
) {
    let Some(host) = panel_res.get().map(|panel| panel.host()) else {
        return;
    };
    let revision = host.settings_revision();
    if *shown_revision == Some(revision) {
        return;
    }
    let Some(tree) = host.settings() else {
        return;
    };

    let content = overlay_text(tree);
    for mut text in &mut overlays {
        text.0 = content.clone();
    }
    *shown_revision = Some(revision);
}
