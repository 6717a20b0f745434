// navball_sim/src/simulation/plugins/host/mod.rs

use bevy::app::AppExit;
use bevy::window::{PrimaryWindow, WindowResized};
use navball_core::config::PanelConfig;
use std::cell::Cell;

use crate::cli::Cli;
use crate::prelude::*;
use crate::simulation::config::StateStore;
use crate::simulation::core::topics::DeliveryCursor;
use crate::simulation::plugins::scene::NavballAssets;

// =========================================================================
// == The Render Host ==
// =========================================================================

/// The Bevy app's side of the panel contract: it records subscriptions,
/// persists the configuration and holds the latest settings form.
#[derive(Debug, Default)]
pub struct BevyHost {
    subscriptions: Vec<String>,
    /// `None` runs without saving or restoring anything.
    store: Option<StateStore>,
    settings: Option<SettingsTree>,
    /// Bumped on every settings form the panel publishes.
    settings_revision: u64,
}

impl BevyHost {
    pub fn new(store: Option<StateStore>) -> Self {
        Self {
            store,
            ..Default::default()
        }
    }

    /// The topics the panel currently wants delivered.
    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    pub fn settings(&self) -> Option<&SettingsTree> {
        self.settings.as_ref()
    }

    pub fn settings_revision(&self) -> u64 {
        self.settings_revision
    }
}

impl RenderHost for BevyHost {
    fn subscribe(&mut self, topics: &[String]) {
        if topics != self.subscriptions.as_slice() {
            info!("Navball subscribed to {:?}", topics);
        }
        self.subscriptions = topics.to_vec();
    }

    fn save_state(&mut self, config: &PanelConfig) {
        let Some(store) = &self.store else {
            return;
        };
        match store.save(config) {
            Ok(()) => debug!("Saved panel state to '{}'", store.path().display()),
            Err(e) => error!("{}", e),
        }
    }

    fn restore_state(&self) -> Option<PanelConfig> {
        let store = self.store.as_ref()?;
        match store.load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring saved panel state: {}", e);
                None
            }
        }
    }

    fn update_settings(&mut self, tree: SettingsTree) {
        self.settings = Some(tree);
        self.settings_revision += 1;
    }
}

/// The mounted panel. `None` before mounting, after a failed mount and
/// after teardown.
#[derive(Resource, Default)]
pub struct NavballPanelResource(pub Option<NavballPanel<BevyHost, MirrorRenderer>>);

impl NavballPanelResource {
    pub fn get(&self) -> Option<&NavballPanel<BevyHost, MirrorRenderer>> {
        self.0.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut NavballPanel<BevyHost, MirrorRenderer>> {
        self.0.as_mut()
    }
}

// =========================================================================
// == Plugin ==
// =========================================================================

pub struct NavballHostPlugin;

impl Plugin for NavballHostPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavballPanelResource>()
            // Vehicle topics and render assets are created in `Startup`.
            .add_systems(PostStartup, mount_panel)
            .add_systems(
                Update,
                (forward_window_resizes, deliver_frame, render_tick)
                    .chain()
                    .in_set(NavballSet::Delivery),
            )
            .add_systems(Last, unmount_on_exit);
    }
}

// =========================================================================
// == Systems ==
// =========================================================================

fn mount_panel(
    settings: Res<AppSettings>,
    cli: Option<Res<Cli>>,
    assets: Option<Res<NavballAssets>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut panel_res: ResMut<NavballPanelResource>,
) {
    let store = cli
        .and_then(|cli| cli.state_file())
        .map(StateStore::new);
    if let Some(store) = &store {
        info!("Panel state file: '{}'", store.path().display());
    }

    let renderer = if assets.is_some() {
        MirrorRenderer::new()
    } else {
        MirrorRenderer::unavailable()
    };

    match NavballPanel::mount(BevyHost::new(store), renderer, settings.schemas.clone()) {
        Ok(mut panel) => {
            if let Ok(window) = windows.single() {
                panel.resize(window.physical_width(), window.physical_height());
            }
            panel_res.0 = Some(panel);
        }
        Err(e) => warn!("Navball panel disabled: {}", e),
    }
}

fn forward_window_resizes(
    mut events: EventReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut panel_res: ResMut<NavballPanelResource>,
) {
    // Only the newest size matters.
    let Some(event) = events.read().last() else {
        return;
    };
    let Some(panel) = panel_res.get_mut() else {
        return;
    };
    if let Ok(window) = windows.get(event.window) {
        panel.resize(window.physical_width(), window.physical_height());
    }
}

/// One host tick: hand the panel what changed on the bus and wait for its
/// done signal before moving the cursor.
fn deliver_frame(
    bus: Res<TelemetryBus>,
    mut cursor: ResMut<DeliveryCursor>,
    mut panel_res: ResMut<NavballPanelResource>,
) {
    let Some(panel) = panel_res.get_mut() else {
        return;
    };
    if panel.phase() == PanelPhase::Unmounted {
        return;
    }

    let revision = bus.revision();
    let topics = (cursor.topics_revision != Some(revision)).then(|| bus.topic_list());

    let newest = bus.newest_id();
    let messages = (newest != cursor.last_id).then(|| {
        bus.frame_messages(panel.host().subscriptions())
            .into_iter()
            .map(|stamped| stamped.message)
            .collect()
    });

    let done = Cell::new(false);
    let result = panel.on_frame(
        FrameBatch::new(topics, messages),
        FrameDone::new(|| done.set(true)),
    );
    if let Err(e) = result {
        warn!("Frame was not applied: {}", e);
    }

    if done.get() {
        cursor.last_id = newest;
        cursor.topics_revision = Some(revision);
    } else {
        warn!("Navball did not finish its frame; redelivering.");
    }
}

fn render_tick(mut panel_res: ResMut<NavballPanelResource>) {
    if let Some(panel) = panel_res.get_mut() {
        panel.render();
    }
}

fn unmount_on_exit(mut exits: EventReader<AppExit>, mut panel_res: ResMut<NavballPanelResource>) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(panel) = panel_res.get_mut() {
        panel.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
    use serde_json::json;

    /// A headless app with the bus, the host systems and a mounted panel.
    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(AppSettings::default())
            .add_plugins(SimulationSetupPlugin)
            .add_event::<WindowResized>()
            .add_event::<AppExit>()
            .init_resource::<NavballPanelResource>()
            .add_systems(
                Update,
                (forward_window_resizes, deliver_frame, render_tick)
                    .chain()
                    .in_set(NavballSet::Delivery),
            )
            .add_systems(Last, unmount_on_exit);

        let panel = NavballPanel::mount(
            BevyHost::new(None),
            MirrorRenderer::new(),
            PanelSchemas::default(),
        )
        .unwrap();
        app.world_mut().resource_mut::<NavballPanelResource>().0 = Some(panel);

        let mut bus = app.world_mut().resource_mut::<TelemetryBus>();
        bus.create_topic("/att", "Quaternion", 8);
        bus.create_topic("/vel", "Vector3", 8);
        app
    }

    fn panel(app: &App) -> &NavballPanel<BevyHost, MirrorRenderer> {
        app.world().resource::<NavballPanelResource>().get().unwrap()
    }

    #[test]
    fn first_frame_delivers_topics_and_defaults_the_selection() {
        let mut app = test_app();
        app.update();

        let panel = panel(&app);
        assert_eq!(panel.topics().len(), 2);
        assert_eq!(panel.config().orientation_topic.as_deref(), Some("/att"));
        assert_eq!(panel.host().subscriptions(), ["/att".to_string()]);
        assert_eq!(panel.phase(), PanelPhase::Idle);
        assert!(panel.host().settings().is_some());

        let cursor = app.world().resource::<DeliveryCursor>();
        assert_eq!(cursor.topics_revision, Some(2));
    }

    #[test]
    fn published_attitude_reaches_the_sphere() {
        let mut app = test_app();
        app.update();

        app.world_mut()
            .resource_mut::<TelemetryBus>()
            .publish("/att", json!({"x": 0.0, "y": 0.0, "z": 0.7071067811865476, "w": 0.7071067811865476}));
        app.update();

        let panel = panel(&app);
        let scene = panel.scene().unwrap();
        // ENU z lands in the render j component.
        assert!((scene.orientation().j - 0.7071067811865476).abs() < 1e-12);
        assert_eq!(app.world().resource::<DeliveryCursor>().last_id, Some(0));
    }

    #[test]
    fn a_burst_between_frames_shows_its_newest_attitude() {
        let mut app = test_app();
        app.update();

        {
            let mut bus = app.world_mut().resource_mut::<TelemetryBus>();
            bus.publish("/att", json!({"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}));
            bus.publish("/att", json!({"x": 0.0, "y": 0.0, "z": 0.7071067811865476, "w": 0.7071067811865476}));
        }
        app.update();
        let orientation = panel(&app).scene().unwrap().orientation();
        assert!((orientation.j - 0.7071067811865476).abs() < 1e-12);
        assert!((orientation.w - 0.7071067811865476).abs() < 1e-12);
        assert_eq!(app.world().resource::<DeliveryCursor>().last_id, Some(1));

        // A quiet tick keeps the newer attitude on screen.
        app.update();
        let orientation = panel(&app).scene().unwrap().orientation();
        assert!((orientation.j - 0.7071067811865476).abs() < 1e-12);
    }

    #[test]
    fn heading_survives_frames_without_a_new_velocity_sample() {
        let mut app = test_app();
        app.update();
        app.world_mut()
            .resource_mut::<NavballPanelResource>()
            .get_mut()
            .unwrap()
            .select_heading_topic(Some("/vel".to_string()))
            .unwrap();

        app.world_mut()
            .resource_mut::<TelemetryBus>()
            .publish("/vel", json!({"x": 1.0, "y": 0.0, "z": 0.0}));
        app.update();
        assert!(panel(&app).scene().unwrap().heading().is_some());

        // Only attitude arrives this frame; the last velocity is carried over.
        app.world_mut()
            .resource_mut::<TelemetryBus>()
            .publish("/att", json!({"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}));
        app.update();
        let heading = panel(&app).scene().unwrap().heading().unwrap();
        assert!((heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn exit_unmounts_the_panel() {
        let mut app = test_app();
        app.update();

        app.world_mut().send_event(AppExit::Success);
        app.update();

        let panel = panel(&app);
        assert_eq!(panel.phase(), PanelPhase::Unmounted);
        assert!(panel.host().subscriptions().is_empty());
        assert_eq!(panel.renderer().node_count(), 0);
    }
}
