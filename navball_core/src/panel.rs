// navball_core/src/panel.rs

//! The frame synchronizer: glues the host's per-frame callback to extraction,
//! the coordinate adapter and the scene.

use tracing::{debug, error, info, warn};

use crate::config::{self, PanelSchemas, SettingsAction, SettingsField};
use crate::error::NavballError;
use crate::extraction::{heading_angle, latest_heading, latest_orientation};
use crate::frames::to_render_quaternion;
use crate::host::RenderHost;
use crate::messages::{FrameBatch, Message, Topic};
use crate::scene::{SceneLayout, SceneRenderer, SceneState, Viewport};
use crate::subscription::SubscriptionManager;

// =========================================================================
// == Frame Completion Token ==
// =========================================================================

/// The host's "frame done" callback, wrapped so that it runs exactly once.
///
/// `signal` consumes the token. A token dropped without being signalled
/// (an early return, an error) signals on drop, so the host is never left
/// waiting on a frame.
pub struct FrameDone<'a> {
    callback: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a> FrameDone<'a> {
    pub fn new(callback: impl FnOnce() + 'a) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    pub fn signal(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl Drop for FrameDone<'_> {
    fn drop(&mut self) {
        self.fire();
    }
}

impl std::fmt::Debug for FrameDone<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDone")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

// =========================================================================
// == Panel Lifecycle ==
// =========================================================================

/// Where the panel is in its lifecycle. `Uninitialized` is never observable
/// from outside: `mount` either reaches `Mounted` or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPhase {
    #[default]
    Uninitialized,
    Mounted,
    Updating,
    Idle,
    Unmounted,
}

/// What one frame did to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutcome {
    /// A new orientation was written to the sphere this frame.
    pub orientation_applied: bool,
    /// The heading indicator's rotation, `None` when it is hidden.
    pub heading: Option<f64>,
}

/// One navball panel: the exclusive owner of its scene, its configuration and
/// its host connection for the whole mounted lifetime.
pub struct NavballPanel<H: RenderHost, R: SceneRenderer> {
    host: H,
    renderer: R,
    scene: Option<SceneState<R::Handle>>,
    subscriptions: SubscriptionManager,
    topics: Vec<Topic>,
    messages: Vec<Message>,
    viewport: Option<Viewport>,
    phase: PanelPhase,
}

impl<H: RenderHost, R: SceneRenderer> NavballPanel<H, R> {
    /// Builds the scene, restores the saved configuration and announces the
    /// initial subscriptions and settings form to the host.
    ///
    /// A scene that cannot be created is fatal: the error is logged and
    /// returned, and nothing is retried.
    pub fn mount(host: H, renderer: R, schemas: PanelSchemas) -> Result<Self, NavballError> {
        Self::mount_with_layout(host, renderer, schemas, &SceneLayout::default())
    }

    pub fn mount_with_layout(
        mut host: H,
        mut renderer: R,
        schemas: PanelSchemas,
        layout: &SceneLayout,
    ) -> Result<Self, NavballError> {
        let scene = SceneState::create(&mut renderer, layout).inspect_err(|e| {
            error!("Navball panel could not be mounted: {}", e);
        })?;

        let config = host.restore_state().unwrap_or_default();
        info!("Mounting navball panel with {:?}", config);

        let mut subscriptions = SubscriptionManager::new(config, schemas);
        subscriptions.sync_subscriptions(&mut host);

        let mut panel = Self {
            host,
            renderer,
            scene: Some(scene),
            subscriptions,
            topics: Vec::new(),
            messages: Vec::new(),
            viewport: None,
            phase: PanelPhase::Mounted,
        };
        panel.publish_settings();
        Ok(panel)
    }

    // --- Host-driven callbacks ---

    /// Processes one host tick and signals `done` exactly once.
    ///
    /// Everything happens before this returns: the topic list and messages are
    /// stored, subscriptions re-issued if the selection changed, and the scene
    /// updated from the latest batch. `done` fires after the scene is updated,
    /// unconditionally, including on frames with nothing relevant in them.
    pub fn on_frame(&mut self, batch: FrameBatch, done: FrameDone<'_>) -> Result<FrameOutcome, NavballError> {
        if self.phase == PanelPhase::Unmounted {
            warn!("Frame delivered to an unmounted navball panel.");
            return Err(NavballError::Unmounted);
        }
        self.phase = PanelPhase::Updating;

        if let Some(topics) = batch.topics {
            if self.subscriptions.update_topics(&mut self.host, &topics) {
                self.publish_settings();
            }
            self.topics = topics;
        }
        if let Some(messages) = batch.messages {
            self.messages = messages;
        }

        self.subscriptions.sync_subscriptions(&mut self.host);
        let outcome = self.refresh_scene();

        done.signal();
        self.phase = PanelPhase::Idle;
        Ok(outcome)
    }

    /// Applies an edit coming back from the settings form.
    ///
    /// An accepted change is persisted, re-subscribed and re-published, and
    /// the scene is re-derived from the last batch under the new selection.
    pub fn handle_settings_action(&mut self, action: &SettingsAction) -> Result<bool, NavballError> {
        if self.phase == PanelPhase::Unmounted {
            return Err(NavballError::Unmounted);
        }
        let (field, value) = config::parse_action(action)?;
        let changed = self.subscriptions.select(&mut self.host, field, value);
        if changed {
            self.publish_settings();
            self.refresh_scene();
        }
        Ok(changed)
    }

    pub fn select_orientation_topic(&mut self, name: Option<String>) -> Result<bool, NavballError> {
        self.handle_settings_action(&SettingsAction::update(SettingsField::OrientationTopic, name))
    }

    pub fn select_heading_topic(&mut self, name: Option<String>) -> Result<bool, NavballError> {
        self.handle_settings_action(&SettingsAction::update(SettingsField::HeadingTopic, name))
    }

    /// Matches the camera and output surface to the panel's visible area.
    /// Zero-sized areas are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let Some(scene) = &self.scene else {
            return;
        };
        let viewport = Viewport::new(width, height);
        if scene.resize(&mut self.renderer, viewport) {
            self.viewport = Some(viewport);
        }
    }

    /// The continuous redraw tick.
    pub fn render(&mut self) {
        if self.scene.is_some() {
            self.renderer.render();
        }
    }

    /// Releases every scene object and drops all subscriptions. Afterwards
    /// every callback is refused. Calling it again does nothing.
    pub fn unmount(&mut self) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        scene.destroy(&mut self.renderer);
        self.subscriptions.clear_subscriptions(&mut self.host);
        self.phase = PanelPhase::Unmounted;
        info!("Navball panel unmounted.");
    }

    // --- Accessors ---

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn config(&self) -> &crate::config::PanelConfig {
        self.subscriptions.config()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn scene(&self) -> Option<&SceneState<R::Handle>> {
        self.scene.as_ref()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // --- Internals ---

    /// Re-derives the scene from the stored batch and the current selection.
    fn refresh_scene(&mut self) -> FrameOutcome {
        let Some(scene) = self.scene.as_mut() else {
            return FrameOutcome::default();
        };
        let config = self.subscriptions.config();

        // No orientation sample: the sphere keeps whatever it showed last.
        let orientation = latest_orientation(&self.messages, config.orientation_topic.as_deref());
        if let Some(sample) = &orientation {
            scene.apply_orientation(&mut self.renderer, to_render_quaternion(sample));
        }

        let heading = latest_heading(&self.messages, config.heading_topic.as_deref())
            .and_then(|sample| heading_angle(&sample));
        scene.apply_heading(&mut self.renderer, heading);

        debug!(
            "Frame applied: orientation={}, heading={:?}",
            orientation.is_some(),
            heading
        );
        FrameOutcome {
            orientation_applied: orientation.is_some(),
            heading: scene.heading(),
        }
    }

    fn publish_settings(&mut self) {
        let tree = config::settings_tree(
            self.subscriptions.config(),
            self.subscriptions.orientation_candidates(),
            self.subscriptions.heading_candidates(),
        );
        self.host.update_settings(tree);
    }
}

impl<H: RenderHost, R: SceneRenderer> Drop for NavballPanel<H, R> {
    fn drop(&mut self) {
        self.unmount();
    }
}
