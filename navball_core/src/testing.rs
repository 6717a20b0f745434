// navball_core/src/testing.rs

//! In-memory stand-ins for the render host and the render engine.

use nalgebra::Quaternion;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{PanelConfig, SettingsTree};
use crate::host::RenderHost;
use crate::scene::{CameraSpec, LightSpec, MarkerSpec, SceneRenderer, SphereSpec, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Camera,
    Light,
    Sphere,
    HeadingMarker,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    Create { node: usize, kind: NodeKind },
    SetOrientation { node: usize, rotation: Quaternion<f64> },
    SetRotationAboutVertical { node: usize, angle: f64 },
    SetVisible { node: usize, visible: bool },
    Resize { camera: usize, width: u32, height: u32, aspect: f64 },
    Render,
    Destroy { node: usize },
}

#[derive(Debug, Clone)]
struct NodeState {
    kind: NodeKind,
    visible: bool,
    rotation: Option<Quaternion<f64>>,
    angle: Option<f64>,
}

/// Records every call and keeps the current state of each live node.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RendererCall>,
    fail_on_sphere: bool,
    /// A copy of `calls` that code outside the renderer can read mid-frame.
    journal: Option<Rc<RefCell<Vec<RendererCall>>>>,
    next_id: usize,
    nodes: HashMap<usize, NodeState>,
}

impl RecordingRenderer {
    /// A renderer whose sphere creation fails, as with no rendering context.
    pub fn failing_on_sphere() -> Self {
        Self {
            fail_on_sphere: true,
            ..Default::default()
        }
    }

    pub fn with_journal(journal: Rc<RefCell<Vec<RendererCall>>>) -> Self {
        Self {
            journal: Some(journal),
            ..Default::default()
        }
    }

    fn record(&mut self, call: RendererCall) {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(call.clone());
        }
        self.calls.push(call);
    }

    fn create(&mut self, kind: NodeKind) -> usize {
        let node = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            node,
            NodeState {
                kind,
                visible: true,
                rotation: None,
                angle: None,
            },
        );
        self.record(RendererCall::Create { node, kind });
        node
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn kind(&self, node: usize) -> Option<NodeKind> {
        self.nodes.get(&node).map(|n| n.kind)
    }

    pub fn visible(&self, node: usize) -> Option<bool> {
        self.nodes.get(&node).map(|n| n.visible)
    }

    pub fn rotation(&self, node: usize) -> Option<Quaternion<f64>> {
        self.nodes.get(&node).and_then(|n| n.rotation)
    }

    pub fn angle(&self, node: usize) -> Option<f64> {
        self.nodes.get(&node).and_then(|n| n.angle)
    }

    pub fn count(&self, pred: impl Fn(&RendererCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
}

impl SceneRenderer for RecordingRenderer {
    type Handle = usize;
    type Error = String;

    fn create_camera(&mut self, _spec: &CameraSpec) -> Result<usize, String> {
        Ok(self.create(NodeKind::Camera))
    }

    fn create_light(&mut self, _spec: &LightSpec) -> Result<usize, String> {
        Ok(self.create(NodeKind::Light))
    }

    fn create_sphere(&mut self, _spec: &SphereSpec) -> Result<usize, String> {
        if self.fail_on_sphere {
            return Err("no rendering context".to_string());
        }
        Ok(self.create(NodeKind::Sphere))
    }

    fn create_heading_marker(&mut self, _spec: &MarkerSpec) -> Result<usize, String> {
        Ok(self.create(NodeKind::HeadingMarker))
    }

    fn set_orientation(&mut self, node: usize, rotation: &Quaternion<f64>) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.rotation = Some(*rotation);
        }
        self.record(RendererCall::SetOrientation {
            node,
            rotation: *rotation,
        });
    }

    fn set_rotation_about_vertical(&mut self, node: usize, angle: f64) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.angle = Some(angle);
        }
        self.record(RendererCall::SetRotationAboutVertical { node, angle });
    }

    fn set_visible(&mut self, node: usize, visible: bool) {
        if let Some(state) = self.nodes.get_mut(&node) {
            state.visible = visible;
        }
        self.record(RendererCall::SetVisible { node, visible });
    }

    fn resize(&mut self, camera: usize, viewport: Viewport, aspect: f64) {
        self.record(RendererCall::Resize {
            camera,
            width: viewport.width,
            height: viewport.height,
            aspect,
        });
    }

    fn render(&mut self) {
        self.record(RendererCall::Render);
    }

    fn destroy(&mut self, node: usize) {
        self.nodes.remove(&node);
        self.record(RendererCall::Destroy { node });
    }
}

/// Remembers every request the panel made of its host.
#[derive(Debug, Default)]
pub struct MockHost {
    pub restored: Option<PanelConfig>,
    pub subscriptions: Vec<Vec<String>>,
    pub saved: Vec<PanelConfig>,
    pub settings: Vec<SettingsTree>,
}

impl MockHost {
    pub fn with_saved_state(config: PanelConfig) -> Self {
        Self {
            restored: Some(config),
            ..Default::default()
        }
    }

    pub fn last_subscription(&self) -> Option<&[String]> {
        self.subscriptions.last().map(Vec::as_slice)
    }
}

impl RenderHost for MockHost {
    fn subscribe(&mut self, topics: &[String]) {
        self.subscriptions.push(topics.to_vec());
    }

    fn save_state(&mut self, config: &PanelConfig) {
        self.saved.push(config.clone());
    }

    fn restore_state(&self) -> Option<PanelConfig> {
        self.restored.clone()
    }

    fn update_settings(&mut self, tree: SettingsTree) {
        self.settings.push(tree);
    }
}
