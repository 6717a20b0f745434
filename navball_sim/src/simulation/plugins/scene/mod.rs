// navball_sim/src/simulation/plugins/scene/mod.rs

pub mod texture;

use nalgebra::Quaternion;
use navball_core::scene::{MarkerSpec, Viewport};
use std::collections::{BTreeMap, HashMap};
use std::f32::consts::FRAC_PI_2;

use crate::prelude::*;
use crate::simulation::core::transforms::{
    array_to_bevy_vec3, render_quat_to_bevy_quat, vertical_rotation_to_bevy_quat,
};

/// Scales the panel's unitless light intensities to Bevy's photometric units.
const AMBIENT_BRIGHTNESS_SCALE: f32 = 500.0;
const DIRECTIONAL_ILLUMINANCE_SCALE: f32 = 10_000.0;

// =========================================================================
// == Scene Mirror (the `SceneRenderer` Bevy implementation) ==
// =========================================================================

/// A handle to one object in the mirrored scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(u32);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("no render pipeline is available")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorNodeKind {
    Camera(CameraSpec),
    Light(LightSpec),
    Sphere(SphereSpec),
    HeadingMarker(MarkerSpec),
}

/// The last state the panel wrote to one object.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorNode {
    pub kind: MirrorNodeKind,
    pub rotation: Quat,
    pub visible: bool,
    /// Only meaningful for cameras.
    pub aspect: Option<f32>,
    dirty: bool,
}

/// A retained-mode copy of the panel's scene.
///
/// The panel talks to this through [`SceneRenderer`] while it holds the
/// scene; once per frame `sync_scene_mirror` copies the changes into real
/// Bevy entities.
#[derive(Debug)]
pub struct MirrorRenderer {
    available: bool,
    next_id: u32,
    nodes: BTreeMap<SceneNodeId, MirrorNode>,
    destroyed: Vec<(SceneNodeId, MirrorNodeKind)>,
    viewport: Option<Viewport>,
}

impl MirrorRenderer {
    pub fn new() -> Self {
        Self {
            available: true,
            next_id: 0,
            nodes: BTreeMap::new(),
            destroyed: Vec::new(),
            viewport: None,
        }
    }

    /// A renderer for an app without a render pipeline. Every create fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn node(&self, id: SceneNodeId) -> Option<&MirrorNode> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Every node changed since the last call, with its dirty flag cleared.
    pub fn take_dirty(&mut self) -> Vec<(SceneNodeId, MirrorNode)> {
        self.nodes
            .iter_mut()
            .filter(|(_, node)| node.dirty)
            .map(|(id, node)| {
                node.dirty = false;
                (*id, node.clone())
            })
            .collect()
    }

    pub fn take_destroyed(&mut self) -> Vec<(SceneNodeId, MirrorNodeKind)> {
        std::mem::take(&mut self.destroyed)
    }

    fn create(&mut self, kind: MirrorNodeKind) -> Result<SceneNodeId, SceneError> {
        if !self.available {
            return Err(SceneError::Unavailable);
        }
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            MirrorNode {
                kind,
                rotation: Quat::IDENTITY,
                visible: true,
                aspect: None,
                dirty: true,
            },
        );
        Ok(id)
    }

    fn modify(&mut self, id: SceneNodeId, change: impl FnOnce(&mut MirrorNode)) {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                change(node);
                node.dirty = true;
            }
            None => debug!("Ignoring change to unknown scene node {:?}", id),
        }
    }
}

impl Default for MirrorRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer for MirrorRenderer {
    type Handle = SceneNodeId;
    type Error = SceneError;

    fn create_camera(&mut self, spec: &CameraSpec) -> Result<SceneNodeId, SceneError> {
        self.create(MirrorNodeKind::Camera(spec.clone()))
    }

    fn create_light(&mut self, spec: &LightSpec) -> Result<SceneNodeId, SceneError> {
        self.create(MirrorNodeKind::Light(spec.clone()))
    }

    fn create_sphere(&mut self, spec: &SphereSpec) -> Result<SceneNodeId, SceneError> {
        self.create(MirrorNodeKind::Sphere(spec.clone()))
    }

    fn create_heading_marker(&mut self, spec: &MarkerSpec) -> Result<SceneNodeId, SceneError> {
        self.create(MirrorNodeKind::HeadingMarker(spec.clone()))
    }

    fn set_orientation(&mut self, node: SceneNodeId, rotation: &Quaternion<f64>) {
        let rotation = render_quat_to_bevy_quat(rotation);
        self.modify(node, |n| n.rotation = rotation);
    }

    fn set_rotation_about_vertical(&mut self, node: SceneNodeId, angle: f64) {
        let rotation = vertical_rotation_to_bevy_quat(angle);
        self.modify(node, |n| n.rotation = rotation);
    }

    fn set_visible(&mut self, node: SceneNodeId, visible: bool) {
        self.modify(node, |n| n.visible = visible);
    }

    fn resize(&mut self, camera: SceneNodeId, viewport: Viewport, aspect: f64) {
        self.viewport = Some(viewport);
        self.modify(camera, |n| n.aspect = Some(aspect as f32));
    }

    // Bevy's own render schedule draws the mirrored entities every frame.
    fn render(&mut self) {}

    fn destroy(&mut self, node: SceneNodeId) {
        if let Some(removed) = self.nodes.remove(&node) {
            self.destroyed.push((node, removed.kind));
        }
    }
}

// =========================================================================
// == Bevy Side ==
// =========================================================================

/// Texture and materials shared by every navball in the app.
#[derive(Resource, Debug, Clone)]
pub struct NavballAssets {
    pub texture: Handle<Image>,
    pub sphere_material: Handle<StandardMaterial>,
    pub marker_material: Handle<StandardMaterial>,
}

/// Which Bevy entity stands for which mirrored node.
#[derive(Resource, Default, Debug)]
pub struct SceneEntities(pub HashMap<SceneNodeId, Entity>);

pub struct SceneMirrorPlugin;

impl Plugin for SceneMirrorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneEntities>()
            .add_systems(Startup, setup_navball_assets)
            .add_systems(Update, sync_scene_mirror.in_set(NavballSet::SceneSync));
    }
}

/// Builds the texture and materials. Without an asset pipeline (headless
/// runs) nothing is inserted and the panel's mount will fail.
fn setup_navball_assets(
    mut commands: Commands,
    images: Option<ResMut<Assets<Image>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let (Some(mut images), Some(mut materials)) = (images, materials) else {
        warn!("No render assets available; the navball will not be drawn.");
        return;
    };

    let texture = images.add(texture::navball_image());
    let sphere_material = materials.add(StandardMaterial {
        base_color_texture: Some(texture.clone()),
        perceptual_roughness: 0.6,
        ..default()
    });
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.8, 0.1),
        emissive: LinearRgba::rgb(0.6, 0.45, 0.05),
        unlit: true,
        ..default()
    });

    info!(
        "Navball texture generated ({}x{}).",
        texture::TEXTURE_WIDTH,
        texture::TEXTURE_HEIGHT
    );
    commands.insert_resource(NavballAssets {
        texture,
        sphere_material,
        marker_material,
    });
}

/// Copies the panel's scene mirror into Bevy entities.
fn sync_scene_mirror(
    mut commands: Commands,
    mut panel: ResMut<NavballPanelResource>,
    mut entities: ResMut<SceneEntities>,
    assets: Option<Res<NavballAssets>>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    ambient: Option<ResMut<AmbientLight>>,
    mut nodes: Query<(&mut Transform, &mut Visibility)>,
    mut projections: Query<&mut Projection>,
) {
    let Some(panel) = panel.0.as_mut() else {
        return;
    };
    let mirror = panel.renderer_mut();
    let (Some(assets), Some(mut meshes)) = (assets, meshes) else {
        return;
    };
    let mut ambient = ambient;

    // --- Despawn what the panel released ---
    for (id, kind) in mirror.take_destroyed() {
        if let MirrorNodeKind::Light(LightSpec::Ambient { .. }) = kind {
            if let Some(ambient) = ambient.as_mut() {
                ambient.brightness = 0.0;
            }
        }
        if let Some(entity) = entities.0.remove(&id) {
            commands.entity(entity).despawn();
        }
    }

    // --- Spawn or update what changed ---
    for (id, node) in mirror.take_dirty() {
        if let Some(&entity) = entities.0.get(&id) {
            update_node_entity(entity, &node, &mut nodes, &mut projections);
            continue;
        }

        if let MirrorNodeKind::Light(LightSpec::Ambient { intensity }) = node.kind {
            if let Some(ambient) = ambient.as_mut() {
                ambient.brightness = intensity as f32 * AMBIENT_BRIGHTNESS_SCALE;
            }
            continue;
        }

        let entity = spawn_node_entity(&mut commands, &node, &assets, &mut meshes);
        debug!("Spawned {:?} for scene node {:?}", entity, id);
        entities.0.insert(id, entity);
    }
}

fn visibility(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

fn spawn_node_entity(
    commands: &mut Commands,
    node: &MirrorNode,
    assets: &NavballAssets,
    meshes: &mut Assets<Mesh>,
) -> Entity {
    match &node.kind {
        MirrorNodeKind::Camera(spec) => {
            let mut perspective = PerspectiveProjection {
                fov: (spec.fov_y_degrees as f32).to_radians(),
                near: spec.near as f32,
                far: spec.far as f32,
                ..default()
            };
            if let Some(aspect) = node.aspect {
                perspective.aspect_ratio = aspect;
            }
            commands
                .spawn((
                    Name::new("Navball Camera"),
                    Camera3d::default(),
                    Projection::from(perspective),
                    Transform::from_xyz(0.0, 0.0, spec.distance as f32)
                        .looking_at(Vec3::ZERO, Vec3::Y),
                ))
                .id()
        }
        MirrorNodeKind::Light(spec) => {
            let (direction, intensity) = match spec {
                LightSpec::Directional {
                    direction,
                    intensity,
                } => (array_to_bevy_vec3(*direction), *intensity),
                // Ambient light is a resource, not an entity.
                LightSpec::Ambient { intensity } => (Vec3::NEG_Y, *intensity),
            };
            commands
                .spawn((
                    Name::new("Navball Light"),
                    DirectionalLight {
                        illuminance: intensity as f32 * DIRECTIONAL_ILLUMINANCE_SCALE,
                        ..default()
                    },
                    Transform::default().looking_to(direction, Vec3::Y),
                ))
                .id()
        }
        MirrorNodeKind::Sphere(spec) => {
            let mesh = meshes.add(
                Sphere::new(spec.radius as f32)
                    .mesh()
                    .uv(spec.width_segments, spec.height_segments),
            );
            commands
                .spawn((
                    Name::new("Navball"),
                    Transform::from_rotation(node.rotation),
                    visibility(node.visible),
                ))
                .with_children(|parent| {
                    // The UV sphere's poles lie on its local Z axis; stand them up
                    // so the sky pole points along +Y.
                    parent.spawn((
                        Mesh3d(mesh),
                        MeshMaterial3d(assets.sphere_material.clone()),
                        Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                    ));
                })
                .id()
        }
        MirrorNodeKind::HeadingMarker(spec) => {
            let length = spec.length as f32;
            let thickness = spec.thickness as f32;
            let mesh = meshes.add(Cuboid::new(thickness, thickness, length));
            commands
                .spawn((
                    Name::new("Heading Marker"),
                    Transform::from_rotation(node.rotation),
                    visibility(node.visible),
                ))
                .with_children(|parent| {
                    // Points along +Z at zero rotation, starting at the center.
                    parent.spawn((
                        Mesh3d(mesh),
                        MeshMaterial3d(assets.marker_material.clone()),
                        Transform::from_xyz(0.0, 0.0, length / 2.0),
                    ));
                })
                .id()
        }
    }
}

fn update_node_entity(
    entity: Entity,
    node: &MirrorNode,
    nodes: &mut Query<(&mut Transform, &mut Visibility)>,
    projections: &mut Query<&mut Projection>,
) {
    match node.kind {
        MirrorNodeKind::Camera(_) => {
            if let (Ok(mut projection), Some(aspect)) = (projections.get_mut(entity), node.aspect) {
                if let Projection::Perspective(perspective) = &mut *projection {
                    perspective.aspect_ratio = aspect;
                }
            }
        }
        MirrorNodeKind::Sphere(_) | MirrorNodeKind::HeadingMarker(_) => {
            if let Ok((mut transform, mut vis)) = nodes.get_mut(entity) {
                transform.rotation = node.rotation;
                *vis = visibility(node.visible);
            }
        }
        MirrorNodeKind::Light(_) => {}
    }
}
