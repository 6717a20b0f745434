// navball_core/src/scene.rs

use nalgebra::Quaternion;
use std::fmt::{Debug, Display};
use tracing::debug;

use crate::error::NavballError;

// =========================================================================
// == Render Engine Contract ==
// =========================================================================

/// The capabilities the navball needs from a 3D render engine.
///
/// Handles are plain `Copy` ids owned by the caller; the engine keeps the
/// actual objects. Every handle returned by a `create_*` call is passed back
/// to `destroy` exactly once.
pub trait SceneRenderer {
    type Handle: Copy + Debug + PartialEq;
    type Error: Display;

    fn create_camera(&mut self, spec: &CameraSpec) -> Result<Self::Handle, Self::Error>;
    fn create_light(&mut self, spec: &LightSpec) -> Result<Self::Handle, Self::Error>;
    /// A sphere with the navball texture mapped onto it.
    fn create_sphere(&mut self, spec: &SphereSpec) -> Result<Self::Handle, Self::Error>;
    fn create_heading_marker(&mut self, spec: &MarkerSpec) -> Result<Self::Handle, Self::Error>;

    /// Sets an object's orientation from a quaternion in render coordinates.
    fn set_orientation(&mut self, node: Self::Handle, rotation: &Quaternion<f64>);
    /// Sets an object's rotation about the render engine's vertical axis.
    fn set_rotation_about_vertical(&mut self, node: Self::Handle, angle: f64);
    fn set_visible(&mut self, node: Self::Handle, visible: bool);

    /// Matches the output surface and the camera projection to a new size.
    fn resize(&mut self, camera: Self::Handle, viewport: Viewport, aspect: f64);
    fn render(&mut self);
    fn destroy(&mut self, node: Self::Handle);
}

// =========================================================================
// == Scene Layout ==
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CameraSpec {
    pub fov_y_degrees: f64,
    /// Distance from the sphere's center along the viewing axis.
    pub distance: f64,
    pub near: f64,
    pub far: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightSpec {
    Ambient { intensity: f64 },
    Directional { direction: [f64; 3], intensity: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereSpec {
    pub radius: f64,
    pub width_segments: u32,
    pub height_segments: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub length: f64,
    pub thickness: f64,
}

/// Everything created once at mount time.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub camera: CameraSpec,
    pub lights: Vec<LightSpec>,
    pub sphere: SphereSpec,
    /// `None` leaves the heading indicator out of the scene entirely.
    pub heading_marker: Option<MarkerSpec>,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            camera: CameraSpec {
                fov_y_degrees: 45.0,
                distance: 3.0,
                near: 0.1,
                far: 100.0,
            },
            lights: vec![
                LightSpec::Ambient { intensity: 0.6 },
                LightSpec::Directional {
                    direction: [-1.0, -1.0, -2.0],
                    intensity: 0.8,
                },
            ],
            sphere: SphereSpec {
                radius: 1.0,
                width_segments: 64,
                height_segments: 32,
            },
            heading_marker: Some(MarkerSpec {
                length: 1.3,
                thickness: 0.03,
            }),
        }
    }
}

/// The visible size of the panel in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `None` for a collapsed panel; a zero side would give a degenerate projection.
    pub fn aspect(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }
}

// =========================================================================
// == Scene State ==
// =========================================================================

/// Every render-engine handle the panel owns, plus the values last written to them.
///
/// Built once by [`SceneState::create`] and released once by
/// [`SceneState::destroy`]; nothing else creates or frees these objects.
#[derive(Debug)]
pub struct SceneState<H> {
    camera: H,
    lights: Vec<H>,
    sphere: H,
    heading_marker: Option<H>,
    orientation: Quaternion<f64>,
    heading: Option<f64>,
}

impl<H: Copy + Debug + PartialEq> SceneState<H> {
    /// Creates the camera, lights, sphere and heading marker.
    ///
    /// If any object fails, those already created are destroyed again before
    /// the error is returned.
    pub fn create<R>(renderer: &mut R, layout: &SceneLayout) -> Result<Self, NavballError>
    where
        R: SceneRenderer<Handle = H>,
    {
        let mut created: Vec<H> = Vec::new();
        let result = Self::create_all(renderer, layout, &mut created);
        if result.is_err() {
            for handle in created.into_iter().rev() {
                renderer.destroy(handle);
            }
        }
        result
    }

    fn create_all<R>(
        renderer: &mut R,
        layout: &SceneLayout,
        created: &mut Vec<H>,
    ) -> Result<Self, NavballError>
    where
        R: SceneRenderer<Handle = H>,
    {
        let unavailable = |what: &str, e: R::Error| {
            NavballError::SceneUnavailable(format!("failed to create {}: {}", what, e))
        };

        let camera = renderer
            .create_camera(&layout.camera)
            .map_err(|e| unavailable("camera", e))?;
        created.push(camera);

        let mut lights = Vec::with_capacity(layout.lights.len());
        for spec in &layout.lights {
            let light = renderer
                .create_light(spec)
                .map_err(|e| unavailable("light", e))?;
            created.push(light);
            lights.push(light);
        }

        let sphere = renderer
            .create_sphere(&layout.sphere)
            .map_err(|e| unavailable("sphere", e))?;
        created.push(sphere);

        let heading_marker = match &layout.heading_marker {
            Some(spec) => {
                let marker = renderer
                    .create_heading_marker(spec)
                    .map_err(|e| unavailable("heading marker", e))?;
                created.push(marker);
                // Hidden until the first usable heading sample arrives.
                renderer.set_visible(marker, false);
                Some(marker)
            }
            None => None,
        };

        Ok(Self {
            camera,
            lights,
            sphere,
            heading_marker,
            orientation: Quaternion::identity(),
            heading: None,
        })
    }

    pub fn apply_orientation<R>(&mut self, renderer: &mut R, rotation: Quaternion<f64>)
    where
        R: SceneRenderer<Handle = H>,
    {
        renderer.set_orientation(self.sphere, &rotation);
        self.orientation = rotation;
    }

    /// Shows the indicator at `angle`, or hides it for `None`.
    pub fn apply_heading<R>(&mut self, renderer: &mut R, angle: Option<f64>)
    where
        R: SceneRenderer<Handle = H>,
    {
        let Some(marker) = self.heading_marker else {
            return;
        };
        match angle {
            Some(angle) => {
                renderer.set_rotation_about_vertical(marker, angle);
                renderer.set_visible(marker, true);
            }
            None => renderer.set_visible(marker, false),
        }
        self.heading = angle;
    }

    /// Returns `false` (and leaves the camera alone) for a zero-sized viewport.
    pub fn resize<R>(&self, renderer: &mut R, viewport: Viewport) -> bool
    where
        R: SceneRenderer<Handle = H>,
    {
        match viewport.aspect() {
            Some(aspect) => {
                renderer.resize(self.camera, viewport, aspect);
                true
            }
            None => {
                debug!(
                    "Ignoring resize to {}x{}: zero-sized viewport.",
                    viewport.width, viewport.height
                );
                false
            }
        }
    }

    pub fn destroy<R>(self, renderer: &mut R)
    where
        R: SceneRenderer<Handle = H>,
    {
        if let Some(marker) = self.heading_marker {
            renderer.destroy(marker);
        }
        renderer.destroy(self.sphere);
        for light in self.lights.into_iter().rev() {
            renderer.destroy(light);
        }
        renderer.destroy(self.camera);
    }

    /// The orientation currently shown on the sphere, in render coordinates.
    pub fn orientation(&self) -> &Quaternion<f64> {
        &self.orientation
    }

    /// The indicator's rotation, or `None` while it is hidden.
    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn sphere(&self) -> H {
        self.sphere
    }

    pub fn heading_marker(&self) -> Option<H> {
        self.heading_marker
    }

    pub fn camera(&self) -> H {
        self.camera
    }
}
