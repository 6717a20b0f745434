// navball_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::host::RenderHost;
pub use crate::scene::SceneRenderer;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{PanelConfig, PanelSchemas, SettingsAction, SettingsField, SettingsTree};
pub use crate::messages::{FrameBatch, HeadingSample, Message, OrientationSample, Topic};
pub use crate::scene::{CameraSpec, LightSpec, SceneLayout, SphereSpec, Viewport};

// --- The Pipeline ---
pub use crate::error::NavballError;
pub use crate::frames::to_render_quaternion;
pub use crate::panel::{FrameDone, FrameOutcome, NavballPanel, PanelPhase};
