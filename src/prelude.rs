//! # Maquette Prelude
//!
//! Convenient imports for typical hosts of the placement toolkit.
//!
//! ## Usage
//!
//! ```rust
//! use maquette::prelude::*;
//! ```

// Re-export the orchestration layer
pub use crate::interaction::{
    CursorState, CursorStyle, CursorVisual, GridVisual, InteractionArbiter, InteractionMode,
};

// Re-export camera and placement types
pub use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera, ViewSlot};
pub use crate::gfx::picking::{Aabb, Ray};
pub use crate::gfx::placement::{PlacementMode, PlacementPlane, PlacementProjector};

// Re-export the host seams
pub use crate::gfx::scene::{NodeId, SceneDelegate, SceneError};
pub use crate::ui::{placement_panel, NoUi, PanelState, UiCapture};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
pub use imgui::Ui;
