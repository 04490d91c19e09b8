//! # Placement Projection Module
//!
//! Converts 2D screen coordinates into 3D world points by casting a ray from
//! the camera through the screen pixel and intersecting it with an
//! axis-aligned placement plane, with optional grid snapping. Also owns the
//! selection and drag session used to move existing nodes.
//!
//! ## Key Components
//!
//! - [`PlacementProjector`] - Projection, snapping, and the drag machine
//! - [`PlacementPlane`] - Which axis-aligned plane the cursor projects onto
//! - [`PlacementMode`] - Whether a claimed click creates or moves nodes

pub mod projector;

// Re-export main types
pub use projector::{PlacementMode, PlacementPlane, PlacementProjector};
