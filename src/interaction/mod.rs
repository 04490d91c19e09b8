//! # Interaction Arbitration Module
//!
//! The orchestration layer of the toolkit. [`InteractionArbiter`] owns the
//! camera manager and the placement projector and decides, per input event,
//! whether the event moves the camera or places/moves a scene node. It also
//! implements plane locking with the Shift-held perpendicular escape axis and
//! maintains the cursor/grid feedback state the host renders.
//!
//! ## Key Components
//!
//! - [`InteractionArbiter`] - Event routing, mode machine, plane locking
//! - [`InteractionMode`] - Camera / Placement / Auto routing policy
//! - [`CursorState`] - Free and constrained cursor positions
//! - [`CursorVisual`] / [`GridVisual`] - Feedback state for the host renderer

pub mod arbiter;
pub mod visuals;

// Re-export main types
pub use arbiter::{CursorState, InteractionArbiter, InteractionMode, PERPENDICULAR_RANGE};
pub use visuals::{CursorStyle, CursorVisual, GridVisual};
