// src/lib.rs
//! Maquette 3D Placement Toolkit
//!
//! Interactive placement and camera arbitration for scene-authoring tools:
//! an orbit camera with gesture controls and view slots, a screen-to-plane
//! placement projector with grid snapping, and the arbiter that routes raw
//! input unambiguously to one of them.

pub mod gfx;
pub mod interaction;
pub mod prelude;
pub mod ui;

// Re-export main types for convenience
pub use interaction::InteractionArbiter;

/// Creates an arbiter with a default camera and controller
pub fn default() -> InteractionArbiter {
    InteractionArbiter::default()
}

/// Installs an `env_logger` backend for the toolkit's log output.
///
/// Opt-in: library hosts that already configure their own logger should
/// simply not call this. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).try_init();
}
