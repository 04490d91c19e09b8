//! # UI Integration Module
//!
//! The toolkit's two contact points with the host's 2D UI layer: the
//! input-capture query that shields placement from clicks on overlapping
//! panels, and a pre-built ImGui control panel for the arbiter configuration
//! surface.

pub mod capture;
pub mod panel;

// Re-export main types
pub use capture::{NoUi, UiCapture};
pub use panel::{placement_panel, PanelState};
