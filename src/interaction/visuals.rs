use cgmath::Vector3;

use crate::gfx::placement::PlacementPlane;

/// Colour of the locked (plane-constrained) cursor.
pub const CURSOR_LOCKED_COLOR: [f32; 4] = [0.85, 0.18, 0.18, 1.0];
/// Colour of the cursor while the perpendicular escape axis is active.
pub const CURSOR_PERPENDICULAR_COLOR: [f32; 4] = [1.0, 0.55, 0.1, 1.0];
/// Colour of the free, unconstrained cursor.
pub const CURSOR_FREE_COLOR: [f32; 4] = [1.0, 0.9, 0.2, 1.0];

/// Constraint state of the placement cursor, encoded as a marker colour for
/// the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    /// Clamped onto the placement plane.
    Locked,
    /// Moving along the plane normal (perpendicular escape axis).
    Perpendicular,
    /// Free movement along the view ray.
    Free,
}

impl CursorStyle {
    pub fn color(&self) -> [f32; 4] {
        match self {
            CursorStyle::Locked => CURSOR_LOCKED_COLOR,
            CursorStyle::Perpendicular => CURSOR_PERPENDICULAR_COLOR,
            CursorStyle::Free => CURSOR_FREE_COLOR,
        }
    }
}

/// Marker the host draws at the authoritative cursor position.
#[derive(Debug, Clone, Copy)]
pub struct CursorVisual {
    pub position: Vector3<f32>,
    pub style: CursorStyle,
    pub visible: bool,
}

impl CursorVisual {
    pub fn color(&self) -> [f32; 4] {
        self.style.color()
    }
}

impl Default for CursorVisual {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            style: CursorStyle::Locked,
            visible: true,
        }
    }
}

/// Reference grid the host draws aligned with the active placement plane.
#[derive(Debug, Clone, Copy)]
pub struct GridVisual {
    pub plane: PlacementPlane,
    pub offset: f32,
    pub visible: bool,
}

impl Default for GridVisual {
    fn default() -> Self {
        Self {
            plane: PlacementPlane::Xz,
            offset: 0.0,
            visible: true,
        }
    }
}
