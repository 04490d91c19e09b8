use cgmath::{
    perspective, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, Vector4,
};

use crate::gfx::camera::camera_utils::{convert_matrix4_to_array, CameraUniform};
use crate::gfx::picking::Aabb;

/// Number of numbered view slots.
pub const VIEW_SLOT_COUNT: usize = 10;

/// Shortest allowed distance between camera position and target. Poses closer
/// than this have an undefined view direction and are rejected.
const MIN_VIEW_DISTANCE: f32 = 1e-4;

/// Fixed elevated diagonal the camera is placed along when framing a bounding
/// box (normalized at use).
const FRAMING_DIRECTION: Vector3<f32> = Vector3::new(1.0, 0.75, 1.0);

const DEFAULT_POSITION: Vector3<f32> = Vector3::new(6.0, 4.5, 6.0);
const DEFAULT_TARGET: Vector3<f32> = Vector3::new(0.0, 0.0, 0.0);
const DEFAULT_FOV_Y_DEG: f32 = 45.0;
const DEFAULT_ZNEAR: f32 = 0.1;
const DEFAULT_ZFAR: f32 = 1000.0;

/// Immutable snapshot of a camera pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSlot {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub fov_y_deg: f32,
    pub znear: f32,
    pub zfar: f32,
}

/// Orbit-style authoring camera.
///
/// Holds the camera pose (position, target, vertical field of view, clip
/// distances), the viewport it projects into, and the cached view/projection
/// matrices, which are recomputed by every setter. Gesture input is applied by
/// [`CameraController`](super::CameraController); this type only guards its
/// own invariants (non-degenerate view vector, positive viewport).
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vector3<f32>,
    target: Vector3<f32>,
    fov_y_deg: f32,
    znear: f32,
    zfar: f32,
    viewport: (u32, u32),
    view: Matrix4<f32>,
    proj: Matrix4<f32>,
    saved_pose: Option<ViewSlot>,
    slots: [Option<ViewSlot>; VIEW_SLOT_COUNT],
}

impl OrbitCamera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        let viewport = if viewport_width > 0 && viewport_height > 0 {
            (viewport_width, viewport_height)
        } else {
            (1280, 800)
        };

        let mut camera = Self {
            position: DEFAULT_POSITION,
            target: DEFAULT_TARGET,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            znear: DEFAULT_ZNEAR,
            zfar: DEFAULT_ZFAR,
            viewport,
            view: Matrix4::identity(),
            proj: Matrix4::identity(),
            saved_pose: None,
            slots: [None; VIEW_SLOT_COUNT],
        };
        camera.rebuild_matrices();
        camera
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn target(&self) -> Vector3<f32> {
        self.target
    }

    pub fn fov_y_deg(&self) -> f32 {
        self.fov_y_deg
    }

    pub fn znear(&self) -> f32 {
        self.znear
    }

    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Normalized view direction.
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }

    /// Distance from the camera position to its target.
    pub fn distance(&self) -> f32 {
        (self.target - self.position).magnitude()
    }

    /// Moves the camera position. Rejected (with a warning) when the new
    /// position coincides with the target.
    pub fn set_position(&mut self, position: Vector3<f32>) {
        if (position - self.target).magnitude2() < MIN_VIEW_DISTANCE * MIN_VIEW_DISTANCE {
            log::warn!("rejected camera position on top of its target");
            return;
        }
        self.position = position;
        self.rebuild_matrices();
    }

    /// Moves the look-at target. Rejected when it coincides with the position.
    pub fn set_target(&mut self, target: Vector3<f32>) {
        if (target - self.position).magnitude2() < MIN_VIEW_DISTANCE * MIN_VIEW_DISTANCE {
            log::warn!("rejected camera target on top of its position");
            return;
        }
        self.target = target;
        self.rebuild_matrices();
    }

    /// Moves position and target together, keeping the degenerate-pose guard.
    pub fn set_look_at(&mut self, position: Vector3<f32>, target: Vector3<f32>) {
        if (target - position).magnitude2() < MIN_VIEW_DISTANCE * MIN_VIEW_DISTANCE {
            log::warn!("rejected degenerate camera pose");
            return;
        }
        self.position = position;
        self.target = target;
        self.rebuild_matrices();
    }

    /// Vertical field of view in degrees, clamped to a usable range.
    pub fn set_fov(&mut self, fov_y_deg: f32) {
        self.fov_y_deg = fov_y_deg.clamp(1.0, 179.0);
        self.rebuild_matrices();
    }

    pub fn set_near(&mut self, znear: f32) {
        if znear <= 0.0 {
            return;
        }
        self.znear = znear;
        self.rebuild_matrices();
    }

    pub fn set_far(&mut self, zfar: f32) {
        if zfar <= 0.0 {
            return;
        }
        self.zfar = zfar;
        self.rebuild_matrices();
    }

    /// Updates the projected viewport. Non-positive dimensions are ignored,
    /// so the projection matrix never divides by zero.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.rebuild_matrices();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.proj
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.proj * self.view
    }

    /// GPU-layout camera data for the host renderer.
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: [self.position.x, self.position.y, self.position.z, 1.0],
            view_proj: convert_matrix4_to_array(self.view_projection_matrix()),
        }
    }

    /// Unprojects a screen pixel to a normalized world-space ray direction
    /// originating at the camera position.
    pub fn mouse_ray(&self, screen_x: f64, screen_y: f64) -> Vector3<f32> {
        let (width, height) = self.viewport;
        let ndc_x = (2.0 * screen_x as f32) / width as f32 - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_y as f32) / height as f32;

        let inv_view_proj = self
            .view_projection_matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity);

        let near = inv_view_proj * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        let direction = far - near;
        if direction.magnitude2() < f32::EPSILON {
            return self.forward();
        }
        direction.normalize()
    }

    /// Snapshots the current pose as the single unnamed baseline.
    pub fn save_state(&mut self) {
        self.saved_pose = Some(self.snapshot());
    }

    /// Restores the unnamed baseline, if one was saved.
    pub fn restore_state(&mut self) {
        if let Some(pose) = self.saved_pose {
            self.apply_snapshot(pose);
        }
    }

    /// Saves the current pose into a numbered slot. Indices outside
    /// `0..VIEW_SLOT_COUNT` are no-ops.
    pub fn save_slot(&mut self, index: usize) {
        if index >= VIEW_SLOT_COUNT {
            return;
        }
        self.slots[index] = Some(self.snapshot());
    }

    /// Restores a numbered slot. Unsaved slots and out-of-range indices are
    /// no-ops.
    pub fn restore_slot(&mut self, index: usize) {
        if index >= VIEW_SLOT_COUNT {
            return;
        }
        if let Some(pose) = self.slots[index] {
            self.apply_snapshot(pose);
        }
    }

    pub fn has_slot_data(&self, index: usize) -> bool {
        index < VIEW_SLOT_COUNT && self.slots[index].is_some()
    }

    /// Frames a world-space bounding box: places the camera along the fixed
    /// elevated diagonal at `max_extent / (2 tan(fov/2)) * margin` from the
    /// box center, looking at the center, with clip distances proportional to
    /// the framing distance. Invalid boxes reset the camera to its default
    /// pose instead.
    pub fn zoom_to_extent(&mut self, bounds: &Aabb, margin: f32) {
        if !bounds.is_valid() {
            log::warn!("zoom_to_extent called with an invalid bounding box, resetting camera");
            self.reset_to_default();
            return;
        }

        let half_fov = (self.fov_y_deg * 0.5).to_radians();
        let distance = bounds.max_dimension() / (2.0 * half_fov.tan()) * margin;
        if !distance.is_finite() || distance <= 0.0 {
            log::warn!("zoom_to_extent produced no usable distance, resetting camera");
            self.reset_to_default();
            return;
        }
        let center = bounds.center();

        self.position = center + FRAMING_DIRECTION.normalize() * distance;
        self.target = center;
        self.znear = (0.01 * distance).max(MIN_VIEW_DISTANCE);
        self.zfar = 10.0 * distance;
        self.rebuild_matrices();
    }

    /// Restores the built-in default pose.
    pub fn reset_to_default(&mut self) {
        self.position = DEFAULT_POSITION;
        self.target = DEFAULT_TARGET;
        self.fov_y_deg = DEFAULT_FOV_Y_DEG;
        self.znear = DEFAULT_ZNEAR;
        self.zfar = DEFAULT_ZFAR;
        self.rebuild_matrices();
    }

    fn snapshot(&self) -> ViewSlot {
        ViewSlot {
            position: self.position,
            target: self.target,
            fov_y_deg: self.fov_y_deg,
            znear: self.znear,
            zfar: self.zfar,
        }
    }

    fn apply_snapshot(&mut self, pose: ViewSlot) {
        self.position = pose.position;
        self.target = pose.target;
        self.fov_y_deg = pose.fov_y_deg;
        self.znear = pose.znear;
        self.zfar = pose.zfar;
        self.rebuild_matrices();
    }

    fn rebuild_matrices(&mut self) {
        let eye = Point3::from_vec(self.position);
        let center = Point3::from_vec(self.target);
        self.view = Matrix4::look_at_rh(eye, center, Vector3::unit_y());

        let (width, height) = self.viewport;
        let aspect = width as f32 / height as f32;
        self.proj = perspective(Deg(self.fov_y_deg), aspect, self.znear, self.zfar);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}
