use cgmath::Vector3;
use winit::event::{ElementState, MouseButton};

use crate::gfx::camera::OrbitCamera;
use crate::gfx::picking::{self, Ray};
use crate::gfx::scene::{
    CursorMovedCallback, NodeId, NodeMovedCallback, NodeSelectionCallback, SceneDelegate,
};

/// Axis-aligned plane the placement cursor projects onto, identified by its
/// normal axis (Y, Z and X respectively).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPlane {
    /// Ground plane, normal along +Y.
    Xz,
    /// Front plane, normal along +Z.
    Xy,
    /// Side plane, normal along +X.
    Yz,
}

impl PlacementPlane {
    pub fn normal(&self) -> Vector3<f32> {
        match self {
            PlacementPlane::Xz => Vector3::unit_y(),
            PlacementPlane::Xy => Vector3::unit_z(),
            PlacementPlane::Yz => Vector3::unit_x(),
        }
    }

    /// Component index of the normal axis.
    pub fn normal_axis(&self) -> usize {
        match self {
            PlacementPlane::Xz => 1,
            PlacementPlane::Xy => 2,
            PlacementPlane::Yz => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlacementPlane::Xz => "XZ",
            PlacementPlane::Xy => "XY",
            PlacementPlane::Yz => "YZ",
        }
    }
}

/// What a claimed click does: spawn a new node or manipulate the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Create,
    Move,
}

/// A single-selection drag in progress: the press-time world point and each
/// selected node's press-time position.
#[derive(Debug, Clone)]
struct DragSession {
    start_point: Vector3<f32>,
    snapshots: Vec<(NodeId, Vector3<f32>)>,
}

/// Screen-to-world placement projector.
///
/// Casts a ray from the camera through a screen pixel and intersects it with
/// the active placement plane, optionally snapping the result to a grid. Also
/// owns the selection and the Idle / Selected / Dragging session machine that
/// moves selected nodes by the cursor delta.
pub struct PlacementProjector {
    plane: PlacementPlane,
    plane_offset: f32,
    snap_enabled: bool,
    snap_cell: f32,
    mode: PlacementMode,
    /// Plane-lock hook: when set, every live cursor point has its
    /// plane-normal coordinate overwritten with this value.
    normal_override: Option<f32>,
    selection: Vec<NodeId>,
    drag: Option<DragSession>,
    cursor_point: Vector3<f32>,
    previous_cursor_point: Vector3<f32>,
    cursor_moved: Option<CursorMovedCallback>,
    node_selected: Option<NodeSelectionCallback>,
    node_moved: Option<NodeMovedCallback>,
}

impl PlacementProjector {
    pub fn new() -> Self {
        Self {
            plane: PlacementPlane::Xz,
            plane_offset: 0.0,
            snap_enabled: false,
            snap_cell: 1.0,
            mode: PlacementMode::Create,
            normal_override: None,
            selection: Vec::new(),
            drag: None,
            cursor_point: Vector3::new(0.0, 0.0, 0.0),
            previous_cursor_point: Vector3::new(0.0, 0.0, 0.0),
            cursor_moved: None,
            node_selected: None,
            node_moved: None,
        }
    }

    pub fn plane(&self) -> PlacementPlane {
        self.plane
    }

    pub fn set_plane(&mut self, plane: PlacementPlane) {
        self.plane = plane;
    }

    pub fn plane_offset(&self) -> f32 {
        self.plane_offset
    }

    /// Signed distance of the plane from the origin along its normal.
    pub fn set_plane_offset(&mut self, offset: f32) {
        self.plane_offset = offset;
    }

    pub fn placement_mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn set_placement_mode(&mut self, mode: PlacementMode) {
        self.mode = mode;
    }

    /// Enables or disables grid snapping. Non-positive cell sizes disable
    /// snapping regardless of `enabled`.
    pub fn set_grid_snapping(&mut self, enabled: bool, cell: f32) {
        if cell <= 0.0 {
            log::warn!("ignoring grid snap with non-positive cell size {cell}");
            self.snap_enabled = false;
            return;
        }
        self.snap_enabled = enabled;
        self.snap_cell = cell;
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    pub fn snap_cell(&self) -> f32 {
        self.snap_cell
    }

    /// Plane-lock hook used by the interaction arbiter: `Some(v)` forces the
    /// plane-normal coordinate of every live cursor point to `v`.
    pub fn set_normal_override(&mut self, value: Option<f32>) {
        self.normal_override = value;
    }

    pub fn normal_override(&self) -> Option<f32> {
        self.normal_override
    }

    /// Latest live cursor point (constrained, if an override is active).
    pub fn cursor_point(&self) -> Vector3<f32> {
        self.cursor_point
    }

    pub fn previous_cursor_point(&self) -> Vector3<f32> {
        self.previous_cursor_point
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_cursor_moved_callback(&mut self, callback: CursorMovedCallback) {
        self.cursor_moved = Some(callback);
    }

    pub fn set_node_selected_callback(&mut self, callback: NodeSelectionCallback) {
        self.node_selected = Some(callback);
    }

    pub fn set_node_moved_callback(&mut self, callback: NodeMovedCallback) {
        self.node_moved = Some(callback);
    }

    /// Point where the active plane crosses its own normal axis.
    pub fn plane_origin(&self) -> Vector3<f32> {
        self.plane.normal() * self.plane_offset
    }

    /// Snaps each coordinate to the nearest grid cell when snapping is on.
    pub fn snap_point(&self, point: Vector3<f32>) -> Vector3<f32> {
        if !self.snap_enabled {
            return point;
        }
        let cell = self.snap_cell;
        Vector3::new(
            (point.x / cell).round() * cell,
            (point.y / cell).round() * cell,
            (point.z / cell).round() * cell,
        )
    }

    /// Projects a screen pixel onto the active placement plane.
    ///
    /// A ray parallel to the plane falls back to the plane origin rather than
    /// producing a non-finite point; otherwise the intersection is returned,
    /// grid-snapped when snapping is enabled.
    pub fn screen_to_world(&self, camera: &OrbitCamera, x: f64, y: f64) -> Vector3<f32> {
        let ray = Ray::new(camera.position(), camera.mouse_ray(x, y));
        match ray.intersect_plane(self.plane_origin(), self.plane.normal()) {
            Some(t) => self.snap_point(ray.point_at(t)),
            None => self.plane_origin(),
        }
    }

    /// Recomputes the live cursor point, applies the plane-lock override, and
    /// notifies the cursor-moved listener.
    pub fn update_cursor_position(&mut self, camera: &OrbitCamera, x: f64, y: f64) {
        let mut point = self.screen_to_world(camera, x, y);
        if let Some(value) = self.normal_override {
            point[self.plane.normal_axis()] = value;
        }
        self.previous_cursor_point = self.cursor_point;
        self.cursor_point = point;
        if let Some(callback) = self.cursor_moved.as_mut() {
            callback(point);
        }
    }

    /// Replaces the selection with a single node. `None` is ignored, so pick
    /// results can be fed in directly.
    pub fn select_node(&mut self, node: Option<NodeId>) {
        let Some(node) = node else {
            return;
        };
        self.drag = None;
        self.selection.clear();
        self.selection.push(node);
        if let Some(callback) = self.node_selected.as_mut() {
            callback(node);
        }
    }

    /// Replaces the selection with a list of nodes.
    pub fn select_nodes(&mut self, nodes: Vec<NodeId>) {
        self.drag = None;
        self.selection = nodes;
        if let Some(callback) = self.node_selected.as_mut() {
            for &node in &self.selection {
                callback(node);
            }
        }
    }

    /// Clears the selection, destroying any drag in progress.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.drag = None;
    }

    /// Casts a pick ray through the scene and returns the closest node whose
    /// bounds it hits.
    pub fn pick_node(
        &self,
        camera: &OrbitCamera,
        scene: &dyn SceneDelegate,
        x: f64,
        y: f64,
    ) -> Option<NodeId> {
        let ray = Ray::new(camera.position(), camera.mouse_ray(x, y));
        picking::pick_node(&ray, scene).map(|hit| hit.node)
    }

    /// Left-button handler for the drag session machine.
    ///
    /// Press in Move mode over a non-empty selection snapshots the selected
    /// nodes and enters Dragging; release applies the final delta and returns
    /// to Selected. Everything else is a no-op.
    pub fn handle_mouse_button(
        &mut self,
        scene: &mut dyn SceneDelegate,
        camera: &OrbitCamera,
        button: MouseButton,
        state: ElementState,
        x: f64,
        y: f64,
    ) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if self.mode != PlacementMode::Move || self.selection.is_empty() {
                    return;
                }
                self.update_cursor_position(camera, x, y);
                let snapshots: Vec<_> = self
                    .selection
                    .iter()
                    .filter_map(|&node| scene.node_position(node).map(|p| (node, p)))
                    .collect();
                if snapshots.is_empty() {
                    log::debug!("drag press over a selection with no live nodes");
                    return;
                }
                self.drag = Some(DragSession {
                    start_point: self.cursor_point,
                    snapshots,
                });
                log::debug!("drag started at {:?}", self.cursor_point);
            }
            ElementState::Released => {
                if self.drag.is_none() {
                    return;
                }
                self.update_cursor_position(camera, x, y);
                self.apply_drag(scene);
                self.drag = None;
                log::debug!("drag finished at {:?}", self.cursor_point);
            }
        }
    }

    /// Updates the live cursor and, while dragging, re-applies
    /// `snapshot + delta` to every selected node.
    pub fn handle_mouse_move(
        &mut self,
        scene: &mut dyn SceneDelegate,
        camera: &OrbitCamera,
        x: f64,
        y: f64,
    ) {
        self.update_cursor_position(camera, x, y);
        if self.drag.is_some() {
            self.apply_drag(scene);
        }
    }

    /// Aborts a drag in progress, restoring every node to its press-time
    /// position.
    pub fn cancel_drag(&mut self, scene: &mut dyn SceneDelegate) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        for (node, original) in drag.snapshots {
            if scene.set_node_position(node, original) {
                if let Some(callback) = self.node_moved.as_mut() {
                    callback(node, original);
                }
            }
        }
        log::debug!("drag cancelled");
    }

    fn apply_drag(&mut self, scene: &mut dyn SceneDelegate) {
        let Some(drag) = self.drag.as_ref() else {
            return;
        };
        let delta = self.cursor_point - drag.start_point;
        let moved: Vec<_> = drag
            .snapshots
            .iter()
            .map(|&(node, snapshot)| (node, self.snap_point(snapshot + delta)))
            .collect();
        for (node, position) in moved {
            if !scene.set_node_position(node, position) {
                log::debug!("skipping stale node {node:?} during drag");
                continue;
            }
            if let Some(callback) = self.node_moved.as_mut() {
                callback(node, position);
            }
        }
    }
}

impl Default for PlacementProjector {
    fn default() -> Self {
        Self::new()
    }
}
