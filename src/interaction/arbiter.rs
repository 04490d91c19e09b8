use cgmath::Vector3;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, ModifiersState};

use crate::gfx::camera::{CameraManager, OrbitCamera};
use crate::gfx::picking;
use crate::gfx::placement::{PlacementMode, PlacementPlane, PlacementProjector};
use crate::gfx::scene::{
    CursorMovedCallback, NodeCreationCallback, NodeId, NodeMovedCallback, NodeSelectionCallback,
    SceneDelegate,
};
use crate::ui::UiCapture;

use super::visuals::{CursorStyle, CursorVisual, GridVisual};

/// World-unit span the perpendicular escape axis covers from screen center to
/// either vertical screen edge. Fixed, so sensitivity never depends on how far
/// the camera happens to be zoomed out.
pub const PERPENDICULAR_RANGE: f32 = 10.0;

/// Who owns an input event.
///
/// `Camera` and `Placement` route everything unconditionally; `Auto` decides
/// per event from the placement mode, the selection, the button, and the held
/// modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Camera,
    Placement,
    Auto,
}

impl InteractionMode {
    /// Successor in the Tab cycle: Auto, Camera, Placement, back to Auto.
    pub fn cycled(&self) -> Self {
        match self {
            InteractionMode::Auto => InteractionMode::Camera,
            InteractionMode::Camera => InteractionMode::Placement,
            InteractionMode::Placement => InteractionMode::Auto,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionMode::Camera => "Camera",
            InteractionMode::Placement => "Placement",
            InteractionMode::Auto => "Auto",
        }
    }
}

/// Live cursor bookkeeping: the raw ray/plane projection, the constrained
/// point actually used for placement, and the plane-lock constraint.
#[derive(Debug, Clone, Copy)]
pub struct CursorState {
    /// Unconstrained projection of the mouse onto the placement plane.
    pub free_position: Vector3<f32>,
    /// Authoritative cursor point after plane locking / perpendicular
    /// movement is applied.
    pub constrained_position: Vector3<f32>,
    /// Whether plane locking is active.
    pub locked: bool,
    /// Signed distance of the locked plane from the origin along its normal.
    pub constraint_offset: f32,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            free_position: Vector3::new(0.0, 0.0, 0.0),
            constrained_position: Vector3::new(0.0, 0.0, 0.0),
            locked: true,
            constraint_offset: 0.0,
        }
    }
}

/// Routes raw input to either the camera controller or the placement
/// projector.
///
/// The host forwards every mouse/keyboard event here. Events the UI layer is
/// capturing are dropped outright; everything else is arbitrated, possibly
/// consumed by placement, and always mirrored into the camera controller's
/// live input state, with the manipulation-blocked flag deciding whether the
/// camera acts on it at the next [`update`](Self::update).
pub struct InteractionArbiter {
    mode: InteractionMode,
    camera_manager: CameraManager,
    projector: PlacementProjector,
    cursor: CursorState,
    perpendicular: bool,
    modifiers: ModifiersState,
    mouse_position: (f64, f64),
    camera_blocked: bool,
    cursor_visual: CursorVisual,
    grid_visual: GridVisual,
    cursor_enabled: bool,
    grid_enabled: bool,
    node_created: Option<NodeCreationCallback>,
}

impl InteractionArbiter {
    pub fn new(camera_manager: CameraManager) -> Self {
        let mut arbiter = Self {
            mode: InteractionMode::Auto,
            camera_manager,
            projector: PlacementProjector::new(),
            cursor: CursorState::default(),
            perpendicular: false,
            modifiers: ModifiersState::default(),
            mouse_position: (0.0, 0.0),
            camera_blocked: false,
            cursor_visual: CursorVisual::default(),
            grid_visual: GridVisual::default(),
            cursor_enabled: true,
            grid_enabled: true,
            node_created: None,
        };
        arbiter.refresh_constraint();
        arbiter.refresh_visuals();
        arbiter
    }

    // --- configuration surface -------------------------------------------

    pub fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        log::debug!("interaction mode {} -> {}", self.mode.label(), mode.label());
        self.mode = mode;
        self.refresh_block_hint();
        self.refresh_visuals();
    }

    pub fn cycle_interaction_mode(&mut self) {
        self.set_interaction_mode(self.mode.cycled());
    }

    pub fn set_plane(&mut self, plane: PlacementPlane) {
        self.projector.set_plane(plane);
        self.refresh_constraint();
        self.refresh_visuals();
    }

    pub fn set_placement_mode(&mut self, mode: PlacementMode) {
        self.projector.set_placement_mode(mode);
        self.refresh_block_hint();
        self.refresh_visuals();
    }

    /// Enables or disables plane locking. Enabling captures the current
    /// cursor's plane-normal coordinate as the new constraint offset, so the
    /// lock engages exactly where the cursor is.
    pub fn set_plane_locked(&mut self, locked: bool) {
        if locked && !self.cursor.locked {
            let axis = self.projector.plane().normal_axis();
            self.cursor.constraint_offset = self.cursor.free_position[axis];
            self.projector.set_plane_offset(self.cursor.constraint_offset);
        }
        self.cursor.locked = locked;
        if !locked {
            self.perpendicular = false;
        }
        self.refresh_constraint();
        self.refresh_visuals();
    }

    pub fn is_plane_locked(&self) -> bool {
        self.cursor.locked
    }

    pub fn set_plane_constraint_offset(&mut self, offset: f32) {
        self.cursor.constraint_offset = offset;
        self.projector.set_plane_offset(offset);
        self.refresh_constraint();
        self.refresh_visuals();
    }

    pub fn set_grid_snapping(&mut self, enabled: bool, cell: f32) {
        self.projector.set_grid_snapping(enabled, cell);
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_enabled = visible;
        self.refresh_visuals();
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_enabled = visible;
        self.refresh_visuals();
    }

    pub fn set_node_created_callback(&mut self, callback: NodeCreationCallback) {
        self.node_created = Some(callback);
    }

    pub fn set_node_selected_callback(&mut self, callback: NodeSelectionCallback) {
        self.projector.set_node_selected_callback(callback);
    }

    pub fn set_node_moved_callback(&mut self, callback: NodeMovedCallback) {
        self.projector.set_node_moved_callback(callback);
    }

    pub fn set_cursor_moved_callback(&mut self, callback: CursorMovedCallback) {
        self.projector.set_cursor_moved_callback(callback);
    }

    /// Replaces the selection with a single node (`None` is ignored).
    pub fn select_node(&mut self, node: Option<NodeId>) {
        self.projector.select_node(node);
        self.refresh_block_hint();
        self.refresh_visuals();
    }

    /// Replaces the selection with a list of nodes.
    pub fn select_nodes(&mut self, nodes: Vec<NodeId>) {
        self.projector.select_nodes(nodes);
        self.refresh_block_hint();
        self.refresh_visuals();
    }

    /// Clears the selection, destroying any drag in progress.
    pub fn clear_selection(&mut self) {
        self.projector.clear_selection();
        self.refresh_block_hint();
        self.refresh_visuals();
    }

    /// Frames everything the scene reports bounds for. With no bounded nodes
    /// the camera falls back to its default pose.
    pub fn frame_scene(&mut self, scene: &dyn SceneDelegate, margin: f32) {
        match picking::scene_bounds(scene) {
            Some(bounds) => self.camera_manager.camera.zoom_to_extent(&bounds, margin),
            None => self.camera_manager.camera.reset_to_default(),
        }
    }

    // --- state queries ----------------------------------------------------

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera_manager.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera_manager.camera
    }

    pub fn projector(&self) -> &PlacementProjector {
        &self.projector
    }

    pub fn cursor_state(&self) -> &CursorState {
        &self.cursor
    }

    pub fn cursor_visual(&self) -> &CursorVisual {
        &self.cursor_visual
    }

    pub fn grid_visual(&self) -> &GridVisual {
        &self.grid_visual
    }

    pub fn is_camera_blocked(&self) -> bool {
        self.camera_manager.controller.is_blocked()
    }

    pub fn is_perpendicular_active(&self) -> bool {
        self.perpendicular
    }

    // --- event entry points ----------------------------------------------

    pub fn on_mouse_button(
        &mut self,
        scene: &mut dyn SceneDelegate,
        ui: &dyn UiCapture,
        button: MouseButton,
        state: ElementState,
        x: f64,
        y: f64,
    ) {
        if ui.wants_mouse() {
            return;
        }
        self.mouse_position = (x, y);

        let claimed = self.arbitrate(button, state);
        self.camera_blocked = claimed;
        self.camera_manager.controller.set_blocked(claimed);

        // A release always reaches the projector while a drag is live, even
        // if the block has just been let go, so sessions cannot get stuck.
        let finishing_drag =
            state == ElementState::Released && self.projector.is_dragging();
        if claimed || finishing_drag {
            self.dispatch_placement_click(scene, button, state, x, y);
        }

        self.camera_manager.on_mouse_button(button, state);
        self.refresh_visuals();
    }

    pub fn on_mouse_move(
        &mut self,
        scene: &mut dyn SceneDelegate,
        ui: &dyn UiCapture,
        x: f64,
        y: f64,
    ) {
        if ui.wants_mouse() {
            return;
        }
        self.mouse_position = (x, y);
        self.refresh_constraint();
        self.projector
            .handle_mouse_move(scene, &self.camera_manager.camera, x, y);
        self.cursor.free_position = self
            .projector
            .screen_to_world(&self.camera_manager.camera, x, y);
        self.cursor.constrained_position = self.projector.cursor_point();
        self.camera_manager.on_mouse_move(x, y);
        self.refresh_visuals();
    }

    pub fn on_mouse_wheel(&mut self, ui: &dyn UiCapture, scroll: f32) {
        if ui.wants_mouse() {
            return;
        }
        self.camera_manager.on_mouse_wheel(scroll);
    }

    pub fn on_key(
        &mut self,
        scene: &mut dyn SceneDelegate,
        ui: &dyn UiCapture,
        key: KeyCode,
        state: ElementState,
    ) {
        if ui.wants_keyboard() {
            return;
        }
        if state != ElementState::Pressed {
            return;
        }
        match key {
            KeyCode::Tab => self.cycle_interaction_mode(),
            KeyCode::Digit1 if self.modifiers.alt_key() => {
                self.set_interaction_mode(InteractionMode::Auto)
            }
            KeyCode::Digit2 if self.modifiers.alt_key() => {
                self.set_interaction_mode(InteractionMode::Camera)
            }
            KeyCode::Digit3 if self.modifiers.alt_key() => {
                self.set_interaction_mode(InteractionMode::Placement)
            }
            KeyCode::Escape => self.cancel(scene),
            _ => {}
        }
    }

    /// Modifier tracking. A Shift edge while the plane lock is on toggles the
    /// perpendicular escape axis; releasing Shift re-locks the plane at the
    /// height the cursor last reached.
    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        let was_shift = self.modifiers.shift_key();
        self.modifiers = modifiers;
        self.camera_manager.set_modifiers(modifiers);

        let shift = modifiers.shift_key();
        if self.cursor.locked && shift != was_shift {
            if shift {
                self.perpendicular = true;
                log::debug!("perpendicular cursor movement on");
            } else {
                self.perpendicular = false;
                let axis = self.projector.plane().normal_axis();
                self.cursor.constraint_offset = self.cursor.constrained_position[axis];
                self.projector.set_plane_offset(self.cursor.constraint_offset);
                log::debug!(
                    "plane re-locked at offset {:.3}",
                    self.cursor.constraint_offset
                );
            }
            self.refresh_constraint();
            self.refresh_visuals();
        }
    }

    /// Per-frame tick. Input callbacks for the frame have already run, so the
    /// blocked flag is final before the camera consumes its live mouse state.
    pub fn update(&mut self) {
        self.camera_manager.controller.set_blocked(self.camera_blocked);
        self.camera_manager.update();
        self.refresh_visuals();
    }

    // --- internals --------------------------------------------------------

    /// Decides whether an event belongs to placement. Camera and Placement
    /// modes are unconditional; Auto applies the per-event table.
    fn arbitrate(&self, button: MouseButton, state: ElementState) -> bool {
        match self.mode {
            InteractionMode::Camera => false,
            InteractionMode::Placement => true,
            InteractionMode::Auto => match state {
                ElementState::Pressed => {
                    if button != MouseButton::Left || self.any_modifier_held() {
                        return false;
                    }
                    self.projector.placement_mode() == PlacementMode::Create
                        || self.projector.has_selection()
                }
                ElementState::Released => {
                    self.projector.has_selection()
                        && self.projector.placement_mode() == PlacementMode::Move
                }
            },
        }
    }

    fn any_modifier_held(&self) -> bool {
        self.modifiers.shift_key() || self.modifiers.control_key() || self.modifiers.alt_key()
    }

    fn dispatch_placement_click(
        &mut self,
        scene: &mut dyn SceneDelegate,
        button: MouseButton,
        state: ElementState,
        x: f64,
        y: f64,
    ) {
        self.refresh_constraint();
        self.projector.handle_mouse_button(
            scene,
            &self.camera_manager.camera,
            button,
            state,
            x,
            y,
        );

        if state == ElementState::Pressed && button == MouseButton::Left {
            match self.projector.placement_mode() {
                PlacementMode::Create => self.spawn_node_at_cursor(scene, x, y),
                PlacementMode::Move => {
                    if !self.projector.has_selection() {
                        let picked =
                            self.projector
                                .pick_node(&self.camera_manager.camera, scene, x, y);
                        if picked.is_some() {
                            self.projector.select_node(picked);
                        }
                    }
                }
            }
        }
        self.cursor.constrained_position = self.projector.cursor_point();
    }

    fn spawn_node_at_cursor(&mut self, scene: &mut dyn SceneDelegate, x: f64, y: f64) {
        self.projector
            .update_cursor_position(&self.camera_manager.camera, x, y);
        let point = self.projector.cursor_point();

        let Some(callback) = self.node_created.as_mut() else {
            log::debug!("create click with no node creation callback registered");
            return;
        };
        match callback(point) {
            Ok(node) => {
                if let Err(err) = scene.add_node(node) {
                    log::warn!("could not add created node to the scene: {err}");
                    return;
                }
                log::info!(
                    "created node {:?} at ({:.3}, {:.3}, {:.3})",
                    node,
                    point.x,
                    point.y,
                    point.z
                );
            }
            Err(err) => log::warn!("node creation failed: {err:#}"),
        }
    }

    /// Escape ladder: abort a live drag, else drop the selection, else leave
    /// placement altogether.
    fn cancel(&mut self, scene: &mut dyn SceneDelegate) {
        if self.projector.is_dragging() {
            self.projector.cancel_drag(scene);
        } else if self.projector.has_selection() {
            self.projector.clear_selection();
        } else {
            self.set_interaction_mode(InteractionMode::Camera);
        }
        self.refresh_block_hint();
        self.refresh_visuals();
    }

    fn refresh_block_hint(&mut self) {
        self.camera_blocked = match self.mode {
            InteractionMode::Camera => false,
            InteractionMode::Placement => true,
            InteractionMode::Auto => {
                self.projector.has_selection()
                    && self.projector.placement_mode() == PlacementMode::Move
            }
        };
        self.camera_manager.controller.set_blocked(self.camera_blocked);
    }

    /// Pushes the current plane-lock state into the projector's
    /// normal-coordinate override.
    fn refresh_constraint(&mut self) {
        if !self.cursor.locked {
            self.projector.set_normal_override(None);
            return;
        }
        let value = if self.perpendicular {
            self.perpendicular_value()
        } else {
            self.cursor.constraint_offset
        };
        self.projector.set_normal_override(Some(value));
    }

    /// Linear mouse-Y mapping for the perpendicular escape axis: screen
    /// center maps to the stored constraint offset, the vertical screen edges
    /// map to ±[`PERPENDICULAR_RANGE`] around it.
    fn perpendicular_value(&self) -> f32 {
        let (_, height) = self.camera_manager.camera.viewport();
        let normalized = 1.0 - 2.0 * (self.mouse_position.1 as f32) / height as f32;
        normalized * PERPENDICULAR_RANGE + self.cursor.constraint_offset
    }

    fn refresh_visuals(&mut self) {
        self.cursor_visual.position = if self.cursor.locked {
            self.cursor.constrained_position
        } else {
            self.cursor.free_position
        };
        self.cursor_visual.style = if !self.cursor.locked {
            CursorStyle::Free
        } else if self.perpendicular {
            CursorStyle::Perpendicular
        } else {
            CursorStyle::Locked
        };
        self.cursor_visual.visible = self.cursor_enabled && self.mode != InteractionMode::Camera;

        self.grid_visual.plane = self.projector.plane();
        self.grid_visual.offset = self.cursor.constraint_offset;
        self.grid_visual.visible =
            self.grid_enabled && self.cursor.locked && self.mode != InteractionMode::Camera;
    }
}

impl Default for InteractionArbiter {
    fn default() -> Self {
        Self::new(CameraManager::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use cgmath::{InnerSpace, Vector3};

    use super::*;
    use crate::gfx::scene::testing::TestScene;
    use crate::gfx::scene::NodeId;
    use crate::ui::NoUi;

    struct CaptureAll;

    impl UiCapture for CaptureAll {
        fn wants_mouse(&self) -> bool {
            true
        }
        fn wants_keyboard(&self) -> bool {
            true
        }
    }

    fn arbiter_with_camera(position: Vector3<f32>, target: Vector3<f32>) -> InteractionArbiter {
        let mut manager = CameraManager::default();
        manager.camera.resize_viewport(800, 600);
        manager.camera.set_look_at(position, target);
        InteractionArbiter::new(manager)
    }

    fn press_left(arbiter: &mut InteractionArbiter, scene: &mut TestScene, x: f64, y: f64) {
        arbiter.on_mouse_button(scene, &NoUi, MouseButton::Left, ElementState::Pressed, x, y);
    }

    fn release_left(arbiter: &mut InteractionArbiter, scene: &mut TestScene, x: f64, y: f64) {
        arbiter.on_mouse_button(scene, &NoUi, MouseButton::Left, ElementState::Released, x, y);
    }

    #[test]
    fn auto_mode_claims_create_clicks() {
        let mut scene = TestScene::new();
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        press_left(&mut arbiter, &mut scene, 400.0, 300.0);
        assert!(arbiter.is_camera_blocked());

        release_left(&mut arbiter, &mut scene, 400.0, 300.0);
        assert!(!arbiter.is_camera_blocked());
    }

    #[test]
    fn auto_mode_leaves_middle_clicks_to_the_camera() {
        let mut scene = TestScene::new();
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        arbiter.on_mouse_button(
            &mut scene,
            &NoUi,
            MouseButton::Middle,
            ElementState::Pressed,
            400.0,
            300.0,
        );
        assert!(!arbiter.is_camera_blocked());
    }

    #[test]
    fn auto_mode_leaves_modifier_clicks_to_the_camera() {
        let mut scene = TestScene::new();
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        arbiter.set_modifiers(ModifiersState::SHIFT);
        press_left(&mut arbiter, &mut scene, 400.0, 300.0);
        assert!(!arbiter.is_camera_blocked());
    }

    #[test]
    fn release_keeps_the_block_with_a_move_selection() {
        let mut scene = TestScene::new();
        let node = scene.insert(1, Vector3::new(0.0, 0.0, 0.0));
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        arbiter.set_placement_mode(PlacementMode::Move);
        arbiter.projector.select_node(Some(node));

        press_left(&mut arbiter, &mut scene, 400.0, 300.0);
        assert!(arbiter.is_camera_blocked());
        release_left(&mut arbiter, &mut scene, 420.0, 310.0);
        assert!(arbiter.is_camera_blocked());
    }

    #[test]
    fn ui_capture_suppresses_placement_entirely() {
        let mut scene = TestScene::new();
        let created = Rc::new(RefCell::new(0));
        let count = created.clone();

        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));
        arbiter.set_node_created_callback(Box::new(move |_| {
            *count.borrow_mut() += 1;
            Ok(NodeId(99))
        }));

        arbiter.on_mouse_button(
            &mut scene,
            &CaptureAll,
            MouseButton::Left,
            ElementState::Pressed,
            400.0,
            300.0,
        );
        assert_eq!(*created.borrow(), 0);
        assert!(!arbiter.is_camera_blocked());
        assert!(scene.added.is_empty());
    }

    #[test]
    fn create_click_snaps_and_spawns_end_to_end() {
        let mut scene = TestScene::new();
        let created = Rc::new(RefCell::new(Vec::new()));
        let sink = created.clone();

        // Aim the camera straight at the target point on the XZ plane: the
        // ray through the screen center then hits (2.3, 0, 4.7).
        let mut arbiter =
            arbiter_with_camera(Vector3::new(5.3, 8.0, 7.7), Vector3::new(2.3, 0.0, 4.7));
        arbiter.set_grid_snapping(true, 1.0);
        arbiter.set_node_created_callback(Box::new(move |point| {
            sink.borrow_mut().push(point);
            Ok(NodeId(42))
        }));

        press_left(&mut arbiter, &mut scene, 400.0, 300.0);
        assert!(arbiter.is_camera_blocked());

        let points = created.borrow();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0], Vector3::new(2.0, 0.0, 5.0));
        drop(points);

        assert_eq!(scene.added, vec![NodeId(42)]);

        release_left(&mut arbiter, &mut scene, 400.0, 300.0);
        assert!(!arbiter.is_camera_blocked());
    }

    #[test]
    fn enabling_the_lock_captures_the_cursor_height() {
        let mut scene = TestScene::new();
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        arbiter.set_plane_locked(false);
        arbiter.set_plane_constraint_offset(2.5);
        arbiter.on_mouse_move(&mut scene, &NoUi, 400.0, 300.0);

        let free_height = arbiter.cursor_state().free_position.y;
        arbiter.set_plane_locked(true);
        assert_eq!(arbiter.cursor_state().constraint_offset, free_height);

        // Later moves keep the constrained height pinned to the captured
        // offset, whatever the free ray does.
        arbiter.on_mouse_move(&mut scene, &NoUi, 520.0, 180.0);
        assert_eq!(arbiter.cursor_state().constrained_position.y, free_height);
    }

    #[test]
    fn perpendicular_mode_tracks_mouse_y_and_relocks_on_release() {
        let mut scene = TestScene::new();
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        arbiter.on_mouse_move(&mut scene, &NoUi, 400.0, 300.0);
        arbiter.set_modifiers(ModifiersState::SHIFT);
        assert!(arbiter.is_perpendicular_active());
        assert_eq!(arbiter.cursor_visual().style, CursorStyle::Perpendicular);

        // Screen center -> offset; half way up -> +5; three quarters -> +7.5.
        arbiter.on_mouse_move(&mut scene, &NoUi, 400.0, 300.0);
        assert_eq!(arbiter.cursor_state().constrained_position.y, 0.0);
        arbiter.on_mouse_move(&mut scene, &NoUi, 400.0, 150.0);
        assert_eq!(arbiter.cursor_state().constrained_position.y, 5.0);
        arbiter.on_mouse_move(&mut scene, &NoUi, 400.0, 75.0);
        assert_eq!(arbiter.cursor_state().constrained_position.y, 7.5);

        // Releasing Shift freezes the reached height as the new constraint.
        arbiter.set_modifiers(ModifiersState::empty());
        assert!(!arbiter.is_perpendicular_active());
        assert_eq!(arbiter.cursor_state().constraint_offset, 7.5);
        assert_eq!(arbiter.cursor_visual().style, CursorStyle::Locked);

        arbiter.on_mouse_move(&mut scene, &NoUi, 430.0, 320.0);
        assert_eq!(arbiter.cursor_state().constrained_position.y, 7.5);
    }

    #[test]
    fn perpendicular_height_is_camera_distance_independent() {
        let mut scene = TestScene::new();

        let mut read_height = |eye: Vector3<f32>| {
            let mut arbiter = arbiter_with_camera(eye, Vector3::new(0.0, 0.0, 0.0));
            arbiter.set_modifiers(ModifiersState::SHIFT);
            arbiter.on_mouse_move(&mut scene, &NoUi, 400.0, 150.0);
            arbiter.cursor_state().constrained_position.y
        };

        let near = read_height(Vector3::new(3.0, 8.0, 5.0));
        let far = read_height(Vector3::new(12.0, 32.0, 20.0));
        assert_eq!(near, 5.0);
        assert_eq!(far, 5.0);
    }

    #[test]
    fn unlocked_cursor_is_free_and_yellow() {
        let mut scene = TestScene::new();
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        arbiter.set_plane_locked(false);
        arbiter.on_mouse_move(&mut scene, &NoUi, 400.0, 300.0);

        assert_eq!(arbiter.cursor_visual().style, CursorStyle::Free);
        let state = arbiter.cursor_state();
        assert!((state.free_position - state.constrained_position).magnitude() < 1e-6);
        assert!(!arbiter.grid_visual().visible);
    }

    #[test]
    fn tab_cycles_and_alt_digits_jump_between_modes() {
        let mut scene = TestScene::new();
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        assert_eq!(arbiter.interaction_mode(), InteractionMode::Auto);
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Tab, ElementState::Pressed);
        assert_eq!(arbiter.interaction_mode(), InteractionMode::Camera);
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Tab, ElementState::Pressed);
        assert_eq!(arbiter.interaction_mode(), InteractionMode::Placement);
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Tab, ElementState::Pressed);
        assert_eq!(arbiter.interaction_mode(), InteractionMode::Auto);

        arbiter.set_modifiers(ModifiersState::ALT);
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Digit2, ElementState::Pressed);
        assert_eq!(arbiter.interaction_mode(), InteractionMode::Camera);
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Digit3, ElementState::Pressed);
        assert_eq!(arbiter.interaction_mode(), InteractionMode::Placement);
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Digit1, ElementState::Pressed);
        assert_eq!(arbiter.interaction_mode(), InteractionMode::Auto);
    }

    #[test]
    fn camera_mode_hides_placement_visuals() {
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 8.0, 5.0), Vector3::new(0.0, 0.0, 0.0));

        assert!(arbiter.cursor_visual().visible);
        arbiter.set_interaction_mode(InteractionMode::Camera);
        assert!(!arbiter.cursor_visual().visible);
        assert!(!arbiter.grid_visual().visible);

        arbiter.set_interaction_mode(InteractionMode::Placement);
        assert!(arbiter.cursor_visual().visible);
        assert!(arbiter.grid_visual().visible);
    }

    #[test]
    fn escape_walks_down_the_cancellation_ladder() {
        let mut scene = TestScene::new();
        let node = scene.insert(1, Vector3::new(1.0, 0.0, 1.0));
        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 9.0, 6.0), Vector3::new(0.0, 0.0, 0.0));

        arbiter.set_placement_mode(PlacementMode::Move);
        arbiter.projector.select_node(Some(node));

        press_left(&mut arbiter, &mut scene, 400.0, 300.0);
        arbiter.on_mouse_move(&mut scene, &NoUi, 500.0, 360.0);
        assert!(arbiter.projector().is_dragging());
        assert!(!(scene.position(node) == Vector3::new(1.0, 0.0, 1.0)));

        // First Escape: abort the drag, restore the node, keep the selection.
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Escape, ElementState::Pressed);
        assert!(!arbiter.projector().is_dragging());
        assert_eq!(scene.position(node), Vector3::new(1.0, 0.0, 1.0));
        assert!(arbiter.projector().has_selection());

        // Second Escape: drop the selection.
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Escape, ElementState::Pressed);
        assert!(!arbiter.projector().has_selection());

        // Third Escape: leave placement.
        arbiter.on_key(&mut scene, &NoUi, KeyCode::Escape, ElementState::Pressed);
        assert_eq!(arbiter.interaction_mode(), InteractionMode::Camera);
    }

    #[test]
    fn move_drag_fires_node_moved_callbacks() {
        let mut scene = TestScene::new();
        let node = scene.insert(1, Vector3::new(1.0, 0.0, 1.0));
        let moves = Rc::new(RefCell::new(Vec::new()));
        let sink = moves.clone();

        let mut arbiter = arbiter_with_camera(Vector3::new(3.0, 9.0, 6.0), Vector3::new(0.0, 0.0, 0.0));
        arbiter.set_placement_mode(PlacementMode::Move);
        arbiter.set_node_moved_callback(Box::new(move |id, position| {
            sink.borrow_mut().push((id, position));
        }));
        arbiter.projector.select_node(Some(node));

        press_left(&mut arbiter, &mut scene, 400.0, 300.0);
        arbiter.on_mouse_move(&mut scene, &NoUi, 460.0, 330.0);
        release_left(&mut arbiter, &mut scene, 460.0, 330.0);

        assert!(!moves.borrow().is_empty());
        let (id, last) = *moves.borrow().last().unwrap();
        assert_eq!(id, node);
        assert_eq!(last, scene.position(node));
    }

    #[test]
    fn frame_scene_targets_the_merged_bounds() {
        let mut scene = TestScene::new();
        scene.insert_with_bounds(1, Vector3::new(2.0, 0.0, 2.0), 1.0);

        let mut arbiter = arbiter_with_camera(Vector3::new(9.0, 9.0, 9.0), Vector3::new(0.0, 0.0, 0.0));
        arbiter.frame_scene(&scene, 1.2);
        assert!((arbiter.camera().target() - Vector3::new(2.0, 0.0, 2.0)).magnitude() < 1e-4);

        // Nothing with bounds: fall back to the default pose.
        let empty = TestScene::new();
        arbiter.frame_scene(&empty, 1.2);
        assert_eq!(arbiter.camera().target(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn placement_mode_click_picks_an_unselected_node() {
        let mut scene = TestScene::new();
        let node = scene.insert_with_bounds(1, Vector3::new(0.0, 0.0, 0.0), 0.8);
        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = selected.clone();

        let mut arbiter = arbiter_with_camera(Vector3::new(0.0, 2.0, 10.0), Vector3::new(0.0, 0.0, 0.0));
        arbiter.set_interaction_mode(InteractionMode::Placement);
        arbiter.set_placement_mode(PlacementMode::Move);
        arbiter.set_node_selected_callback(Box::new(move |id| {
            sink.borrow_mut().push(id);
        }));

        press_left(&mut arbiter, &mut scene, 400.0, 300.0);
        assert_eq!(arbiter.projector().selection(), &[node]);
        assert_eq!(&*selected.borrow(), &[node]);
    }
}
