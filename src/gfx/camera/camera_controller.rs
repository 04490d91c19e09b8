use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Vector3};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::ModifiersState;

use super::orbit_camera::OrbitCamera;

/// Distance below which a dolly starts pushing the target ahead of the
/// camera instead of letting the position cross through it.
const MIN_TARGET_DISTANCE: f32 = 1.5;

/// Pitch limit keeping the orbit short of the poles.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// Mouse gesture resolved at press time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Orbit,
    Pan,
    Dolly,
}

/// Pose and mouse position captured when a drag begins. Gestures are
/// computed from this anchor plus the total mouse delta, so a drag never
/// accumulates rounding and release leaves the live pose as the new baseline.
#[derive(Debug, Clone, Copy)]
struct DragAnchor {
    button: MouseButton,
    gesture: Gesture,
    start_mouse: (f64, f64),
    position: Vector3<f32>,
    target: Vector3<f32>,
}

/// Mouse-driven camera gestures.
///
/// The host (normally the interaction arbiter) feeds live input state through
/// `on_mouse_button` / `on_mouse_move` / `set_modifiers`, then calls
/// [`update`](Self::update) once per frame. Input callbacks for a frame are
/// always processed before `update`, so a manipulation block raised during a
/// click is in place before the camera would consume that click.
pub struct CameraController {
    orbit_speed: f32,
    pan_scale: (f32, f32),
    dolly_speed: f32,
    wheel_step: f32,
    blocked: bool,
    mouse_position: (f64, f64),
    modifiers: ModifiersState,
    drag: Option<DragAnchor>,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            orbit_speed: 0.01,
            pan_scale: (0.0015, 0.0015),
            dolly_speed: 0.002,
            wheel_step: 0.1,
            blocked: false,
            mouse_position: (0.0, 0.0),
            modifiers: ModifiersState::default(),
            drag: None,
        }
    }

    /// Orbit sensitivity in radians per pixel.
    pub fn set_orbit_speed(&mut self, speed: f32) {
        self.orbit_speed = speed;
    }

    /// Per-axis pan scale factors.
    pub fn set_pan_scale(&mut self, horizontal: f32, vertical: f32) {
        self.pan_scale = (horizontal, vertical);
    }

    pub fn set_dolly_speed(&mut self, speed: f32) {
        self.dolly_speed = speed;
    }

    /// While blocked, `update` applies no gesture and presses start no drag.
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    pub fn on_mouse_move(&mut self, x: f64, y: f64) {
        self.mouse_position = (x, y);
    }

    pub fn on_mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
        camera: &OrbitCamera,
    ) {
        match state {
            ElementState::Pressed => {
                if self.blocked || self.drag.is_some() {
                    return;
                }
                let gesture = match button {
                    MouseButton::Left => Gesture::Orbit,
                    MouseButton::Right if self.modifiers.shift_key() => Gesture::Dolly,
                    MouseButton::Right => Gesture::Pan,
                    MouseButton::Middle => Gesture::Dolly,
                    _ => return,
                };
                self.drag = Some(DragAnchor {
                    button,
                    gesture,
                    start_mouse: self.mouse_position,
                    position: camera.position(),
                    target: camera.target(),
                });
            }
            ElementState::Released => {
                // Dropping the anchor commits the live pose as the new
                // baseline; the next drag starts fresh from its own press.
                if self.drag.map_or(false, |drag| drag.button == button) {
                    self.drag = None;
                }
            }
        }
    }

    /// Immediate dolly step from the scroll wheel. Ignored while blocked or
    /// mid-drag.
    pub fn on_mouse_wheel(&mut self, scroll: f32, camera: &mut OrbitCamera) {
        if self.blocked || self.drag.is_some() {
            return;
        }
        let travel = scroll * self.wheel_step * camera.distance();
        let (position, target) =
            dolly_pose(camera.position(), camera.target(), travel, MIN_TARGET_DISTANCE);
        camera.set_look_at(position, target);
    }

    /// Applies the active gesture, if any, to the camera. Called once per
    /// frame after all input callbacks have been delivered.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        if self.blocked {
            return;
        }
        let Some(anchor) = self.drag else {
            return;
        };

        let dx = (self.mouse_position.0 - anchor.start_mouse.0) as f32;
        let dy = (self.mouse_position.1 - anchor.start_mouse.1) as f32;
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        match anchor.gesture {
            Gesture::Orbit => self.apply_orbit(camera, &anchor, dx, dy),
            Gesture::Pan => self.apply_pan(camera, &anchor, dx, dy),
            Gesture::Dolly => self.apply_dolly(camera, &anchor, dy),
        }
    }

    /// Rotates the anchored offset around the world-up axis by the horizontal
    /// delta and lifts it by the vertical delta, holding the target fixed.
    fn apply_orbit(&self, camera: &mut OrbitCamera, anchor: &DragAnchor, dx: f32, dy: f32) {
        let offset = anchor.position - anchor.target;
        let radius = offset.magnitude();
        if radius < f32::EPSILON {
            return;
        }

        let mut yaw = offset.z.atan2(offset.x);
        let mut pitch = (offset.y / radius).asin();
        yaw += dx * self.orbit_speed;
        pitch = (pitch + dy * self.orbit_speed).clamp(-MAX_PITCH, MAX_PITCH);

        let rotated = Vector3::new(
            radius * pitch.cos() * yaw.cos(),
            radius * pitch.sin(),
            radius * pitch.cos() * yaw.sin(),
        );
        camera.set_look_at(anchor.target + rotated, anchor.target);
    }

    /// Translates position and target together along the camera's right and
    /// up basis vectors. Movement scales with the anchored view distance so
    /// panning feels uniform across zoom levels.
    fn apply_pan(&self, camera: &mut OrbitCamera, anchor: &DragAnchor, dx: f32, dy: f32) {
        let forward = (anchor.target - anchor.position).normalize();
        let mut right = forward.cross(Vector3::unit_y());
        if right.magnitude2() < f32::EPSILON {
            right = Vector3::unit_x();
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize();

        let distance = (anchor.target - anchor.position).magnitude();
        let movement = right * (-dx * self.pan_scale.0 * distance)
            + up * (dy * self.pan_scale.1 * distance);
        camera.set_look_at(anchor.position + movement, anchor.target + movement);
    }

    /// Moves the position along the anchored forward vector. The target only
    /// moves once the distance closes below [`MIN_TARGET_DISTANCE`].
    fn apply_dolly(&self, camera: &mut OrbitCamera, anchor: &DragAnchor, dy: f32) {
        let radius = (anchor.target - anchor.position).magnitude();
        let travel = -dy * self.dolly_speed * radius.max(1.0);
        let (position, target) =
            dolly_pose(anchor.position, anchor.target, travel, MIN_TARGET_DISTANCE);
        camera.set_look_at(position, target);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

fn dolly_pose(
    position: Vector3<f32>,
    target: Vector3<f32>,
    travel: f32,
    min_distance: f32,
) -> (Vector3<f32>, Vector3<f32>) {
    let forward = (target - position).normalize();
    let new_position = position + forward * travel;
    let remaining = (target - new_position).dot(forward);
    let new_target = if remaining < min_distance {
        new_position + forward * min_distance
    } else {
        target
    };
    (new_position, new_target)
}
