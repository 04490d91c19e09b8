use cgmath::{Matrix4, SquareMatrix};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::ModifiersState;

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// Camera plus its gesture controller, forwarded to as one unit by the host.
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.controller.on_mouse_button(button, state, &self.camera);
    }

    pub fn on_mouse_move(&mut self, x: f64, y: f64) {
        self.controller.on_mouse_move(x, y);
    }

    pub fn on_mouse_wheel(&mut self, scroll: f32) {
        self.controller.on_mouse_wheel(scroll, &mut self.camera);
    }

    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.controller.set_modifiers(modifiers);
    }

    /// Applies the active gesture for this frame.
    pub fn update(&mut self) {
        self.controller.update(&mut self.camera);
    }

    /// Get the view projection matrix from the camera
    pub fn view_proj_matrix(&self) -> Matrix4<f32> {
        self.camera.view_projection_matrix()
    }
}

impl Default for CameraManager {
    fn default() -> Self {
        Self::new(OrbitCamera::default(), CameraController::default())
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}
