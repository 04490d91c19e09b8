//! UI input-capture query.
//!
//! Before any mouse or keyboard event reaches placement logic, the arbiter
//! asks the host's UI layer whether it is currently capturing that kind of
//! input, so clicks on overlapping 2D panels never spawn or move 3D objects.

/// "Is the UI capturing input?" query implemented by the host UI layer.
pub trait UiCapture {
    fn wants_mouse(&self) -> bool;
    fn wants_keyboard(&self) -> bool;
}

/// ImGui answers the query straight from its IO state.
impl UiCapture for imgui::Io {
    fn wants_mouse(&self) -> bool {
        self.want_capture_mouse
    }

    fn wants_keyboard(&self) -> bool {
        self.want_capture_keyboard
    }
}

/// Null object for headless hosts and tests: never captures anything.
pub struct NoUi;

impl UiCapture for NoUi {
    fn wants_mouse(&self) -> bool {
        false
    }

    fn wants_keyboard(&self) -> bool {
        false
    }
}
