//! Default placement control panel.
//!
//! Provides a pre-built ImGui panel exposing the arbiter configuration
//! surface: interaction and placement modes, plane selection, plane locking,
//! grid snapping, and the camera view slots.

use crate::gfx::camera::VIEW_SLOT_COUNT;
use crate::gfx::placement::{PlacementMode, PlacementPlane};
use crate::interaction::{CursorStyle, InteractionArbiter, InteractionMode};

const INTERACTION_MODES: [InteractionMode; 3] = [
    InteractionMode::Auto,
    InteractionMode::Camera,
    InteractionMode::Placement,
];

const PLACEMENT_PLANES: [PlacementPlane; 3] = [
    PlacementPlane::Xz,
    PlacementPlane::Xy,
    PlacementPlane::Yz,
];

/// Per-panel UI state that outlives a single frame.
#[derive(Debug, Default)]
pub struct PanelState {
    slot: i32,
}

/// Default placement panel for the interaction arbiter
///
/// # Arguments
/// * `ui` - ImGui UI context
/// * `arbiter` - Arbiter whose configuration the panel edits
/// * `state` - Persistent panel state (selected view slot)
pub fn placement_panel(ui: &imgui::Ui, arbiter: &mut InteractionArbiter, state: &mut PanelState) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let panel_width = (display_size[0] * 0.25).clamp(320.0, 420.0);
    let panel_height = (display_size[1] * 0.7).max(420.0);

    ui.window("Placement")
        .size([panel_width, panel_height], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_mode_controls(ui, arbiter);
            ui.separator();
            render_plane_controls(ui, arbiter);
            ui.separator();
            render_grid_controls(ui, arbiter);
            ui.separator();
            render_view_slots(ui, arbiter, state);
            ui.separator();
            render_cursor_readout(ui, arbiter);
        });
}

fn render_mode_controls(ui: &imgui::Ui, arbiter: &mut InteractionArbiter) {
    ui.text("Input Routing");
    ui.spacing();

    let mut mode_index = INTERACTION_MODES
        .iter()
        .position(|&m| m == arbiter.interaction_mode())
        .unwrap_or(0);
    if ui.combo_simple_string("Mode", &mut mode_index, &["Auto", "Camera", "Placement"]) {
        arbiter.set_interaction_mode(INTERACTION_MODES[mode_index]);
    }

    let mut create = arbiter.projector().placement_mode() == PlacementMode::Create;
    if ui.radio_button("Create nodes", &mut create, true) {
        arbiter.set_placement_mode(PlacementMode::Create);
    }
    ui.same_line();
    if ui.radio_button("Move selection", &mut create, false) {
        arbiter.set_placement_mode(PlacementMode::Move);
    }
}

fn render_plane_controls(ui: &imgui::Ui, arbiter: &mut InteractionArbiter) {
    if ui.collapsing_header("Plane", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        let mut plane_index = PLACEMENT_PLANES
            .iter()
            .position(|&p| p == arbiter.projector().plane())
            .unwrap_or(0);
        if ui.combo_simple_string("Plane", &mut plane_index, &["XZ", "XY", "YZ"]) {
            arbiter.set_plane(PLACEMENT_PLANES[plane_index]);
        }

        let mut locked = arbiter.is_plane_locked();
        if ui.checkbox("Lock cursor to plane", &mut locked) {
            arbiter.set_plane_locked(locked);
        }

        let mut offset = arbiter.cursor_state().constraint_offset;
        if ui.input_float("Offset", &mut offset).build() {
            arbiter.set_plane_constraint_offset(offset);
        }

        let mut grid_visible = arbiter.grid_visual().visible;
        if ui.checkbox("Show reference grid", &mut grid_visible) {
            arbiter.set_grid_visible(grid_visible);
        }
    }
}

fn render_grid_controls(ui: &imgui::Ui, arbiter: &mut InteractionArbiter) {
    if ui.collapsing_header("Grid Snapping", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        let mut enabled = arbiter.projector().snap_enabled();
        let mut cell = arbiter.projector().snap_cell();

        let toggled = ui.checkbox("Snap to grid", &mut enabled);
        let resized = ui.slider("Cell size", 0.1, 5.0, &mut cell);
        if toggled || resized {
            arbiter.set_grid_snapping(enabled, cell);
        }
    }
}

fn render_view_slots(ui: &imgui::Ui, arbiter: &mut InteractionArbiter, state: &mut PanelState) {
    if ui.collapsing_header("Camera Slots", imgui::TreeNodeFlags::empty()) {
        ui.slider("Slot", 0, VIEW_SLOT_COUNT as i32 - 1, &mut state.slot);
        let slot = state.slot.max(0) as usize;

        if ui.button("Save") {
            arbiter.camera_mut().save_slot(slot);
        }
        ui.same_line();
        if ui.button("Restore") {
            arbiter.camera_mut().restore_slot(slot);
        }
        ui.same_line();
        if arbiter.camera().has_slot_data(slot) {
            ui.text("saved");
        } else {
            ui.text_disabled("empty");
        }
    }
}

fn render_cursor_readout(ui: &imgui::Ui, arbiter: &mut InteractionArbiter) {
    let cursor = arbiter.cursor_visual();
    let label = match cursor.style {
        CursorStyle::Locked => "locked",
        CursorStyle::Perpendicular => "perpendicular",
        CursorStyle::Free => "free",
    };
    ui.text_colored(
        cursor.color(),
        format!(
            "Cursor ({label}): {:.2}, {:.2}, {:.2}",
            cursor.position.x, cursor.position.y, cursor.position.z
        ),
    );
}
