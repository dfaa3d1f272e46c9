//! Preview zoom and drag repositioning of modules.

use crate::{EngineError, Result, TextModule};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.05;
/// Steps one mouse wheel notch moves the zoom.
pub const WHEEL_ZOOM_STEPS: f32 = 2.0;

/// Clamps to `MIN_ZOOM..=MAX_ZOOM` and snaps to the zoom step.
pub fn clamp_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return 1.0;
    }
    let steps = (zoom / ZOOM_STEP).round();
    (steps * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Zoom after a wheel event; scrolling up (negative delta) zooms in.
pub fn wheel_zoom(zoom: f32, wheel_delta: f32) -> f32 {
    let step = ZOOM_STEP * WHEEL_ZOOM_STEPS;
    if wheel_delta < 0.0 {
        clamp_zoom(zoom + step)
    } else if wheel_delta > 0.0 {
        clamp_zoom(zoom - step)
    } else {
        zoom
    }
}

/// Converts a point on the zoomed preview to canvas coordinates.
pub fn screen_to_canvas(x: f32, y: f32, zoom: f32) -> (f32, f32) {
    (x / zoom, y / zoom)
}

/// An in progress drag of one module.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub module_id: String,
    pointer_start: (f32, f32),
    position_start: (f32, f32),
}

impl DragState {
    /// Starts dragging `module` from the screen point `(pointer_x, pointer_y)`.
    pub fn begin(module: &TextModule, pointer_x: f32, pointer_y: f32) -> Self {
        Self {
            module_id: module.id.clone(),
            pointer_start: (pointer_x, pointer_y),
            position_start: (module.text_settings.position_x, module.text_settings.position_y),
        }
    }

    /// Module position for the current pointer: start plus the pointer delta
    /// scaled back from screen to canvas pixels.
    pub fn position(&self, pointer_x: f32, pointer_y: f32, zoom: f32) -> (f32, f32) {
        (
            self.position_start.0 + (pointer_x - self.pointer_start.0) / zoom,
            self.position_start.1 + (pointer_y - self.pointer_start.1) / zoom,
        )
    }

    /// Moves the dragged module. Only its position changes.
    pub fn update(&self, modules: &mut [TextModule], pointer_x: f32, pointer_y: f32, zoom: f32) -> Result<()> {
        let module = modules
            .iter_mut()
            .find(|m| m.id == self.module_id)
            .ok_or_else(|| EngineError::UnknownModule { id: self.module_id.clone() })?;
        let (x, y) = self.position(pointer_x, pointer_y, zoom);
        module.text_settings.position_x = x;
        module.text_settings.position_y = y;
        Ok(())
    }
}
