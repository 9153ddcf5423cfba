/// Pointer interaction: drag to orbit, wheel to zoom
use tracing::trace;

use crate::config::InteractionConfig;
use crate::projection::Camera;

/// Pointer input in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release,
    /// Positive deltas scroll down (zoom out)
    Wheel { delta_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { last_x: f64, last_y: f64 },
}

/// Turns pointer events into camera changes
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: DragState,
    settings: InteractionConfig,
}

impl InteractionController {
    pub fn new(settings: InteractionConfig) -> Self {
        Self {
            state: DragState::Idle,
            settings,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Apply one event to `camera`. Returns whether the camera changed and
    /// the frame must be redrawn.
    pub fn handle(&mut self, camera: &mut Camera, event: PointerEvent) -> bool {
        match (self.state, event) {
            (_, PointerEvent::Press { x, y }) => {
                self.state = DragState::Dragging {
                    last_x: x,
                    last_y: y,
                };
                false
            }
            (DragState::Dragging { last_x, last_y }, PointerEvent::Move { x, y }) => {
                let k = self.settings.drag_sensitivity;
                camera.rotate((y - last_y) * k, (x - last_x) * k);
                self.state = DragState::Dragging {
                    last_x: x,
                    last_y: y,
                };
                trace!(
                    rotation_x = camera.rotation_x,
                    rotation_y = camera.rotation_y,
                    "orbit"
                );
                true
            }
            (DragState::Idle, PointerEvent::Move { .. }) => false,
            (_, PointerEvent::Release) => {
                self.state = DragState::Idle;
                false
            }
            (_, PointerEvent::Wheel { delta_y }) => {
                let factor = if delta_y > 0.0 {
                    self.settings.zoom_out_factor
                } else {
                    self.settings.zoom_in_factor
                };
                camera.zoom_by(factor);
                trace!(zoom = camera.zoom(), "zoom");
                true
            }
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}
