//! Pointer tracking.
//!
//! Input callbacks only stage the latest pointer sample; the frame loop reads
//! whatever is staged when the tick runs. There is no queue: the most recent
//! position wins.

use glam::Vec2;
use winit::event::WindowEvent;

use crate::viewport::Viewport;

/// Pointer position in normalized device coordinates.
///
/// Both axes lie in `[-1, 1]`, origin at the viewport center, y pointing up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    /// Create a pointer state, clamping both axes into `[-1, 1]`.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        }
    }

    /// As a glam vector.
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for PointerState {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Stages the most recent pointer sample for the next tick.
#[derive(Debug, Default)]
pub struct PointerTracker {
    staged: PointerState,
    samples: u64,
}

impl PointerTracker {
    /// Create a tracker with the pointer at the viewport center.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a pointer position given in physical window pixels.
    pub fn stage_physical(&mut self, x: f64, y: f64, viewport: &Viewport) {
        self.stage(viewport.to_ndc(x, y).into());
    }

    /// Stage a pointer position already in normalized device coordinates.
    pub fn stage(&mut self, pointer: PointerState) {
        self.staged = pointer;
        self.samples += 1;
    }

    /// The currently staged pointer.
    #[inline]
    pub fn current(&self) -> PointerState {
        self.staged
    }

    /// Number of samples staged since creation.
    #[inline]
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Stage the pointer from a winit event. Returns `true` if the event was a
    /// pointer move.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent, viewport: &Viewport) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.stage_physical(position.x, position.y, viewport);
                true
            }
            _ => false,
        }
    }
}
