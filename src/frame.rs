//! Frame orchestration and resize coordination.
//!
//! [`RendererState`] owns every piece of mutable per-frame state (clock,
//! staged pointer, trail uniforms, camera, viewport). GPU work is delegated to
//! a [`FrameBackend`], which owns the offscreen buffer pair and the display
//! surface.
//!
//! One tick runs these steps, strictly in order:
//!
//! 1. advance the frame clock
//! 2. update the camera controller
//! 3. smooth speed and pointer from the staged pointer sample
//! 4. trail pass: read the input buffer, write the output buffer
//! 5. composite the output buffer behind the scene and present
//! 6. swap buffer roles
//!
//! Scheduling the next tick is the caller's job.

use glam::Mat4;

use crate::camera::OrbitCamera;
use crate::config::{CameraConfig, TrailConfig};
use crate::input::PointerTracker;
use crate::time::{FrameState, Time};
use crate::trail::{TrailParams, TrailUniformState};
use crate::viewport::Viewport;

/// Whether a tick is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    FrameActive,
}

/// GPU side of the frame loop.
pub trait FrameBackend {
    /// Error returned when compositing or presenting fails.
    type Error;

    /// Render the next trail image into the output buffer, sampling the input buffer.
    fn update_trail(&mut self, params: &TrailParams);

    /// Draw the output buffer as background, then the scene, and present.
    fn composite(&mut self, view_proj: Mat4) -> Result<(), Self::Error>;

    /// Exchange input and output buffer roles.
    fn swap_buffers(&mut self);

    /// Resize the display surface and both offscreen buffers to `viewport`.
    fn apply_viewport(&mut self, viewport: &Viewport);
}

/// All mutable state of the trail renderer outside the GPU.
#[derive(Debug)]
pub struct RendererState {
    /// Frame clock.
    pub clock: Time,
    /// Latest staged pointer sample.
    pub pointer: PointerTracker,
    /// Camera controller, updated once per tick.
    pub camera: OrbitCamera,
    trail: TrailUniformState,
    viewport: Viewport,
    phase: FramePhase,
}

impl RendererState {
    /// Create renderer state for an initial viewport.
    pub fn new(trail: &TrailConfig, camera: &CameraConfig, viewport: Viewport) -> Self {
        Self {
            clock: Time::new(),
            pointer: PointerTracker::new(),
            camera: OrbitCamera::new(camera, viewport.aspect()),
            trail: TrailUniformState::new(trail, viewport.buffer_resolution()),
            viewport,
            phase: FramePhase::Idle,
        }
    }

    /// Run one tick using the wall clock.
    pub fn tick<B: FrameBackend>(&mut self, backend: &mut B) -> Result<FrameState, B::Error> {
        self.phase = FramePhase::FrameActive;
        let frame = self.clock.update();
        self.run_tick(frame, backend)
    }

    /// Run one tick with an explicit delta time.
    pub fn tick_with_delta<B: FrameBackend>(
        &mut self,
        delta_time: f32,
        backend: &mut B,
    ) -> Result<FrameState, B::Error> {
        self.phase = FramePhase::FrameActive;
        let frame = self.clock.advance(delta_time);
        self.run_tick(frame, backend)
    }

    fn run_tick<B: FrameBackend>(
        &mut self,
        frame: FrameState,
        backend: &mut B,
    ) -> Result<FrameState, B::Error> {
        self.camera.update();
        self.trail.update(self.pointer.current(), frame);

        backend.update_trail(&self.trail.params());
        let composited = backend.composite(self.camera.view_proj());
        // Roles rotate even if presentation failed; the trail pass already wrote.
        backend.swap_buffers();

        self.phase = FramePhase::Idle;
        composited.map(|()| frame)
    }

    /// Propagate a new viewport to the camera, the trail uniforms, and the backend.
    ///
    /// Everything is applied before returning, so the next tick sees a
    /// consistent set.
    pub fn resize<B: FrameBackend>(&mut self, viewport: Viewport, backend: &mut B) {
        tracing::debug!(
            width = viewport.width(),
            height = viewport.height(),
            pixel_ratio = viewport.pixel_ratio(),
            buffer = ?viewport.buffer_resolution(),
            "resizing"
        );
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        self.trail.set_resolution(viewport.buffer_resolution());
        backend.apply_viewport(&viewport);
    }

    /// Current viewport.
    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Trail uniform state.
    #[inline]
    pub fn trail(&self) -> &TrailUniformState {
        &self.trail
    }

    /// Current phase of the frame loop.
    #[inline]
    pub fn phase(&self) -> FramePhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerState;
    use crate::ping_pong::{PingPong, Slot};

    #[derive(Debug, PartialEq)]
    enum Call {
        Trail { read: Slot, write: Slot },
        Composite { sample: Slot },
        Swap,
        Viewport((u32, u32)),
    }

    struct Recorder {
        buffers: PingPong<(u32, u32)>,
        calls: Vec<Call>,
        fail_present: bool,
    }

    impl Recorder {
        fn new(viewport: &Viewport) -> Self {
            let res = viewport.buffer_resolution();
            Self {
                buffers: PingPong::new(res, res),
                calls: Vec::new(),
                fail_present: false,
            }
        }
    }

    impl FrameBackend for Recorder {
        type Error = &'static str;

        fn update_trail(&mut self, _params: &TrailParams) {
            self.calls.push(Call::Trail {
                read: self.buffers.input_slot(),
                write: self.buffers.output_slot(),
            });
        }

        fn composite(&mut self, _view_proj: Mat4) -> Result<(), Self::Error> {
            self.calls.push(Call::Composite {
                sample: self.buffers.output_slot(),
            });
            if self.fail_present {
                Err("surface lost")
            } else {
                Ok(())
            }
        }

        fn swap_buffers(&mut self) {
            self.buffers.swap();
            self.calls.push(Call::Swap);
        }

        fn apply_viewport(&mut self, viewport: &Viewport) {
            let res = viewport.buffer_resolution();
            self.buffers.for_each_mut(|_, size| *size = res);
            self.calls.push(Call::Viewport(res));
        }
    }

    fn state(viewport: Viewport) -> RendererState {
        RendererState::new(&TrailConfig::default(), &CameraConfig::default(), viewport)
    }

    #[test]
    fn test_tick_order() {
        let viewport = Viewport::new(800, 600, 1.0);
        let mut renderer = state(viewport);
        let mut backend = Recorder::new(&viewport);

        renderer.tick_with_delta(0.016, &mut backend).unwrap();

        assert_eq!(
            backend.calls,
            vec![
                Call::Trail {
                    read: Slot::A,
                    write: Slot::B,
                },
                Call::Composite { sample: Slot::B },
                Call::Swap,
            ]
        );
        assert_eq!(renderer.phase(), FramePhase::Idle);
    }

    #[test]
    fn test_next_tick_reads_previous_output() {
        let viewport = Viewport::new(800, 600, 1.0);
        let mut renderer = state(viewport);
        let mut backend = Recorder::new(&viewport);

        renderer.tick_with_delta(0.016, &mut backend).unwrap();
        renderer.tick_with_delta(0.016, &mut backend).unwrap();

        assert_eq!(
            backend.calls[3],
            Call::Trail {
                read: Slot::B,
                write: Slot::A,
            }
        );
    }

    #[test]
    fn test_swap_happens_when_present_fails() {
        let viewport = Viewport::new(800, 600, 1.0);
        let mut renderer = state(viewport);
        let mut backend = Recorder::new(&viewport);
        backend.fail_present = true;

        assert_eq!(renderer.tick_with_delta(0.016, &mut backend), Err("surface lost"));
        assert_eq!(backend.calls.last(), Some(&Call::Swap));
        assert_eq!(backend.buffers.input_slot(), Slot::B);
        assert_eq!(renderer.phase(), FramePhase::Idle);
    }

    #[test]
    fn test_resize_updates_everything() {
        let viewport = Viewport::new(800, 600, 1.0);
        let mut renderer = state(viewport);
        let mut backend = Recorder::new(&viewport);

        renderer.resize(Viewport::new(1024, 512, 1.0), &mut backend);

        assert_eq!(renderer.trail().resolution(), (256, 128));
        assert_eq!(renderer.camera.aspect(), 2.0);
        assert_eq!(backend.buffers.both(), [&(256, 128), &(256, 128)]);
        assert_eq!(backend.calls, vec![Call::Viewport((256, 128))]);
    }

    #[test]
    fn test_scenario_800x600() {
        let viewport = Viewport::new(800, 600, 1.0);
        let mut renderer = state(viewport);
        let mut backend = Recorder::new(&viewport);

        renderer.pointer.stage(PointerState::new(0.5, 0.5));
        let frame = renderer.tick_with_delta(0.016, &mut backend).unwrap();

        assert_eq!(frame.delta_time, 0.016);
        let speed = renderer.trail().speed();
        assert!(speed > 0.0 && speed < 0.5f32.hypot(0.5));
        assert_eq!(renderer.trail().resolution(), (200, 150));
        assert_eq!(*backend.buffers.output(), (200, 150));
    }
}
