//! Integration tests for the frame loop.
//!
//! These drive `RendererState` with a CPU backend that keeps two small images
//! and evaluates the trail program per texel with `shade_texel`, so buffer
//! roles, resize propagation and fading can be checked without a GPU.

use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trailfx::trail::shade_texel;
use trailfx::{
    CameraConfig, FrameBackend, PingPong, PointerState, RendererState, Slot, TrailConfig,
    TrailParams, Viewport,
};

const DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, PartialEq)]
struct Image {
    width: u32,
    height: u32,
    texels: Vec<Vec3>,
}

impl Image {
    fn blank((width, height): (u32, u32)) -> Self {
        Self {
            width,
            height,
            texels: vec![Vec3::ZERO; (width * height) as usize],
        }
    }

    fn peak(&self) -> f32 {
        self.texels.iter().map(|t| t.max_element()).fold(0.0, f32::max)
    }
}

/// Software stand-in for the GPU: two images with rotating roles.
struct CpuBackend {
    images: PingPong<Image>,
    reads: Vec<Slot>,
    writes: Vec<Slot>,
    composited: Vec<Slot>,
}

impl CpuBackend {
    fn new(viewport: &Viewport) -> Self {
        let res = viewport.buffer_resolution();
        Self {
            images: PingPong::new(Image::blank(res), Image::blank(res)),
            reads: Vec::new(),
            writes: Vec::new(),
            composited: Vec::new(),
        }
    }
}

impl FrameBackend for CpuBackend {
    type Error = std::convert::Infallible;

    fn update_trail(&mut self, params: &TrailParams) {
        self.reads.push(self.images.input_slot());
        self.writes.push(self.images.output_slot());

        let input = self.images.input().clone();
        let output = self.images.output_mut();
        let (w, h) = (input.width, input.height);
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) as usize;
                let uv = Vec2::new((x as f32 + 0.5) / w as f32, (y as f32 + 0.5) / h as f32);
                output.texels[i] = shade_texel(input.texels[i], uv, params);
            }
        }
    }

    fn composite(&mut self, _view_proj: Mat4) -> Result<(), Self::Error> {
        self.composited.push(self.images.output_slot());
        Ok(())
    }

    fn swap_buffers(&mut self) {
        self.images.swap();
    }

    fn apply_viewport(&mut self, viewport: &Viewport) {
        let res = viewport.buffer_resolution();
        self.images.for_each_mut(|_, image| *image = Image::blank(res));
    }
}

fn renderer(viewport: Viewport) -> RendererState {
    RendererState::new(&TrailConfig::default(), &CameraConfig::default(), viewport)
}

#[test]
fn test_read_and_write_buffers_always_differ() {
    let viewport = Viewport::new(64, 48, 1.0);
    let mut state = renderer(viewport);
    let mut backend = CpuBackend::new(&viewport);

    for _ in 0..25 {
        state.tick_with_delta(DT, &mut backend).unwrap();
    }

    let roles = backend.reads.iter().zip(&backend.writes);
    for ((read, write), shown) in roles.zip(&backend.composited) {
        assert_ne!(read, write);
        assert_eq!(write, shown, "composite must sample the buffer just written");
    }
}

#[test]
fn test_roles_have_period_two() {
    let viewport = Viewport::new(64, 48, 1.0);
    let mut state = renderer(viewport);
    let mut backend = CpuBackend::new(&viewport);

    for _ in 0..10 {
        state.tick_with_delta(DT, &mut backend).unwrap();
    }

    assert_eq!(backend.images.input_slot(), Slot::A);
    for k in 1..backend.reads.len() {
        assert_eq!(backend.reads[k], backend.writes[k - 1]);
    }
}

#[test]
fn test_random_resizes_keep_resolutions_consistent() {
    let mut rng = StdRng::seed_from_u64(7);
    let viewport = Viewport::new(800, 600, 1.0);
    let mut state = renderer(viewport);
    let mut backend = CpuBackend::new(&viewport);

    for _ in 0..40 {
        let width = rng.gen_range(0..400);
        let height = rng.gen_range(0..400);
        let dpr = rng.gen_range(0.5..3.0);
        state.resize(Viewport::new(width, height, dpr), &mut backend);

        let expected = state.viewport().buffer_resolution();
        assert!(expected.0 >= 1 && expected.1 >= 1);
        assert_eq!(state.trail().resolution(), expected);
        for image in backend.images.both() {
            assert_eq!((image.width, image.height), expected);
        }

        let ticks = rng.gen_range(1..4);
        for _ in 0..ticks {
            state.tick_with_delta(DT, &mut backend).unwrap();
        }
        assert_eq!(state.trail().params().resolution, [expected.0 as f32, expected.1 as f32]);
    }
}

#[test]
fn test_scenario_800x600_first_tick() {
    let viewport = Viewport::new(800, 600, 1.0);
    let mut state = renderer(viewport);
    let mut backend = CpuBackend::new(&viewport);

    state.pointer.stage(PointerState::new(0.5, 0.5));
    state.tick_with_delta(0.016, &mut backend).unwrap();

    let expected_speed = 0.5f32.hypot(0.5) * 0.016 * 3.0;
    assert!((state.trail().speed() - expected_speed).abs() < 1e-5);
    assert_eq!(state.trail().resolution(), (200, 150));

    // The image just shown is the one the next tick reads.
    assert_eq!(backend.images.input_slot(), backend.composited[0]);
    assert!(backend.images.input().peak() > 0.0);
}

#[test]
fn test_trail_fades_after_pointer_stops() {
    let viewport = Viewport::new(256, 192, 1.0);
    let mut state = renderer(viewport);
    let mut backend = CpuBackend::new(&viewport);

    for i in 0..10 {
        let x = -0.5 + i as f32 * 0.05;
        state.pointer.stage(PointerState::new(x, 0.0));
        state.tick_with_delta(DT, &mut backend).unwrap();
    }
    let lit = backend.images.input().peak();
    assert!(lit > 0.05, "moving pointer should leave a visible trail, peak {lit}");

    for _ in 0..1000 {
        state.tick_with_delta(DT, &mut backend).unwrap();
    }
    let faded = backend.images.input().peak();
    assert!(faded < 1e-3, "trail should fade once the pointer rests, peak {faded}");
}

#[test]
fn test_resting_pointer_never_brightens_trail() {
    let viewport = Viewport::new(256, 192, 1.0);
    let config = TrailConfig::default();
    let mut state = RendererState::new(&config, &CameraConfig::default(), viewport);
    let mut backend = CpuBackend::new(&viewport);

    for i in 0..10 {
        let x = -0.5 + i as f32 * 0.05;
        state.pointer.stage(PointerState::new(x, 0.0));
        state.tick_with_delta(DT, &mut backend).unwrap();
    }

    // Let the smoothed speed settle below the stamp threshold.
    let mut settle = 0;
    while state.trail().speed() >= config.stamp_threshold {
        state.tick_with_delta(DT, &mut backend).unwrap();
        settle += 1;
        assert!(settle < 600, "speed never settled");
    }
    assert!(backend.images.input().peak() > 0.0, "trail faded before the check began");

    for tick in 0..120 {
        let before = backend.images.input().texels.clone();
        state.tick_with_delta(DT, &mut backend).unwrap();
        let after = &backend.images.input().texels;
        for (prev, next) in before.iter().zip(after) {
            for c in 0..3 {
                assert!(next[c] <= prev[c], "texel brightened on tick {tick}");
                if prev[c] > 0.0 {
                    assert!(next[c] < prev[c], "lit texel held steady on tick {tick}");
                }
            }
        }
    }
}

#[test]
fn test_stationary_pointer_paints_nothing() {
    let viewport = Viewport::new(64, 48, 1.0);
    let mut state = renderer(viewport);
    let mut backend = CpuBackend::new(&viewport);

    for _ in 0..30 {
        state.tick_with_delta(DT, &mut backend).unwrap();
    }

    assert_eq!(state.trail().speed(), 0.0);
    assert_eq!(backend.images.input().peak(), 0.0);
}
