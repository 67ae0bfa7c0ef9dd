//! CPU side of the trail update stage.
//!
//! [`TrailUniformState`] owns the smoothed pointer and speed and produces the
//! [`TrailParams`] block uploaded to the trail program each tick. The per-texel
//! evaluation itself runs on the GPU; [`shade_texel`] mirrors it on the CPU so
//! its decay and stamp behaviour can be checked without a device.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::config::TrailConfig;
use crate::input::PointerState;
use crate::time::FrameState;

/// Move `current` toward `target` by the framerate-independent factor
/// `min(1, dt * rate)`.
#[inline]
pub fn smooth_toward(current: f32, target: f32, dt: f32, rate: f32) -> f32 {
    current + (target - current) * smoothing_factor(dt, rate)
}

#[inline]
fn smoothing_factor(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// Uniform block of the trail program.
///
/// Layout matches `TrailParams` in the trail WGSL (48 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TrailParams {
    /// Offscreen buffer resolution in texels.
    pub resolution: [f32; 2],
    /// Smoothed pointer in NDC.
    pub pointer: [f32; 2],
    /// Smoothed pointer speed.
    pub speed: f32,
    pub delta_time: f32,
    pub time: f32,
    pub decay_rate: f32,
    pub radius: f32,
    pub intensity: f32,
    /// Linear fade per second, applied after the exponential decay.
    pub fade_floor: f32,
    /// Smoothed speeds below this stamp nothing.
    pub stamp_threshold: f32,
}

/// Smoothed pointer/speed state plus the per-tick uniforms derived from it.
#[derive(Debug, Clone)]
pub struct TrailUniformState {
    resolution: (u32, u32),
    pointer: Vec2,
    last_raw: Vec2,
    speed: f32,
    frame: FrameState,
    speed_rate: f32,
    pointer_rate: f32,
    decay_rate: f32,
    fade_floor: f32,
    stamp_threshold: f32,
    radius: f32,
    intensity: f32,
}

impl TrailUniformState {
    /// Create the state for a buffer resolution.
    pub fn new(config: &TrailConfig, resolution: (u32, u32)) -> Self {
        Self {
            resolution,
            pointer: Vec2::ZERO,
            last_raw: Vec2::ZERO,
            speed: 0.0,
            frame: FrameState::default(),
            speed_rate: config.speed_smoothing,
            pointer_rate: config.pointer_smoothing,
            decay_rate: config.decay_rate,
            fade_floor: config.fade_floor,
            stamp_threshold: config.stamp_threshold,
            radius: config.stamp_radius,
            intensity: config.stamp_intensity,
        }
    }

    /// Advance the smoothed speed and pointer toward the raw pointer sample.
    ///
    /// The speed target is the raw displacement since the previous update.
    pub fn update(&mut self, raw: PointerState, frame: FrameState) {
        let raw = raw.to_vec2();
        let dt = frame.delta_time;
        let target_speed = raw.distance(self.last_raw);

        self.speed = smooth_toward(self.speed, target_speed, dt, self.speed_rate);
        self.pointer = self.pointer.lerp(raw, smoothing_factor(dt, self.pointer_rate));
        self.last_raw = raw;
        self.frame = frame;

        tracing::trace!(
            speed = self.speed,
            pointer_x = self.pointer.x,
            pointer_y = self.pointer.y,
            "trail uniforms updated"
        );
    }

    /// Set the resolution uniform. Called by the resize path only.
    pub fn set_resolution(&mut self, resolution: (u32, u32)) {
        self.resolution = resolution;
    }

    /// Current resolution uniform.
    #[inline]
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Smoothed speed.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Smoothed pointer.
    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Uniform block for the current tick.
    pub fn params(&self) -> TrailParams {
        TrailParams {
            resolution: [self.resolution.0 as f32, self.resolution.1 as f32],
            pointer: self.pointer.to_array(),
            speed: self.speed,
            delta_time: self.frame.delta_time,
            time: self.frame.elapsed_time,
            decay_rate: self.decay_rate,
            radius: self.radius,
            intensity: self.intensity,
            fade_floor: self.fade_floor,
            stamp_threshold: self.stamp_threshold,
        }
    }
}

/// Cosine palette used to tint the stamp over time.
pub fn stamp_tint(time: f32) -> Vec3 {
    let phase = Vec3::splat(time) + Vec3::new(0.0, 2.0, 4.0);
    Vec3::splat(0.5) + 0.5 * Vec3::new(phase.x.cos(), phase.y.cos(), phase.z.cos())
}

/// CPU mirror of the trail fragment program for one texel.
///
/// `previous` is the sampled color from the input buffer and `uv` the texel's
/// texture coordinate (origin top-left). Returns the color written to the
/// output buffer.
pub fn shade_texel(previous: Vec3, uv: Vec2, params: &TrailParams) -> Vec3 {
    let attenuation = (-params.decay_rate * params.delta_time).exp();
    let fade = params.fade_floor * params.delta_time;
    let faded = (previous * attenuation - Vec3::splat(fade)).max(Vec3::ZERO);

    let aspect = params.resolution[0] / params.resolution[1].max(1.0);
    let ndc = Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);
    let offset = (ndc - Vec2::from(params.pointer)) * Vec2::new(aspect, 1.0);
    let falloff = 1.0 - smoothstep(0.0, params.radius, offset.length());
    let gain = if params.speed < params.stamp_threshold {
        0.0
    } else {
        (params.speed * params.intensity).clamp(0.0, 1.0)
    };
    let strength = gain * falloff;

    (faded + stamp_tint(params.time) * strength).min(Vec3::ONE)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(dt: f32, elapsed: f32) -> FrameState {
        FrameState {
            delta_time: dt,
            elapsed_time: elapsed,
        }
    }

    #[test]
    fn test_params_layout() {
        assert_eq!(std::mem::size_of::<TrailParams>(), 48);
        assert_eq!(std::mem::size_of::<TrailParams>() % 16, 0);
    }

    #[test]
    fn test_smoothing_factor_clamped() {
        assert_eq!(smooth_toward(0.0, 1.0, 10.0, 3.0), 1.0);
        assert_eq!(smooth_toward(0.5, 1.0, 0.0, 3.0), 0.5);
    }

    #[test]
    fn test_single_tick_partial_convergence() {
        let mut state = TrailUniformState::new(&TrailConfig::default(), (200, 150));
        state.update(PointerState::new(0.5, 0.5), frame(0.016, 0.016));

        let raw = (0.5f32 * 0.5 + 0.5 * 0.5).sqrt();
        assert!(state.speed() > 0.0);
        assert!(state.speed() < raw);
        assert!((state.speed() - raw * 0.048).abs() < 1e-5);
    }

    #[test]
    fn test_speed_converges_without_overshoot() {
        let dt = 0.016;
        let step = 0.01;
        let mut state = TrailUniformState::new(&TrailConfig::default(), (200, 150));

        // Constant displacement of `step` per tick along x, starting from origin.
        let mut last = 0.0;
        for n in 1..=60 {
            let x = n as f32 * step;
            state.update(PointerState::new(x, 0.0), frame(dt, n as f32 * dt));
            let expected = step * (1.0 - (1.0 - 3.0 * dt).powi(n));
            assert!((state.speed() - expected).abs() < 1e-5, "tick {n}");
            assert!(state.speed() >= last);
            assert!(state.speed() <= step + 1e-6);
            last = state.speed();
        }
    }

    #[test]
    fn test_pointer_tracks_faster_than_speed() {
        let dt = 0.016;
        let mut state = TrailUniformState::new(&TrailConfig::default(), (200, 150));
        let target = Vec2::new(0.4, -0.2);

        for n in 1..=10 {
            state.update(PointerState::new(target.x, target.y), frame(dt, n as f32 * dt));
            let expected = target * (1.0 - (1.0 - 15.0 * dt).powi(n));
            assert!((state.pointer() - expected).length() < 1e-5);
        }

        let pointer_progress = 1.0 - (1.0 - 15.0 * dt).powi(10);
        let speed_progress = 1.0 - (1.0 - 3.0 * dt).powi(10);
        assert!(pointer_progress > speed_progress);
    }

    #[test]
    fn test_params_reflect_state() {
        let mut state = TrailUniformState::new(&TrailConfig::default(), (200, 150));
        state.update(PointerState::new(0.2, 0.1), frame(0.02, 1.5));
        let params = state.params();

        assert_eq!(params.resolution, [200.0, 150.0]);
        assert_eq!(params.delta_time, 0.02);
        assert_eq!(params.time, 1.5);
        assert_eq!(params.speed, state.speed());
        assert_eq!(params.pointer, state.pointer().to_array());
    }

    #[test]
    fn test_decay_without_input() {
        let params = TrailParams {
            resolution: [200.0, 150.0],
            pointer: [-0.9, -0.9],
            speed: 0.0,
            delta_time: 0.016,
            time: 0.0,
            decay_rate: 1.5,
            radius: 0.15,
            intensity: 12.0,
            fade_floor: 0.12,
            stamp_threshold: 1e-3,
        };

        let uv = Vec2::new(0.75, 0.25);
        let mut color = Vec3::new(1.0, 0.6, 0.2);
        let mut frames = 0;
        while color.max_element() > 0.0 {
            let next = shade_texel(color, uv, &params);
            for i in 0..3 {
                if color[i] > 0.0 {
                    assert!(next[i] < color[i]);
                }
                assert!(next[i] >= 0.0);
            }
            color = next;
            frames += 1;
            assert!(frames < 1000, "trail never faded out");
        }
    }

    #[test]
    fn test_stamp_tint_palette() {
        let tint = stamp_tint(0.0);
        assert!((tint.x - 1.0).abs() < 1e-6);
        assert!((tint.y - (0.5 + 0.5 * 2.0f32.cos())).abs() < 1e-6);
        assert!((tint.z - (0.5 + 0.5 * 4.0f32.cos())).abs() < 1e-6);

        for step in 0..64 {
            let tint = stamp_tint(step as f32 * 0.37);
            assert!(tint.min_element() >= 0.0 && tint.max_element() <= 1.0);
        }
    }

    fn fade_out_seconds(dt: f32) -> f32 {
        let params = TrailParams {
            resolution: [200.0, 150.0],
            pointer: [-0.9, -0.9],
            delta_time: dt,
            decay_rate: 1.5,
            radius: 0.15,
            intensity: 12.0,
            fade_floor: 0.12,
            stamp_threshold: 1e-3,
            ..Default::default()
        };
        let uv = Vec2::new(0.75, 0.25);
        let mut color = Vec3::ONE;
        let mut frames = 0u32;
        while color.max_element() > 0.0 {
            color = shade_texel(color, uv, &params);
            frames += 1;
        }
        frames as f32 * dt
    }

    #[test]
    fn test_fade_time_independent_of_frame_rate() {
        let slow = fade_out_seconds(1.0 / 30.0);
        let fast = fade_out_seconds(1.0 / 240.0);
        assert!(
            (slow - fast).abs() < 0.05 * fast,
            "30 Hz fades in {slow}s, 240 Hz in {fast}s"
        );
    }

    #[test]
    fn test_speed_below_threshold_stamps_nothing() {
        let mut params = TrailParams {
            resolution: [200.0, 200.0],
            speed: 5e-4,
            delta_time: 0.016,
            decay_rate: 1.5,
            radius: 0.15,
            intensity: 12.0,
            fade_floor: 0.12,
            stamp_threshold: 1e-3,
            ..Default::default()
        };
        let center = Vec2::new(0.5, 0.5);
        assert_eq!(shade_texel(Vec3::ZERO, center, &params), Vec3::ZERO);

        params.speed = 2e-3;
        assert!(shade_texel(Vec3::ZERO, center, &params).max_element() > 0.0);
    }

    #[test]
    fn test_stamp_centered_on_pointer() {
        let params = TrailParams {
            resolution: [200.0, 200.0],
            pointer: [0.0, 0.0],
            speed: 0.1,
            delta_time: 0.016,
            time: 0.0,
            decay_rate: 1.5,
            radius: 0.15,
            intensity: 12.0,
            fade_floor: 0.12,
            stamp_threshold: 1e-3,
        };

        let center = shade_texel(Vec3::ZERO, Vec2::new(0.5, 0.5), &params);
        let far = shade_texel(Vec3::ZERO, Vec2::new(0.95, 0.95), &params);

        assert!(center.max_element() > 0.0);
        assert_eq!(far, Vec3::ZERO);
    }
}
