//! Orbit camera with damped rotation and zoom.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

const PITCH_LIMIT: f32 = 1.5;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
const ROTATE_SPEED: f32 = 0.005;
const ZOOM_SPEED: f32 = 0.3;

/// Perspective camera orbiting a target point.
///
/// Pointer drags and wheel steps accumulate pending motion; [`OrbitCamera::update`]
/// applies a damped fraction of it once per tick.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    fov_y: f32,
    near: f32,
    aspect: f32,
    damping: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
}

impl OrbitCamera {
    /// Create a camera framed from `config` with the given aspect ratio.
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let offset = config.position - config.target;
        let distance = offset.length().max(MIN_DISTANCE);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        Self {
            yaw,
            pitch,
            distance,
            target: config.target,
            fov_y: config.fov_degrees.to_radians(),
            near: config.near,
            aspect,
            damping: config.damping,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Perspective projection with a near plane and no far plane.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_infinite_rh(self.fov_y, self.aspect, self.near)
    }

    /// Combined projection and view.
    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view_matrix()
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the projection aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Queue a rotation from a pointer drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * ROTATE_SPEED;
        self.pending_pitch += dy * ROTATE_SPEED;
    }

    /// Queue a zoom from wheel steps (positive zooms in).
    pub fn zoom(&mut self, steps: f32) {
        self.pending_zoom -= steps * ZOOM_SPEED;
    }

    /// Apply pending motion. Called once per tick before rendering.
    pub fn update(&mut self) {
        let step = if self.damping > 0.0 { self.damping } else { 1.0 };

        self.yaw += self.pending_yaw * step;
        self.pitch = (self.pitch + self.pending_pitch * step).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance =
            (self.distance + self.pending_zoom * step).clamp(MIN_DISTANCE, MAX_DISTANCE);

        let keep = 1.0 - step;
        self.pending_yaw *= keep;
        self.pending_pitch *= keep;
        self.pending_zoom *= keep;
    }
}
