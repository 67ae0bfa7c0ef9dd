//! Configuration for the trail effect and the camera.
//!
//! Both structs follow the same pattern: sensible defaults, chained `with_*`
//! setters, and clamping instead of failing on out-of-range values.
//!
//! ```ignore
//! let trail = TrailConfig::new()
//!     .with_decay_rate(0.6)
//!     .with_stamp_radius(0.25);
//! ```

use glam::Vec3;

/// Parameters of the trail simulation and its compositing.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailConfig {
    /// Offscreen buffer resolution relative to the viewport.
    pub downscale: f32,
    /// Smoothing rate for the pointer speed (per second).
    pub speed_smoothing: f32,
    /// Smoothing rate for the pointer position (per second).
    pub pointer_smoothing: f32,
    /// Exponential decay constant of trail intensity (per second).
    pub decay_rate: f32,
    /// Linear fade per second, subtracted after the exponential decay.
    pub fade_floor: f32,
    /// Smoothed speed below which the pointer stamps nothing.
    pub stamp_threshold: f32,
    /// Stamp radius in NDC units (aspect corrected).
    pub stamp_radius: f32,
    /// Gain applied to the smoothed speed to get stamp intensity.
    pub stamp_intensity: f32,
    /// Upper bound for the display pixel ratio.
    pub max_pixel_ratio: f32,
    /// Clear color of the display surface.
    pub clear_color: [f64; 4],
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            downscale: crate::viewport::BUFFER_DOWNSCALE,
            speed_smoothing: 3.0,
            pointer_smoothing: 15.0,
            decay_rate: 1.5,
            fade_floor: 0.12,
            stamp_threshold: 1e-3,
            stamp_radius: 0.15,
            stamp_intensity: 12.0,
            max_pixel_ratio: crate::viewport::MAX_PIXEL_RATIO,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl TrailConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the offscreen buffer downscale factor, clamped to `(0, 1]`.
    pub fn with_downscale(mut self, downscale: f32) -> Self {
        self.downscale = downscale.clamp(0.01, 1.0);
        self
    }

    /// Set the speed smoothing rate.
    pub fn with_speed_smoothing(mut self, rate: f32) -> Self {
        self.speed_smoothing = rate.max(0.0);
        self
    }

    /// Set the pointer smoothing rate.
    pub fn with_pointer_smoothing(mut self, rate: f32) -> Self {
        self.pointer_smoothing = rate.max(0.0);
        self
    }

    /// Set the exponential decay constant.
    pub fn with_decay_rate(mut self, rate: f32) -> Self {
        self.decay_rate = rate.max(0.0);
        self
    }

    /// Set the linear fade per second.
    ///
    /// Must stay positive for untouched trails to reach exactly zero.
    pub fn with_fade_floor(mut self, floor: f32) -> Self {
        self.fade_floor = floor.clamp(0.01, 30.0);
        self
    }

    /// Set the smoothed speed below which no stamp is drawn.
    pub fn with_stamp_threshold(mut self, threshold: f32) -> Self {
        self.stamp_threshold = threshold.max(0.0);
        self
    }

    /// Set the stamp radius.
    pub fn with_stamp_radius(mut self, radius: f32) -> Self {
        self.stamp_radius = radius.max(1e-3);
        self
    }

    /// Set the stamp intensity gain.
    pub fn with_stamp_intensity(mut self, intensity: f32) -> Self {
        self.stamp_intensity = intensity.max(0.0);
        self
    }

    /// Set the pixel ratio cap.
    pub fn with_max_pixel_ratio(mut self, ratio: f32) -> Self {
        self.max_pixel_ratio = ratio.max(1.0);
        self
    }

    /// Set the surface clear color.
    pub fn with_clear_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.clear_color = [r, g, b, 1.0];
        self
    }
}

/// Perspective camera and orbit controller settings.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip distance. There is no far plane.
    pub near: f32,
    /// Initial eye position.
    pub position: Vec3,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Fraction of pending orbit motion applied per tick (0 disables damping).
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            position: Vec3::new(4.0, 4.0, 4.0),
            target: Vec3::new(0.0, 2.5, 0.0),
            damping: 0.05,
        }
    }
}

impl CameraConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, degrees: f32) -> Self {
        self.fov_degrees = degrees.clamp(1.0, 179.0);
        self
    }

    /// Set the near clip distance.
    pub fn with_near(mut self, near: f32) -> Self {
        self.near = near.max(1e-4);
        self
    }

    /// Set the initial eye position and look-at target.
    pub fn looking_at(mut self, position: Vec3, target: Vec3) -> Self {
        self.position = position;
        self.target = target;
        self
    }

    /// Set orbit damping, clamped to `[0, 1]`.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrailConfig::default();
        assert_eq!(config.downscale, 0.25);
        assert_eq!(config.speed_smoothing, 3.0);
        assert_eq!(config.pointer_smoothing, 15.0);
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert_eq!(config.fade_floor, 0.12);
        assert_eq!(config.stamp_threshold, 1e-3);

        let camera = CameraConfig::default();
        assert_eq!(camera.fov_degrees, 60.0);
        assert_eq!(camera.near, 0.1);
    }

    #[test]
    fn test_setters_clamp() {
        let config = TrailConfig::new()
            .with_downscale(4.0)
            .with_decay_rate(-1.0)
            .with_fade_floor(0.0)
            .with_stamp_radius(0.0)
            .with_max_pixel_ratio(0.5)
            .with_stamp_threshold(-1.0);

        assert_eq!(config.downscale, 1.0);
        assert_eq!(config.decay_rate, 0.0);
        assert!(config.fade_floor > 0.0);
        assert!(config.stamp_radius > 0.0);
        assert_eq!(config.max_pixel_ratio, 1.0);
        assert_eq!(config.stamp_threshold, 0.0);

        let camera = CameraConfig::new().with_fov(500.0).with_damping(2.0);
        assert_eq!(camera.fov_degrees, 179.0);
        assert_eq!(camera.damping, 1.0);
    }
}
