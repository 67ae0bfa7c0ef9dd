//! Viewport dimensions and the resolutions derived from them.
//!
//! Everything resolution-dependent (surface size, offscreen buffer size, the
//! trail program's resolution uniform) is derived here so that a single
//! [`Viewport`] value is the only thing the resize path has to propagate.

/// Offscreen buffer resolution relative to the viewport.
pub const BUFFER_DOWNSCALE: f32 = 0.25;

/// Upper bound applied to the device pixel ratio.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Derive an offscreen buffer extent from viewport dimensions.
///
/// Each side is `round(side * downscale)`, never less than 1. Returns `None`
/// when either input dimension is zero.
pub fn buffer_extent(width: u32, height: u32, downscale: f32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let scale = |side: u32| ((side as f32 * downscale).round() as u32).max(1);
    Some((scale(width), scale(height)))
}

fn sanitize_scale(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    }
}

/// Logical viewport plus the device scale it is presented at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    physical: (u32, u32),
    scale_factor: f64,
    pixel_ratio: f32,
    downscale: f32,
}

impl Viewport {
    /// Create a viewport from logical dimensions and a device pixel ratio.
    ///
    /// Zero dimensions are clamped to 1. The pixel ratio is clamped to
    /// [`MAX_PIXEL_RATIO`].
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        Self::with_limits(width, height, device_pixel_ratio, MAX_PIXEL_RATIO, BUFFER_DOWNSCALE)
    }

    /// Like [`Viewport::new`] with an explicit pixel ratio cap and buffer downscale.
    pub fn with_limits(
        width: u32,
        height: u32,
        device_pixel_ratio: f64,
        max_pixel_ratio: f32,
        downscale: f32,
    ) -> Self {
        let scale_factor = sanitize_scale(device_pixel_ratio);
        let to_physical = |side: u32| ((side as f64 * scale_factor).round() as u32).max(1);
        let physical = (to_physical(width), to_physical(height));
        Self::build(width, height, physical, scale_factor, max_pixel_ratio, downscale)
    }

    fn build(
        width: u32,
        height: u32,
        physical: (u32, u32),
        scale_factor: f64,
        max_pixel_ratio: f32,
        downscale: f32,
    ) -> Self {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "clamping zero-area viewport to 1x1 minimum");
        }
        Self {
            width: width.max(1),
            height: height.max(1),
            physical: (physical.0.max(1), physical.1.max(1)),
            scale_factor,
            pixel_ratio: (scale_factor as f32).min(max_pixel_ratio.max(1.0)),
            downscale: downscale.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Build a viewport from a window's physical size and scale factor.
    pub fn from_physical(
        physical: winit::dpi::PhysicalSize<u32>,
        scale_factor: f64,
        max_pixel_ratio: f32,
        downscale: f32,
    ) -> Self {
        let scale_factor = sanitize_scale(scale_factor);
        let logical: winit::dpi::LogicalSize<u32> = physical.to_logical(scale_factor);
        Self::build(
            logical.width,
            logical.height,
            (physical.width, physical.height),
            scale_factor,
            max_pixel_ratio,
            downscale,
        )
    }

    /// Logical width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Clamped pixel ratio used for the display surface.
    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Unclamped device scale factor, used to map physical pointer positions.
    #[inline]
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Width over height.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Size of the display surface in pixels.
    ///
    /// The window's physical size, unless the device scale exceeds the pixel
    /// ratio cap, in which case the physical size is scaled down to the cap.
    pub fn surface_size(&self) -> (u32, u32) {
        if self.scale_factor as f32 <= self.pixel_ratio {
            return self.physical;
        }
        let ratio = self.pixel_ratio as f64 / self.scale_factor;
        let scale = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
        (scale(self.physical.0), scale(self.physical.1))
    }

    /// Resolution shared by both offscreen trail buffers.
    pub fn buffer_resolution(&self) -> (u32, u32) {
        // Dimensions are clamped to >= 1 at construction, so the extent always exists.
        buffer_extent(self.width, self.height, self.downscale).unwrap_or((1, 1))
    }

    /// Map a physical pointer position to normalized device coordinates.
    ///
    /// The origin is the viewport center, x grows right, y grows up. The
    /// result is clamped to `[-1, 1]`.
    pub fn to_ndc(&self, physical_x: f64, physical_y: f64) -> glam::Vec2 {
        let x = (physical_x / self.scale_factor) as f32 / self.width as f32;
        let y = (physical_y / self.scale_factor) as f32 / self.height as f32;
        glam::Vec2::new(x * 2.0 - 1.0, 1.0 - y * 2.0).clamp(glam::Vec2::NEG_ONE, glam::Vec2::ONE)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_extent_quarter() {
        assert_eq!(buffer_extent(800, 600, 0.25), Some((200, 150)));
        assert_eq!(buffer_extent(1281, 719, 0.25), Some((320, 180)));
    }

    #[test]
    fn test_buffer_extent_minimum_one() {
        assert_eq!(buffer_extent(1, 1, 0.25), Some((1, 1)));
        assert_eq!(buffer_extent(3, 2, 0.25), Some((1, 1)));
    }

    #[test]
    fn test_buffer_extent_rejects_zero() {
        assert_eq!(buffer_extent(0, 600, 0.25), None);
        assert_eq!(buffer_extent(800, 0, 0.25), None);
    }

    #[test]
    fn test_zero_area_clamped() {
        let viewport = Viewport::new(0, 0, 1.0);
        assert_eq!(viewport.width(), 1);
        assert_eq!(viewport.height(), 1);
        assert_eq!(viewport.buffer_resolution(), (1, 1));
    }

    #[test]
    fn test_pixel_ratio_clamped() {
        let viewport = Viewport::new(800, 600, 3.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.surface_size(), (1600, 1200));
        assert_eq!(viewport.buffer_resolution(), (200, 150));
    }

    #[test]
    fn test_from_physical() {
        let viewport = Viewport::from_physical(
            winit::dpi::PhysicalSize::new(1600, 1200),
            2.0,
            MAX_PIXEL_RATIO,
            BUFFER_DOWNSCALE,
        );
        assert_eq!((viewport.width(), viewport.height()), (800, 600));
        assert_eq!(viewport.surface_size(), (1600, 1200));
    }

    #[test]
    fn test_surface_matches_window_at_fractional_scale() {
        let physical = |w, h, scale| {
            Viewport::from_physical(
                winit::dpi::PhysicalSize::new(w, h),
                scale,
                MAX_PIXEL_RATIO,
                BUFFER_DOWNSCALE,
            )
        };
        assert_eq!(physical(1603, 1203, 1.5).surface_size(), (1603, 1203));
        assert_eq!(physical(1000, 700, 1.75).surface_size(), (1000, 700));
        assert_eq!(physical(3000, 2001, 3.0).surface_size(), (2000, 1334));
        assert_eq!(physical(0, 0, 1.5).surface_size(), (1, 1));
    }

    #[test]
    fn test_ndc_mapping() {
        let viewport = Viewport::new(800, 600, 1.0);
        let center = viewport.to_ndc(400.0, 300.0);
        assert!(center.length() < 1e-6);

        let top_left = viewport.to_ndc(0.0, 0.0);
        assert_eq!(top_left, glam::Vec2::new(-1.0, 1.0));

        let bottom_right = viewport.to_ndc(800.0, 600.0);
        assert_eq!(bottom_right, glam::Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_ndc_uses_scale_factor_and_clamps() {
        let viewport = Viewport::new(800, 600, 2.0);
        let center = viewport.to_ndc(800.0, 600.0);
        assert!(center.length() < 1e-6);

        let outside = viewport.to_ndc(-500.0, 5000.0);
        assert_eq!(outside, glam::Vec2::new(-1.0, -1.0));
    }
}
