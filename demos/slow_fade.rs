//! # Slow Fade
//!
//! Long-lived trails: a gentle decay, a wide stamp, and a lower gain so
//! only fast strokes light up fully. The buffers use a coarser downscale,
//! which softens the trail further.
//!
//! Run with: `cargo run --example slow_fade`

use trailfx::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,trailfx=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let trail = TrailConfig::default()
        .with_decay_rate(0.35)
        .with_fade_floor(0.03)
        .with_stamp_radius(0.25)
        .with_stamp_intensity(6.0)
        .with_downscale(0.125)
        .with_clear_color(0.02, 0.02, 0.04);

    let camera = CameraConfig::default()
        .looking_at(Vec3::new(6.0, 3.0, 6.0), Vec3::ZERO)
        .with_fov(45.0);

    TrailApp::new()
        .with_title("Slow Fade")
        .with_trail(trail)
        .with_camera(camera)
        .run()
}
