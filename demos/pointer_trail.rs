//! # Pointer Trail
//!
//! The default setup: a colored trail follows the mouse across the window
//! while the world axes are drawn on top of it.
//!
//! - Move the mouse to paint; faster movement paints brighter
//! - Left-drag to orbit the camera
//! - Scroll to zoom
//!
//! Run with: `cargo run --example pointer_trail`

use trailfx::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,trailfx=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    TrailApp::new()
        .with_title("Pointer Trail")
        .with_window_size(1280, 720)
        .run()
}
