//! # trailfx
//!
//! A pointer-driven fading trail rendered as a GPU feedback effect and used as
//! the background of a 3D scene.
//!
//! Every frame the trail program reads the previous trail image, fades it, and
//! stamps a new mark at the smoothed pointer position, scaled by the smoothed
//! pointer speed. The result is written into a second offscreen buffer; the two
//! buffers swap roles after each frame (ping-pong). The newest image is drawn
//! as a full-screen background, then the depth-tested scene is drawn on top.
//!
//! ## Quick Start
//!
//! ```ignore
//! use trailfx::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     TrailApp::new()
//!         .with_title("Trail")
//!         .with_trail(TrailConfig::default().with_decay_rate(0.8))
//!         .run()
//! }
//! ```
//!
//! ## Custom scene content
//!
//! Anything drawn over the trail implements [`SceneLayer`]:
//!
//! ```ignore
//! TrailApp::new()
//!     .with_axes(false)
//!     .with_layer(|ctx| MyMesh::new(ctx))
//!     .run()?;
//! ```
//!
//! ## Testing without a GPU
//!
//! The per-frame ordering lives in [`RendererState`], which drives any
//! [`FrameBackend`]. [`GpuState`] is the wgpu implementation; tests can supply
//! their own backend to observe buffer roles and resize propagation.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber. Binaries
//! choose one, e.g. `tracing_subscriber::fmt()` with an `EnvFilter`.

mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod input;
pub mod ping_pong;
pub mod time;
pub mod trail;
pub mod viewport;

pub use app::TrailApp;
pub use bytemuck;
pub use camera::OrbitCamera;
pub use config::{CameraConfig, TrailConfig};
pub use error::{AppError, GpuError};
pub use frame::{FrameBackend, FramePhase, RendererState};
pub use glam::{Mat4, Vec2, Vec3};
pub use gpu::{AxesHelper, GpuState, SceneContext, SceneLayer};
pub use input::{PointerState, PointerTracker};
pub use ping_pong::{PingPong, Slot};
pub use time::{FrameState, Time};
pub use trail::{TrailParams, TrailUniformState};
pub use viewport::Viewport;
pub use wgpu;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::app::TrailApp;
    pub use crate::camera::OrbitCamera;
    pub use crate::config::{CameraConfig, TrailConfig};
    pub use crate::error::{AppError, GpuError};
    pub use crate::frame::{FrameBackend, RendererState};
    pub use crate::gpu::{AxesHelper, SceneContext, SceneLayer};
    pub use crate::input::PointerState;
    pub use crate::viewport::Viewport;
    pub use glam::{Mat4, Vec2, Vec3};
}
