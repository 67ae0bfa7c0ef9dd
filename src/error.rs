//! Error types for trailfx.
//!
//! Initialization failures are fatal and surface from [`TrailApp::run`](crate::TrailApp::run).
//! Per-frame problems (surface timeouts, zero-area resizes) are absorbed by the
//! frame loop and never show up here.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no texture formats for this adapter.
    #[error("surface exposes no supported texture formats")]
    NoSurfaceFormat,
    /// Offscreen trail buffers were requested with a zero dimension.
    #[error("offscreen buffer dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested viewport width.
        width: u32,
        /// Requested viewport height.
        height: u32,
    },
}

/// Errors that can occur when running the trail application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}
