//! Error types for morphfield.
//!
//! Extraction errors never escape a morph request: the loader logs them and
//! treats the source as having produced no points. Configuration and GPU
//! errors belong to the host layer and are returned to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a source into a pixel buffer.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The image could not be opened or decoded.
    #[error("failed to load image '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// No font is registered for the requested family and there is no default.
    #[error("no font available for family '{0}'")]
    NoFont(String),
    /// The text source was empty or only whitespace.
    #[error("text source is empty")]
    EmptyText,
    /// The scaled buffer would have zero width or height.
    #[error("source '{0}' renders to an empty buffer")]
    ZeroSize(String),
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The TOML document is malformed or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A font file exists but could not be parsed.
    #[error("invalid font '{}': {reason}", path.display())]
    Font { path: PathBuf, reason: String },
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a WebGPU/Vulkan/Metal/DX12 capable GPU is required")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture formats.
    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,
}

/// Errors that stop the window host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
}
