//! Error types for plexus.
//!
//! Configuration, GPU initialization, and worker spawning can all fail;
//! each gets its own enum so callers can match on what went wrong.

use std::fmt;

/// Errors produced by [`FieldConfig::validate`](crate::config::FieldConfig::validate)
/// and friends.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Field width or height is zero or negative.
    NonPositiveBounds { width: f32, height: f32 },
    /// Connection distance must be positive when any entities are configured.
    NonPositiveLineDistance(f32),
    /// At least two opacity bins are required for binned line batching.
    TooFewBins(usize),
    /// Trail segment cap of zero would make every trail invisible.
    ZeroSegmentCap,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveBounds { width, height } => {
                write!(f, "field bounds must be positive, got {}x{}", width, height)
            }
            ConfigError::NonPositiveLineDistance(d) => {
                write!(f, "connection distance must be positive, got {}", d)
            }
            ConfigError::TooFewBins(n) => {
                write!(f, "need at least 2 opacity bins, got {}", n)
            }
            ConfigError::ZeroSegmentCap => {
                write!(f, "trail segment cap must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "failed to create GPU surface: {}", e),
            GpuError::NoAdapter(e) => write!(f, "no compatible GPU adapter found: {}", e),
            GpuError::DeviceCreation(e) => write!(f, "failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::NoAdapter(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when spawning a simulation worker thread.
#[derive(Debug)]
pub enum WorkerError {
    /// The field configuration was rejected before the thread was spawned.
    Config(ConfigError),
    /// The OS refused to spawn the thread.
    Thread(std::io::Error),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Config(e) => write!(f, "invalid worker field config: {}", e),
            WorkerError::Thread(e) => write!(f, "failed to spawn worker thread: {}", e),
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkerError::Config(e) => Some(e),
            WorkerError::Thread(e) => Some(e),
        }
    }
}

impl From<ConfigError> for WorkerError {
    fn from(e: ConfigError) -> Self {
        WorkerError::Config(e)
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(e: std::io::Error) -> Self {
        WorkerError::Thread(e)
    }
}

/// Errors that can occur when running the application.
#[derive(Debug)]
pub enum RunError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// A field configuration failed validation.
    Config(ConfigError),
    /// The simulation worker could not be spawned.
    Worker(WorkerError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::EventLoop(e) => write!(f, "failed to create event loop: {}", e),
            RunError::Gpu(e) => write!(f, "GPU error: {}", e),
            RunError::Config(e) => write!(f, "configuration error: {}", e),
            RunError::Worker(e) => write!(f, "worker error: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::EventLoop(e) => Some(e),
            RunError::Gpu(e) => Some(e),
            RunError::Config(e) => Some(e),
            RunError::Worker(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for RunError {
    fn from(e: winit::error::EventLoopError) -> Self {
        RunError::EventLoop(e)
    }
}

impl From<GpuError> for RunError {
    fn from(e: GpuError) -> Self {
        RunError::Gpu(e)
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}

impl From<WorkerError> for RunError {
    fn from(e: WorkerError) -> Self {
        RunError::Worker(e)
    }
}
