//! Annotator Core Library
//!
//! Construction point for the image pipeline: configuration, service
//! wiring, and lifecycle.
//!
//! The rest of the application talks to one [`ImagePipeline`] instance,
//! built here from a [`PipelineConfig`] and shut down explicitly. No part
//! of the pipeline is reachable through global state.

mod config;
mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::ImagePipeline;

// Re-export the pipeline's surface so consumers depend on one crate.
pub use annotator_cache::{CacheConfig, CacheStats, ImageCache, Pixmap};
pub use annotator_loader::{
    AsyncLoader, LoadError, LoaderConfig, LoaderEvents, LoaderStats, TaskMetadata,
    PRIORITY_FOREGROUND, PRIORITY_PRELOAD,
};
pub use annotator_memory::{
    BufferPool, MemoryLevel, MemoryMonitor, MemoryStats, MonitorConfig, MonitorStats,
};
