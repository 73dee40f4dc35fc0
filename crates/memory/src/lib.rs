//! Annotator Memory Library
//!
//! Process-memory supervision and buffer recycling.
//!
//! This crate provides the memory-pressure side of the image pipeline:
//! a background monitor that samples process memory, classifies it against
//! warning/critical thresholds, and drives registered cleanup callbacks,
//! plus a bounded pool of recyclable pixel buffers.
//!
//! # Example
//!
//! ```
//! use annotator_memory::{MemoryMonitor, MonitorConfig, MemoryStats};
//!
//! let monitor = MemoryMonitor::new(
//!     MonitorConfig::default().with_eval_spacing(std::time::Duration::ZERO),
//! );
//!
//! // Collaborators register cleanup callbacks; the monitor only sums the
//! // megabytes they report freed.
//! monitor.register_cleanup_callback(std::sync::Arc::new(|emergency| {
//!     if emergency { 42 } else { 1 }
//! }));
//!
//! // The polling thread feeds samples through the same entry point:
//! monitor.evaluate(MemoryStats {
//!     resident_bytes: 900 * 1024 * 1024,
//!     ..Default::default()
//! });
//! ```

mod monitor;
mod pool;
mod stats;

// Re-export public API
pub use monitor::{
    CallbackId, CleanupCallback, MemoryLevel, MemoryMonitor, MonitorConfig, MonitorStats,
    ReclaimHook,
};
pub use pool::BufferPool;
pub use stats::{MemorySampler, MemoryStats, SysinfoSampler};
