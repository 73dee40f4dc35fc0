//! Annotator Loader Library
//!
//! Asynchronous image loading with priority scheduling and cancellable
//! workers.
//!
//! This crate keeps image decoding off the foreground thread. Load requests
//! carry an integer priority (lower = more urgent) and are serviced by a
//! fixed pool of worker threads that consult the image cache before touching
//! the filesystem. Results are delivered through per-task callbacks and a
//! loader-wide event registry; the submitting thread never blocks on I/O.
//!
//! # Example
//!
//! ```no_run
//! use annotator_cache::{CacheConfig, ImageCache};
//! use annotator_loader::{AsyncLoader, LoaderConfig, TaskMetadata, PRIORITY_FOREGROUND};
//! use annotator_memory::BufferPool;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let pool = Arc::new(BufferPool::new(20));
//! let cache = Arc::new(ImageCache::new(CacheConfig::default(), pool));
//! let loader = AsyncLoader::new(LoaderConfig::default(), cache);
//!
//! loader.events().on_image_loaded(Arc::new(|path, _image, pixmap| {
//!     println!("{}: {}x{}", path.display(), pixmap.width, pixmap.height);
//! }));
//!
//! loader.submit(
//!     Path::new("photos/0001.jpg"),
//!     PRIORITY_FOREGROUND,
//!     None,
//!     TaskMetadata::default(),
//! );
//!
//! // ...
//! loader.shutdown();
//! ```

mod cancel;
mod config;
mod error;
mod events;
mod loader;
mod task;
mod worker;

// Re-export public API
pub use cancel::{CancellationRegistry, CancellationToken};
pub use config::{LoaderConfig, DEFAULT_EXTENSIONS};
pub use error::LoadError;
pub use events::LoaderEvents;
pub use loader::{AsyncLoader, LoaderStats};
pub use task::{
    LoadCallback, LoadTask, TaskId, TaskMetadata, TaskQueue, PRIORITY_FOREGROUND, PRIORITY_PRELOAD,
};
