//! Loader configuration.

use std::path::Path;
use std::time::Duration;

/// File extensions accepted by default (lowercase, without the dot).
pub const DEFAULT_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Configuration for the async loader and its worker pool.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of worker threads. Default: 4.
    pub worker_count: usize,

    /// How long an idle worker waits before re-checking the queue.
    pub poll_interval: Duration,

    /// Requests for files larger than this are rejected. Default: 50 MiB.
    pub max_image_file_bytes: u64,

    /// Retry budget for transient decode failures. Default: 3.
    pub max_retries: u32,

    /// Sliding-window half-width used by `preload`. Default: 3.
    pub preload_lookahead: usize,

    /// Accepted file extensions (lowercase, without the dot).
    pub supported_extensions: Vec<String>,

    /// Presentable pixmaps are downscaled to fit this dimension;
    /// the decoded image keeps full resolution. `None` disables the cap.
    pub max_decode_dimension: Option<u32>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            poll_interval: Duration::from_millis(100),
            max_image_file_bytes: 50 * 1024 * 1024,
            max_retries: 3,
            preload_lookahead: 3,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_decode_dimension: Some(4096),
        }
    }
}

impl LoaderConfig {
    /// Set the number of worker threads.
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the idle poll interval for workers.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the maximum accepted file size in megabytes.
    pub fn with_max_image_mb(mut self, mb: u64) -> Self {
        self.max_image_file_bytes = mb * 1024 * 1024;
        self
    }

    /// Set the retry budget for decode failures.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the preload lookahead.
    pub fn with_preload_lookahead(mut self, lookahead: usize) -> Self {
        self.preload_lookahead = lookahead;
        self
    }

    /// Replace the extension allow-list.
    pub fn with_supported_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_extensions = extensions
            .into_iter()
            .map(|e| e.into().to_lowercase())
            .collect();
        self
    }

    /// Set (or disable) the presentable-form dimension cap.
    pub fn with_max_decode_dimension(mut self, dimension: Option<u32>) -> Self {
        self.max_decode_dimension = dimension;
        self
    }

    /// Whether the path's extension is in the allow-list.
    pub fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.supported_extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}
