//! Pipeline service wiring.
//!
//! One `ImagePipeline` owns the buffer pool, the image cache, the memory
//! monitor, and the async loader, wired together at a single construction
//! point and torn down by one explicit `shutdown()`. Components never reach
//! each other through globals; whoever needs a collaborator is handed a
//! reference from here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use annotator_cache::ImageCache;
use annotator_loader::AsyncLoader;
use annotator_memory::{BufferPool, CallbackId, MemoryMonitor};

use crate::config::PipelineConfig;

/// The assembled image pipeline.
///
/// # Example
///
/// ```no_run
/// use annotator_core::{ImagePipeline, PipelineConfig, TaskMetadata, PRIORITY_FOREGROUND};
/// use std::path::Path;
///
/// let pipeline = ImagePipeline::new(PipelineConfig::default());
///
/// pipeline.loader().submit(
///     Path::new("photos/0001.jpg"),
///     PRIORITY_FOREGROUND,
///     None,
///     TaskMetadata::default(),
/// );
///
/// // ...
/// pipeline.shutdown();
/// ```
pub struct ImagePipeline {
    pool: Arc<BufferPool>,
    cache: Arc<ImageCache>,
    monitor: MemoryMonitor,
    loader: AsyncLoader,
    cleanup_id: CallbackId,
    reclaim_id: CallbackId,
    shut_down: AtomicBool,
}

impl ImagePipeline {
    /// Build and start the pipeline.
    ///
    /// The cache and the buffer pool are registered as cleanup targets of
    /// the monitor: on a warning the cache trims back to its configured
    /// bounds, in an emergency it clears unconditionally; reclaim passes
    /// drain the buffer pool.
    pub fn new(config: PipelineConfig) -> Self {
        let pool = Arc::new(BufferPool::new(config.max_pooled_buffers));
        let cache = Arc::new(ImageCache::new(config.cache_config(), pool.clone()));
        let monitor = MemoryMonitor::new(config.monitor_config());

        let cleanup_id = {
            let cache = cache.clone();
            monitor.register_cleanup_callback(Arc::new(move |emergency| {
                if emergency {
                    let freed_bytes = cache.stats().memory_bytes;
                    cache.clear();
                    freed_bytes / (1024 * 1024)
                } else {
                    cache.trim_to_bounds() / (1024 * 1024)
                }
            }))
        };
        let reclaim_id = {
            let pool = pool.clone();
            monitor.register_reclaim_hook(Arc::new(move || pool.drain() as u64))
        };
        monitor.start();

        let loader = AsyncLoader::new(config.loader_config(), cache.clone());
        log::info!("image pipeline assembled");

        Self {
            pool,
            cache,
            monitor,
            loader,
            cleanup_id,
            reclaim_id,
            shut_down: AtomicBool::new(false),
        }
    }

    /// The async loader.
    pub fn loader(&self) -> &AsyncLoader {
        &self.loader
    }

    /// The image cache.
    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// The memory monitor.
    pub fn monitor(&self) -> &MemoryMonitor {
        &self.monitor
    }

    /// The recyclable pixel-buffer pool.
    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Stop the loader and the monitor and unhook the cleanup wiring.
    /// Idempotent; blocks until in-flight workers drain.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.loader.shutdown();
        self.monitor.stop();
        self.monitor.unregister_cleanup_callback(self.cleanup_id);
        self.monitor.unregister_reclaim_hook(self.reclaim_id);
        log::info!("image pipeline shut down");
    }
}

impl Drop for ImagePipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotator_cache::Pixmap;
    use image::DynamicImage;
    use tempfile::TempDir;

    fn small_pipeline() -> ImagePipeline {
        ImagePipeline::new(
            PipelineConfig::default()
                .with_worker_count(0)
                .with_cache_max_items(4),
        )
    }

    fn cached_fixture(pipeline: &ImagePipeline, dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![0u8; 512]).unwrap();
        let image = Arc::new(DynamicImage::new_rgba8(2, 2));
        let pixmap = Arc::new(Pixmap::from_rgba8(vec![0u8; 16], 2, 2));
        pipeline.cache().put(&path, image, pixmap);
        path
    }

    #[test]
    fn test_construction_and_accessors() {
        let pipeline = small_pipeline();
        assert!(pipeline.cache().is_empty());
        assert_eq!(pipeline.loader().pending(), 0);
        assert_eq!(pipeline.buffer_pool().pooled(), 0);
        pipeline.shutdown();
    }

    #[test]
    fn test_two_pipelines_are_independent() {
        let dir = TempDir::new().unwrap();
        let first = small_pipeline();
        let second = small_pipeline();

        let path = cached_fixture(&first, &dir, "a.png");
        assert!(first.cache().is_cached(&path));
        assert!(!second.cache().is_cached(&path));

        first.shutdown();
        second.shutdown();
    }

    #[test]
    fn test_force_cleanup_clears_cache() {
        let dir = TempDir::new().unwrap();
        let pipeline = small_pipeline();

        cached_fixture(&pipeline, &dir, "a.png");
        cached_fixture(&pipeline, &dir, "b.png");
        assert_eq!(pipeline.cache().len(), 2);

        // The emergency path wired at construction clears unconditionally.
        pipeline.monitor().force_cleanup();
        assert!(pipeline.cache().is_empty());

        pipeline.shutdown();
    }

    #[test]
    fn test_reclaim_drains_buffer_pool() {
        let pipeline = small_pipeline();
        pipeline.buffer_pool().release(vec![0u8; 4096]);
        assert_eq!(pipeline.buffer_pool().pooled(), 1);

        pipeline.monitor().force_cleanup();
        assert_eq!(pipeline.buffer_pool().pooled(), 0);

        pipeline.shutdown();
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let pipeline = small_pipeline();
        pipeline.shutdown();
        pipeline.shutdown();
    }
}
