//! Async loader facade
//!
//! Accepts load requests, validates them synchronously, consults the cache,
//! and hands the rest to the worker pool. The submitting thread never blocks
//! on file I/O or decode; `shutdown()` is the only call that waits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use annotator_cache::ImageCache;

use crate::cancel::CancellationRegistry;
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::events::LoaderEvents;
use crate::task::{LoadCallback, TaskMetadata, TaskQueue, PRIORITY_PRELOAD};
use crate::worker::WorkerPool;

/// Loader statistics.
#[derive(Debug, Clone, Default)]
pub struct LoaderStats {
    /// Images decoded successfully (cache hits excluded).
    pub total_loaded: u64,

    /// Loads that failed permanently.
    pub total_failed: u64,

    /// Requests satisfied from the cache.
    pub cache_hits: u64,

    /// Rolling average decode time.
    pub average_load_time: Duration,

    /// Tasks currently pending or executing.
    pub active_loads: usize,

    /// Tasks waiting in the pending queue.
    pub queue_size: usize,

    /// Tasks submitted over the loader's lifetime.
    pub submitted: u64,

    /// Tasks completed (including cancellations) over the loader's lifetime.
    pub completed: u64,

    /// Tasks cancelled before execution.
    pub cancelled: u64,
}

pub(crate) struct FlightState {
    pub(crate) in_flight: HashMap<PathBuf, crate::task::TaskId>,
    pub(crate) submitted: u64,
    pub(crate) completed: u64,
    pub(crate) cancelled: u64,
    pub(crate) drained_emitted: bool,
}

#[derive(Default)]
pub(crate) struct StatsState {
    pub(crate) total_loaded: u64,
    pub(crate) total_failed: u64,
    pub(crate) cache_hits: u64,
    pub(crate) average_load_time: Duration,
}

/// State shared between the facade and the worker threads.
pub(crate) struct LoaderInner {
    pub(crate) config: LoaderConfig,
    pub(crate) max_image_file_bytes: AtomicU64,
    pub(crate) queue: TaskQueue,
    pub(crate) cache: Arc<ImageCache>,
    pub(crate) events: LoaderEvents,
    pub(crate) cancels: CancellationRegistry,
    pub(crate) flight: Mutex<FlightState>,
    pub(crate) stats: Mutex<StatsState>,
    pub(crate) shutdown: AtomicBool,
}

impl LoaderInner {
    pub(crate) fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Synchronous input validation; rejected requests are never queued.
    fn validate(&self, path: &Path) -> Result<(), LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }
        if !self.config.supports(path) {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string();
            return Err(LoadError::UnsupportedFormat(ext));
        }
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| LoadError::Inaccessible(e.to_string()))?
            .len();
        let limit_bytes = self.max_image_file_bytes.load(Ordering::Relaxed);
        if size_bytes > limit_bytes {
            return Err(LoadError::FileTooLarge {
                size_bytes,
                limit_bytes,
            });
        }
        Ok(())
    }

    /// Completion bookkeeping shared by every task outcome.
    ///
    /// Fires the all-work-drained event exactly once when the completed
    /// count catches up with the submitted count.
    pub(crate) fn finish_task(&self, path: &Path, cancelled: bool) {
        self.cancels.unregister(path);

        let drained = {
            let mut flight = self.flight.lock().unwrap();
            flight.in_flight.remove(path);
            flight.completed += 1;
            if cancelled {
                flight.cancelled += 1;
            }
            if flight.completed >= flight.submitted
                && flight.submitted > 0
                && !flight.drained_emitted
            {
                flight.drained_emitted = true;
                true
            } else {
                false
            }
        };

        if drained {
            self.events.emit_drained();
        }
    }

    /// Re-enqueue a task after a transient decode failure.
    pub(crate) fn retry(&self, mut task: crate::task::LoadTask) {
        task.retry_count += 1;
        log::debug!(
            "retrying {} ({}/{})",
            task.path.display(),
            task.retry_count,
            task.max_retries
        );
        self.queue.requeue(task);
    }

    /// Record a completed decode in the rolling-average statistics.
    pub(crate) fn note_loaded(&self, elapsed: Duration, from_cache: bool) {
        let mut stats = self.stats.lock().unwrap();
        if from_cache {
            stats.cache_hits += 1;
            return;
        }
        stats.total_loaded += 1;
        let n = stats.total_loaded as u32;
        stats.average_load_time = (stats.average_load_time * (n - 1) + elapsed) / n;
    }

    pub(crate) fn note_failed(&self) {
        let mut stats = self.stats.lock().unwrap();
        stats.total_failed += 1;
    }
}

/// Asynchronous image loader with a fixed worker pool.
///
/// Construct one per pipeline; submitting the path currently on screen at
/// [`PRIORITY_FOREGROUND`](crate::PRIORITY_FOREGROUND) and letting the
/// navigation layer call [`preload`](Self::preload) keeps the canvas
/// responsive while browsing.
///
/// `shutdown()` cancels pending work, waits for in-flight workers to drain,
/// and is idempotent. It must not be called from a worker callback.
pub struct AsyncLoader {
    pub(crate) inner: Arc<LoaderInner>,
    workers: Mutex<Option<WorkerPool>>,
}

impl AsyncLoader {
    /// Create a loader and start its worker pool.
    pub fn new(config: LoaderConfig, cache: Arc<ImageCache>) -> Self {
        let worker_count = config.worker_count;
        let inner = Arc::new(LoaderInner {
            max_image_file_bytes: AtomicU64::new(config.max_image_file_bytes),
            config,
            queue: TaskQueue::new(),
            cache,
            events: LoaderEvents::default(),
            cancels: CancellationRegistry::new(),
            flight: Mutex::new(FlightState {
                in_flight: HashMap::new(),
                submitted: 0,
                completed: 0,
                cancelled: 0,
                drained_emitted: false,
            }),
            stats: Mutex::new(StatsState::default()),
            shutdown: AtomicBool::new(false),
        });

        let workers = WorkerPool::spawn(&inner, worker_count);
        log::info!("async loader started with {} workers", worker_count);

        Self {
            inner,
            workers: Mutex::new(Some(workers)),
        }
    }

    /// Request an image load.
    ///
    /// Returns `false` (after emitting a synchronous load-failed event) when
    /// the path does not exist, its extension is not allowed, or the file
    /// exceeds the size limit. A path already in flight is accepted as a
    /// no-op. If the cache holds a valid entry the callback is invoked
    /// immediately and no worker is scheduled.
    pub fn submit(
        &self,
        path: &Path,
        priority: i32,
        callback: Option<LoadCallback>,
        metadata: TaskMetadata,
    ) -> bool {
        if self.inner.is_shut_down() {
            return false;
        }

        if let Err(err) = self.inner.validate(path) {
            self.inner.events.emit_failed(path, &err);
            return false;
        }

        // Cache-hit fast path: deliver synchronously, no worker involved.
        if let Some((image, pixmap)) = self.inner.cache.get(path) {
            if let Some(cb) = &callback {
                cb(path, &image, &pixmap, &metadata);
            }
            self.inner.events.emit_loaded(path, &image, &pixmap);
            self.inner.stats.lock().unwrap().cache_hits += 1;
            return true;
        }

        let mut flight = self.inner.flight.lock().unwrap();
        if flight.in_flight.contains_key(path) {
            return true; // already in flight; no duplicate work
        }

        self.inner.cancels.register(path);
        let id = self.inner.queue.push(
            path,
            priority,
            metadata,
            callback,
            self.inner.config.max_retries,
        );
        flight.in_flight.insert(path.to_path_buf(), id);
        flight.submitted += 1;
        flight.drained_emitted = false;
        true
    }

    /// Submit a batch with an increasing priority offset per path, so the
    /// pool services the batch in request order under contention.
    pub fn submit_batch(
        &self,
        paths: &[PathBuf],
        base_priority: i32,
        callback: Option<LoadCallback>,
        metadata: TaskMetadata,
    ) -> usize {
        let total = paths.len();
        let mut accepted = 0;
        for (i, path) in paths.iter().enumerate() {
            let batch_metadata = TaskMetadata {
                batch_index: Some(i),
                batch_size: Some(total),
                ..metadata
            };
            if self.submit(path, base_priority + i as i32, callback.clone(), batch_metadata) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Preload the sliding window around `current_index`, excluding the
    /// current image itself. Preloads run in the low-urgency band, so any
    /// foreground submission preempts them in the queue.
    pub fn preload(&self, paths: &[PathBuf], current_index: usize, lookahead: usize) -> usize {
        if paths.is_empty() {
            return 0;
        }

        let before_end = current_index.min(paths.len());
        let before_start = current_index.saturating_sub(lookahead).min(before_end);
        let after_start = (current_index + 1).min(paths.len());
        let after_end = (current_index + lookahead + 1).min(paths.len());

        let window: Vec<PathBuf> = paths[before_start..before_end]
            .iter()
            .chain(paths[after_start..after_end].iter())
            .cloned()
            .collect();

        self.submit_batch(
            &window,
            PRIORITY_PRELOAD,
            None,
            TaskMetadata {
                preload: true,
                ..Default::default()
            },
        )
    }

    /// Cancel the load for a path.
    ///
    /// A task still in the pending queue is removed and its callback will
    /// never fire. A task already executing runs to completion; its result
    /// is kept in the cache but not delivered. Returns whether a pending
    /// task was found.
    pub fn cancel(&self, path: &Path) -> bool {
        if let Some(task) = self.inner.queue.remove_path(path) {
            self.inner.cancels.cancel(path);
            self.inner.finish_task(&task.path, true);
            return true;
        }
        // Possibly executing: flag the token so the worker discards the result.
        self.inner.cancels.cancel(path);
        false
    }

    /// Drain the pending queue, cancelling every task in it. Tasks already
    /// executing are not interrupted. Returns the number cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained = self.inner.queue.drain();
        for task in &drained {
            self.inner.cancels.cancel(&task.path);
            self.inner.finish_task(&task.path, true);
        }
        drained.len()
    }

    /// Cancel pending work, wait for in-flight workers to drain, and release
    /// the pool. Idempotent; must be called from the owning thread.
    pub fn shutdown(&self) {
        if self.inner.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        self.cancel_all();
        let workers = self.workers.lock().unwrap().take();
        if let Some(pool) = workers {
            pool.join();
        }
        log::info!("async loader shut down");
    }

    /// The loader's event registry.
    pub fn events(&self) -> &LoaderEvents {
        &self.inner.events
    }

    /// The cache this loader populates.
    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.inner.cache
    }

    /// The loader's configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Number of tasks waiting in the pending queue.
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    /// Adjust the maximum accepted file size (settings-change path).
    pub fn set_max_image_file_bytes(&self, bytes: u64) {
        self.inner
            .max_image_file_bytes
            .store(bytes, Ordering::Relaxed);
    }

    /// Snapshot of loader statistics.
    pub fn stats(&self) -> LoaderStats {
        let stats = self.inner.stats.lock().unwrap();
        let flight = self.inner.flight.lock().unwrap();
        LoaderStats {
            total_loaded: stats.total_loaded,
            total_failed: stats.total_failed,
            cache_hits: stats.cache_hits,
            average_load_time: stats.average_load_time,
            active_loads: flight.in_flight.len(),
            queue_size: self.inner.queue.len(),
            submitted: flight.submitted,
            completed: flight.completed,
            cancelled: flight.cancelled,
        }
    }
}

impl Drop for AsyncLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}
