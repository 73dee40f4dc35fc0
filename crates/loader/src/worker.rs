//! Worker pool executing load tasks
//!
//! A fixed pool of named threads pulls tasks from the priority queue,
//! consults the cache, decodes on a miss, populates the cache, and delivers
//! the result. Decode panics are contained per task so one bad file cannot
//! take a worker down.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use annotator_cache::Pixmap;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::cancel::CancellationToken;
use crate::error::LoadError;
use crate::loader::LoaderInner;
use crate::task::LoadTask;

pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` worker threads over the shared loader state.
    pub(crate) fn spawn(inner: &Arc<LoaderInner>, count: usize) -> Self {
        let mut handles = Vec::with_capacity(count);
        for id in 0..count {
            let inner = inner.clone();
            let handle = thread::Builder::new()
                .name(format!("annotator-load-worker-{}", id))
                .spawn(move || run(inner))
                .expect("failed to spawn load worker thread");
            handles.push(handle);
        }
        Self { handles }
    }

    /// Wait for every worker to exit.
    pub(crate) fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// Main worker loop: pull, execute, sleep briefly when idle.
fn run(inner: Arc<LoaderInner>) {
    loop {
        if inner.is_shut_down() {
            break;
        }

        let Some(task) = inner.queue.pop() else {
            thread::sleep(inner.config.poll_interval);
            continue;
        };

        let token = inner.cancels.get(&task.path).unwrap_or_default();
        if token.is_cancelled() {
            // Cancelled before starting: never decoded, never delivered.
            inner.finish_task(&task.path, true);
            continue;
        }

        process_task(&inner, task, &token);
    }
}

/// Execute one task: decode (or hit the cache), populate, deliver.
///
/// A task cancelled while executing still populates the cache with the
/// finished result, but its callback is skipped and no loaded event fires.
pub(crate) fn process_task(inner: &Arc<LoaderInner>, task: LoadTask, token: &CancellationToken) {
    let started = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| load_and_cache(inner, &task)));

    match outcome {
        Ok(Ok((image, pixmap, from_cache))) => {
            if token.is_cancelled() {
                log::debug!(
                    "discarding result of cancelled load {}",
                    task.path.display()
                );
            } else {
                if let Some(callback) = &task.callback {
                    callback(&task.path, &image, &pixmap, &task.metadata);
                }
                inner.events.emit_loaded(&task.path, &image, &pixmap);
                emit_batch_progress(inner, &task);
                inner.note_loaded(started.elapsed(), from_cache);
            }
            inner.finish_task(&task.path, token.is_cancelled());
        }
        Ok(Err(err)) => {
            if err.is_retryable() && task.retry_count < task.max_retries {
                inner.retry(task);
            } else {
                inner.note_failed();
                inner.events.emit_failed(&task.path, &err);
                inner.finish_task(&task.path, false);
            }
        }
        Err(_) => {
            // A panic inside decode is converted into a failure event so the
            // worker thread survives.
            let err = LoadError::DecodeFailed("worker panicked during decode".to_string());
            inner.note_failed();
            inner.events.emit_failed(&task.path, &err);
            inner.finish_task(&task.path, false);
        }
    }
}

type LoadOutcome = Result<(Arc<DynamicImage>, Arc<Pixmap>, bool), LoadError>;

fn load_and_cache(inner: &Arc<LoaderInner>, task: &LoadTask) -> LoadOutcome {
    // Fast exit: another task (or the fast path) may have filled the cache
    // while this one waited in the queue.
    if let Some((image, pixmap)) = inner.cache.get(&task.path) {
        return Ok((image, pixmap, true));
    }

    log::debug!("decoding {}", task.path.display());
    let image = image::open(&task.path).map_err(|e| LoadError::DecodeFailed(e.to_string()))?;
    let image = Arc::new(image);
    let pixmap = Arc::new(build_pixmap(inner, &image));

    inner.cache.put(&task.path, image.clone(), pixmap.clone());
    if task.metadata.preload {
        inner.cache.record_preload();
    }

    Ok((image, pixmap, false))
}

/// Build the presentable form, capping its dimensions when configured.
/// The decoded image keeps full resolution.
fn build_pixmap(inner: &Arc<LoaderInner>, image: &DynamicImage) -> Pixmap {
    let rgba = match inner.config.max_decode_dimension {
        Some(max) if image.width() > max || image.height() > max => {
            image.resize(max, max, FilterType::Triangle).to_rgba8()
        }
        _ => image.to_rgba8(),
    };
    let (width, height) = rgba.dimensions();

    let raw = rgba.as_raw();
    let mut pixels = inner.cache.buffer_pool().acquire(raw.len());
    pixels.extend_from_slice(raw);
    Pixmap::from_rgba8(pixels, width, height)
}

fn emit_batch_progress(inner: &Arc<LoaderInner>, task: &LoadTask) {
    let (Some(index), Some(size)) = (task.metadata.batch_index, task.metadata.batch_size) else {
        return;
    };
    if size == 0 {
        return;
    }
    let percent = (((index + 1) * 100) / size).min(100) as u8;
    let label = task
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    inner.events.emit_progress(&label, percent);
}
