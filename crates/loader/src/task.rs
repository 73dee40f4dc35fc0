//! Load tasks and the priority queue feeding the worker pool
//!
//! Tasks compare by priority only (lower value = more urgent); ties are
//! broken by a monotonically increasing sequence number so tasks of equal
//! priority are serviced in submission order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use annotator_cache::Pixmap;
use image::DynamicImage;

/// Unique task identifier
pub type TaskId = u64;

/// Priority band for foreground "show this now" requests.
pub const PRIORITY_FOREGROUND: i32 = 0;

/// Priority band for speculative preloads. Numerically above every
/// foreground request, so foreground work always preempts preloads in the
/// pending queue.
pub const PRIORITY_PRELOAD: i32 = 100;

/// Per-task completion callback.
///
/// Invoked with the path, decoded image, presentable pixmap, and the task's
/// metadata. Runs on the worker thread (or synchronously on the submitting
/// thread for cache hits) and must not block.
pub type LoadCallback =
    Arc<dyn Fn(&Path, &Arc<DynamicImage>, &Arc<Pixmap>, &TaskMetadata) + Send + Sync>;

/// Typed metadata attached to a load task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskMetadata {
    /// Position of this path within its batch, if batched.
    pub batch_index: Option<usize>,

    /// Size of the batch this path belongs to, if batched.
    pub batch_size: Option<usize>,

    /// Whether this task came from the preload window.
    pub preload: bool,
}

/// A queued image load.
pub struct LoadTask {
    /// Unique task identifier
    pub id: TaskId,

    /// Path of the image to load
    pub path: PathBuf,

    /// Priority (lower = more urgent)
    pub priority: i32,

    /// Retries consumed so far
    pub retry_count: u32,

    /// Retry budget for transient decode failures
    pub max_retries: u32,

    /// Caller-supplied metadata
    pub metadata: TaskMetadata,

    /// When the task entered the queue
    pub submitted_at: Instant,

    /// Completion callback, if any
    pub callback: Option<LoadCallback>,

    /// Submission order (FIFO tie-break within a priority)
    seq: u64,
}

impl fmt::Debug for LoadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTask")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("priority", &self.priority)
            .field("retry_count", &self.retry_count)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl PartialEq for LoadTask {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LoadTask {}

impl PartialOrd for LoadTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LoadTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert both comparisons so the task
        // with the lowest priority value (and earliest seq) surfaces first.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of pending loads.
///
/// Thread-safe; tasks are popped lowest-priority-value first, FIFO within a
/// priority level.
pub struct TaskQueue {
    state: Mutex<QueueState>,
}

struct QueueState {
    heap: BinaryHeap<LoadTask>,
    next_task_id: TaskId,
    next_seq: u64,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                next_task_id: 1,
                next_seq: 0,
            }),
        }
    }

    /// Enqueue a new task and return its assigned id.
    pub fn push(
        &self,
        path: &Path,
        priority: i32,
        metadata: TaskMetadata,
        callback: Option<LoadCallback>,
        max_retries: u32,
    ) -> TaskId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_task_id;
        state.next_task_id += 1;
        let seq = state.next_seq;
        state.next_seq += 1;

        state.heap.push(LoadTask {
            id,
            path: path.to_path_buf(),
            priority,
            retry_count: 0,
            max_retries,
            metadata,
            submitted_at: Instant::now(),
            callback,
            seq,
        });
        id
    }

    /// Re-enqueue a task (retry path). Keeps its id and priority; the task
    /// joins the back of its priority band.
    pub(crate) fn requeue(&self, mut task: LoadTask) {
        let mut state = self.state.lock().unwrap();
        task.seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(task);
    }

    /// Pop the most urgent task, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<LoadTask> {
        let mut state = self.state.lock().unwrap();
        state.heap.pop()
    }

    /// Remove the pending task for `path`, if one is queued.
    pub fn remove_path(&self, path: &Path) -> Option<LoadTask> {
        let mut state = self.state.lock().unwrap();
        let mut removed = None;
        let mut remaining = Vec::with_capacity(state.heap.len());
        while let Some(task) = state.heap.pop() {
            if removed.is_none() && task.path == path {
                removed = Some(task);
            } else {
                remaining.push(task);
            }
        }
        state.heap = remaining.into_iter().collect();
        removed
    }

    /// Remove and return every pending task.
    pub fn drain(&self) -> Vec<LoadTask> {
        let mut state = self.state.lock().unwrap();
        let mut drained = Vec::with_capacity(state.heap.len());
        while let Some(task) = state.heap.pop() {
            drained.push(task);
        }
        drained
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
