//! Cancellation tokens for in-flight loads
//!
//! Cancellation is cooperative: workers check the token once before starting
//! a decode and once before delivering the result. A task canceled mid-decode
//! runs to completion but its result is not delivered.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

/// Cancellation token shared between the loader and a worker.
///
/// All clones observe the same cancellation state.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this token. Idempotent; all clones observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether `cancel()` has been called on this token or any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry associating in-flight paths with their cancellation tokens.
pub struct CancellationRegistry {
    tokens: Mutex<HashMap<PathBuf, CancellationToken>>,
}

impl CancellationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Register a path and return its fresh token.
    pub fn register(&self, path: &Path) -> CancellationToken {
        let token = CancellationToken::new();
        let mut tokens = self.tokens.lock().unwrap();
        tokens.insert(path.to_path_buf(), token.clone());
        token
    }

    /// Cancel the token for a path. Returns whether the path was registered.
    pub fn cancel(&self, path: &Path) -> bool {
        let tokens = self.tokens.lock().unwrap();
        if let Some(token) = tokens.get(path) {
            token.cancel();
            true
        } else {
            false
        }
    }

    /// Cancel every registered token. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let tokens = self.tokens.lock().unwrap();
        for token in tokens.values() {
            token.cancel();
        }
        tokens.len()
    }

    /// Remove a path from the registry (task completed or was dropped).
    pub fn unregister(&self, path: &Path) -> bool {
        let mut tokens = self.tokens.lock().unwrap();
        tokens.remove(path).is_some()
    }

    /// Get the token for a path, if registered.
    pub fn get(&self, path: &Path) -> Option<CancellationToken> {
        let tokens = self.tokens.lock().unwrap();
        tokens.get(path).cloned()
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        let tokens = self.tokens.lock().unwrap();
        tokens.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CancellationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
