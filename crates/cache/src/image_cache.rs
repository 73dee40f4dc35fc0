//! Image cache with LRU eviction and content-change invalidation
//!
//! Provides in-memory caching of decoded images keyed by file path, with
//! automatic eviction when either the entry-count bound or the aggregate
//! byte budget is exceeded. Cached entries carry a fingerprint of the source
//! file (modification time + size) that is re-checked on every lookup, so a
//! file changed on disk is never served stale.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime};

use annotator_memory::BufferPool;
use image::{DynamicImage, GenericImageView};

use crate::config::CacheConfig;

/// Presentable form of a decoded image: tightly packed RGBA8 pixels ready
/// for upload to the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    /// Raw pixel data (RGBA format)
    pub pixels: Vec<u8>,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl Pixmap {
    /// Create a pixmap from raw RGBA8 bytes.
    pub fn from_rgba8(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Get the memory size of this pixmap in bytes.
    pub fn memory_size(&self) -> usize {
        self.pixels.len()
    }

    /// Consume the pixmap, returning its pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// Fingerprint of a file on disk, used to detect that a cached image no
/// longer matches its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

impl Fingerprint {
    /// Capture the fingerprint of the file at `path`.
    pub fn capture(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified()?,
            len: meta.len(),
        })
    }

    /// Size of the fingerprinted file in bytes.
    pub fn file_len(&self) -> u64 {
        self.len
    }
}

/// Statistics about cache usage
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries currently in cache
    pub items: usize,

    /// Total bytes accounted to cached entries (source file sizes)
    pub memory_bytes: u64,

    /// Byte budget
    pub max_memory_bytes: u64,

    /// Entry-count bound
    pub max_items: usize,

    /// Number of cache hits
    pub hits: u64,

    /// Number of cache misses
    pub misses: u64,

    /// Number of entries evicted (capacity pressure or invalidation)
    pub evictions: u64,

    /// Number of entries populated by preload tasks
    pub preloaded: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Accounted memory in megabytes.
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// A cached decoded image plus bookkeeping.
struct CacheEntry {
    image: Arc<DynamicImage>,
    pixmap: Arc<Pixmap>,
    file_size: u64,
    fingerprint: Fingerprint,
    last_access: Instant,
    access_count: u64,
}

/// Internal cache state
struct CacheState {
    /// Map from path to cached entry
    entries: HashMap<PathBuf, CacheEntry>,

    /// Recency queue (most recently used at back, least recently used at front)
    recency: VecDeque<PathBuf>,

    /// Current accounted byte total
    memory_used: u64,

    max_memory_bytes: u64,
    max_items: usize,

    hits: u64,
    misses: u64,
    evictions: u64,
    preloaded: u64,
}

impl CacheState {
    fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            recency: VecDeque::new(),
            memory_used: 0,
            max_memory_bytes: config.max_memory_bytes,
            max_items: config.max_items,
            hits: 0,
            misses: 0,
            evictions: 0,
            preloaded: 0,
        }
    }

    /// Move a path to the back of the recency queue (mark as most recently used)
    fn touch(&mut self, path: &Path) {
        self.recency.retain(|p| p != path);
        self.recency.push_back(path.to_path_buf());
    }

    /// Remove one entry, recycling its pixel buffer when uniquely owned.
    fn remove_entry(&mut self, path: &Path, pool: &BufferPool) -> bool {
        let Some(entry) = self.entries.remove(path) else {
            return false;
        };
        log::debug!(
            "dropping {} ({} accesses, idle {:?})",
            path.display(),
            entry.access_count,
            entry.last_access.elapsed()
        );
        self.recency.retain(|p| p != path);
        self.memory_used = self.memory_used.saturating_sub(entry.file_size);
        self.evictions += 1;
        if let Ok(pixmap) = Arc::try_unwrap(entry.pixmap) {
            pool.release(pixmap.into_pixels());
        }
        true
    }

    /// Evict the least recently used entry
    fn evict_lru(&mut self, pool: &BufferPool) -> bool {
        let Some(path) = self.recency.front().cloned() else {
            return false;
        };
        self.remove_entry(&path, pool)
    }

    /// Evict from the LRU end until both bounds hold.
    ///
    /// The cache always keeps at least one entry under the byte budget so a
    /// single oversized image cannot livelock insertion.
    fn enforce_bounds(&mut self, pool: &BufferPool) {
        while self.entries.len() > self.max_items {
            if !self.evict_lru(pool) {
                break;
            }
        }
        while self.memory_used > self.max_memory_bytes && self.entries.len() > 1 {
            if !self.evict_lru(pool) {
                break;
            }
        }
    }
}

/// Image cache with dual-constraint LRU eviction.
///
/// Thread-safe cache of decoded-image/pixmap pairs keyed by file path.
/// Lookups validate the entry's fingerprint against the file on disk; a
/// mismatch evicts the stale entry and reports a miss, forcing a re-decode.
/// Both the entry-count bound and the byte budget are restored after every
/// mutating operation by evicting from the least-recently-used end.
///
/// Callers receive `Arc` references to the cached buffers; an entry evicted
/// later does not invalidate references already handed out.
///
/// # Example
///
/// ```no_run
/// use annotator_cache::{CacheConfig, ImageCache, Pixmap};
/// use annotator_memory::BufferPool;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let pool = Arc::new(BufferPool::new(20));
/// let cache = ImageCache::new(CacheConfig::default(), pool);
///
/// let path = Path::new("photos/0001.jpg");
/// let decoded = Arc::new(image::open(path).unwrap());
/// let rgba = decoded.to_rgba8();
/// let (width, height) = rgba.dimensions();
/// let pixmap = Arc::new(Pixmap::from_rgba8(rgba.into_raw(), width, height));
///
/// cache.put(path, decoded, pixmap);
/// assert!(cache.get(path).is_some());
/// ```
pub struct ImageCache {
    state: Mutex<CacheState>,
    pool: Arc<BufferPool>,
}

impl ImageCache {
    /// Create a cache with the given bounds, recycling evicted pixel
    /// buffers through `pool`.
    pub fn new(config: CacheConfig, pool: Arc<BufferPool>) -> Self {
        Self {
            state: Mutex::new(CacheState::new(config)),
            pool,
        }
    }

    /// Look up a cached image.
    ///
    /// Validates the entry's fingerprint against the file's current
    /// modification time and size. On a match the entry is promoted to most
    /// recently used and both buffers are returned; on a mismatch (or an
    /// unreadable file) the stale entry is evicted and the lookup is a miss.
    pub fn get(&self, path: &Path) -> Option<(Arc<DynamicImage>, Arc<Pixmap>)> {
        // Fingerprint capture touches the filesystem; do it outside the lock.
        let current = Fingerprint::capture(path);

        let mut state = self.state.lock().unwrap();
        let cached = state.entries.get(path).map(|e| e.fingerprint);
        match (cached, current) {
            (Some(fingerprint), Ok(fp)) if fingerprint == fp => {
                state.touch(path);
                state.hits += 1;
                state.entries.get_mut(path).map(|entry| {
                    entry.last_access = Instant::now();
                    entry.access_count += 1;
                    (entry.image.clone(), entry.pixmap.clone())
                })
            }
            (Some(_), _) => {
                // File changed (or vanished) since it was cached.
                log::debug!("stale cache entry for {}", path.display());
                state.remove_entry(path, &self.pool);
                state.misses += 1;
                None
            }
            (None, _) => {
                state.misses += 1;
                None
            }
        }
    }

    /// Insert a decoded image.
    ///
    /// No-op if the image is empty or the file no longer exists. Replaces
    /// any existing entry for the path, inserts at the most-recently-used
    /// end, then evicts from the least-recently-used end until both bounds
    /// hold (or a single entry remains).
    pub fn put(&self, path: &Path, image: Arc<DynamicImage>, pixmap: Arc<Pixmap>) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let Ok(fingerprint) = Fingerprint::capture(path) else {
            return;
        };
        let file_size = fingerprint.file_len();

        let entry = CacheEntry {
            image,
            pixmap,
            file_size,
            fingerprint,
            last_access: Instant::now(),
            access_count: 1,
        };

        let mut state = self.state.lock().unwrap();
        if let Some(old) = state.entries.remove(path) {
            // Replacing in place: swap accounting without counting an eviction.
            state.memory_used = state.memory_used.saturating_sub(old.file_size);
            state.recency.retain(|p| p != path);
        }

        state.entries.insert(path.to_path_buf(), entry);
        state.memory_used += file_size;
        state.touch(path);
        state.enforce_bounds(&self.pool);
    }

    /// Presence check without promoting recency or touching counters.
    pub fn is_cached(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.entries.contains_key(path)
    }

    /// Remove a single entry. Returns whether it was present.
    pub fn remove(&self, path: &Path) -> bool {
        let mut state = self.state.lock().unwrap();
        state.remove_entry(path, &self.pool)
    }

    /// Empty the cache and reset the byte total.
    ///
    /// Hit/miss counters are lifetime statistics and survive a clear.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        let dropped = state.entries.len() as u64;
        state.entries.clear();
        state.recency.clear();
        state.memory_used = 0;
        state.evictions += dropped;
    }

    /// Evict until both bounds hold, returning the bytes freed.
    ///
    /// Used by the non-emergency memory-pressure path; a cache already
    /// within bounds frees nothing.
    pub fn trim_to_bounds(&self) -> u64 {
        let mut state = self.state.lock().unwrap();
        let before = state.memory_used;
        state.enforce_bounds(&self.pool);
        before.saturating_sub(state.memory_used)
    }

    /// Adjust the byte budget (megabytes) and immediately re-run eviction.
    pub fn set_memory_limit(&self, mb: u64) {
        let mut state = self.state.lock().unwrap();
        state.max_memory_bytes = mb * 1024 * 1024;
        state.enforce_bounds(&self.pool);
    }

    /// Adjust the entry-count bound and immediately re-run eviction.
    pub fn set_max_items(&self, items: usize) {
        let mut state = self.state.lock().unwrap();
        state.max_items = items;
        state.enforce_bounds(&self.pool);
    }

    /// Record that a preload task populated the cache.
    pub fn record_preload(&self) {
        let mut state = self.state.lock().unwrap();
        state.preloaded += 1;
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current accounted byte total.
    pub fn memory_used(&self) -> u64 {
        let state = self.state.lock().unwrap();
        state.memory_used
    }

    /// The pool evicted pixel buffers are recycled into.
    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Get current cache statistics
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap();
        CacheStats {
            items: state.entries.len(),
            memory_bytes: state.memory_used,
            max_memory_bytes: state.max_memory_bytes,
            max_items: state.max_items,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            preloaded: state.preloaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Write a fixture file of `size` bytes and return its path.
    fn fixture(dir: &TempDir, name: &str, size: usize) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, vec![0xABu8; size]).unwrap();
        path
    }

    fn dummy_entry() -> (Arc<DynamicImage>, Arc<Pixmap>) {
        let image = Arc::new(DynamicImage::new_rgba8(2, 2));
        let pixmap = Arc::new(Pixmap::from_rgba8(vec![0u8; 16], 2, 2));
        (image, pixmap)
    }

    fn test_cache(max_memory_bytes: u64, max_items: usize) -> ImageCache {
        let config = CacheConfig {
            max_memory_bytes,
            max_items,
        };
        ImageCache::new(config, Arc::new(BufferPool::new(8)))
    }

    #[test]
    fn test_put_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image.clone(), pixmap.clone());

        let (got_image, got_pixmap) = cache.get(&path).expect("entry should be cached");
        assert!(Arc::ptr_eq(&image, &got_image));
        assert!(Arc::ptr_eq(&pixmap, &got_pixmap));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.memory_bytes, 1024);
    }

    #[test]
    fn test_miss_on_absent_key() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        assert!(cache.get(&path).is_none());
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_bounds_hold_after_every_put() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(4 * 1024, 3);

        for i in 0..10 {
            let path = fixture(&dir, &format!("img_{i}.jpg"), 1024);
            let (image, pixmap) = dummy_entry();
            cache.put(&path, image, pixmap);

            let stats = cache.stats();
            let within = stats.items <= 3 && stats.memory_bytes <= 4 * 1024;
            assert!(within || stats.items == 1, "bounds violated at put {i}");
        }
    }

    #[test]
    fn test_eviction_removes_least_recently_used() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(1024 * 1024, 3);

        let a = fixture(&dir, "a.jpg", 1024);
        let b = fixture(&dir, "b.jpg", 1024);
        let c = fixture(&dir, "c.jpg", 1024);
        let d = fixture(&dir, "d.jpg", 1024);

        for path in [&a, &b, &c] {
            let (image, pixmap) = dummy_entry();
            cache.put(path, image, pixmap);
        }
        let (image, pixmap) = dummy_entry();
        cache.put(&d, image, pixmap);

        assert!(!cache.is_cached(&a), "a was least recently used");
        assert!(cache.is_cached(&b));
        assert!(cache.is_cached(&c));
        assert!(cache.is_cached(&d));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_promotes_recency() {
        // After put(a), put(b), put(c), put(d): cache is {b, c, d}.
        // get(b) promotes b; put(e) must then evict c.
        let dir = TempDir::new().unwrap();
        let cache = test_cache(1024 * 1024, 3);

        let paths: Vec<PathBuf> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| fixture(&dir, &format!("{n}.jpg"), 1024))
            .collect();
        for path in &paths {
            let (image, pixmap) = dummy_entry();
            cache.put(path, image, pixmap);
        }

        assert!(cache.get(&paths[1]).is_some()); // promote b

        let e = fixture(&dir, "e.jpg", 1024);
        let (image, pixmap) = dummy_entry();
        cache.put(&e, image, pixmap);

        assert!(!cache.is_cached(&paths[2]), "c was least recently used");
        assert!(cache.is_cached(&paths[3])); // d
        assert!(cache.is_cached(&paths[1])); // b
        assert!(cache.is_cached(&e));
    }

    #[test]
    fn test_single_oversized_entry_is_kept() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(1024, 10);
        let path = fixture(&dir, "huge.jpg", 10 * 1024);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);

        // Over budget, but the sole entry must survive.
        assert!(cache.is_cached(&path));
        assert_eq!(cache.len(), 1);
        assert!(cache.memory_used() > 1024);

        // A second entry tips the balance: the older oversized one goes.
        let small = fixture(&dir, "small.jpg", 256);
        let (image, pixmap) = dummy_entry();
        cache.put(&small, image, pixmap);
        assert!(!cache.is_cached(&path));
        assert!(cache.is_cached(&small));
    }

    #[test]
    fn test_changed_file_invalidates_entry() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);
        assert!(cache.get(&path).is_some());

        // Rewrite with a different size: fingerprint no longer matches.
        fs::write(&path, vec![0xCDu8; 2048]).unwrap();

        assert!(cache.get(&path).is_none());
        assert!(!cache.is_cached(&path));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);

        // A fresh put of the new content is served again.
        let (image, pixmap) = dummy_entry();
        cache.put(&path, image.clone(), pixmap);
        let (got, _) = cache.get(&path).unwrap();
        assert!(Arc::ptr_eq(&image, &got));
    }

    #[test]
    fn test_deleted_file_invalidates_entry() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);
        fs::remove_file(&path).unwrap();

        assert!(cache.get(&path).is_none());
        assert!(!cache.is_cached(&path));
    }

    #[test]
    fn test_repeated_hits_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);

        for _ in 0..5 {
            assert!(cache.get(&path).is_some());
        }

        let stats = cache.stats();
        assert_eq!(stats.hits, 5);
        assert_eq!(stats.misses, 0);
        assert!((stats.hit_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_put_on_missing_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never_written.jpg");
        let cache = test_cache(1024 * 1024, 10);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);

        assert!(cache.is_empty());
        assert_eq!(cache.memory_used(), 0);
    }

    #[test]
    fn test_put_of_empty_image_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        let image = Arc::new(DynamicImage::new_rgba8(0, 0));
        let pixmap = Arc::new(Pixmap::from_rgba8(Vec::new(), 0, 0));
        cache.put(&path, image, pixmap);

        assert!(cache.is_empty());
    }

    #[test]
    fn test_replacement_accounts_once() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);
        let (image2, pixmap2) = dummy_entry();
        cache.put(&path, image2.clone(), pixmap2);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_used(), 1024);
        assert_eq!(cache.stats().evictions, 0);

        let (got, _) = cache.get(&path).unwrap();
        assert!(Arc::ptr_eq(&image2, &got));
    }

    #[test]
    fn test_clear_preserves_lifetime_counters() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "a.jpg", 1024);
        let cache = test_cache(1024 * 1024, 10);

        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);
        let _ = cache.get(&path);
        let _ = cache.get(Path::new("/nonexistent.jpg"));

        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.items, 0);
        assert_eq!(stats.memory_bytes, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_set_max_items_evicts_immediately() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(1024 * 1024, 10);

        for i in 0..5 {
            let path = fixture(&dir, &format!("img_{i}.jpg"), 1024);
            let (image, pixmap) = dummy_entry();
            cache.put(&path, image, pixmap);
        }
        assert_eq!(cache.len(), 5);

        cache.set_max_items(2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_set_memory_limit_evicts_immediately() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(10 * 1024 * 1024, 10);

        for i in 0..4 {
            // 1 MiB each
            let path = fixture(&dir, &format!("img_{i}.jpg"), 1024 * 1024);
            let (image, pixmap) = dummy_entry();
            cache.put(&path, image, pixmap);
        }
        assert_eq!(cache.len(), 4);

        cache.set_memory_limit(2);
        assert!(cache.memory_used() <= 2 * 1024 * 1024);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_trim_to_bounds_reports_freed_bytes() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(1024 * 1024, 10);

        let path = fixture(&dir, "a.jpg", 1024);
        let (image, pixmap) = dummy_entry();
        cache.put(&path, image, pixmap);

        // Within bounds: nothing to free.
        assert_eq!(cache.trim_to_bounds(), 0);

        // Shrink the budget under the entry count bound and trim.
        {
            let mut state = cache.state.lock().unwrap();
            state.max_items = 0;
        }
        let freed = cache.trim_to_bounds();
        assert_eq!(freed, 1024);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicted_pixmap_buffer_is_recycled() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(1024 * 1024, 1);

        let a = fixture(&dir, "a.jpg", 1024);
        let b = fixture(&dir, "b.jpg", 1024);

        let image = Arc::new(DynamicImage::new_rgba8(2, 2));
        let pixmap = Arc::new(Pixmap::from_rgba8(vec![0u8; 16], 2, 2));
        cache.put(&a, image, pixmap); // cache holds the only pixmap Arc

        assert_eq!(cache.buffer_pool().pooled(), 0);
        let (image, pixmap) = dummy_entry();
        cache.put(&b, image, pixmap); // evicts a

        assert_eq!(cache.buffer_pool().pooled(), 1);
    }

    #[test]
    fn test_record_preload() {
        let cache = test_cache(1024 * 1024, 10);
        cache.record_preload();
        cache.record_preload();
        assert_eq!(cache.stats().preloaded, 2);
    }

    #[test]
    fn test_hit_rate_zero_without_requests() {
        let cache = test_cache(1024 * 1024, 10);
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }
}
