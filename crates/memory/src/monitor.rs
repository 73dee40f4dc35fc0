//! Background memory monitor with graduated cleanup.
//!
//! The monitor samples process memory on a fixed interval, classifies the
//! resident size against warning/critical thresholds, and drives registered
//! cleanup callbacks with an escalating emergency flag. It knows nothing
//! about what a callback frees; it only sums the megabytes each one reports.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::stats::{MemorySampler, MemoryStats, SysinfoSampler};

/// Cleanup callback invoked on threshold crossings.
///
/// Receives `emergency = true` on the critical path (callbacks are expected
/// to free unconditionally rather than trim to bounds) and returns an
/// estimate of megabytes freed.
pub type CleanupCallback = Arc<dyn Fn(bool) -> u64 + Send + Sync>;

/// Reclaim hook invoked on low-priority reclaim passes.
///
/// Returns the number of bytes released back to the allocator.
pub type ReclaimHook = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Handle for unregistering a callback or hook.
pub type CallbackId = u64;

type MessageHandler = Arc<dyn Fn(&str) + Send + Sync>;
type FreedHandler = Arc<dyn Fn(u64) + Send + Sync>;

/// Configuration for the memory monitor.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Resident size that triggers the warning path (megabytes).
    pub warning_threshold_mb: u64,

    /// Resident size that triggers the critical path (megabytes).
    pub critical_threshold_mb: u64,

    /// How often the background thread takes a sample.
    pub poll_interval: Duration,

    /// Minimum spacing between consecutive threshold evaluations.
    /// Samples arriving sooner only update the running statistics.
    pub eval_spacing: Duration,

    /// Interval of the unconditional low-priority reclaim pass.
    pub reclaim_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            warning_threshold_mb: 800,
            critical_threshold_mb: 1200,
            poll_interval: Duration::from_secs(1),
            eval_spacing: Duration::from_secs(5),
            reclaim_interval: Duration::from_secs(30),
        }
    }
}

impl MonitorConfig {
    /// Set the warning and critical thresholds in megabytes.
    pub fn with_thresholds(mut self, warning_mb: u64, critical_mb: u64) -> Self {
        self.warning_threshold_mb = warning_mb;
        self.critical_threshold_mb = critical_mb;
        self
    }

    /// Set the sampling interval of the background thread.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the minimum spacing between threshold evaluations.
    pub fn with_eval_spacing(mut self, spacing: Duration) -> Self {
        self.eval_spacing = spacing;
        self
    }

    /// Set the interval of the periodic reclaim pass.
    pub fn with_reclaim_interval(mut self, interval: Duration) -> Self {
        self.reclaim_interval = interval;
        self
    }
}

/// Classification of the current resident size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemoryLevel {
    /// Below the warning threshold.
    #[default]
    Normal,
    /// At or above the warning threshold.
    Warning,
    /// At or above the critical threshold.
    Critical,
}

impl MemoryLevel {
    fn classify(resident_mb: u64, config: &MonitorConfig) -> Self {
        if resident_mb >= config.critical_threshold_mb {
            MemoryLevel::Critical
        } else if resident_mb >= config.warning_threshold_mb {
            MemoryLevel::Warning
        } else {
            MemoryLevel::Normal
        }
    }
}

/// Lifetime statistics of the monitor.
#[derive(Debug, Clone, Default)]
pub struct MonitorStats {
    /// Current memory level.
    pub level: MemoryLevel,

    /// Most recent sample.
    pub last_sample: MemoryStats,

    /// Highest resident size observed (megabytes).
    pub peak_resident_mb: u64,

    /// Total megabytes reported freed by cleanup callbacks and reclaim passes.
    pub memory_freed_mb: u64,

    /// Total cleanup-callback invocations.
    pub cleanup_invocations: u64,

    /// Total reclaim passes run.
    pub reclaim_passes: u64,
}

struct MonitorState {
    config: MonitorConfig,
    level: MemoryLevel,
    last_eval: Option<Instant>,
    stats: MonitorStats,
}

#[derive(Default)]
struct Registry {
    next_id: CallbackId,
    cleanup: Vec<(CallbackId, CleanupCallback)>,
    reclaim: Vec<(CallbackId, ReclaimHook)>,
    on_warning: Vec<MessageHandler>,
    on_critical: Vec<MessageHandler>,
    on_freed: Vec<FreedHandler>,
}

struct MonitorInner {
    state: Mutex<MonitorState>,
    registry: Mutex<Registry>,
    emergency: AtomicBool,
}

enum Crossing {
    Warning,
    Critical,
}

impl MonitorInner {
    /// Feed one sample through the threshold state machine.
    ///
    /// Crossings are edge-triggered: callbacks fire once per upward crossing
    /// and re-arm only after usage drops below the warning threshold.
    fn evaluate(&self, sample: MemoryStats) {
        let crossing = {
            let mut state = self.state.lock().unwrap();
            state.stats.last_sample = sample;
            if sample.resident_mb() > state.stats.peak_resident_mb {
                state.stats.peak_resident_mb = sample.resident_mb();
            }

            let now = Instant::now();
            if let Some(last) = state.last_eval {
                if now.duration_since(last) < state.config.eval_spacing {
                    return;
                }
            }
            state.last_eval = Some(now);

            let level = MemoryLevel::classify(sample.resident_mb(), &state.config);
            let previous = state.level;
            state.level = level;
            state.stats.level = level;

            match (previous, level) {
                (prev, MemoryLevel::Critical) if prev != MemoryLevel::Critical => {
                    Some(Crossing::Critical)
                }
                (MemoryLevel::Normal, MemoryLevel::Warning) => Some(Crossing::Warning),
                _ => None,
            }
        };

        match crossing {
            Some(Crossing::Warning) => self.handle_warning(sample),
            Some(Crossing::Critical) => self.handle_critical(sample),
            None => {}
        }
    }

    fn handle_warning(&self, sample: MemoryStats) {
        let message = format!("Memory usage high: {} MB resident", sample.resident_mb());
        log::warn!("{}", message);
        self.emit_message(|r| &r.on_warning, &message);

        let mut freed_mb = self.run_cleanup(false);
        freed_mb += self.reclaim_pass();
        self.record_freed(freed_mb);
    }

    fn handle_critical(&self, sample: MemoryStats) {
        let message = format!(
            "Critical memory usage: {} MB resident",
            sample.resident_mb()
        );
        log::error!("{}", message);
        self.emit_message(|r| &r.on_critical, &message);

        let freed_mb = self.emergency_cleanup();
        self.record_freed(freed_mb);
    }

    /// The full critical path: emergency callbacks plus three reclaim passes.
    fn emergency_cleanup(&self) -> u64 {
        self.emergency.store(true, Ordering::Release);
        let mut freed_mb = self.run_cleanup(true);
        for _ in 0..3 {
            freed_mb += self.reclaim_pass();
        }
        self.emergency.store(false, Ordering::Release);
        freed_mb
    }

    /// Invoke every cleanup callback, isolating panics, and sum the
    /// megabytes they report freed.
    fn run_cleanup(&self, emergency: bool) -> u64 {
        let callbacks: Vec<CleanupCallback> = {
            let registry = self.registry.lock().unwrap();
            registry.cleanup.iter().map(|(_, cb)| cb.clone()).collect()
        };

        let mut freed_mb = 0u64;
        let mut invoked = 0u64;
        for callback in callbacks {
            invoked += 1;
            match catch_unwind(AssertUnwindSafe(|| callback(emergency))) {
                Ok(mb) => freed_mb += mb,
                Err(_) => log::warn!("memory cleanup callback panicked; continuing"),
            }
        }

        let mut state = self.state.lock().unwrap();
        state.stats.cleanup_invocations += invoked;
        freed_mb
    }

    /// Run one reclaim pass over all registered hooks, returning megabytes freed.
    fn reclaim_pass(&self) -> u64 {
        let hooks: Vec<ReclaimHook> = {
            let registry = self.registry.lock().unwrap();
            registry.reclaim.iter().map(|(_, h)| h.clone()).collect()
        };

        let mut freed_bytes = 0u64;
        for hook in hooks {
            match catch_unwind(AssertUnwindSafe(|| hook())) {
                Ok(bytes) => freed_bytes += bytes,
                Err(_) => log::warn!("memory reclaim hook panicked; continuing"),
            }
        }

        let mut state = self.state.lock().unwrap();
        state.stats.reclaim_passes += 1;
        freed_bytes / (1024 * 1024)
    }

    fn record_freed(&self, freed_mb: u64) {
        if freed_mb == 0 {
            return;
        }
        {
            let mut state = self.state.lock().unwrap();
            state.stats.memory_freed_mb += freed_mb;
        }
        log::info!("memory cleanup freed ~{} MB", freed_mb);
        let handlers: Vec<FreedHandler> = {
            let registry = self.registry.lock().unwrap();
            registry.on_freed.clone()
        };
        for handler in handlers {
            handler(freed_mb);
        }
    }

    fn emit_message<F>(&self, select: F, message: &str)
    where
        F: Fn(&Registry) -> &Vec<MessageHandler>,
    {
        let handlers: Vec<MessageHandler> = {
            let registry = self.registry.lock().unwrap();
            select(&registry).clone()
        };
        for handler in handlers {
            handler(message);
        }
    }
}

/// Background memory monitor.
///
/// Construct with [`MemoryMonitor::new`], register cleanup targets, then
/// [`start`](MemoryMonitor::start) the polling thread. All notification
/// handlers run synchronously on whichever thread produced the event and
/// must not block.
///
/// # Example
///
/// ```
/// use annotator_memory::{MemoryMonitor, MonitorConfig};
/// use std::sync::Arc;
///
/// let monitor = MemoryMonitor::new(MonitorConfig::default());
/// let id = monitor.register_cleanup_callback(Arc::new(|emergency| {
///     if emergency { 100 } else { 10 }
/// }));
///
/// monitor.start();
/// // ...
/// monitor.unregister_cleanup_callback(id);
/// monitor.stop();
/// ```
pub struct MemoryMonitor {
    inner: Arc<MonitorInner>,
    shutdown: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryMonitor {
    /// Create a monitor. The polling thread is not started until
    /// [`start`](Self::start) is called.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                state: Mutex::new(MonitorState {
                    config,
                    level: MemoryLevel::Normal,
                    last_eval: None,
                    stats: MonitorStats::default(),
                }),
                registry: Mutex::new(Registry::default()),
                emergency: AtomicBool::new(false),
            }),
            shutdown: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
        }
    }

    /// Start the polling thread with the default `sysinfo` sampler.
    pub fn start(&self) {
        self.start_with_sampler(Box::new(SysinfoSampler::new()));
    }

    /// Start the polling thread with a custom sampler.
    ///
    /// Calling this while the monitor is already running is a no-op.
    pub fn start_with_sampler(&self, mut sampler: Box<dyn MemorySampler>) {
        let mut thread = self.thread.lock().unwrap();
        if thread.is_some() {
            return;
        }
        self.shutdown.store(false, Ordering::Release);

        let inner = self.inner.clone();
        let shutdown = self.shutdown.clone();
        let handle = thread::Builder::new()
            .name("annotator-memory-monitor".to_string())
            .spawn(move || {
                log::info!("memory monitor started");
                let mut last_reclaim = Instant::now();
                loop {
                    let (poll_interval, reclaim_interval) = {
                        let state = inner.state.lock().unwrap();
                        (state.config.poll_interval, state.config.reclaim_interval)
                    };

                    thread::sleep(poll_interval);
                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    inner.evaluate(sampler.sample());

                    if last_reclaim.elapsed() >= reclaim_interval {
                        last_reclaim = Instant::now();
                        let freed_mb = inner.reclaim_pass();
                        inner.record_freed(freed_mb);
                    }
                }
                log::info!("memory monitor stopped");
            })
            .expect("failed to spawn memory monitor thread");

        *thread = Some(handle);
    }

    /// Stop the polling thread and wait for it to exit. Idempotent.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
        let handle = self.thread.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Feed one sample through the threshold state machine.
    ///
    /// The polling thread calls this internally; exposing it lets callers
    /// (and tests) evaluate scripted samples without the timing of the
    /// background thread. Evaluations closer together than the configured
    /// spacing only update the running statistics.
    pub fn evaluate(&self, sample: MemoryStats) {
        self.inner.evaluate(sample);
    }

    /// Register a cleanup callback. Returns an id for unregistering.
    pub fn register_cleanup_callback(&self, callback: CleanupCallback) -> CallbackId {
        let mut registry = self.inner.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.cleanup.push((id, callback));
        id
    }

    /// Remove a previously registered cleanup callback.
    pub fn unregister_cleanup_callback(&self, id: CallbackId) -> bool {
        let mut registry = self.inner.registry.lock().unwrap();
        let before = registry.cleanup.len();
        registry.cleanup.retain(|(cb_id, _)| *cb_id != id);
        registry.cleanup.len() != before
    }

    /// Register a reclaim hook run on every reclaim pass.
    pub fn register_reclaim_hook(&self, hook: ReclaimHook) -> CallbackId {
        let mut registry = self.inner.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.reclaim.push((id, hook));
        id
    }

    /// Remove a previously registered reclaim hook.
    pub fn unregister_reclaim_hook(&self, id: CallbackId) -> bool {
        let mut registry = self.inner.registry.lock().unwrap();
        let before = registry.reclaim.len();
        registry.reclaim.retain(|(h_id, _)| *h_id != id);
        registry.reclaim.len() != before
    }

    /// Register a handler for warning-threshold events.
    pub fn on_warning(&self, handler: Arc<dyn Fn(&str) + Send + Sync>) {
        self.inner.registry.lock().unwrap().on_warning.push(handler);
    }

    /// Register a handler for critical-threshold events.
    pub fn on_critical(&self, handler: Arc<dyn Fn(&str) + Send + Sync>) {
        self.inner
            .registry
            .lock()
            .unwrap()
            .on_critical
            .push(handler);
    }

    /// Register a handler for memory-freed notifications (megabytes).
    pub fn on_freed(&self, handler: Arc<dyn Fn(u64) + Send + Sync>) {
        self.inner.registry.lock().unwrap().on_freed.push(handler);
    }

    /// Run the full critical-path cleanup synchronously on the calling
    /// thread, outside the polling cadence. Returns megabytes freed.
    pub fn force_cleanup(&self) -> u64 {
        let freed_mb = self.inner.emergency_cleanup();
        self.inner.record_freed(freed_mb);
        freed_mb
    }

    /// Adjust the warning/critical thresholds at runtime.
    pub fn set_thresholds(&self, warning_mb: u64, critical_mb: u64) {
        let mut state = self.inner.state.lock().unwrap();
        state.config.warning_threshold_mb = warning_mb;
        state.config.critical_threshold_mb = critical_mb;
    }

    /// Whether the emergency flag is currently set.
    pub fn is_emergency(&self) -> bool {
        self.inner.emergency.load(Ordering::Acquire)
    }

    /// Snapshot of the monitor's lifetime statistics.
    pub fn stats(&self) -> MonitorStats {
        let state = self.inner.state.lock().unwrap();
        state.stats.clone()
    }
}

impl Drop for MemoryMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mb(mb: u64) -> MemoryStats {
        MemoryStats {
            resident_bytes: mb * 1024 * 1024,
            virtual_bytes: 2 * mb * 1024 * 1024,
            percent_of_system: 0.0,
            available_bytes: 4096 * 1024 * 1024,
        }
    }

    fn test_monitor() -> MemoryMonitor {
        MemoryMonitor::new(MonitorConfig::default().with_eval_spacing(Duration::ZERO))
    }

    /// Records the emergency flag of every cleanup invocation.
    fn recording_callback(log: Arc<Mutex<Vec<bool>>>) -> CleanupCallback {
        Arc::new(move |emergency| {
            log.lock().unwrap().push(emergency);
            7
        })
    }

    #[test]
    fn test_classify_levels() {
        let config = MonitorConfig::default();
        assert_eq!(MemoryLevel::classify(100, &config), MemoryLevel::Normal);
        assert_eq!(MemoryLevel::classify(799, &config), MemoryLevel::Normal);
        assert_eq!(MemoryLevel::classify(800, &config), MemoryLevel::Warning);
        assert_eq!(MemoryLevel::classify(1199, &config), MemoryLevel::Warning);
        assert_eq!(MemoryLevel::classify(1200, &config), MemoryLevel::Critical);
    }

    #[test]
    fn test_no_cleanup_below_warning() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.evaluate(sample_mb(100));
        monitor.evaluate(sample_mb(500));
        monitor.evaluate(sample_mb(799));

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(monitor.stats().level, MemoryLevel::Normal);
    }

    #[test]
    fn test_crossing_sequence_fires_once_per_threshold() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.evaluate(sample_mb(900)); // crosses warning
        monitor.evaluate(sample_mb(1300)); // crosses critical
        monitor.evaluate(sample_mb(400)); // drops below warning

        assert_eq!(*calls.lock().unwrap(), vec![false, true]);
        assert_eq!(monitor.stats().level, MemoryLevel::Normal);
    }

    #[test]
    fn test_staying_above_warning_does_not_refire() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.evaluate(sample_mb(900));
        monitor.evaluate(sample_mb(950));
        monitor.evaluate(sample_mb(900));

        assert_eq!(*calls.lock().unwrap(), vec![false]);
    }

    #[test]
    fn test_rearms_after_dropping_below_warning() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.evaluate(sample_mb(900));
        monitor.evaluate(sample_mb(400));
        monitor.evaluate(sample_mb(900));

        assert_eq!(*calls.lock().unwrap(), vec![false, false]);
    }

    #[test]
    fn test_direct_jump_to_critical() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.evaluate(sample_mb(2000));

        assert_eq!(*calls.lock().unwrap(), vec![true]);
        assert_eq!(monitor.stats().level, MemoryLevel::Critical);
    }

    #[test]
    fn test_eval_spacing_gates_evaluations() {
        // Default 5s spacing; the second sample lands well within it.
        let monitor = MemoryMonitor::new(MonitorConfig::default());
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.evaluate(sample_mb(900));
        monitor.evaluate(sample_mb(1300));

        assert_eq!(*calls.lock().unwrap(), vec![false]);
        // The gated sample still updates running statistics.
        assert_eq!(monitor.stats().peak_resident_mb, 1300);
    }

    #[test]
    fn test_warning_and_critical_events() {
        let monitor = test_monitor();
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let criticals = Arc::new(Mutex::new(Vec::new()));

        let w = warnings.clone();
        monitor.on_warning(Arc::new(move |msg| w.lock().unwrap().push(msg.to_string())));
        let c = criticals.clone();
        monitor.on_critical(Arc::new(move |msg| c.lock().unwrap().push(msg.to_string())));

        monitor.evaluate(sample_mb(900));
        monitor.evaluate(sample_mb(1300));

        let warnings = warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("900"));
        let criticals = criticals.lock().unwrap();
        assert_eq!(criticals.len(), 1);
        assert!(criticals[0].contains("1300"));
    }

    #[test]
    fn test_freed_event_sums_callback_estimates() {
        let monitor = test_monitor();
        monitor.register_cleanup_callback(Arc::new(|_| 10));
        monitor.register_cleanup_callback(Arc::new(|_| 5));

        let freed = Arc::new(Mutex::new(Vec::new()));
        let f = freed.clone();
        monitor.on_freed(Arc::new(move |mb| f.lock().unwrap().push(mb)));

        monitor.evaluate(sample_mb(900));

        assert_eq!(*freed.lock().unwrap(), vec![15]);
        assert_eq!(monitor.stats().memory_freed_mb, 15);
        assert_eq!(monitor.stats().cleanup_invocations, 2);
    }

    #[test]
    fn test_panicking_callback_is_isolated() {
        let monitor = test_monitor();
        monitor.register_cleanup_callback(Arc::new(|_| panic!("bad callback")));
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.evaluate(sample_mb(900));
        monitor.evaluate(sample_mb(400));
        monitor.evaluate(sample_mb(900));

        // The surviving callback ran on both crossings.
        assert_eq!(*calls.lock().unwrap(), vec![false, false]);
        assert_eq!(monitor.stats().memory_freed_mb, 14);
    }

    #[test]
    fn test_unregister_cleanup_callback() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let id = monitor.register_cleanup_callback(recording_callback(calls.clone()));

        assert!(monitor.unregister_cleanup_callback(id));
        assert!(!monitor.unregister_cleanup_callback(id));

        monitor.evaluate(sample_mb(900));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_force_cleanup_runs_critical_path() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));
        // Hook reports 2 MiB freed per pass; force_cleanup runs three passes.
        monitor.register_reclaim_hook(Arc::new(|| 2 * 1024 * 1024));

        let freed = monitor.force_cleanup();

        assert_eq!(*calls.lock().unwrap(), vec![true]);
        assert_eq!(freed, 7 + 3 * 2);
        assert!(!monitor.is_emergency());
        assert_eq!(monitor.stats().reclaim_passes, 3);
    }

    #[test]
    fn test_reclaim_hook_runs_on_warning_pass() {
        let monitor = test_monitor();
        monitor.register_reclaim_hook(Arc::new(|| 3 * 1024 * 1024));

        monitor.evaluate(sample_mb(900));

        let stats = monitor.stats();
        assert_eq!(stats.reclaim_passes, 1);
        assert_eq!(stats.memory_freed_mb, 3);
    }

    #[test]
    fn test_set_thresholds() {
        let monitor = test_monitor();
        let calls = Arc::new(Mutex::new(Vec::new()));
        monitor.register_cleanup_callback(recording_callback(calls.clone()));

        monitor.set_thresholds(100, 200);
        monitor.evaluate(sample_mb(150));

        assert_eq!(*calls.lock().unwrap(), vec![false]);
    }

    #[test]
    fn test_peak_tracking() {
        let monitor = test_monitor();
        monitor.evaluate(sample_mb(300));
        monitor.evaluate(sample_mb(700));
        monitor.evaluate(sample_mb(500));

        assert_eq!(monitor.stats().peak_resident_mb, 700);
        assert_eq!(monitor.stats().last_sample.resident_mb(), 500);
    }

    #[test]
    fn test_start_stop_idempotent() {
        let monitor = MemoryMonitor::new(
            MonitorConfig::default().with_poll_interval(Duration::from_millis(10)),
        );
        monitor.start();
        monitor.start(); // second start is a no-op
        thread::sleep(Duration::from_millis(30));
        monitor.stop();
        monitor.stop(); // second stop is a no-op

        // The thread took at least one sample before stopping.
        assert!(monitor.stats().last_sample.available_bytes > 0);
    }
}
