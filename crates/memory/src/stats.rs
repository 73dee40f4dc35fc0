//! Process/system memory sampling.
//!
//! Sampling is kept behind the [`MemorySampler`] trait so the monitor's
//! threshold logic can be driven with scripted samples in tests.

use sysinfo::{Pid, System};

/// A point-in-time snapshot of process and system memory usage.
///
/// Recomputed on every monitor tick; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryStats {
    /// Resident set size of this process in bytes.
    pub resident_bytes: u64,

    /// Virtual memory size of this process in bytes.
    pub virtual_bytes: u64,

    /// Resident size as a percentage of total system memory (0.0 to 100.0).
    pub percent_of_system: f64,

    /// Memory still available to the system in bytes.
    pub available_bytes: u64,
}

impl MemoryStats {
    /// Resident set size in whole megabytes.
    pub fn resident_mb(&self) -> u64 {
        self.resident_bytes / (1024 * 1024)
    }

    /// Available system memory in whole megabytes.
    pub fn available_mb(&self) -> u64 {
        self.available_bytes / (1024 * 1024)
    }
}

/// Source of memory samples for the monitor.
pub trait MemorySampler: Send {
    /// Take a fresh sample of current memory usage.
    fn sample(&mut self) -> MemoryStats;
}

/// Default sampler backed by the `sysinfo` crate.
///
/// Keeps one `System` handle alive across samples so refreshes only touch
/// the memory tables, not the full process list.
pub struct SysinfoSampler {
    system: System,
    pid: Pid,
}

impl SysinfoSampler {
    /// Create a sampler for the current process.
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(std::process::id()),
        }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler for SysinfoSampler {
    fn sample(&mut self) -> MemoryStats {
        self.system.refresh_memory();
        self.system.refresh_process(self.pid);

        let (resident_bytes, virtual_bytes) = self
            .system
            .process(self.pid)
            .map(|p| (p.memory(), p.virtual_memory()))
            .unwrap_or((0, 0));

        let total = self.system.total_memory();
        let percent_of_system = if total == 0 {
            0.0
        } else {
            resident_bytes as f64 / total as f64 * 100.0
        };

        MemoryStats {
            resident_bytes,
            virtual_bytes,
            percent_of_system,
            available_bytes: self.system.available_memory(),
        }
    }
}
