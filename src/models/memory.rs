//! Process memory statistics reported under `Mem` in the stats response.
//!
//! The `sysinfo::System` instance and the process ID are created once and
//! reused; the figures themselves are refreshed on every snapshot.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sysinfo::{get_current_pid, Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Memory figures in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemStats {
    /// Gateway process ID (0 if it could not be determined)
    pub pid: u32,
    /// Resident set size of the gateway process
    pub rss: u64,
    /// Virtual memory of the gateway process
    pub virtual_memory: u64,
    /// Host totals
    pub total_memory: u64,
    pub used_memory: u64,
    pub available_memory: u64,
}

/// Reads [`MemStats`] for the current process.
pub struct MemoryProbe {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        let pid = match get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                tracing::warn!("Process memory stats unavailable: {}", err);
                None
            }
        };

        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }

    /// Refreshes and returns the current figures.
    pub fn snapshot(&self) -> MemStats {
        let mut system = self.system.lock();
        system.refresh_memory();

        let mut stats = MemStats {
            total_memory: system.total_memory(),
            used_memory: system.used_memory(),
            available_memory: system.available_memory(),
            ..MemStats::default()
        };

        if let Some(pid) = self.pid {
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::nothing().with_memory(),
            );
            stats.pid = pid.as_u32();
            if let Some(process) = system.process(pid) {
                stats.rss = process.memory();
                stats.virtual_memory = process.virtual_memory();
            }
        }

        stats
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProbe").field("pid", &self.pid).finish()
    }
}
