#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ProcessStats {
    pub label: String,
    pub cpu_usage: f32,
    pub memory_mb: u64,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub processes: Vec<ProcessStats>,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// 追蹤比賽執行器本身與兩個引擎子行程的資源使用
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    watched: Mutex<Vec<(String, Pid)>>,
    start_time: Instant,
    peak_memory: Mutex<u64>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut watched = Vec::new();
        if enabled {
            if let Ok(pid) = sysinfo::get_current_pid() {
                watched.push(("twogtp".to_string(), pid));
            }
        }

        Self {
            system: Mutex::new(System::new()),
            watched: Mutex::new(watched),
            start_time: Instant::now(),
            peak_memory: Mutex::new(0),
            enabled,
        }
    }

    pub fn watch(&self, label: &str, pid: Option<u32>) {
        if !self.enabled {
            return;
        }
        let (Some(pid), Ok(mut watched)) = (pid, self.watched.lock()) else {
            return;
        };
        watched.push((label.to_string(), Pid::from_u32(pid)));
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let watched = self.watched.lock().ok()?.clone();
        let mut system = self.system.lock().ok()?;
        let pids: Vec<Pid> = watched.iter().map(|(_, pid)| *pid).collect();
        system.refresh_processes(ProcessesToUpdate::Some(&pids), true);

        let processes: Vec<ProcessStats> = watched
            .iter()
            .filter_map(|(label, pid)| {
                system.process(*pid).map(|process| ProcessStats {
                    label: label.clone(),
                    cpu_usage: process.cpu_usage(),
                    memory_mb: process.memory() / 1024 / 1024,
                })
            })
            .collect();

        let total_mb: u64 = processes.iter().map(|p| p.memory_mb).sum();
        let mut peak = self.peak_memory.lock().ok()?;
        if total_mb > *peak {
            *peak = total_mb;
        }

        Some(SystemStats {
            processes,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.get_stats() {
            for process in &stats.processes {
                tracing::info!(
                    "📊 {} - {}: CPU {:.1}%, Memory {}MB",
                    phase,
                    process.label,
                    process.cpu_usage,
                    process.memory_mb
                );
            }
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 為非CLI環境提供空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn watch(&self, _label: &str, _pid: Option<u32>) {}

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = SystemMonitor::new(false);
        monitor.watch("black", Some(1));
        assert!(!monitor.is_enabled());
        assert!(monitor.get_stats().is_none());
    }

    #[test]
    fn test_enabled_monitor_sees_current_process() {
        let monitor = SystemMonitor::new(true);
        let stats = monitor.get_stats().unwrap();
        assert!(stats.processes.iter().any(|p| p.label == "twogtp"));
    }
}
