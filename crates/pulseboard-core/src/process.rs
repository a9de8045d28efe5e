//! OS process statistics (CPU, memory, file descriptors, start time).
//!
//! Linux reads `/proc/self/*`; other platforms report
//! `ProcessStatsUnavailable` and callers keep their previous values.
//! Reads are single-shot with no retries.

use crate::error::{PulseError, Result};

/// One reading of the current process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessStats {
    /// User + system CPU time in seconds.
    pub cpu_seconds: f64,
    pub virtual_memory_bytes: f64,
    pub resident_memory_bytes: f64,
    /// `None` where descriptor counting is unsupported.
    pub open_fds: Option<f64>,
    /// Hard `RLIMIT_NOFILE`.
    pub max_fds: Option<f64>,
}

/// Raw fields of `/proc/<pid>/stat` used for the process metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcStat {
    pub utime_ticks: u64,
    pub stime_ticks: u64,
    pub start_ticks: u64,
    pub vsize_bytes: u64,
    pub rss_pages: u64,
}

/// Parse the contents of `/proc/<pid>/stat`.
///
/// The command name (field 2) may contain spaces and parentheses, so fields
/// are counted from the last `)`.
pub fn parse_proc_stat(content: &str) -> Result<ProcStat> {
    let rest = content
        .rfind(')')
        .map(|i| &content[i + 1..])
        .ok_or_else(|| PulseError::ProcessStatsUnavailable("malformed stat: no comm".into()))?;
    let fields: Vec<&str> = rest.split_whitespace().collect();

    // fields[0] is the state (field 3 of the stat line)
    let field = |n: usize| -> Result<u64> {
        let idx = n - 3;
        fields
            .get(idx)
            .ok_or_else(|| PulseError::ProcessStatsUnavailable(format!("stat field {n} missing")))?
            .parse::<u64>()
            .map_err(|e| PulseError::ProcessStatsUnavailable(format!("stat field {n}: {e}")))
    };

    Ok(ProcStat {
        utime_ticks: field(14)?,
        stime_ticks: field(15)?,
        start_ticks: field(22)?,
        vsize_bytes: field(23)?,
        rss_pages: field(24)?,
    })
}

/// Parse the `btime` (boot time, unix seconds) line of `/proc/stat`.
pub fn parse_boot_time(content: &str) -> Result<u64> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("btime "))
        .ok_or_else(|| PulseError::ProcessStatsUnavailable("btime missing from /proc/stat".into()))?
        .trim()
        .parse::<u64>()
        .map_err(|e| PulseError::ProcessStatsUnavailable(format!("btime: {e}")))
}

#[cfg(target_os = "linux")]
mod imp {
    use std::fs;

    use super::{parse_boot_time, parse_proc_stat, ProcessStats};
    use crate::error::{PulseError, Result};

    fn sysconf_or(name: libc::c_int, fallback: u64) -> u64 {
        // SAFETY: sysconf has no memory-safety preconditions.
        let v = unsafe { libc::sysconf(name) };
        if v > 0 {
            v as u64
        } else {
            fallback
        }
    }

    fn clock_ticks() -> u64 {
        sysconf_or(libc::_SC_CLK_TCK, 100)
    }

    fn page_size() -> u64 {
        sysconf_or(libc::_SC_PAGESIZE, 4096)
    }

    fn read(path: &str) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|e| PulseError::ProcessStatsUnavailable(format!("read {path}: {e}")))
    }

    fn open_fds() -> Option<f64> {
        match fs::read_dir("/proc/self/fd") {
            // the listing includes the descriptor read_dir itself holds open
            Ok(entries) => Some(entries.count().saturating_sub(1) as f64),
            Err(e) => {
                tracing::debug!(error = %e, "open fd count unavailable");
                None
            }
        }
    }

    fn max_fds() -> Option<f64> {
        let mut lim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: `lim` is a valid, writable rlimit.
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut lim) };
        (rc == 0).then_some(lim.rlim_max as f64)
    }

    pub fn read_process_stats() -> Result<ProcessStats> {
        let stat = parse_proc_stat(&read("/proc/self/stat")?)?;
        let ticks = clock_ticks() as f64;
        Ok(ProcessStats {
            cpu_seconds: (stat.utime_ticks + stat.stime_ticks) as f64 / ticks,
            virtual_memory_bytes: stat.vsize_bytes as f64,
            resident_memory_bytes: (stat.rss_pages * page_size()) as f64,
            open_fds: open_fds(),
            max_fds: max_fds(),
        })
    }

    pub fn process_start_time() -> Result<f64> {
        let stat = parse_proc_stat(&read("/proc/self/stat")?)?;
        let boot = parse_boot_time(&read("/proc/stat")?)?;
        Ok(boot as f64 + stat.start_ticks as f64 / clock_ticks() as f64)
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::ProcessStats;
    use crate::error::{PulseError, Result};

    pub fn read_process_stats() -> Result<ProcessStats> {
        Err(PulseError::ProcessStatsUnavailable(
            "process stats not supported on this platform".into(),
        ))
    }

    pub fn process_start_time() -> Result<f64> {
        Err(PulseError::ProcessStatsUnavailable(
            "process start time not supported on this platform".into(),
        ))
    }
}

/// Read live statistics for the current process.
pub fn read_process_stats() -> Result<ProcessStats> {
    imp::read_process_stats()
}

/// Start time of the current process, unix seconds.
pub fn process_start_time() -> Result<f64> {
    imp::process_start_time()
}
