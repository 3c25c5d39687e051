//! Fixed-capacity registry of background process ids.
//!
//! The shell only ever holds pids, never handles to child memory; all
//! observation goes through non-blocking `waitpid` during [`JobTable::sweep`].

use std::fmt;

use log::warn;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag};
use nix::unistd::Pid;

use crate::errors::{Error, Result};
use crate::status::ExitStatus;

/// Maximum number of concurrent background processes.
pub const MAX_JOBS: usize = 100;

/// Slot array of background pids. An empty slot is `None`, so a vacant
/// entry is always distinguishable from a valid pid.
pub struct JobTable {
    slots: Vec<Option<Pid>>,
}

impl JobTable {
    pub fn new() -> JobTable {
        JobTable::with_capacity(MAX_JOBS)
    }

    pub fn with_capacity(capacity: usize) -> JobTable {
        JobTable {
            slots: vec![None; capacity],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.slots.contains(&Some(pid))
    }

    /// Stores `pid` in the first free slot and returns its index.
    ///
    /// The capacity is a hard resource bound; a full table is an error.
    /// A pid may appear at most once.
    pub fn insert(&mut self, pid: Pid) -> Result<usize> {
        debug_assert!(!self.contains(pid), "pid {} registered twice", pid);
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(pid);
                Ok(index)
            }
            None => Err(Error::job_table_full(self.slots.len())),
        }
    }

    /// Checks every occupied slot for a state change without blocking.
    ///
    /// Each pid whose process has terminated is freed from the table and
    /// returned with its exit status; still-running pids are left alone.
    /// No ordering across slots is guaranteed.
    pub fn sweep(&mut self) -> Vec<(Pid, ExitStatus)> {
        let mut reaped = Vec::new();
        for slot in &mut self.slots {
            let pid = match *slot {
                Some(pid) => pid,
                None => continue,
            };

            match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(status) => {
                    if let Some(exit_status) = ExitStatus::from_wait(status) {
                        reaped.push((pid, exit_status));
                        *slot = None;
                    }
                }
                Err(e) => {
                    // ECHILD here means the process is already gone; in
                    // either case the slot no longer tracks anything real.
                    warn!("waitpid failed for background pid {}: {}", pid, e);
                    *slot = None;
                }
            }
        }
        reaped
    }

    /// Forcefully kills every tracked process. Shutdown only; the table
    /// is empty afterwards.
    pub fn terminate_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(pid) = slot.take() {
                let temp_result = signal::kill(pid, Signal::SIGKILL);
                log_if_err!(temp_result, "failed to kill background pid {}", pid);
            }
        }
    }
}

impl Default for JobTable {
    fn default() -> JobTable {
        JobTable::new()
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let occupied: Vec<Pid> = self.slots.iter().filter_map(|s| *s).collect();
        write!(f, "{} background jobs: {:?}", occupied.len(), occupied)
    }
}
