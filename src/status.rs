//! Exit status of a child process, as observed through `waitpid`.

use std::fmt;

use nix::sys::wait::WaitStatus;

/// Terminal state of a child: either a normal exit code or the number of
/// the signal that killed it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitStatus {
    Exited(i32),
    Signaled(i32),
}

impl ExitStatus {
    pub fn success() -> ExitStatus {
        ExitStatus::Exited(0)
    }

    /// Maps a `waitpid` result to a terminal state. Returns `None` for
    /// non-terminal states such as `StillAlive`.
    pub fn from_wait(status: WaitStatus) -> Option<ExitStatus> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitStatus::Signaled(signal as i32)),
            _ => None,
        }
    }

    /// Process exit code for this status, following the shell convention
    /// of `128 + signo` for signal termination.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Exited(code) => code,
            ExitStatus::Signaled(signal) => 128 + signal,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExitStatus::Exited(code) => write!(f, "Exit value {}", code),
            ExitStatus::Signaled(signal) => write!(f, "Terminated by signal {}", signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn displays_exit_value() {
        assert_eq!(ExitStatus::Exited(0).to_string(), "Exit value 0");
        assert_eq!(ExitStatus::Exited(2).to_string(), "Exit value 2");
    }

    #[test]
    fn displays_signal_number() {
        assert_eq!(ExitStatus::Signaled(9).to_string(), "Terminated by signal 9");
        assert_eq!(
            ExitStatus::Signaled(15).to_string(),
            "Terminated by signal 15"
        );
    }

    #[test]
    fn converts_wait_statuses() {
        let pid = Pid::from_raw(100);
        assert_eq!(
            ExitStatus::from_wait(WaitStatus::Exited(pid, 3)),
            Some(ExitStatus::Exited(3))
        );
        assert_eq!(
            ExitStatus::from_wait(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(ExitStatus::Signaled(9))
        );
        assert_eq!(ExitStatus::from_wait(WaitStatus::StillAlive), None);
    }

    #[test]
    fn signal_termination_maps_to_high_exit_codes() {
        assert_eq!(ExitStatus::Exited(7).code(), 7);
        assert_eq!(ExitStatus::Signaled(2).code(), 130);
    }
}
