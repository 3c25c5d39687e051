//! Process launcher: forks a child, wires redirection and signal
//! dispositions, and replaces the child's image with the requested
//! program.
//!
//! Everything between fork and exec happens on the child side and can only
//! kill the child; the parent either registers a background pid or blocks
//! until its foreground child terminates.

use std::ffi::{CStr, CString};
use std::os::unix::io::RawFd;
use std::process;
use std::result;

use failure::{Fail, ResultExt};
use nix::errno::Errno;
use nix::fcntl::{self, FcntlArg, FdFlag, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait;
use nix::unistd::{self, ForkResult, Pid};

use crate::command::Command;
use crate::errors::{Error, ErrorKind, Result};
use crate::jobs::JobTable;
use crate::signals;
use crate::status::ExitStatus;

/// Child exit code when a redirection target cannot be opened.
pub const REDIRECT_FAILURE_STATUS: i32 = 1;
/// Child exit code when descriptor duplication or exec itself fails.
pub const EXEC_FAILURE_STATUS: i32 = 2;

const DEV_NULL: &str = "/dev/null";

/// What happened on the parent side of a launch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The child ran in the foreground and terminated with this status.
    Foreground(ExitStatus),
    /// The child was backgrounded and registered in the job table.
    Background(Pid),
}

/// Launches `command` as a child process.
///
/// `foreground_only` is the mode snapshot taken at dispatch time: a
/// `&`-marked command is demoted to the foreground, without error, while
/// the mode disables background execution.
///
/// Fork failure is the one fatal error here ([`ErrorKind::Fork`]); the
/// caller is expected to terminate the shell on it.
pub fn launch(command: &Command, foreground_only: bool, jobs: &mut JobTable) -> Result<Outcome> {
    let run_in_background = command.background && !foreground_only;

    // Built before fork so the child allocates as little as possible.
    let program = CString::new(command.program.as_str())
        .map_err(|_| Error::syntax(&command.program))?;
    let argv = command
        .arguments
        .iter()
        .map(|arg| CString::new(arg.as_str()).map_err(|_| Error::syntax(arg)))
        .collect::<Result<Vec<CString>>>()?;

    match unsafe { unistd::fork() }.context(ErrorKind::Fork)? {
        ForkResult::Child => {
            let code = exec_child(command, run_in_background, &program, &argv);
            process::exit(code)
        }
        ForkResult::Parent { child } => {
            if run_in_background {
                jobs.insert(child)?;
                Ok(Outcome::Background(child))
            } else {
                Ok(Outcome::Foreground(wait_for(child)?))
            }
        }
    }
}

/// Child side of a launch. Only returns on failure, yielding the exit code
/// the child should die with. Ordering is mandatory: signal dispositions,
/// then redirection, then exec.
fn exec_child(
    command: &Command,
    run_in_background: bool,
    program: &CStr,
    argv: &[CString],
) -> i32 {
    if let Err(e) = signals::prepare_child(!run_in_background) {
        eprintln!("smsh: failed to set signal dispositions: {}", e);
        return EXEC_FAILURE_STATUS;
    }

    // Background children with no explicit redirection read from and
    // write to /dev/null; foreground children never get defaults.
    let default = if run_in_background {
        Some(DEV_NULL)
    } else {
        None
    };
    let input_file = command.input_file.as_deref().or(default);
    let output_file = command.output_file.as_deref().or(default);

    if let Some(path) = input_file {
        if let Err(code) = redirect(path, OFlag::O_RDONLY, Mode::empty(), libc::STDIN_FILENO) {
            return code;
        }
    }

    if let Some(path) = output_file {
        let oflag = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
        let mode = Mode::from_bits_truncate(0o644);
        if let Err(code) = redirect(path, oflag, mode, libc::STDOUT_FILENO) {
            return code;
        }
    }

    match unistd::execvp(program, argv) {
        Err(e) => {
            eprintln!("smsh: {}: {}", command.program, e.desc());
            EXEC_FAILURE_STATUS
        }
        Ok(infallible) => match infallible {},
    }
}

/// Opens `path` and binds it to `target` (stdin or stdout). The original
/// descriptor is marked close-on-exec so it does not leak past the
/// program replacement.
fn redirect(path: &str, oflag: OFlag, mode: Mode, target: RawFd) -> result::Result<(), i32> {
    let fd = match fcntl::open(path, oflag, mode) {
        Ok(fd) => fd,
        Err(e) => {
            eprintln!("smsh: cannot open {}: {}", path, e.desc());
            return Err(REDIRECT_FAILURE_STATUS);
        }
    };

    if let Err(e) = unistd::dup2(fd, target) {
        eprintln!("smsh: cannot redirect {}: {}", path, e.desc());
        return Err(EXEC_FAILURE_STATUS);
    }

    let _ = fcntl::fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC));
    Ok(())
}

/// Blocks until `pid` exits or is killed by a signal. The SIGTSTP toggle
/// may interrupt the wait; EINTR restarts it.
fn wait_for(pid: Pid) -> Result<ExitStatus> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(status) => {
                if let Some(exit_status) = ExitStatus::from_wait(status) {
                    return Ok(exit_status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.context(ErrorKind::Nix).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::thread;
    use std::time::Duration;

    fn external(argv: &[&str]) -> Command {
        Command {
            program: argv[0].to_string(),
            arguments: argv.iter().map(|s| s.to_string()).collect(),
            input_file: None,
            output_file: None,
            background: false,
        }
    }

    fn sweep_until_reaped(jobs: &mut JobTable, pid: Pid) -> ExitStatus {
        for _ in 0..100 {
            if let Some(&(_, status)) = jobs.sweep().iter().find(|&&(p, _)| p == pid) {
                return status;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("background pid {} was never reaped", pid);
    }

    #[test]
    fn foreground_captures_exit_code() {
        let command = external(&["sh", "-c", "exit 4"]);
        let mut jobs = JobTable::new();
        let outcome = launch(&command, false, &mut jobs).unwrap();
        assert_eq!(outcome, Outcome::Foreground(ExitStatus::Exited(4)));
        assert!(jobs.is_empty());
    }

    #[test]
    fn foreground_reports_signal_termination() {
        let command = external(&["sh", "-c", "kill -9 $$"]);
        let mut jobs = JobTable::new();
        let outcome = launch(&command, false, &mut jobs).unwrap();
        assert_eq!(outcome, Outcome::Foreground(ExitStatus::Signaled(9)));
    }

    #[test]
    fn exec_failure_exits_child_with_status_two() {
        let command = external(&["smsh-no-such-program-zzz"]);
        let mut jobs = JobTable::new();
        let outcome = launch(&command, false, &mut jobs).unwrap();
        assert_eq!(
            outcome,
            Outcome::Foreground(ExitStatus::Exited(EXEC_FAILURE_STATUS))
        );
    }

    #[test]
    fn missing_input_file_exits_child_with_status_one() {
        let mut command = external(&["cat"]);
        command.input_file = Some("/smsh-no-such-dir/missing.txt".to_string());
        let mut jobs = JobTable::new();
        let outcome = launch(&command, false, &mut jobs).unwrap();
        assert_eq!(
            outcome,
            Outcome::Foreground(ExitStatus::Exited(REDIRECT_FAILURE_STATUS))
        );
    }

    #[test]
    fn output_redirection_truncates_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "previous contents that should disappear").unwrap();

        let mut command = external(&["echo", "hello"]);
        command.output_file = Some(path.to_string_lossy().to_string());
        let mut jobs = JobTable::new();
        let outcome = launch(&command, false, &mut jobs).unwrap();

        assert_eq!(outcome, Outcome::Foreground(ExitStatus::success()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn input_redirection_feeds_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, "one two three\n").unwrap();

        let mut command = external(&["wc", "-w"]);
        command.input_file = Some(input.to_string_lossy().to_string());
        command.output_file = Some(output.to_string_lossy().to_string());
        let mut jobs = JobTable::new();
        let outcome = launch(&command, false, &mut jobs).unwrap();

        assert_eq!(outcome, Outcome::Foreground(ExitStatus::success()));
        assert_eq!(fs::read_to_string(&output).unwrap().trim(), "3");
    }

    #[test]
    fn background_child_is_registered_then_reaped() {
        let mut command = external(&["true"]);
        command.background = true;
        let mut jobs = JobTable::new();

        let pid = match launch(&command, false, &mut jobs).unwrap() {
            Outcome::Background(pid) => pid,
            outcome => panic!("expected background outcome, got {:?}", outcome),
        };
        assert!(jobs.contains(pid));

        let status = sweep_until_reaped(&mut jobs, pid);
        assert_eq!(status, ExitStatus::Exited(0));
        assert!(!jobs.contains(pid));
    }

    #[test]
    fn background_stdin_defaults_to_dev_null() {
        // Without the /dev/null default, cat would block on the shell's
        // stdin forever instead of exiting immediately.
        let mut command = external(&["cat"]);
        command.background = true;
        let mut jobs = JobTable::new();

        let pid = match launch(&command, false, &mut jobs).unwrap() {
            Outcome::Background(pid) => pid,
            outcome => panic!("expected background outcome, got {:?}", outcome),
        };
        let status = sweep_until_reaped(&mut jobs, pid);
        assert_eq!(status, ExitStatus::Exited(0));
    }

    #[test]
    fn foreground_only_mode_demotes_background_commands() {
        let mut command = external(&["true"]);
        command.background = true;
        let mut jobs = JobTable::new();

        let outcome = launch(&command, true, &mut jobs).unwrap();
        assert_eq!(outcome, Outcome::Foreground(ExitStatus::success()));
        assert!(jobs.is_empty());
    }
}
