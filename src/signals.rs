//! Signal dispositions for the shell and its children.
//!
//! The shell ignores SIGINT for its whole life and installs a SIGTSTP
//! handler that toggles foreground-only mode. The mode flag is a process
//! global written only by that handler; everything else reads a snapshot
//! of it at dispatch time.

use std::sync::atomic::{AtomicBool, Ordering};

use failure::ResultExt;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::errors::{ErrorKind, Result};

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_MESSAGE: &[u8] = b"Entering forground-only mode (& is now ignored)\n";
const EXIT_MESSAGE: &[u8] = b"Exiting foreground-only mode\n";

/// Snapshot of the foreground-only mode flag.
pub fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// SIGTSTP handler: flips the mode flag and announces the transition.
///
/// Runs in async-signal context, so it is restricted to the atomic store
/// and a single raw `write(2)` of a fixed byte string. No formatting, no
/// buffered I/O.
extern "C" fn handle_sigtstp(_signal: libc::c_int) {
    let entering = !FOREGROUND_ONLY.load(Ordering::SeqCst);
    FOREGROUND_ONLY.store(entering, Ordering::SeqCst);

    let message: &[u8] = if entering { ENTER_MESSAGE } else { EXIT_MESSAGE };
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            message.as_ptr() as *const libc::c_void,
            message.len(),
        );
    }
}

/// Installs the shell's own dispositions: SIGINT ignored, SIGTSTP toggling
/// foreground-only mode. Both actions block all signals while running and
/// restart interrupted syscalls.
pub fn install_shell_handlers() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::SA_RESTART, SigSet::all());
    let toggle = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );
    unsafe {
        signal::sigaction(Signal::SIGINT, &ignore).context(ErrorKind::Nix)?;
        signal::sigaction(Signal::SIGTSTP, &toggle).context(ErrorKind::Nix)?;
    }
    Ok(())
}

/// Arranges signal dispositions in a freshly forked child, before any
/// redirection and before exec.
///
/// Foreground children get the default SIGINT disposition back so the
/// user can interrupt them; background children keep the inherited
/// ignore. Every child ignores SIGTSTP, the shell's toggle keystroke.
pub fn prepare_child(run_in_foreground: bool) -> nix::Result<()> {
    unsafe {
        if run_in_foreground {
            signal::signal(Signal::SIGINT, SigHandler::SigDfl)?;
        }
        signal::signal(Signal::SIGTSTP, SigHandler::SigIgn)?;
    }
    Ok(())
}
