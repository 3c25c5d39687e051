//! Smsh - a small command shell.
//!
//! Reads one command per line, expands `$$` to the shell's pid, and either
//! runs a built-in (`cd`, `exit`, `status`) or forks and execs an external
//! program with optional `<`/`>` redirection. A trailing `&` runs the
//! program in the background; SIGTSTP toggles a foreground-only mode in
//! which `&` is ignored.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

/// Logs `Err` results without interrupting control flow.
macro_rules! log_if_err {
    ($result:expr, $($arg:tt)*) => {
        if let Err(ref e) = $result {
            log::error!("{}: {}", format_args!($($arg)*), e);
        }
    };
}

mod builtins;
pub mod command;
pub mod errors;
pub mod execute;
pub mod expansion;
pub mod jobs;
pub mod shell;
pub mod signals;
pub mod status;

pub use crate::command::Command;
pub use crate::shell::{Shell, ShellConfig};
pub use crate::status::ExitStatus;
