//! Smsh builtins: `cd`, `exit` and `status`.
//!
//! Built-ins run inside the shell process against its own state and are
//! never routed through the process launcher.

use std::io::Write;

use crate::command::Command;
use crate::errors::Result;
use crate::shell::Shell;

use self::cd::Cd;
use self::exit::Exit;
use self::status::Status;

mod cd;
mod exit;
mod status;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const STATUS_NAME: &str = "status";

mod prelude {
    pub use std::io::Write;

    pub use failure::ResultExt;

    pub use crate::errors::{Error, ErrorKind, Result};
    pub use crate::shell::Shell;
}

/// Represents a builtin command such as cd or status.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// The help string to display to the user.
    const HELP: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()>;
}

pub fn is_builtin(program: &str) -> bool {
    [CD_NAME, EXIT_NAME, STATUS_NAME].contains(&program)
}

/// precondition: the command's program is a builtin.
pub fn run(shell: &mut Shell, command: &Command, stdout: &mut dyn Write) -> Result<()> {
    debug_assert!(is_builtin(&command.program));
    let args = &command.arguments[1..];
    match command.program.as_str() {
        CD_NAME => Cd::run(shell, args, stdout),
        EXIT_NAME => Exit::run(shell, args, stdout),
        STATUS_NAME => Status::run(shell, args, stdout),
        _ => unreachable!(),
    }
}
