use std::path::PathBuf;

use nix::unistd;

use crate::builtins::{self, prelude::*};

pub struct Cd;

impl builtins::BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    const HELP: &'static str = "\
cd: cd [dir]
    Change the working directory to DIR, or to the home directory if DIR
    is not given.";

    fn run(_shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()> {
        let target = match args.first() {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir().ok_or_else(|| {
                Error::builtin_command("cd: could not determine home directory", 1)
            })?,
        };

        // A missing target is recoverable; report it and keep the loop going.
        if unistd::chdir(&target).is_err() {
            writeln!(stdout, "Directory not found").context(ErrorKind::Io)?;
        }
        Ok(())
    }
}
