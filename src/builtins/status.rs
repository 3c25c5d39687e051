use crate::builtins::{self, prelude::*};

pub struct Status;

impl builtins::BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    const HELP: &'static str = "\
status: status
    Print the exit value of the last foreground command, or the number of
    the signal that terminated it.";

    fn run(shell: &mut Shell, _args: &[String], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_exit_status()).context(ErrorKind::Io)?;
        Ok(())
    }
}
