use crate::builtins::{self, prelude::*};

pub struct Exit;

impl builtins::BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    const HELP: &'static str = "\
exit: exit [n]
    Kill every tracked background process, then exit the shell with a
    status of N. If N is omitted, the exit status is that of the last
    foreground command.";

    fn run(shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let status = args.first().map(|arg| {
            arg.parse::<i32>().unwrap_or_else(|_| {
                eprintln!("smsh: exit: {}: numeric argument required", arg);
                2
            })
        });
        shell.exit(status)
    }
}
