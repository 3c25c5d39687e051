//! The shell itself: the read/dispatch loop, built-in routing, and the
//! process-wide state (last exit status, background job table).

use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::process;

use failure::ResultExt;
use log::{error, info};
use nix::unistd::{self, Pid};

use crate::builtins;
use crate::command::Command;
use crate::errors::{ErrorKind, Result};
use crate::execute::{self, Outcome};
use crate::expansion;
use crate::jobs::JobTable;
use crate::signals;
use crate::status::ExitStatus;

const SYNTAX_ERROR_STATUS: i32 = 2;

/// Policy object to control a Shell's behavior.
#[derive(Clone, Copy, Debug)]
pub struct ShellConfig {
    /// Determines if the `": "` prompt is written before each read.
    display_prompt: bool,
}

impl ShellConfig {
    /// Creates an interactive shell: prompts before each line.
    pub fn interactive() -> ShellConfig {
        ShellConfig {
            display_prompt: true,
        }
    }

    /// Creates a noninteractive shell for piped input, `-c` strings and
    /// script files: no prompt is written.
    pub fn noninteractive() -> ShellConfig {
        ShellConfig {
            display_prompt: false,
        }
    }
}

#[derive(Debug)]
pub struct Shell {
    /// The shell's own pid, substituted for `$$` in input lines.
    pid: Pid,
    jobs: JobTable,
    /// Exit status of the last foreground command executed.
    last_exit_status: ExitStatus,
    config: ShellConfig,
}

impl Shell {
    /// Constructs a new Shell and installs its signal dispositions:
    /// SIGINT ignored for the life of the process, SIGTSTP toggling
    /// foreground-only mode.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        signals::install_shell_handlers()?;
        let shell = Shell {
            pid: unistd::getpid(),
            jobs: JobTable::new(),
            last_exit_status: ExitStatus::success(),
            config,
        };
        info!("smsh started up, pid {}", shell.pid);
        Ok(shell)
    }

    pub fn last_exit_status(&self) -> ExitStatus {
        self.last_exit_status
    }

    /// Expands, parses and dispatches one input line.
    ///
    /// Parse-level problems (missing redirection operand, argument
    /// overflow) are reported here and recorded in the last exit status;
    /// they never tear the loop down.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let input = expansion::expand_pid(input, self.pid);
        let command = match Command::parse(&input) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => {
                eprintln!("smsh: {}", e);
                self.last_exit_status = ExitStatus::Exited(SYNTAX_ERROR_STATUS);
                return Ok(());
            }
        };

        self.dispatch(&command)
    }

    pub fn execute_commands_from_file(&mut self, path: &Path) -> Result<()> {
        let mut file = File::open(path).context(ErrorKind::Io)?;
        let mut buffer = String::new();
        file.read_to_string(&mut buffer).context(ErrorKind::Io)?;

        for line in buffer.split('\n') {
            self.execute_command_string(line)?;
        }

        Ok(())
    }

    /// The read loop. Returns on end of file; the caller decides how to
    /// shut down.
    pub fn execute_from_stdin(&mut self) {
        let stdin = io::stdin();
        loop {
            let input = match self.prompt(&stdin) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("prompt: {}", e);
                    continue;
                }
            };

            let temp_result = self.execute_command_string(&input);
            if let Err(ref e) = temp_result {
                eprintln!("smsh: {}", e);
            }
            log_if_err!(temp_result, "execute_command_string");
        }
    }

    /// Kills every tracked background job and ends the shell process.
    /// Without an explicit code, exits with the last recorded status.
    pub fn exit(&mut self, status: Option<i32>) -> ! {
        self.jobs.terminate_all();

        let code = status.unwrap_or_else(|| self.last_exit_status.code());
        let code_like_u8 = if code < 0 {
            (256 + code) % 256
        } else {
            code % 256
        };

        info!("smsh has shut down");
        process::exit(code_like_u8);
    }

    fn prompt(&mut self, stdin: &io::Stdin) -> Result<Option<String>> {
        if self.config.display_prompt {
            print!(": ");
            io::stdout().flush().context(ErrorKind::Io)?;
        }

        let mut line = String::new();
        // Cooked-mode read; resumes after the SIGTSTP handler fires.
        let bytes_read = stdin.lock().read_line(&mut line).context(ErrorKind::Io)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches('\n').to_string()))
    }

    /// Routes one parsed command: comments reprompt silently, built-ins
    /// run in-process, everything else goes through the launcher.
    fn dispatch(&mut self, command: &Command) -> Result<()> {
        if command.is_comment() {
            return Ok(());
        }

        if builtins::is_builtin(&command.program) {
            return builtins::run(self, command, &mut io::stdout());
        }

        self.run_external(command)
    }

    fn run_external(&mut self, command: &Command) -> Result<()> {
        let result = execute::launch(command, signals::foreground_only(), &mut self.jobs);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if *e.kind() == ErrorKind::Fork {
                    // The shell's state no longer matches its assumed
                    // execution path; continuing is unsafe.
                    eprintln!("smsh: {}", e);
                    error!("fork failed, shutting down: {}", e);
                    process::exit(1);
                }
                self.notify_completed_jobs();
                return Err(e);
            }
        };

        match outcome {
            Outcome::Background(pid) => println!("Background pid is {}", pid),
            Outcome::Foreground(status) => {
                self.last_exit_status = status;
                // Signal termination is the one status surfaced without
                // an explicit `status` call.
                if let ExitStatus::Signaled(_) = status {
                    println!("{}", status);
                }
            }
        }

        self.notify_completed_jobs();
        Ok(())
    }

    /// The background sweep: runs once per non-built-in dispatch, after
    /// that dispatch's own wait has completed. Never blocks.
    fn notify_completed_jobs(&mut self) {
        for (pid, status) in self.jobs.sweep() {
            println!("Background process {} is done. {}", pid, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_shell() -> Shell {
        Shell::new(ShellConfig::noninteractive()).expect("failed to create shell")
    }

    #[test]
    fn blank_lines_and_comments_are_no_ops() {
        let mut shell = new_shell();
        shell.execute_command_string("").unwrap();
        shell.execute_command_string("   ").unwrap();
        shell.execute_command_string("# ls -l").unwrap();
        assert_eq!(shell.last_exit_status(), ExitStatus::success());
    }

    #[test]
    fn foreground_commands_record_their_exit_status() {
        let mut shell = new_shell();
        shell.execute_command_string("false").unwrap();
        assert_eq!(shell.last_exit_status(), ExitStatus::Exited(1));
        shell.execute_command_string("true").unwrap();
        assert_eq!(shell.last_exit_status(), ExitStatus::Exited(0));
    }

    #[test]
    fn syntax_errors_are_recoverable_and_recorded() {
        let mut shell = new_shell();
        shell.execute_command_string("wc <").unwrap();
        assert_eq!(
            shell.last_exit_status(),
            ExitStatus::Exited(SYNTAX_ERROR_STATUS)
        );
        // The loop state is intact; the next command still runs.
        shell.execute_command_string("true").unwrap();
        assert_eq!(shell.last_exit_status(), ExitStatus::Exited(0));
    }

    #[test]
    fn status_builtin_is_idempotent() {
        let mut shell = new_shell();
        shell.execute_command_string("false").unwrap();

        let command = Command::parse("status").unwrap().unwrap();
        let mut first = Vec::new();
        let mut second = Vec::new();
        builtins::run(&mut shell, &command, &mut first).unwrap();
        builtins::run(&mut shell, &command, &mut second).unwrap();

        assert_eq!(first, b"Exit value 1\n");
        assert_eq!(first, second);
    }

    #[test]
    fn builtins_do_not_touch_last_exit_status() {
        let mut shell = new_shell();
        shell.execute_command_string("false").unwrap();

        let command = Command::parse("status").unwrap().unwrap();
        builtins::run(&mut shell, &command, &mut Vec::new()).unwrap();
        assert_eq!(shell.last_exit_status(), ExitStatus::Exited(1));
    }

    #[test]
    fn pid_expansion_happens_before_tokenization() {
        let mut shell = new_shell();
        // `true` ignores its arguments; the line must still parse after
        // `$$` becomes the shell's pid.
        shell.execute_command_string("true $$").unwrap();
        assert_eq!(shell.last_exit_status(), ExitStatus::Exited(0));
    }
}
