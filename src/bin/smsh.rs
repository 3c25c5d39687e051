use std::path::PathBuf;
use std::process;

use atty::Stream;
use docopt::Docopt;
use log::{debug, error};
use nix::unistd::Pid;
use serde_derive::Deserialize;

use smsh::errors::Result;
use smsh::{Shell, ShellConfig};

const LOG_FILE_NAME: &str = ".smsh_log";

const USAGE: &str = "
smsh.

Usage:
    smsh [options]
    smsh [options] -c <command>
    smsh [options] <file>
    smsh (-h | --help)
    smsh --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -c              If the -c option is present, then commands are read from the first non-option
                        argument command_string.
    --log=<path>    File to write log to, defaults to ~/.smsh_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    init_logger(&args.flag_log);
    debug!("{:?}", args);

    if args.flag_version {
        println!("smsh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args);
    } else {
        execute_from_stdin();
    }
}

fn init_logger(path: &Option<String>) {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(path) => path,
        None => return,
    };

    let pid = Pid::this();
    let result = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(match fern::log_file(log_path) {
            Ok(file) => file,
            Err(_) => return,
        })
        .apply();
    if result.is_err() {
        eprintln!("smsh: failed to initialize logging");
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

fn execute_from_command_string_or_file(args: &Args) -> ! {
    let mut shell = create_shell(ShellConfig::noninteractive());

    let result = if let Some(ref command) = args.arg_command {
        shell.execute_command_string(command)
    } else if let Some(ref file_path) = args.arg_file {
        shell.execute_commands_from_file(&PathBuf::from(file_path))
    } else {
        unreachable!();
    };

    exit(result, &mut shell)
}

fn execute_from_stdin() -> ! {
    let config = if atty::is(Stream::Stdin) {
        ShellConfig::interactive()
    } else {
        ShellConfig::noninteractive()
    };

    let mut shell = create_shell(config);
    shell.execute_from_stdin();
    shell.exit(None)
}

fn create_shell(config: ShellConfig) -> Shell {
    Shell::new(config).unwrap_or_else(|e| {
        error!("failed to create shell: {}", e);
        eprintln!("smsh: {}", e);
        process::exit(1);
    })
}

fn exit(result: Result<()>, shell: &mut Shell) -> ! {
    if let Err(e) = result {
        eprintln!("smsh: {}", e);
        shell.exit(Some(1))
    } else {
        shell.exit(None)
    }
}
