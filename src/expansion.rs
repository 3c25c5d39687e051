//! Variable expansion performed on the raw input line before tokenization.
//!
//! The only supported expansion is `$$`, which becomes the decimal pid of
//! the shell process itself.

use nix::unistd::Pid;

/// Replaces every occurrence of `$$` with the decimal form of `pid`.
///
/// Occurrences are consumed left to right without overlap, so `$$$`
/// expands to the pid followed by a single literal `$`.
pub fn expand_pid(line: &str, pid: Pid) -> String {
    line.replace("$$", &pid.to_string())
}
