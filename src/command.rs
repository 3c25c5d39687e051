//! Command parser.
//!
//! Splits one input line into a [`Command`] record: the program and its
//! argument vector, optional `<`/`>` redirection targets, and the trailing
//! `&` background marker.

use crate::errors::{Error, Result};

/// Upper bound on the argument vector, including the program itself.
pub const MAX_ARGUMENTS: usize = 512;

/// One parsed user command.
///
/// `arguments[0]` is always equal to `program`. The record is immutable
/// once built; the trailing `&` token is stripped during parsing, before
/// anyone looks at the argument list.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    /// The program to execute.
    pub program: String,
    /// The full argument vector, starting with the program name.
    pub arguments: Vec<String>,
    /// Redirect stdin from this file, if given.
    pub input_file: Option<String>,
    /// Redirect stdout to this file, if given.
    pub output_file: Option<String>,
    /// Run the command without waiting for it.
    pub background: bool,
}

impl Command {
    /// Parses an input line. Returns `Ok(None)` for blank lines.
    ///
    /// Tokens are whitespace-delimited. `<` and `>` each take the next
    /// token as a file name; a missing operand is a syntax error. A `&`
    /// marks background execution only when it is the final token,
    /// otherwise it is an ordinary argument.
    pub fn parse(input: &str) -> Result<Option<Command>> {
        let mut tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(None);
        }

        let background = tokens.last() == Some(&"&");
        if background {
            tokens.pop();
            if tokens.is_empty() {
                return Err(Error::syntax(input.trim()));
            }
        }

        let program = tokens[0].to_string();
        let mut arguments = vec![program.clone()];
        let mut input_file = None;
        let mut output_file = None;

        let mut iter = tokens[1..].iter();
        while let Some(&token) = iter.next() {
            match token {
                "<" => match iter.next() {
                    Some(&file) => input_file = Some(file.to_string()),
                    None => return Err(Error::syntax(input.trim())),
                },
                ">" => match iter.next() {
                    Some(&file) => output_file = Some(file.to_string()),
                    None => return Err(Error::syntax(input.trim())),
                },
                _ => arguments.push(token.to_string()),
            }
        }

        if arguments.len() > MAX_ARGUMENTS {
            return Err(Error::too_many_arguments(MAX_ARGUMENTS));
        }

        Ok(Some(Command {
            program,
            arguments,
            input_file,
            output_file,
            background,
        }))
    }

    /// Lines whose program starts with `#` are comments; the dispatcher
    /// ignores them without error.
    pub fn is_comment(&self) -> bool {
        self.program.starts_with('#')
    }
}
