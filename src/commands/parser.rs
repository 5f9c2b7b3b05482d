//! Command parsing
//!
//! Input lines starting with `\` are client commands rather than SQL,
//! e.g. `\q`, `\use shop`, `\copy json`.

use crate::error::{CommandError, CommandResult};
use crate::export::ExportFormat;
use std::path::PathBuf;

/// Prefix that marks a client command
pub const COMMAND_PREFIX: char = '\\';

pub const HELP_TEXT: &str = "\
Statements run when the input ends with ';'.

  \\q                       quit
  \\?                       show this help
  \\c <database>            switch to another database (also \\use)
  \\copy csv|json           copy the last result to the clipboard
  \\export csv|json <file>  write the last result to a file
  \\history                 list previous statements

DESCRIBE <table>, SHOW TABLES and SHOW INDEXES FROM <table> work on both
MySQL and PostgreSQL.";

/// Commands understood by the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    /// Reconnect to the named database
    UseDatabase(String),
    /// Copy the last result to the clipboard
    Copy(ExportFormat),
    /// Write the last result to a file
    Export(ExportFormat, PathBuf),
    History,
}

/// Whether `input` should be parsed as a command instead of run as SQL
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with(COMMAND_PREFIX)
}

/// Parse a command string into a Command enum
pub fn parse_command(input: &str) -> CommandResult<Command> {
    let input = input.trim();
    let input = input.strip_prefix(COMMAND_PREFIX).unwrap_or(input);
    let input = input.trim_end_matches(';');
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some((&name, args)) = parts.split_first() else {
        return Err(CommandError::Unknown(String::new()));
    };

    match name {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "?" | "h" | "help" => Ok(Command::Help),
        "c" | "connect" | "use" => match args {
            [db] => Ok(Command::UseDatabase(db.trim_matches('"').to_string())),
            [] => Err(CommandError::MissingArgument),
            _ => Err(CommandError::InvalidArgument(
                "expected a single database name".to_string(),
            )),
        },
        "copy" => match args {
            [format] => Ok(Command::Copy(format.parse()?)),
            [] => Err(CommandError::MissingArgument),
            _ => Err(CommandError::InvalidArgument(
                "usage: \\copy csv|json".to_string(),
            )),
        },
        "export" => match args {
            [format, path] => Ok(Command::Export(format.parse()?, PathBuf::from(*path))),
            [] | [_] => Err(CommandError::MissingArgument),
            _ => Err(CommandError::InvalidArgument(
                "usage: \\export csv|json <file>".to_string(),
            )),
        },
        "history" => Ok(Command::History),
        unknown => Err(CommandError::Unknown(unknown.to_string())),
    }
}
