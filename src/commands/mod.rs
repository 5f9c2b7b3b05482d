//! Client commands
//!
//! Handles the backslash commands typed at the prompt (`\q`, `\use`, ...)

pub mod parser;

pub use parser::{Command, HELP_TEXT, is_command, parse_command};
