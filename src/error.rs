//! Error types for redline
//!
//! Library code returns the narrow enums (`DbError`, `ConfigError`,
//! `CommandError`); `RedlineError` is what the session loop deals in.
//! Only the binary edge uses `anyhow`.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum RedlineError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading the prompt or writing to the terminal failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Failures while connecting, rewriting or running a statement.
///
/// All of these are shown inline at the prompt; none ends the session.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The connection string could not be built from the options
    #[error("Failed to create connection string: {0}")]
    Dsn(#[from] ConfigError),

    /// Opening, pinging or re-opening the connection failed
    #[error("Failed to establish connection to database: {0}")]
    ConnectionFailed(String),

    /// Opening a connection to another database failed; the old one is kept
    #[error("Failed to switch database: {0}")]
    SwitchFailed(Box<DbError>),

    /// A meta-command referenced a table missing from the current schema
    #[error("Table {0} does not exist")]
    TableNotFound(String),

    /// The table existence probe itself failed
    #[error("Unable to validate that the table exists: {0}")]
    TableCheckFailed(Box<DbError>),

    /// A meta-command has no rewrite for the connection's flavor
    #[error("{command} not supported for {flavor}")]
    Unsupported {
        command: &'static str,
        flavor: String,
    },

    /// The server rejected the statement
    #[error("Query Failed: {0}")]
    QueryFailed(String),

    /// A row could not be read while draining the result set
    #[error("failed to read rows: {0}")]
    ReadFailed(String),
}

/// Problems with options, profiles or settings files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not locate the home directory for ~/.redline")]
    NoHomeDir,

    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("No saved connection named '{0}'")]
    ProfileNotFound(String),

    /// Neither MySQL nor PostgreSQL was selected
    #[error("Database type (ex: mysql, postgres) must be specified")]
    MissingFlavor,

    #[error("Unknown database type {0}")]
    UnknownFlavor(String),
}

/// Bad backslash command input
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Command needs an argument, see \\?")]
    MissingArgument,

    #[error("Bad argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, RedlineError>;
pub type DbResult<T> = std::result::Result<T, DbError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type CommandResult<T> = std::result::Result<T, CommandError>;
