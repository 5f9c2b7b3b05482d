//! redline - An interactive terminal SQL client for MySQL and PostgreSQL
//!
//! redline gives one prompt for both servers. Statements are sent to the
//! server as typed, except for a few MySQL-style meta-commands which are
//! rewritten for PostgreSQL so they behave the same everywhere.
//!
//! # Features
//!
//! - **One client, two servers**: MySQL via sqlx, PostgreSQL via tokio-postgres
//! - **Portable meta-commands**: `DESCRIBE t`, `SHOW TABLES`, `SHOW INDEXES FROM t`
//! - **Text results**: every cell is text or NULL, regardless of column type
//! - **Export**: copy or save the last result as CSV or JSON
//! - **Safe mode**: MySQL `SQL_SAFE_UPDATES` on every new connection
//!
//! # Architecture
//!
//! - [`config`]: Connection options, saved profiles and settings
//! - [`db`]: DSN building, connection management, statement rewriting, execution
//! - [`export`]: CSV / JSON rendering of results
//! - [`commands`]: Backslash commands typed at the prompt
//! - [`history`]: Statement history
//! - [`ui`]: Line prompt and result grid
//! - [`app`]: The interactive session
//! - [`cli`]: Command-line arguments
//! - [`logging`]: File-based tracing setup
//! - [`error`]: Error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use redline::config::{ConnectionOptions, Flavor};
//! use redline::db::DbClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut options = ConnectionOptions::new(Flavor::Postgres);
//! options.host = "localhost".to_string();
//! options.database = "shop".to_string();
//!
//! let mut client = DbClient::connect(options).await?;
//!
//! // Rewritten into an information_schema query on PostgreSQL
//! if let Some(result) = client.query("DESCRIBE orders").await? {
//!     println!("{}", redline::export::to_csv(&result));
//! }
//!
//! client.destroy().await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod history;
pub mod logging;
pub mod ui;

pub use error::{CommandError, ConfigError, DbError, RedlineError, Result};
