//! Command-line arguments
//!
//! Flags describe a single connection. `--profile` starts from a saved
//! profile and any explicit flag overrides the matching field.

use crate::config::{ConnectionOptions, Flavor, find_connection};
use crate::error::ConfigResult;
use clap::{ArgAction, CommandFactory, Parser};

#[derive(Parser, Debug, Default)]
#[command(name = "redline", version)]
#[command(about = "Interactive terminal SQL client for MySQL and PostgreSQL")]
#[command(disable_help_flag = true)]
#[command(after_help = "Statements end with ';'. Type \\? at the prompt for client commands.")]
pub struct Cli {
    /// Print help (`-h` is the host)
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// MySQL database flavor
    #[arg(long, conflicts_with = "postgres")]
    pub mysql: bool,

    /// PostgreSQL database flavor
    #[arg(long, visible_alias = "psql")]
    pub postgres: bool,

    /// Database host - ex: localhost, remote.example.com, /var/run/mysqld/mysqld.sock
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Database name to connect to
    #[arg(short = 'd', long)]
    pub database: Option<String>,

    /// User name for logging into the database
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Password for logging into the database
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Port, defaults based on MySQL/PostgreSQL default port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// MySQL option to prevent unintended delete/updates
    #[arg(short = 's', long)]
    pub safe: bool,

    /// Additional driver options - ex: foo=bar,bar=baz (a bare key means true)
    #[arg(long = "additional-options", value_name = "KEY=VALUE,...")]
    pub additional_options: Vec<String>,

    /// Start from a profile saved in ~/.redline/connections.toml
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,
}

impl Cli {
    /// Flavor selected by `--mysql` / `--postgres`, if any
    pub fn flavor(&self) -> Option<Flavor> {
        if self.mysql {
            Some(Flavor::MySql)
        } else if self.postgres {
            Some(Flavor::Postgres)
        } else {
            None
        }
    }

    /// Resolve the connection options, loading `--profile` when given.
    ///
    /// The result is not validated; a missing flavor is reported by the
    /// caller so it can print usage.
    pub fn connection_options(&self) -> ConfigResult<ConnectionOptions> {
        let base = match &self.profile {
            Some(name) => find_connection(name)?,
            None => ConnectionOptions::default(),
        };
        Ok(self.apply_to(base))
    }

    /// Override `base` with every flag that was given
    pub fn apply_to(&self, mut options: ConnectionOptions) -> ConnectionOptions {
        if let Some(flavor) = self.flavor() {
            options.flavor = Some(flavor);
        }
        if let Some(host) = &self.host {
            options.host = host.clone();
        }
        if let Some(database) = &self.database {
            options.database = database.clone();
        }
        if let Some(user) = &self.user {
            options.user = user.clone();
        }
        if let Some(password) = &self.password {
            options.password = password.clone();
        }
        if let Some(port) = self.port {
            options.port = port;
        }
        options.safe_mode |= self.safe;
        for raw in &self.additional_options {
            options.add_options(raw);
        }
        options
    }

    /// One-line usage string for error output
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}
