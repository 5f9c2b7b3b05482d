//! Connection configuration
//!
//! `ConnectionOptions` is the single input the database layer is built from.
//! Named profiles of these options can be stored in ~/.redline/connections.toml

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which database engine a connection targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Flavor {
    MySql,
    Postgres,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::MySql => "mysql",
            Flavor::Postgres => "postgres",
        }
    }

    /// Value substituted for an additional option written without a value
    pub fn true_token(&self) -> &'static str {
        match self {
            Flavor::MySql => "true",
            Flavor::Postgres => "1",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Flavor::MySql),
            "postgres" | "postgresql" | "psql" | "pgx" => Ok(Flavor::Postgres),
            other => Err(ConfigError::UnknownFlavor(other.to_string())),
        }
    }
}

impl TryFrom<String> for Flavor {
    type Error = ConfigError;

    fn try_from(value: String) -> ConfigResult<Self> {
        value.parse()
    }
}

impl From<Flavor> for String {
    fn from(flavor: Flavor) -> Self {
        flavor.as_str().to_string()
    }
}

/// Everything needed to reach a database server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// Target engine; `None` until the user picks one
    #[serde(default)]
    pub flavor: Option<Flavor>,

    /// Host name, or a Unix socket path when it starts with `/` or `@`
    #[serde(default)]
    pub host: String,

    /// Database name
    #[serde(default)]
    pub database: String,

    /// Username
    #[serde(default)]
    pub user: String,

    /// Password
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Port (0 = driver default)
    #[serde(default)]
    pub port: u16,

    /// Reject UPDATE/DELETE without a key-based WHERE clause (MySQL only)
    #[serde(default)]
    pub safe_mode: bool,

    /// Extra driver options; an empty value means "enabled"
    #[serde(default)]
    pub additional_options: BTreeMap<String, String>,
}

impl ConnectionOptions {
    /// Options for `flavor` with everything else left at its default
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor: Some(flavor),
            ..Self::default()
        }
    }

    /// Ensure a known flavor has been selected
    pub fn validate(&self) -> ConfigResult<Flavor> {
        self.flavor.ok_or(ConfigError::MissingFlavor)
    }

    /// Parse `key=value,flag,other=` pairs into `additional_options`.
    ///
    /// A key without `=` (or with nothing after it) is stored with an empty
    /// value, which the DSN builder later turns into the flavor's "true".
    pub fn add_options(&mut self, raw: &str) {
        for pair in raw.split(',').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.additional_options
                .insert(key.to_string(), value.to_string());
        }
    }

    /// Short label used for the prompt and log lines
    pub fn display_name(&self) -> String {
        let flavor = self.flavor.map_or("?", |f| f.as_str());
        let host = if self.host.is_empty() {
            "localhost"
        } else {
            &self.host
        };
        if self.database.is_empty() {
            format!("{}@{}", flavor, host)
        } else {
            format!("{}@{}/{}", flavor, host, self.database)
        }
    }

    /// Get the config directory path (~/.redline/)
    pub fn config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".redline"))
    }

    /// Get the connections file path
    pub fn connections_file() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join("connections.toml"))
    }
}

/// A named set of connection options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Connection profile name
    pub name: String,

    #[serde(flatten)]
    pub options: ConnectionOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConnectionsFile {
    #[serde(default)]
    connections: Vec<ConnectionProfile>,
}

/// Load all connection profiles from config file
pub fn load_connections() -> ConfigResult<Vec<ConnectionProfile>> {
    load_connections_from(&ConnectionOptions::connections_file()?)
}

fn load_connections_from(path: &Path) -> ConfigResult<Vec<ConnectionProfile>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    let file: ConnectionsFile = toml::from_str(&content)?;
    Ok(file.connections)
}

/// Find a connection by name
pub fn find_connection(name: &str) -> ConfigResult<ConnectionOptions> {
    find_in(load_connections()?, name)
}

fn find_in(profiles: Vec<ConnectionProfile>, name: &str) -> ConfigResult<ConnectionOptions> {
    profiles
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.options)
        .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
}
