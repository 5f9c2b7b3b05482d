//! Connection string construction
//!
//! MySQL DSNs use the `user:password@net(address)/database?k=v` shape;
//! PostgreSQL DSNs are space separated `key=value` pairs.

use crate::config::{ConnectionOptions, Flavor};
use crate::error::ConfigResult;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters left as-is in a query string value
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// How the driver reaches the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// No host given; the driver picks its default
    Default,
    Tcp,
    /// Filesystem (`/...`) or abstract (`@...`) Unix domain socket
    Unix,
}

impl Transport {
    pub fn for_host(host: &str) -> Self {
        match host.chars().next() {
            None => Transport::Default,
            Some('/') | Some('@') => Transport::Unix,
            Some(_) => Transport::Tcp,
        }
    }

    /// Network name used in MySQL DSNs
    pub fn net(&self) -> &'static str {
        match self {
            Transport::Default => "",
            Transport::Tcp => "tcp",
            Transport::Unix => "unix",
        }
    }
}

/// Build the flavor-specific connection string for `options`
pub fn build_dsn(options: &ConnectionOptions) -> ConfigResult<String> {
    let flavor = options.validate()?;
    Ok(match flavor {
        Flavor::MySql => mysql_dsn(options),
        Flavor::Postgres => postgres_dsn(options),
    })
}

fn mysql_dsn(options: &ConnectionOptions) -> String {
    let transport = Transport::for_host(&options.host);
    let mut dsn = String::new();

    // Credentials are written only when a user is set
    if !options.user.is_empty() {
        dsn.push_str(&options.user);
        if !options.password.is_empty() {
            dsn.push(':');
            dsn.push_str(&options.password);
        }
        dsn.push('@');
    }

    if transport != Transport::Default {
        dsn.push_str(transport.net());
        dsn.push('(');
        dsn.push_str(&options.host);
        if options.port != 0 && transport == Transport::Tcp {
            dsn.push_str(&format!(":{}", options.port));
        }
        dsn.push(')');
    }

    dsn.push('/');
    dsn.push_str(&options.database);

    let params: Vec<String> = additional_options(options, Flavor::MySql)
        .map(|(key, value)| format!("{}={}", key, query_escape(value)))
        .collect();
    if !params.is_empty() {
        dsn.push('?');
        dsn.push_str(&params.join("&"));
    }

    dsn
}

fn postgres_dsn(options: &ConnectionOptions) -> String {
    let port = (options.port != 0).then(|| options.port.to_string());
    let required = [
        ("host", Some(options.host.as_str())),
        ("port", port.as_deref()),
        ("dbname", Some(options.database.as_str())),
        ("user", Some(options.user.as_str())),
        ("password", Some(options.password.as_str())),
    ];

    let mut parts: Vec<String> = required
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    parts.extend(
        additional_options(options, Flavor::Postgres)
            .map(|(key, value)| format!("{}={}", key, value)),
    );

    parts.join(" ")
}

/// Additional options with empty values replaced by the flavor's "true"
fn additional_options(
    options: &ConnectionOptions,
    flavor: Flavor,
) -> impl Iterator<Item = (&str, &str)> {
    options.additional_options.iter().map(move |(key, value)| {
        let value = if value.is_empty() {
            flavor.true_token()
        } else {
            value.as_str()
        };
        (key.as_str(), value)
    })
}

/// Form-style escaping: spaces become `+`, reserved bytes become `%XX`
pub(crate) fn query_escape(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE)
        .to_string()
        .replace("%20", "+")
}

/// Inverse of [`query_escape`]
pub(crate) fn query_unescape(value: &str) -> String {
    percent_decode_str(&value.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
