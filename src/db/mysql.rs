//! MySQL session
//!
//! Concrete `Session` using a single sqlx `MySqlConnection`. Statements run
//! over the text protocol, so every cell arrives as the server's own text
//! rendering and is kept byte-for-byte. MySQL handles the meta-commands
//! natively, so plans never carry parameters here.

use crate::db::dsn::query_unescape;
use crate::db::session::Session;
use crate::db::types::{CellValue, QueryResult, StatementPlan};
use crate::error::{DbError, DbResult};
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::{Column, Connection, Either, Executor, Row, Statement};

/// The pieces of a `user:password@net(address)/database?k=v` DSN
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MySqlDsn {
    pub user: String,
    pub password: String,
    pub net: String,
    pub address: String,
    pub database: String,
    pub params: Vec<(String, String)>,
}

impl MySqlDsn {
    /// Split a DSN into its parts. Parameter values are unescaped.
    pub fn parse(dsn: &str) -> DbResult<Self> {
        let slash = dsn
            .rfind('/')
            .ok_or_else(|| DbError::ConnectionFailed("invalid DSN, missing '/'".to_string()))?;
        let (head, tail) = (&dsn[..slash], &dsn[slash + 1..]);

        let mut parsed = MySqlDsn::default();

        let target = match head.rfind('@') {
            Some(at) => {
                let credentials = &head[..at];
                match credentials.split_once(':') {
                    Some((user, password)) => {
                        parsed.user = user.to_string();
                        parsed.password = password.to_string();
                    }
                    None => parsed.user = credentials.to_string(),
                }
                &head[at + 1..]
            }
            None => head,
        };

        if !target.is_empty() {
            match target.find('(') {
                Some(open) => {
                    let close = target.rfind(')').filter(|&c| c > open).ok_or_else(|| {
                        DbError::ConnectionFailed("invalid DSN, unclosed address".to_string())
                    })?;
                    parsed.net = target[..open].to_string();
                    parsed.address = target[open + 1..close].to_string();
                }
                None => parsed.net = target.to_string(),
            }
        }

        let (database, query) = tail.split_once('?').unwrap_or((tail, ""));
        parsed.database = database.to_string();
        parsed.params = query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_string(), query_unescape(value))
            })
            .collect();

        Ok(parsed)
    }

    /// Translate into sqlx connect options
    pub fn connect_options(&self) -> DbResult<MySqlConnectOptions> {
        let mut options = MySqlConnectOptions::new();

        match self.net.as_str() {
            "" => {}
            "tcp" => {
                let (host, port) = split_host_port(&self.address)?;
                options = options.host(host);
                if let Some(port) = port {
                    options = options.port(port);
                }
            }
            "unix" => options = options.socket(&self.address),
            other => {
                return Err(DbError::ConnectionFailed(format!(
                    "unsupported network type: {other}"
                )));
            }
        }

        if !self.user.is_empty() {
            options = options.username(&self.user);
        }
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        if !self.database.is_empty() {
            options = options.database(&self.database);
        }

        for (key, value) in &self.params {
            match key.as_str() {
                "tls" => match tls_mode(value) {
                    Some(mode) => options = options.ssl_mode(mode),
                    None => tracing::warn!("ignoring unknown tls mode {:?}", value),
                },
                "charset" => options = options.charset(value),
                "collation" => options = options.collation(value),
                _ => tracing::warn!("ignoring unsupported MySQL option {}={}", key, value),
            }
        }

        Ok(options)
    }
}

/// Split `host[:port]`, allowing a bracketed IPv6 literal
fn split_host_port(address: &str) -> DbResult<(&str, Option<u16>)> {
    let bad_port = |p: &str| DbError::ConnectionFailed(format!("invalid port: {p}"));

    if let Some(rest) = address.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| DbError::ConnectionFailed(format!("invalid address: {address}")))?;
        return match after.strip_prefix(':') {
            Some(p) => Ok((host, Some(p.parse().map_err(|_| bad_port(p))?))),
            None => Ok((host, None)),
        };
    }

    match address.rsplit_once(':') {
        Some((host, p)) => Ok((host, Some(p.parse().map_err(|_| bad_port(p))?))),
        None => Ok((address, None)),
    }
}

fn tls_mode(value: &str) -> Option<MySqlSslMode> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "verify_identity" => Some(MySqlSslMode::VerifyIdentity),
        "verify_ca" => Some(MySqlSslMode::VerifyCa),
        "skip-verify" | "required" => Some(MySqlSslMode::Required),
        "preferred" => Some(MySqlSslMode::Preferred),
        "false" | "0" | "disabled" => Some(MySqlSslMode::Disabled),
        _ => None,
    }
}

/// MySQL connection
pub struct MySqlSession {
    conn: MySqlConnection,
}

impl MySqlSession {
    pub async fn connect(dsn: &str) -> DbResult<Self> {
        let options = MySqlDsn::parse(dsn)?.connect_options()?;
        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| DbError::ConnectionFailed(mysql_message(&e)))?;
        tracing::debug!("mysql session opened");
        Ok(Self { conn })
    }

    /// Column names of a statement without running it
    async fn describe_columns(&mut self, sql: &str) -> Option<Vec<String>> {
        match (&mut self.conn).prepare(sql).await {
            Ok(stmt) if !stmt.columns().is_empty() => Some(column_names(stmt.columns())),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("could not describe statement: {}", e);
                None
            }
        }
    }

    async fn text(&mut self, sql: &str) -> DbResult<Option<QueryResult>> {
        let mut last: Option<QueryResult> = None;
        let mut current: Option<QueryResult> = None;
        let mut statements = 0usize;

        {
            let mut stream = sqlx::raw_sql(sql).fetch_many(&mut self.conn);
            while let Some(item) = stream
                .try_next()
                .await
                .map_err(|e| DbError::QueryFailed(mysql_message(&e)))?
            {
                match item {
                    Either::Left(_) => {
                        statements += 1;
                        if let Some(done) = current.take() {
                            last = Some(done);
                        }
                    }
                    Either::Right(row) => {
                        let target = current
                            .get_or_insert_with(|| QueryResult::new(column_names(row.columns())));
                        target.push_row(text_cells(&row)?);
                    }
                }
            }
        }
        if let Some(done) = current {
            last = Some(done);
        }

        // A result set with no rows sends no row to take column names from
        if last.is_none() && statements <= 1 {
            return Ok(self.describe_columns(sql).await.map(QueryResult::new));
        }
        Ok(last)
    }
}

impl Session for MySqlSession {
    async fn ping(&mut self) -> DbResult<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| DbError::ConnectionFailed(mysql_message(&e)))
    }

    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        (&mut self.conn)
            .execute(sqlx::raw_sql(sql))
            .await
            .map(|_| ())
            .map_err(|e| DbError::QueryFailed(mysql_message(&e)))
    }

    async fn query(&mut self, plan: &StatementPlan) -> DbResult<Option<QueryResult>> {
        let sql = literal_sql(plan)?;
        self.text(sql).await
    }

    async fn close(self) -> DbResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| DbError::ConnectionFailed(mysql_message(&e)))?;
        tracing::debug!("mysql session closed");
        Ok(())
    }
}

fn column_names<C: Column>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

/// Prefer the server's own message over the driver's wrapper text
fn mysql_message(e: &sqlx::Error) -> String {
    match e {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

/// Text-protocol cells as the server rendered them
fn text_cells(row: &MySqlRow) -> DbResult<Vec<CellValue>> {
    (0..row.len()).map(|i| raw_text(row, i)).collect()
}

fn raw_text(row: &MySqlRow, idx: usize) -> DbResult<CellValue> {
    row.try_get_unchecked::<Option<Vec<u8>>, _>(idx)
        .map(|v| {
            v.map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .into()
        })
        .map_err(|e| DbError::ReadFailed(e.to_string()))
}

/// SQL of a plan without bound parameters
fn literal_sql(plan: &StatementPlan) -> DbResult<&str> {
    if plan.params.is_empty() {
        Ok(&plan.sql)
    } else {
        Err(DbError::QueryFailed(
            "bound parameters are not supported on MySQL sessions".to_string(),
        ))
    }
}
