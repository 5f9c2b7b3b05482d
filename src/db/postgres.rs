//! PostgreSQL session
//!
//! Concrete `Session` using tokio-postgres. Plans without parameters go
//! through the simple query protocol, where the server already sends every
//! value as text. Parameterized plans are only built for the catalog queries
//! behind the meta-commands, which cast every column to `text`.

use crate::db::session::Session;
use crate::db::types::{CellValue, QueryResult, StatementPlan};
use crate::error::{DbError, DbResult};
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};

/// PostgreSQL connection
pub struct PgSession {
    client: Client,
}

impl PgSession {
    /// Connect using a space separated `key=value` DSN
    pub async fn connect(dsn: &str) -> DbResult<Self> {
        let mut config: Config = dsn
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::ConnectionFailed(e.to_string()))?;
        if config.get_hosts().is_empty() {
            config.host("localhost");
        }
        if config.get_user().is_none() {
            if let Ok(user) = std::env::var("USER") {
                config.user(&user);
            }
        }

        let client = match config.get_ssl_mode() {
            SslMode::Disable => {
                let (client, connection) = config
                    .connect(NoTls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(pg_message(&e)))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::warn!("postgres connection closed: {}", e);
                    }
                });
                client
            }
            _ => {
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(make_tls_config());
                let (client, connection) = config
                    .connect(tls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(pg_message(&e)))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::warn!("postgres connection closed: {}", e);
                    }
                });
                client
            }
        };

        tracing::debug!("postgres session opened");
        Ok(Self { client })
    }

    async fn simple(&mut self, sql: &str) -> DbResult<Option<QueryResult>> {
        let messages = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| DbError::QueryFailed(pg_message(&e)))?;

        // With several statements the last result set wins
        let mut result: Option<QueryResult> = None;
        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    let names = columns.iter().map(|c| c.name().to_string()).collect();
                    result = Some(QueryResult::new(names));
                }
                SimpleQueryMessage::Row(row) => {
                    let target = result.get_or_insert_with(|| {
                        QueryResult::new(
                            row.columns().iter().map(|c| c.name().to_string()).collect(),
                        )
                    });
                    target.push_row(
                        (0..row.len()).map(|i| CellValue::from(row.get(i).map(str::to_string))),
                    );
                }
                _ => {}
            }
        }
        Ok(result)
    }

    async fn prepared(&mut self, plan: &StatementPlan) -> DbResult<Option<QueryResult>> {
        let stmt = self
            .client
            .prepare(&plan.sql)
            .await
            .map_err(|e| DbError::QueryFailed(pg_message(&e)))?;
        let params = bind_params(&plan.params);
        if stmt.columns().is_empty() {
            self.client
                .execute(&stmt, &params)
                .await
                .map_err(|e| DbError::QueryFailed(pg_message(&e)))?;
            return Ok(None);
        }

        let rows = self
            .client
            .query(&stmt, &params)
            .await
            .map_err(|e| DbError::QueryFailed(pg_message(&e)))?;

        let mut result =
            QueryResult::new(stmt.columns().iter().map(|c| c.name().to_string()).collect());
        for row in &rows {
            result.push_row((0..row.len()).map(|i| text_cell(row, i)));
        }
        Ok(Some(result))
    }
}

impl Session for PgSession {
    async fn ping(&mut self) -> DbResult<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| DbError::ConnectionFailed(pg_message(&e)))
    }

    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| DbError::QueryFailed(pg_message(&e)))
    }

    async fn query(&mut self, plan: &StatementPlan) -> DbResult<Option<QueryResult>> {
        if plan.params.is_empty() {
            self.simple(&plan.sql).await
        } else {
            self.prepared(plan).await
        }
    }

    async fn close(self) -> DbResult<()> {
        // Dropping the client ends the spawned connection task
        drop(self.client);
        tracing::debug!("postgres session closed");
        Ok(())
    }
}

fn bind_params(params: &[String]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Prefer the server's own message over the driver's wrapper text
fn pg_message(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => db.message().to_string(),
        None => e.to_string(),
    }
}

/// Build a rustls ClientConfig that trusts OS certificates (with Mozilla roots as fallback)
fn make_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    let native_certs = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native_certs.certs {
        if root_store.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Cell of a text column; anything else is shown as a placeholder naming its type
fn text_cell(row: &tokio_postgres::Row, idx: usize) -> CellValue {
    match row.try_get::<_, Option<String>>(idx) {
        Ok(v) => v.into(),
        Err(_) => {
            let type_name = row
                .columns()
                .get(idx)
                .map_or("unknown", |c| c.type_().name());
            CellValue::Text(format!("<unable to display: {}>", type_name))
        }
    }
}
