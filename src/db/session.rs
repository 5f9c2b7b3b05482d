//! Driver seam
//!
//! A `Session` is one physical connection to a server. A `Connector` opens
//! sessions from a flavor and a DSN. The connection manager, transformer and
//! executor only ever talk to these traits, so tests can swap in a fake.

use crate::config::Flavor;
use crate::db::mysql::MySqlSession;
use crate::db::postgres::PgSession;
use crate::db::types::{QueryResult, StatementPlan};
use crate::error::DbResult;
use std::future::Future;

/// One live connection to a database server
pub trait Session: Send {
    /// Lightweight round-trip used to detect a dead connection
    fn ping(&mut self) -> impl Future<Output = DbResult<()>> + Send;

    /// Run a statement whose result (if any) is discarded
    fn execute(&mut self, sql: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Run a plan and materialize its result set as text cells.
    ///
    /// Returns `Ok(None)` when the statement produced no result set.
    fn query(
        &mut self,
        plan: &StatementPlan,
    ) -> impl Future<Output = DbResult<Option<QueryResult>>> + Send;

    /// Close the connection
    fn close(self) -> impl Future<Output = DbResult<()>> + Send
    where
        Self: Sized;
}

/// Opens new sessions
pub trait Connector: Send + Sync {
    type Session: Session;

    fn connect(
        &self,
        flavor: Flavor,
        dsn: &str,
    ) -> impl Future<Output = DbResult<Self::Session>> + Send;
}

/// Connector backed by the real MySQL and PostgreSQL drivers
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConnector;

/// A session opened by [`DriverConnector`]
pub enum DriverSession {
    MySql(MySqlSession),
    Postgres(PgSession),
}

impl Connector for DriverConnector {
    type Session = DriverSession;

    async fn connect(&self, flavor: Flavor, dsn: &str) -> DbResult<DriverSession> {
        match flavor {
            Flavor::MySql => MySqlSession::connect(dsn).await.map(DriverSession::MySql),
            Flavor::Postgres => PgSession::connect(dsn).await.map(DriverSession::Postgres),
        }
    }
}

impl Session for DriverSession {
    async fn ping(&mut self) -> DbResult<()> {
        match self {
            DriverSession::MySql(s) => s.ping().await,
            DriverSession::Postgres(s) => s.ping().await,
        }
    }

    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        match self {
            DriverSession::MySql(s) => s.execute(sql).await,
            DriverSession::Postgres(s) => s.execute(sql).await,
        }
    }

    async fn query(&mut self, plan: &StatementPlan) -> DbResult<Option<QueryResult>> {
        match self {
            DriverSession::MySql(s) => s.query(plan).await,
            DriverSession::Postgres(s) => s.query(plan).await,
        }
    }

    async fn close(self) -> DbResult<()> {
        match self {
            DriverSession::MySql(s) => s.close().await,
            DriverSession::Postgres(s) => s.close().await,
        }
    }
}
