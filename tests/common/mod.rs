//! Common test utilities and helpers
//!
//! An in-memory `Connector` that records everything the client does, so the
//! connection lifecycle and statement flow can be checked without a server.

#![allow(dead_code)]

use redline::config::{ConnectionOptions, Flavor};
use redline::db::transform::PG_TABLE_EXISTS_SQL;
use redline::db::{CellValue, Connector, QueryResult, Session, StatementPlan};
use redline::error::{DbError, DbResult};
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the fake driver saw, plus knobs to make it misbehave
#[derive(Default)]
pub struct FakeState {
    /// DSN of every successful connect, in order
    pub dsns: Vec<String>,
    /// `Session::execute` calls as (session id, sql)
    pub executed: Vec<(usize, String)>,
    /// `Session::query` calls as (session id, plan)
    pub queries: Vec<(usize, StatementPlan)>,
    pub pings: usize,
    pub closed: Vec<usize>,

    /// Reject every connect attempt
    pub fail_connect: bool,
    /// Fail the next ping only
    pub fail_next_ping: bool,
    /// Fail `execute` (used by safe mode)
    pub fail_execute: bool,
    /// Fail every non-probe query with this server message
    pub query_error: Option<String>,
    /// Tables the existence probe reports as present
    pub tables: Vec<String>,
    /// Returned for every non-probe query
    pub result: Option<QueryResult>,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_result(&self, result: Option<QueryResult>) {
        self.state().result = result;
    }

    /// Number of sessions opened so far
    pub fn opened(&self) -> usize {
        self.state().dsns.len()
    }

    /// SQL of every query plan, oldest first
    pub fn query_sql(&self) -> Vec<String> {
        self.state()
            .queries
            .iter()
            .map(|(_, plan)| plan.sql.clone())
            .collect()
    }
}

pub struct FakeSession {
    id: usize,
    state: Arc<Mutex<FakeState>>,
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self, _flavor: Flavor, dsn: &str) -> DbResult<FakeSession> {
        let mut state = self.state();
        if state.fail_connect {
            return Err(DbError::ConnectionFailed("connection refused".to_string()));
        }
        state.dsns.push(dsn.to_string());
        Ok(FakeSession {
            id: state.dsns.len(),
            state: Arc::clone(&self.state),
        })
    }
}

impl Session for FakeSession {
    async fn ping(&mut self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.pings += 1;
        if std::mem::take(&mut state.fail_next_ping) {
            return Err(DbError::ConnectionFailed("server has gone away".to_string()));
        }
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.executed.push((self.id, sql.to_string()));
        if state.fail_execute {
            return Err(DbError::QueryFailed("access denied".to_string()));
        }
        Ok(())
    }

    async fn query(&mut self, plan: &StatementPlan) -> DbResult<Option<QueryResult>> {
        let mut state = self.state.lock().unwrap();
        state.queries.push((self.id, plan.clone()));

        if plan.sql == PG_TABLE_EXISTS_SQL {
            let exists = plan.params.first().is_some_and(|t| state.tables.contains(t));
            let mut result = QueryResult::new(vec!["exists".to_string()]);
            result.push_row(vec![CellValue::from(if exists { "true" } else { "false" })]);
            return Ok(Some(result));
        }
        if let Some(message) = &state.query_error {
            return Err(DbError::QueryFailed(message.clone()));
        }
        Ok(state.result.clone())
    }

    async fn close(self) -> DbResult<()> {
        self.state.lock().unwrap().closed.push(self.id);
        Ok(())
    }
}

/// MySQL options pointing at a made-up server
pub fn mysql_options() -> ConnectionOptions {
    let mut options = ConnectionOptions::new(Flavor::MySql);
    options.host = "db.test".to_string();
    options.user = "app".to_string();
    options.database = "shop".to_string();
    options
}

/// PostgreSQL options pointing at a made-up server
pub fn postgres_options() -> ConnectionOptions {
    let mut options = ConnectionOptions::new(Flavor::Postgres);
    options.host = "db.test".to_string();
    options.user = "app".to_string();
    options.database = "shop".to_string();
    options
}

/// Two columns, two rows, one NULL
pub fn users_result() -> QueryResult {
    let mut result = QueryResult::new(vec!["id".to_string(), "name".to_string()]);
    result.push_row(vec![CellValue::from("1"), CellValue::from("Alice")]);
    result.push_row(vec![CellValue::from("2"), CellValue::Null]);
    result
}
