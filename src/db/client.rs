//! Query entry point
//!
//! `DbClient` ties the connection manager and the statement transformer
//! together behind one call per committed statement.

use crate::config::{ConnectionOptions, Flavor};
use crate::db::manager::ConnectionManager;
use crate::db::session::{Connector, DriverConnector, Session};
use crate::db::transform::StatementTransformer;
use crate::db::types::QueryResult;
use crate::error::DbResult;

pub struct DbClient<C: Connector = DriverConnector> {
    manager: ConnectionManager<C>,
    transformer: StatementTransformer,
}

impl DbClient<DriverConnector> {
    /// Client for the real drivers. Connects eagerly so bad credentials
    /// surface before the interactive session starts.
    pub async fn connect(options: ConnectionOptions) -> DbResult<Self> {
        Self::connect_with(options, DriverConnector).await
    }
}

impl<C: Connector> DbClient<C> {
    pub async fn connect_with(options: ConnectionOptions, connector: C) -> DbResult<Self> {
        let manager = ConnectionManager::connect(options, connector).await?;
        Ok(Self::from_manager(manager))
    }

    /// Wrap an existing manager; no connection is opened until the first query
    pub fn from_manager(manager: ConnectionManager<C>) -> Self {
        let transformer = StatementTransformer::new(manager.flavor());
        Self {
            manager,
            transformer,
        }
    }

    /// Run one statement.
    ///
    /// `Ok(None)` means the statement succeeded without producing a result
    /// set. A result set with zero rows is `Ok(Some(..))` with empty `rows`.
    pub async fn query(&mut self, statement: &str) -> DbResult<Option<QueryResult>> {
        let session = self.manager.get_connection().await?;
        let plan = self.transformer.transform(statement, session).await?;
        tracing::debug!(sql = %plan.sql, params = plan.params.len(), "executing");
        session.query(&plan).await
    }

    /// Switch the connection to another database
    pub async fn use_database(&mut self, name: &str) -> DbResult<()> {
        self.manager.use_database(name).await
    }

    pub fn flavor(&self) -> Flavor {
        self.manager.flavor()
    }

    pub fn options(&self) -> &ConnectionOptions {
        self.manager.options()
    }

    pub fn manager(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    /// Release the connection. Must be awaited before exit.
    pub async fn destroy(&mut self) {
        self.manager.destroy().await;
    }
}
