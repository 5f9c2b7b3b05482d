//! Single-connection lifecycle
//!
//! The manager owns at most one live session. It is not synchronized: the
//! interactive loop runs one statement at a time and holds `&mut` for the
//! duration.

use crate::config::{ConnectionOptions, Flavor};
use crate::db::dsn::build_dsn;
use crate::db::session::{Connector, DriverConnector, Session};
use crate::error::{DbError, DbResult};

/// Session command that rejects key-less UPDATE/DELETE on MySQL
pub const SAFE_UPDATES_SQL: &str = "SET SQL_SAFE_UPDATES = 1";

pub struct ConnectionManager<C: Connector = DriverConnector> {
    options: ConnectionOptions,
    flavor: Flavor,
    connector: C,
    session: Option<C::Session>,
}

impl ConnectionManager<DriverConnector> {
    /// Manager backed by the real drivers; connects on first use
    pub fn new(options: ConnectionOptions) -> DbResult<Self> {
        Self::with_connector(options, DriverConnector)
    }
}

impl<C: Connector> ConnectionManager<C> {
    /// Validate the options and prepare a manager without connecting
    pub fn with_connector(options: ConnectionOptions, connector: C) -> DbResult<Self> {
        let flavor = options.validate()?;
        Ok(Self {
            options,
            flavor,
            connector,
            session: None,
        })
    }

    /// Like [`with_connector`](Self::with_connector) but opens the session immediately
    pub async fn connect(options: ConnectionOptions, connector: C) -> DbResult<Self> {
        let mut manager = Self::with_connector(options, connector)?;
        manager.get_connection().await?;
        Ok(manager)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Whether a session is currently held (it may still be stale)
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Return the live session, reconnecting if the held one fails a ping
    pub async fn get_connection(&mut self) -> DbResult<&mut C::Session> {
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.ping().await {
                tracing::warn!("connection to {} went stale: {}", self.options.display_name(), e);
                if let Some(stale) = self.session.take() {
                    if let Err(e) = stale.close().await {
                        tracing::debug!("closing stale connection: {}", e);
                    }
                }
            }
        }

        if self.session.is_none() {
            let session = self.open(&self.options).await?;
            self.session = Some(session);
        }

        self.session
            .as_mut()
            .ok_or_else(|| DbError::ConnectionFailed("no connection available".to_string()))
    }

    /// Switch to another database.
    ///
    /// The new session is opened before the old one is closed; on failure the
    /// current session and database name are left untouched.
    pub async fn use_database(&mut self, name: &str) -> DbResult<()> {
        let mut target = self.options.clone();
        target.database = name.to_string();

        let session = self
            .open(&target)
            .await
            .map_err(|e| DbError::SwitchFailed(Box::new(e)))?;

        if let Some(old) = self.session.replace(session) {
            if let Err(e) = old.close().await {
                tracing::debug!("closing previous connection: {}", e);
            }
        }
        self.options = target;
        tracing::info!("switched to {}", self.options.display_name());
        Ok(())
    }

    /// Close the session if one is open. Safe to call repeatedly.
    pub async fn destroy(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.close().await {
                tracing::debug!("closing connection: {}", e);
            }
            tracing::info!("disconnected from {}", self.options.display_name());
        }
    }

    /// Open one physical connection and prepare its session state
    async fn open(&self, options: &ConnectionOptions) -> DbResult<C::Session> {
        let dsn = build_dsn(options)?;
        let mut session = self.connector.connect(self.flavor, &dsn).await?;
        tracing::info!("connected to {}", options.display_name());

        if options.safe_mode && self.flavor == Flavor::MySql {
            if let Err(e) = session.execute(SAFE_UPDATES_SQL).await {
                let _ = session.close().await;
                return Err(DbError::ConnectionFailed(format!(
                    "failed to enable safe updates: {}",
                    e
                )));
            }
        }

        Ok(session)
    }
}
