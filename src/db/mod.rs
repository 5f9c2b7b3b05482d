//! Database abstraction layer
//!
//! One client interface over MySQL and PostgreSQL: connection string
//! construction, a single managed connection, meta-command rewriting and
//! text materialization of result sets.

pub mod client;
pub mod dsn;
pub mod manager;
pub mod mysql;
pub mod postgres;
pub mod session;
pub mod transform;
pub mod types;

// Re-export main types
pub use client::DbClient;
pub use dsn::build_dsn;
pub use manager::ConnectionManager;
pub use session::{Connector, DriverConnector, DriverSession, Session};
pub use transform::{MetaCommand, StatementTransformer};
pub use types::{CellValue, QueryResult, Row, StatementPlan};
