//! Integration test runner
//!
//! These tests talk to real servers and skip themselves when the server is
//! unreachable. Run with: cargo test --test integration
//!
//! Environment variables (with defaults):
//! - TEST_PG_HOST: localhost
//! - TEST_PG_PORT: 5432
//! - TEST_PG_DATABASE: test_db
//! - TEST_PG_USER: test_user
//! - TEST_PG_PASSWORD: test_password
//! - TEST_MYSQL_HOST: 127.0.0.1
//! - TEST_MYSQL_PORT: 3306
//! - TEST_MYSQL_DATABASE: test_db
//! - TEST_MYSQL_USER: test_user
//! - TEST_MYSQL_PASSWORD: test_password

#[path = "integration/mysql_tests.rs"]
mod mysql_tests;
#[path = "integration/postgres_tests.rs"]
mod postgres_tests;

use redline::config::{ConnectionOptions, Flavor};
use redline::db::DbClient;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Options for a live server, read from `TEST_<prefix>_*`
fn live_options(flavor: Flavor, prefix: &str, host: &str, port: u16) -> ConnectionOptions {
    let mut options = ConnectionOptions::new(flavor);
    options.host = env_or(&format!("TEST_{}_HOST", prefix), host);
    options.port = std::env::var(format!("TEST_{}_PORT", prefix))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(port);
    options.database = env_or(&format!("TEST_{}_DATABASE", prefix), "test_db");
    options.user = env_or(&format!("TEST_{}_USER", prefix), "test_user");
    options.password = env_or(&format!("TEST_{}_PASSWORD", prefix), "test_password");
    options
}

/// Connect or explain why the test is being skipped
async fn connect_or_skip(options: ConnectionOptions) -> Option<DbClient> {
    let target = options.display_name();
    match DbClient::connect(options).await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping test: {} not available - {}", target, e);
            None
        }
    }
}
