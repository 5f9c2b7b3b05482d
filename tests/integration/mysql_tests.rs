//! Integration tests against a live MySQL server

use super::{connect_or_skip, live_options};
use redline::config::{ConnectionOptions, Flavor};
use redline::db::CellValue;
use redline::error::DbError;
use redline::export::to_csv;

fn test_options() -> ConnectionOptions {
    live_options(Flavor::MySql, "MYSQL", "127.0.0.1", 3306)
}

#[tokio::test]
async fn test_select_materializes_text() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    let result = client
        .query("SELECT 1 AS num, 'hello' AS msg, NULL AS nothing, 2.50 AS price")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.columns, vec!["num", "msg", "nothing", "price"]);
    assert_eq!(result.cell(0, "num"), Some(&CellValue::from("1")));
    assert_eq!(result.cell(0, "msg"), Some(&CellValue::from("hello")));
    assert_eq!(result.cell(0, "nothing"), Some(&CellValue::Null));
    assert_eq!(result.cell(0, "price"), Some(&CellValue::from("2.50")));
    assert_eq!(to_csv(&result), "num,msg,nothing,price\n1,hello,NULL,2.50");

    client.destroy().await;
}

#[tokio::test]
async fn test_zero_rows_keeps_columns() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    let result = client
        .query("SELECT 1 AS a, 2 AS b FROM DUAL WHERE 1 = 0")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.columns, vec!["a", "b"]);
    assert!(result.is_empty());

    // Statements from the prompt always end with the terminator
    let result = client
        .query("SELECT 1 AS a, 2 AS b FROM DUAL WHERE 1 = 0;")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.columns, vec!["a", "b"]);
    assert!(result.is_empty());

    client.destroy().await;
}

#[tokio::test]
async fn test_meta_commands_run_natively() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    client
        .query("DROP TABLE IF EXISTS redline_describe")
        .await
        .unwrap();
    client
        .query("CREATE TABLE redline_describe (id INT PRIMARY KEY, name VARCHAR(20))")
        .await
        .unwrap();

    let describe = client.query("DESCRIBE redline_describe;").await.unwrap().unwrap();
    assert_eq!(describe.row_count(), 2);
    assert_eq!(describe.cell(0, "Field"), Some(&CellValue::from("id")));
    assert_eq!(describe.cell(0, "Key"), Some(&CellValue::from("PRI")));

    let tables = client.query("SHOW TABLES").await.unwrap().unwrap();
    assert!(!tables.is_empty());

    let indexes = client
        .query("SHOW INDEXES FROM redline_describe")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(indexes.row_count(), 1);

    client
        .query("DROP TABLE redline_describe")
        .await
        .unwrap();
    client.destroy().await;
}

#[tokio::test]
async fn test_safe_mode_rejects_keyless_update() {
    let mut options = test_options();
    options.safe_mode = true;
    let Some(mut client) = connect_or_skip(options).await else {
        return;
    };

    client
        .query("CREATE TEMPORARY TABLE redline_safe (id INT PRIMARY KEY, n INT)")
        .await
        .unwrap();
    let err = client
        .query("UPDATE redline_safe SET n = 1")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::QueryFailed(_)));
    assert!(
        client
            .query("UPDATE redline_safe SET n = 1 WHERE id = 1")
            .await
            .is_ok()
    );

    client.destroy().await;
}

#[tokio::test]
async fn test_use_database() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };
    let current = client.options().database.clone();

    client.use_database("information_schema").await.unwrap();
    let result = client.query("SELECT DATABASE() AS db").await.unwrap().unwrap();
    assert_eq!(result.cell(0, "db"), Some(&CellValue::from("information_schema")));

    let err = client
        .use_database("redline_missing_database")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::SwitchFailed(_)));
    assert_eq!(client.options().database, "information_schema");

    client.use_database(&current).await.unwrap();
    client.destroy().await;
}
