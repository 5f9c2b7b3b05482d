//! Integration tests against a live PostgreSQL server

use super::{connect_or_skip, live_options};
use redline::config::{ConnectionOptions, Flavor};
use redline::db::CellValue;
use redline::error::DbError;
use redline::export::to_json;

fn test_options() -> ConnectionOptions {
    live_options(Flavor::Postgres, "PG", "localhost", 5432)
}

#[tokio::test]
async fn test_select_materializes_text() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    let result = client
        .query("SELECT 1 AS num, 'hello' AS msg, NULL::text AS nothing, true AS flag")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.columns, vec!["num", "msg", "nothing", "flag"]);
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.cell(0, "num"), Some(&CellValue::from("1")));
    assert_eq!(result.cell(0, "msg"), Some(&CellValue::from("hello")));
    assert_eq!(result.cell(0, "nothing"), Some(&CellValue::Null));
    assert_eq!(result.cell(0, "flag"), Some(&CellValue::from("t")));

    client.destroy().await;
}

#[tokio::test]
async fn test_zero_rows_keeps_columns() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    let result = client
        .query("SELECT 1 AS a, 2 AS b WHERE false")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.columns, vec!["a", "b"]);
    assert!(result.is_empty());
    assert_eq!(to_json(&result), "[]");

    client.destroy().await;
}

#[tokio::test]
async fn test_ddl_has_no_result_set() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    let result = client
        .query("CREATE TEMP TABLE redline_tmp (id int primary key, name text)")
        .await
        .unwrap();
    assert!(result.is_none());

    client.destroy().await;
}

#[tokio::test]
async fn test_describe_and_show_indexes() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    client
        .query("DROP TABLE IF EXISTS redline_describe")
        .await
        .unwrap();
    client
        .query(
            "CREATE TABLE redline_describe (id int PRIMARY KEY, email text UNIQUE, note text DEFAULT 'n/a')",
        )
        .await
        .unwrap();

    let describe = client.query("DESCRIBE redline_describe").await.unwrap().unwrap();
    assert_eq!(
        describe.columns,
        vec!["Field", "Type", "Null", "Key", "Default"]
    );
    assert_eq!(describe.row_count(), 3);
    assert_eq!(describe.cell(0, "Field"), Some(&CellValue::from("id")));
    assert_eq!(describe.cell(0, "Key"), Some(&CellValue::from("PRI")));
    assert_eq!(describe.cell(0, "Null"), Some(&CellValue::from("NO")));
    assert_eq!(describe.cell(1, "Key"), Some(&CellValue::from("UNI")));
    assert_eq!(describe.cell(1, "Default"), Some(&CellValue::from("NULL")));

    let indexes = client
        .query("SHOW INDEXES FROM redline_describe;")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(indexes.row_count(), 2);
    assert_eq!(indexes.columns, vec!["indexname", "indexdef"]);
    assert!(indexes.rows.iter().all(|r| {
        r.get("indexdef")
            .map(CellValue::as_text)
            .is_some_and(|def| def.starts_with("CREATE UNIQUE INDEX"))
    }));

    let tables = client.query("SHOW TABLES").await.unwrap().unwrap();
    assert!(
        tables
            .rows
            .iter()
            .any(|r| r.get("table_name").map(CellValue::as_text) == Some("redline_describe"))
    );

    client
        .query("DROP TABLE redline_describe")
        .await
        .unwrap();
    client.destroy().await;
}

#[tokio::test]
async fn test_describe_missing_table() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    let err = client
        .query("DESCRIBE redline_no_such_table")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));

    client.destroy().await;
}

#[tokio::test]
async fn test_syntax_error_is_query_failed() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };

    let err = client.query("SELEC 1").await.unwrap_err();
    assert!(err.to_string().starts_with("Query Failed: syntax error"));

    client.destroy().await;
}

#[tokio::test]
async fn test_use_missing_database_keeps_connection() {
    let Some(mut client) = connect_or_skip(test_options()).await else {
        return;
    };
    let before = client.options().database.clone();

    let err = client
        .use_database("redline_missing_database")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::SwitchFailed(_)));
    assert_eq!(client.options().database, before);
    assert!(client.query("SELECT 1").await.is_ok());

    client.destroy().await;
}
