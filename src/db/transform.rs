//! Meta-command rewriting
//!
//! `DESCRIBE t`, `SHOW TABLES` and `SHOW INDEXES FROM t` are native on MySQL.
//! PostgreSQL gets equivalent catalog queries, preceded by a table
//! existence check for the commands that name a table.

use crate::config::Flavor;
use crate::db::session::Session;
use crate::db::types::StatementPlan;
use crate::error::{DbError, DbResult};
use regex::Regex;

/// Catalog query answering "does this table exist in the current schema"
pub const PG_TABLE_EXISTS_SQL: &str = "\
SELECT EXISTS (
    SELECT 1
    FROM information_schema.tables
    WHERE table_schema = current_schema()
      AND table_name = $1::text
)::text AS \"exists\"";

pub const PG_SHOW_TABLES_SQL: &str = "\
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_schema = current_schema()
ORDER BY table_name ASC";

pub const PG_SHOW_INDEXES_SQL: &str = "\
SELECT indexname::text AS indexname, indexdef
FROM pg_indexes
WHERE schemaname = current_schema()
  AND tablename = $1::text
ORDER BY indexname ASC";

/// Five columns shaped like MySQL's DESCRIBE: Field, Type, Null, Key, Default
pub const PG_DESCRIBE_SQL: &str = r#"
SELECT
    c.column_name::text AS "Field",
    CASE
        WHEN c.data_type IN ('character', 'character varying')
             AND c.character_maximum_length IS NOT NULL
            THEN c.data_type || '(' || c.character_maximum_length || ')'
        WHEN c.data_type = 'numeric' AND c.numeric_precision IS NOT NULL
            THEN c.data_type || '(' || c.numeric_precision || ', ' || c.numeric_scale || ')'
        ELSE c.data_type
    END::text AS "Type",
    c.is_nullable::text AS "Null",
    CASE
        WHEN EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
             AND kcu.table_name = tc.table_name
            WHERE tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND tc.constraint_type = 'PRIMARY KEY'
              AND kcu.column_name = c.column_name
        ) THEN 'PRI'
        WHEN EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
             AND kcu.table_name = tc.table_name
            WHERE tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND tc.constraint_type = 'UNIQUE'
              AND kcu.column_name = c.column_name
        ) OR EXISTS (
            SELECT 1
            FROM pg_index i
            JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = i.indkey[0]
            WHERE i.indrelid = (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass
              AND a.attname = c.column_name
              AND NOT i.indisprimary
              AND i.indisunique
        ) THEN 'UNI'
        WHEN EXISTS (
            SELECT 1
            FROM pg_index i
            JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = i.indkey[0]
            WHERE i.indrelid = (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass
              AND a.attname = c.column_name
              AND NOT i.indisprimary
        ) THEN 'MUL'
        ELSE ''
    END AS "Key",
    COALESCE(c.column_default, 'NULL')::text AS "Default"
FROM information_schema.columns c
WHERE c.table_schema = current_schema()
  AND c.table_name = $1::text
ORDER BY c.ordinal_position"#;

/// A recognized client-side convenience command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Describe(String),
    ShowIndexes(String),
    ShowTables,
}

impl MetaCommand {
    pub fn name(&self) -> &'static str {
        match self {
            MetaCommand::Describe(_) => "DESCRIBE",
            MetaCommand::ShowIndexes(_) => "SHOW INDEXES",
            MetaCommand::ShowTables => "SHOW TABLES",
        }
    }
}

/// How meta-commands are handled for a given flavor
#[derive(Debug, Clone)]
enum Rewriter {
    /// The server understands the commands as written
    Native,
    Postgres,
    /// No rewrite exists; meta-commands are rejected
    Unsupported(String),
}

/// Rewrites meta-commands into SQL the connected server understands
#[derive(Debug, Clone)]
pub struct StatementTransformer {
    describe: Regex,
    show_indexes: Regex,
    rewriter: Rewriter,
}

impl StatementTransformer {
    /// `None` stands for a flavor without meta-command support
    pub fn new(flavor: impl Into<Option<Flavor>>) -> Self {
        let rewriter = match flavor.into() {
            Some(Flavor::MySql) => Rewriter::Native,
            Some(Flavor::Postgres) => Rewriter::Postgres,
            None => Rewriter::Unsupported("unknown".to_string()),
        };
        Self {
            describe: Regex::new(r#"(?i)^DESCRIBE\s+"?(\w+)"?\s*;?$"#)
                .expect("describe pattern is valid"),
            show_indexes: Regex::new(r#"(?i)^SHOW\s+INDEXES\s+FROM\s+"?(\w+)"?\s*;?$"#)
                .expect("show indexes pattern is valid"),
            rewriter,
        }
    }

    /// Recognize a meta-command in `statement`
    pub fn classify(&self, statement: &str) -> Option<MetaCommand> {
        let trimmed = statement.trim();

        if let Some(caps) = self.describe.captures(trimmed) {
            return Some(MetaCommand::Describe(caps[1].to_string()));
        }
        if let Some(caps) = self.show_indexes.captures(trimmed) {
            return Some(MetaCommand::ShowIndexes(caps[1].to_string()));
        }

        let normalized = trimmed
            .to_uppercase()
            .replace(';', "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (normalized == "SHOW TABLES").then_some(MetaCommand::ShowTables)
    }

    /// Produce the plan to run for `statement`.
    ///
    /// `session` is only used for the PostgreSQL table existence check.
    pub async fn transform<S: Session>(
        &self,
        statement: &str,
        session: &mut S,
    ) -> DbResult<StatementPlan> {
        let Some(command) = self.classify(statement) else {
            return Ok(StatementPlan::literal(statement));
        };

        match &self.rewriter {
            Rewriter::Native => Ok(StatementPlan::literal(statement)),
            Rewriter::Unsupported(flavor) => Err(DbError::Unsupported {
                command: command.name(),
                flavor: flavor.clone(),
            }),
            Rewriter::Postgres => {
                tracing::debug!("rewriting {} for postgres", command.name());
                match command {
                    MetaCommand::ShowTables => Ok(StatementPlan::literal(PG_SHOW_TABLES_SQL)),
                    MetaCommand::Describe(table) => {
                        assert_table_exists(session, &table).await?;
                        Ok(StatementPlan::with_params(PG_DESCRIBE_SQL, vec![table]))
                    }
                    MetaCommand::ShowIndexes(table) => {
                        assert_table_exists(session, &table).await?;
                        Ok(StatementPlan::with_params(PG_SHOW_INDEXES_SQL, vec![table]))
                    }
                }
            }
        }
    }
}

async fn assert_table_exists<S: Session>(session: &mut S, table: &str) -> DbResult<()> {
    let probe = StatementPlan::with_params(PG_TABLE_EXISTS_SQL, vec![table.to_string()]);
    let result = session
        .query(&probe)
        .await
        .map_err(|e| DbError::TableCheckFailed(Box::new(e)))?;

    let exists = result
        .as_ref()
        .and_then(|r| r.cell(0, "exists"))
        .is_some_and(|cell| matches!(cell.as_text(), "true" | "t"));

    if exists {
        Ok(())
    } else {
        Err(DbError::TableNotFound(table.to_string()))
    }
}
