//! Query results export (CSV / JSON)
//!
//! Pure serialization functions, no filesystem I/O. The caller writes the
//! returned string to disk or the clipboard.

use crate::db::types::QueryResult;
use crate::error::CommandError;
use std::str::FromStr;

/// Export format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension for this format (without leading dot)
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn render(&self, result: &QueryResult) -> String {
        match self {
            ExportFormat::Csv => to_csv(result),
            ExportFormat::Json => to_json(result),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(CommandError::InvalidArgument(format!(
                "unknown format '{}', expected csv or json",
                other
            ))),
        }
    }
}

/// Serialize rows as a compact JSON array of objects.
///
/// NULL cells become JSON `null`; every other cell is a JSON string.
pub fn to_json(result: &QueryResult) -> String {
    // Rows only hold strings and nulls, which always serialize
    serde_json::to_string(&result.rows).expect("query rows serialize to JSON")
}

/// Serialize as comma separated lines: header first, then one line per row.
///
/// Fields are not quoted or escaped; NULL is written as `NULL`. There is no
/// trailing newline.
pub fn to_csv(result: &QueryResult) -> String {
    let mut lines = Vec::with_capacity(result.rows.len() + 1);
    lines.push(result.columns.join(","));
    for row in &result.rows {
        let fields: Vec<&str> = result.row_values(row).map(|c| c.as_text()).collect();
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::CellValue;

    fn sample_results() -> QueryResult {
        let mut result = QueryResult::new(vec!["id".to_string(), "name".to_string()]);
        result.push_row(vec![CellValue::from("1"), CellValue::from("Alice")]);
        result.push_row(vec![CellValue::from("2"), CellValue::Null]);
        result
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_basic_csv() {
        let csv = to_csv(&sample_results());
        assert_eq!(csv, "id,name\n1,Alice\n2,NULL");
    }

    #[test]
    fn test_csv_line_and_field_counts() {
        let mut result = QueryResult::new(vec!["a".into(), "b".into(), "c".into()]);
        for i in 0..4 {
            let n = i.to_string();
            result.push_row(vec![
                CellValue::from(n.as_str()),
                CellValue::Null,
                CellValue::from("x"),
            ]);
        }
        let csv = to_csv(&result);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.split(',').count() == 3));
    }

    #[test]
    fn test_csv_does_not_escape() {
        let mut result = QueryResult::new(vec!["val".to_string()]);
        result.push_row(vec![CellValue::from("a,b")]);
        assert_eq!(to_csv(&result), "val\na,b");
    }

    #[test]
    fn test_csv_follows_column_order() {
        let mut result = QueryResult::new(vec!["z".to_string(), "a".to_string()]);
        result.push_row(vec![CellValue::from("last"), CellValue::from("first")]);
        assert_eq!(to_csv(&result), "z,a\nlast,first");
    }

    #[test]
    fn test_csv_empty_results() {
        let result = QueryResult::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(to_csv(&result), "a,b");
    }

    #[test]
    fn test_json_null_and_string() {
        let json_str = to_json(&sample_results());
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["id"], "1");
        assert_eq!(parsed[0]["name"], "Alice");
        assert_eq!(parsed[1]["id"], "2");
        assert!(parsed[1]["name"].is_null());
    }

    #[test]
    fn test_json_is_compact() {
        let mut result = QueryResult::new(vec!["x".to_string()]);
        result.push_row(vec![CellValue::from("1")]);
        assert_eq!(to_json(&result), r#"[{"x":"1"}]"#);
    }

    #[test]
    fn test_json_empty_results() {
        let result = QueryResult::new(vec!["x".to_string()]);
        assert_eq!(to_json(&result), "[]");
    }

    #[test]
    fn test_render_dispatches() {
        let result = sample_results();
        assert_eq!(ExportFormat::Csv.render(&result), to_csv(&result));
        assert_eq!(ExportFormat::Json.render(&result), to_json(&result));
    }
}
