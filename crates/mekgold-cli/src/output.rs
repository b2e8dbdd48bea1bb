// crates/mekgold-cli/src/output.rs
//
// Output formatting utilities for the MekGold CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render gold with two decimals.
pub fn gold(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Render an engine-level failure carried inside a result body.
pub fn failure(error: Option<&str>, kind: Option<&str>) -> String {
    match (kind, error) {
        (Some(kind), Some(error)) => format!("Error ({}): {}", kind, error),
        (None, Some(error)) => format!("Error: {}", error),
        (Some(kind), None) => format!("Error ({})", kind),
        (None, None) => "Error".to_string(),
    }
}
