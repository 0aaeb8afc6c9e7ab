//! Terminal output for property, hostname, and activation results

use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print result rows in the selected format
pub fn print_rows<T: Serialize + Tabled>(rows: Vec<T>, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No matches".dimmed());
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows).unwrap());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&rows).unwrap());
        }
    }
}

/// Print one structured document, e.g. a rule tree.
///
/// Documents have no tabular shape, so the table format falls back to
/// pretty JSON — the same bytes a rule-file export would contain.
pub fn print_document<T: Serialize>(document: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(document).unwrap());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(document).unwrap());
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default_is_table() {
        assert!(matches!(OutputFormat::default(), OutputFormat::Table));
    }
}
