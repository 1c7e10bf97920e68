//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Highlights a name inside a message.
pub fn highlight(text: &str) -> String {
    text.yellow().to_string()
}

/// Outputs data in the specified format.
pub fn output<T: Tabled + Serialize>(data: &[T], format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                info("No results found.");
            } else {
                let table = Table::new(data).with(Style::rounded()).to_string();
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Outputs a single item.
pub fn output_single<T: Tabled + Serialize>(item: &T, format: OutputFormat) -> crate::CliResult<()> {
    output(std::slice::from_ref(item), format)
}

/// Outputs a list of plain strings under one column header.
pub fn output_strings(values: &[String], header: &str, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if values.is_empty() {
                info("No results found.");
            } else {
                println!("{}", string_table(values, header));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(values)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {
            for value in values {
                println!("{value}");
            }
        }
    }
    Ok(())
}

/// Renders a single-column table.
pub fn string_table(values: &[String], header: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record([header]);
    for value in values {
        builder.push_record([value.as_str()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Prompts for password input (hidden).
pub fn prompt_password(prompt: &str) -> crate::CliResult<String> {
    Ok(rpassword::prompt_password(prompt)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_table_has_header_and_rows() {
        let rendered = string_table(&["/api/users".to_string(), "/api/roles".to_string()], "ENDPOINT");
        assert!(rendered.contains("ENDPOINT"));
        assert!(rendered.contains("/api/users"));
        assert!(rendered.contains("/api/roles"));
        let header_line = rendered.lines().position(|l| l.contains("ENDPOINT")).unwrap();
        let row_line = rendered.lines().position(|l| l.contains("/api/users")).unwrap();
        assert!(header_line < row_line);
    }
}
