use crate::core::types::OutputFormat;
use crate::error::{AdbError, Result};
use colored::*;
use comfy_table::Table;
use serde::Serialize;

/// Unified output formatter for all commands
pub struct OutputFormatter {
    color_enabled: bool,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            color_enabled: true,
            quiet: false,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Render `items` as a table or as JSON.
    pub fn render<T: TableFormat + Serialize>(&self, format: OutputFormat, items: &[T]) -> Result<()> {
        match format {
            OutputFormat::Table => self.table(items),
            OutputFormat::Json => self.json(&items),
        }
    }

    pub fn table<T: TableFormat>(&self, items: &[T]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        println!("{}", build_table(items));
        Ok(())
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        let json = to_json(value)?;
        if self.color_enabled {
            println!("{}", colorize_json(&json));
        } else {
            println!("{}", json);
        }
        Ok(())
    }

    pub fn message(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            if self.color_enabled {
                println!("{} {}", "✓".green(), msg);
            } else {
                println!("{}", msg);
            }
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color_enabled {
            eprintln!("{} {}", "error:".bright_red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for types that can be formatted as a table
pub trait TableFormat {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

pub fn build_table<T: TableFormat>(items: &[T]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AdbError::App(format!("cannot encode JSON output: {}", e)))
}

/// Highlight object keys of pretty-printed JSON.
fn colorize_json(json: &str) -> String {
    json.lines()
        .map(|line| {
            let indent = line.len() - line.trim_start().len();
            match line.trim_start().split_once("\": ") {
                Some((key, value)) if key.starts_with('"') => {
                    format!("{}{}: {}", &line[..indent], format!("{}\"", key).cyan(), value)
                }
                _ => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub mod device;
pub mod file;

pub use device::DeviceRow;
pub use file::{format_size, StatView};
