//! Output formatting for CLI commands
//!
//! Text mode prints human-readable lines to stdout. JSON mode prints exactly
//! one JSON document per command so the output can be piped into `jq`.

use serde::Serialize;
use serde_json::json;

use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        if self.is_json() {
            println!("{}", json!({ "success": true, "message": message }));
        } else {
            println!("{}", message);
        }
    }

    /// Prints a plain line (text only, ignored in JSON mode)
    pub fn line(&self, message: impl AsRef<str>) {
        if !self.is_json() {
            println!("{}", message.as_ref());
        }
    }

    /// Prints structured data; pretty-printed in text mode
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = if self.is_json() {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        };
        if let Ok(json) = rendered {
            println!("{}", json);
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
