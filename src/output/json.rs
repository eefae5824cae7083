//! Structured output: one pretty-printed JSON object per outcome

use std::io::Write;

use serde_json::json;

use super::{parse_json_value, Outcome, Renderer};
use crate::config::Config;
use crate::error::Result;

/// JSON output
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    fn write(&self, value: &serde_json::Value, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, outcome: &Outcome, out: &mut dyn Write) -> Result<()> {
        let value = match outcome {
            Outcome::Success { message } => json!({
                "success": true,
                "message": message,
            }),
            Outcome::Value { key, value } => json!({
                "success": true,
                "key": key,
                // Embedded as JSON when the stored value is itself JSON
                "value": parse_json_value(value).unwrap_or_else(|| json!(value)),
            }),
            Outcome::NotFound { key } => json!({
                "success": false,
                "error": "key not found",
                "key": key,
            }),
            Outcome::Error { message } => json!({
                "success": false,
                "error": message,
            }),
            Outcome::Status { text } => json!({
                "success": true,
                "status": text,
            }),
        };
        self.write(&value, out)
    }

    fn render_config(&self, config: &Config, out: &mut dyn Write) -> Result<()> {
        self.write(&serde_json::to_value(config)?, out)
    }
}
