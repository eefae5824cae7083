//! Human-readable output

use std::io::Write;

use crossterm::style::Stylize;

use super::{parse_json_value, Outcome, Renderer};
use crate::config::Config;
use crate::error::Result;

const RULE: &str = "---------------------";

/// Plain or colored text output
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn render_value(&self, value: &str, out: &mut dyn Write) -> Result<()> {
        // JSON values are pretty-printed; anything else is printed as-is
        let text = match parse_json_value(value) {
            Some(json) => serde_json::to_string_pretty(&json)?,
            None => value.to_string(),
        };
        if self.color {
            writeln!(out, "{}", text.cyan())?;
        } else {
            writeln!(out, "{}", text)?;
        }
        Ok(())
    }
}

impl Renderer for TextRenderer {
    fn render(&self, outcome: &Outcome, out: &mut dyn Write) -> Result<()> {
        match outcome {
            Outcome::Success { message } => {
                if self.color {
                    writeln!(out, "{}", format!("✓ {}", message).green())?;
                } else {
                    writeln!(out, "{}", message)?;
                }
            }
            Outcome::Value { value, .. } => self.render_value(value, out)?,
            Outcome::NotFound { key } => {
                let line = format!("Key not found: {}", key);
                if self.color {
                    writeln!(out, "{}", line.yellow())?;
                } else {
                    writeln!(out, "{}", line)?;
                }
            }
            Outcome::Error { message } => {
                if self.color {
                    writeln!(out, "{}", format!("✗ Error: {}", message).red())?;
                } else {
                    writeln!(out, "Error: {}", message)?;
                }
            }
            Outcome::Status { text } => {
                if self.color {
                    writeln!(out, "{}", "Server Status:".cyan())?;
                } else {
                    writeln!(out, "Server Status:")?;
                }
                writeln!(out, "{}", RULE)?;
                writeln!(out, "{}", text)?;
            }
        }
        Ok(())
    }

    fn render_config(&self, config: &Config, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Current Configuration:")?;
        writeln!(out, "{}", RULE)?;
        for (key, value) in config.entries() {
            if self.color {
                writeln!(out, "{}", format!("{}:", key).cyan())?;
                writeln!(out, "  {}", value)?;
            } else {
                writeln!(out, "{}: {}", key, value)?;
            }
        }
        Ok(())
    }
}
