//! Output Module
//!
//! Presentation of command outcomes.
//!
//! Handlers turn protocol responses into an [`Outcome`] and hand it to a
//! [`Renderer`]; the renderer alone decides between text and JSON.

use std::io::Write;

use crate::config::{Config, OutputConfig, OutputFormat};
use crate::error::Result;

mod json;
mod text;

pub use json::JsonRenderer;
pub use text::TextRenderer;

/// Result of one CLI command, as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Command succeeded with a human-readable message
    Success { message: String },

    /// GET found a value
    Value { key: String, value: String },

    /// GET found no value for the key
    NotFound { key: String },

    /// Command failed
    Error { message: String },

    /// Opaque server status text
    Status { text: String },
}

impl Outcome {
    /// Whether the command should exit successfully
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Success { .. } | Outcome::Value { .. } | Outcome::Status { .. }
        )
    }
}

/// Presentation strategy
pub trait Renderer {
    /// Write one outcome
    fn render(&self, outcome: &Outcome, out: &mut dyn Write) -> Result<()>;

    /// Write the effective configuration
    fn render_config(&self, config: &Config, out: &mut dyn Write) -> Result<()>;
}

/// Pick the renderer configured in `output`
pub fn renderer_for(output: &OutputConfig) -> Box<dyn Renderer> {
    match output.format {
        OutputFormat::Text => Box::new(TextRenderer::new(output.color)),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

/// Parse `value` as JSON, if it is JSON
fn parse_json_value(value: &str) -> Option<serde_json::Value> {
    serde_json::from_str(value).ok()
}
