//! Command Handlers
//!
//! One handler per CLI action. Each run opens a fresh connection, issues a
//! single command through the [`Client`] facade, closes the connection and
//! maps the result to an [`Outcome`] for the renderer.
//!
//! Settings and the renderer are injected, so handlers can be exercised with
//! fixture settings against a test server.

use std::io::Write;

use crate::client::Client;
use crate::config::Settings;
use crate::error::{KvError, Result};
use crate::output::{Outcome, Renderer};
use crate::protocol::Response;

/// A CLI action that talks to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Get { key: String },
    Set { key: String, value: String },
    Delete { key: String },
    Ping,
    Status,
}

/// Executes actions against the configured server
pub struct Handler<'a> {
    settings: &'a Settings,
    renderer: &'a dyn Renderer,
}

impl<'a> Handler<'a> {
    pub fn new(settings: &'a Settings, renderer: &'a dyn Renderer) -> Self {
        Self { settings, renderer }
    }

    /// Execute `action`, render its outcome to `out`, and return the outcome
    pub fn run(&self, action: &Action, out: &mut dyn Write) -> Result<Outcome> {
        let outcome = self.execute(action);
        self.renderer.render(&outcome, out)?;
        Ok(outcome)
    }

    /// Execute `action` without rendering
    pub fn execute(&self, action: &Action) -> Outcome {
        tracing::debug!("Executing {:?}", action);

        let mut client = match Client::connect(self.settings) {
            Ok(client) => client,
            Err(e) => return connect_failure(e),
        };

        let outcome = match action {
            Action::Get { key } => match client.get(key) {
                Ok(resp) if resp.success() => Outcome::Value {
                    key: key.clone(),
                    value: resp.value.unwrap_or_default(),
                },
                Ok(resp) if resp.is_not_found() => Outcome::NotFound { key: key.clone() },
                Ok(resp) => server_failure(resp),
                Err(e) => request_failure("failed to get key", e),
            },
            Action::Set { key, value } => match client.set(key, value) {
                Ok(resp) if resp.success() => Outcome::Success {
                    message: format!("Set {}", key),
                },
                Ok(resp) => server_failure(resp),
                Err(e) => request_failure("failed to set key", e),
            },
            Action::Delete { key } => match client.delete(key) {
                Ok(resp) if resp.success() => Outcome::Success {
                    message: format!("Deleted {}", key),
                },
                Ok(resp) => server_failure(resp),
                Err(e) => request_failure("failed to delete key", e),
            },
            Action::Ping => match client.ping() {
                Ok(resp) if resp.success() => Outcome::Success {
                    message: format!("PONG from {}:{}", self.settings.host, self.settings.port),
                },
                Ok(resp) => server_failure(resp),
                Err(e) => request_failure("ping failed", e),
            },
            Action::Status => match client.status() {
                Ok(resp) if resp.success() => Outcome::Status {
                    text: resp.status_text().to_string(),
                },
                Ok(resp) => server_failure(resp),
                Err(e) => request_failure("failed to get status", e),
            },
        };

        client.close();
        outcome
    }
}

fn connect_failure(e: KvError) -> Outcome {
    // Connect errors already name the address
    let message = match e {
        KvError::Connect { .. } => e.to_string(),
        other => format!("failed to connect: {}", other),
    };
    Outcome::Error { message }
}

fn server_failure(resp: Response) -> Outcome {
    Outcome::Error {
        message: resp.message,
    }
}

fn request_failure(context: &str, e: KvError) -> Outcome {
    Outcome::Error {
        message: format!("{}: {}", context, e),
    }
}
