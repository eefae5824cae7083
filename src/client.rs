//! Command Facade
//!
//! Typed wrappers over [`Connection::send`], one per protocol command.
//! Server-side failures come back as a [`Response`] whose status is not
//! `Ok`; only connection, transport, protocol and argument problems are
//! returned as errors.

use crate::config::Settings;
use crate::error::Result;
use crate::network::{Connection, ConnectionState};
use crate::protocol::{Command, Response};

/// Blocking client for one KV server
pub struct Client {
    conn: Connection,
}

impl Client {
    /// Wrap an existing connection (connected or not)
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Connect to the server described by `settings`
    pub fn connect(settings: &Settings) -> Result<Self> {
        Ok(Self::new(Connection::open(settings)?))
    }

    /// Fetch the value stored under `key`
    ///
    /// An absent key yields a response with `Status::NotFound`.
    pub fn get(&mut self, key: &str) -> Result<Response> {
        self.conn.send(&Command::Get {
            key: key.to_string(),
        })
    }

    /// Store `value` under `key`
    pub fn set(&mut self, key: &str, value: &str) -> Result<Response> {
        self.conn.send(&Command::Put {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Remove `key`
    pub fn delete(&mut self, key: &str) -> Result<Response> {
        self.conn.send(&Command::Delete {
            key: key.to_string(),
        })
    }

    /// Liveness check
    pub fn ping(&mut self) -> Result<Response> {
        self.conn.send(&Command::Ping)
    }

    /// Ask the server to end the session; it may close the stream afterwards
    pub fn quit(&mut self) -> Result<Response> {
        self.conn.send(&Command::Quit)
    }

    /// Fetch server status text (see [`Response::status_text`])
    pub fn status(&mut self) -> Result<Response> {
        self.conn.send(&Command::Status)
    }

    /// Close the underlying connection
    pub fn close(&mut self) {
        self.conn.close();
    }

    /// Lifecycle state of the underlying connection
    pub fn state(&self) -> ConnectionState {
        self.conn.state()
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
