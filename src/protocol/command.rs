//! Command definitions
//!
//! Represents commands sent to the server.

use std::fmt;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Put,
    Delete,
    Ping,
    Quit,
    Status,
}

impl CommandType {
    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Get => "GET",
            CommandType::Put => "PUT",
            CommandType::Delete => "DELETE",
            CommandType::Ping => "PING",
            CommandType::Quit => "QUIT",
            CommandType::Status => "STATUS",
        }
    }

    /// Parse a wire name, case-insensitively
    ///
    /// Accepts the server's aliases: `SET`, `DEL` and `EXIT`.
    #[doc(hidden)]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(CommandType::Get),
            "PUT" | "SET" => Some(CommandType::Put),
            "DELETE" | "DEL" => Some(CommandType::Delete),
            "PING" => Some(CommandType::Ping),
            "QUIT" | "EXIT" => Some(CommandType::Quit),
            "STATUS" => Some(CommandType::Status),
            _ => None,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command to send to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Put a key-value pair
    Put { key: String, value: String },

    /// Delete a key
    Delete { key: String },

    /// Ping (liveness check)
    Ping,

    /// Ask the server to end the session
    Quit,

    /// Fetch opaque server status text
    Status,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Put { .. } => CommandType::Put,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
            Command::Quit => CommandType::Quit,
            Command::Status => CommandType::Status,
        }
    }

    /// Arguments in wire order
    pub fn args(&self) -> Vec<&str> {
        match self {
            Command::Get { key } | Command::Delete { key } => vec![key.as_str()],
            Command::Put { key, value } => vec![key.as_str(), value.as_str()],
            Command::Ping | Command::Quit | Command::Status => Vec::new(),
        }
    }
}
