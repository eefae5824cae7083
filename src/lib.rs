//! # kvcli
//!
//! Command-line client for the KV storage engine, speaking its line-based
//! text protocol:
//! - Handshake on connect (`+OK ...` welcome line)
//! - One CR LF terminated command line per request
//! - `+OK` / `+VALUE` / `-ERR` response framing
//! - Per-request deadlines, strictly one request in flight
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 kv binary (clap, tracing)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Settings + Renderer
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Command Handlers                            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Client (get/set/delete/...)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command / Response
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │         Connection (handshake, deadlines, send)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ lines
//!                ┌──────▼──────┐
//!                │    Codec    │
//!                └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;
pub mod output;
pub mod commands;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, Settings};
pub use client::Client;
pub use network::{Connection, ConnectionState};
pub use protocol::{Command, Response, Status};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvcli
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
