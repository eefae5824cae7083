//! Network Module
//!
//! TCP connection handling for the client.
//!
//! ## Architecture
//! - One blocking TCP stream per `Connection`
//! - One request in flight at a time (`&mut self`)
//! - Per-request absolute deadline shared by the write and the read

mod connection;

pub use connection::{Connection, ConnectionState, HANDSHAKE_PREFIX};
