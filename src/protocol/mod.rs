//! Protocol Module
//!
//! Defines the line-based text protocol spoken with the storage server.
//!
//! ## Protocol Format
//!
//! ### Handshake
//! The server greets every new connection with one line starting `+OK`.
//!
//! ### Commands
//! - `GET <key>`
//! - `PUT <key> <value>`
//! - `DELETE <key>`
//! - `PING`
//! - `QUIT`
//! - `STATUS`
//!
//! ### Responses
//! - `+OK <message>`   - success
//! - `+VALUE <data>`   - success carrying a value (GET, sometimes STATUS)
//! - `-ERR <message>`  - failure; `NOT_FOUND` marks an absent key

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status, NOT_FOUND_MESSAGE, OK_MESSAGE};
pub use codec::{
    decode_response, encode_command, read_line, read_response, validate_command,
    write_command, LINE_TERMINATOR, MAX_LINE_SIZE,
};

// Server-side framing, used only by in-process test peers
#[doc(hidden)]
pub use codec::{decode_command, encode_response, read_command, write_response};
