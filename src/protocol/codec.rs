//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! Every frame is one UTF-8 line terminated by CR LF.
//!
//! ### Request (Command) Format
//! ```text
//! NAME [arg1 [arg2]]\r\n
//! ```
//!
//! ### Arguments by Command Type
//! - GET:    key            (key may contain spaces)
//! - PUT:    key value      (value may contain spaces, key may not)
//! - DELETE: key            (key may contain spaces)
//! - PING, QUIT, STATUS: none
//!
//! ### Response Format
//! ```text
//! +OK <message>\r\n
//! +VALUE <data>\r\n
//! -ERR <message>\r\n
//! ```

use std::io::{self, BufRead, Read, Write};

use super::response::{NOT_FOUND_MESSAGE, OK_MESSAGE};
use super::{Command, CommandType, Response, Status};
use crate::error::{KvError, Result};

/// Line terminator for every frame
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Maximum accepted line length, terminator included (1 MB)
pub const MAX_LINE_SIZE: usize = 1024 * 1024;

/// Leading byte of a success frame
pub const SUCCESS_MARKER: char = '+';

/// Leading byte of an error frame
pub const ERROR_MARKER: char = '-';

/// Sentinel token that introduces a value frame
pub const VALUE_TOKEN: &str = "VALUE";

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Check that a command's arguments can be framed unambiguously
///
/// Rejects CR/LF anywhere, empty keys and values, and spaces in a PUT key
/// (the server splits key from value on the first space).
pub fn validate_command(command: &Command) -> Result<()> {
    let name = command.command_type();

    for arg in command.args() {
        if arg.contains(['\r', '\n']) {
            return Err(KvError::InvalidArgument(format!(
                "{} argument contains a line terminator",
                name
            )));
        }
    }

    match command {
        Command::Get { key } | Command::Delete { key } => validate_key(name, key),
        Command::Put { key, value } => {
            validate_key(name, key)?;
            if key.contains(' ') {
                return Err(KvError::InvalidArgument(format!(
                    "PUT key must not contain spaces: {:?}",
                    key
                )));
            }
            if value.is_empty() {
                return Err(KvError::InvalidArgument(
                    "PUT value must not be empty".to_string(),
                ));
            }
            Ok(())
        }
        Command::Ping | Command::Quit | Command::Status => Ok(()),
    }
}

fn validate_key(name: CommandType, key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::InvalidArgument(format!(
            "{} key must not be empty",
            name
        )));
    }
    Ok(())
}

/// Encode a command to bytes
///
/// Format: NAME, then each argument after a single space, then CR LF
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    validate_command(command)?;

    let name = command.command_type().as_str();
    let args = command.args();
    let len = name.len()
        + args.iter().map(|arg| arg.len() + 1).sum::<usize>()
        + LINE_TERMINATOR.len();

    let mut line = Vec::with_capacity(len);
    line.extend_from_slice(name.as_bytes());
    for arg in args {
        line.push(b' ');
        line.extend_from_slice(arg.as_bytes());
    }
    line.extend_from_slice(LINE_TERMINATOR);

    Ok(line)
}

/// Decode a command line as the server parses it
///
/// Names are case-insensitive. The key of GET/DELETE is everything after the
/// name; PUT splits key from value on the first space.
#[doc(hidden)]
pub fn decode_command(line: &str) -> Result<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Err(KvError::Protocol("empty command".to_string()));
    }

    let (name, rest) = match line.split_once(' ') {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command_type = CommandType::from_name(name)
        .ok_or_else(|| KvError::Protocol(format!("unknown command: {}", name)))?;

    let command = match command_type {
        CommandType::Get => Command::Get {
            key: required_key(command_type, rest)?,
        },
        CommandType::Delete => Command::Delete {
            key: required_key(command_type, rest)?,
        },
        CommandType::Put => {
            let (key, value) = rest
                .split_once(' ')
                .map(|(key, value)| (key, value.trim()))
                .filter(|(key, value)| !key.is_empty() && !value.is_empty())
                .ok_or_else(|| {
                    KvError::Protocol("PUT command: expected key and value".to_string())
                })?;
            Command::Put {
                key: key.to_string(),
                value: value.to_string(),
            }
        }
        CommandType::Ping => Command::Ping,
        CommandType::Quit => Command::Quit,
        CommandType::Status => Command::Status,
    };

    Ok(command)
}

fn required_key(command_type: CommandType, rest: &str) -> Result<String> {
    if rest.is_empty() {
        return Err(KvError::Protocol(format!(
            "{} command: missing key",
            command_type
        )));
    }
    Ok(rest.to_string())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// A value serializes as `+VALUE`, other successes as `+OK`, failures as `-ERR`.
#[doc(hidden)]
pub fn encode_response(response: &Response) -> Vec<u8> {
    let line = match (&response.value, response.status) {
        (Some(value), _) => format!("{}{} {}", SUCCESS_MARKER, VALUE_TOKEN, value),
        (None, Status::Ok) => format!("{}{} {}", SUCCESS_MARKER, OK_MESSAGE, response.message),
        (None, Status::NotFound | Status::Error) => {
            format!("{}ERR {}", ERROR_MARKER, response.message)
        }
    };

    let mut bytes = line.into_bytes();
    bytes.extend_from_slice(LINE_TERMINATOR);
    bytes
}

/// Decode a response line
///
/// Trailing whitespace (including the terminator) is stripped first.
/// The only string sentinel recognized is `NOT_FOUND`, which maps to
/// [`Status::NotFound`] so callers never compare messages.
pub fn decode_response(line: &str) -> Result<Response> {
    let line = line.trim_end();

    let mut chars = line.chars();
    let marker = chars
        .next()
        .ok_or_else(|| KvError::Protocol("empty response".to_string()))?;
    let body = chars.as_str();

    match marker {
        SUCCESS_MARKER => {
            let response = match body.split_once(' ') {
                Some((VALUE_TOKEN, value)) => Response::with_value(value),
                Some((_, message)) => Response::ok(message),
                None => Response::ok(body),
            };
            Ok(response)
        }
        ERROR_MARKER => {
            let message = match body.split_once(' ') {
                Some((_, message)) => message,
                None => body,
            };
            if message == NOT_FOUND_MESSAGE {
                Ok(Response::not_found())
            } else {
                Ok(Response::error(message))
            }
        }
        _ => Err(KvError::Protocol(format!(
            "unknown response format: {}",
            line
        ))),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one line from a stream, without its terminator
///
/// Blocks until `\n` arrives. EOF before a full line and read failures are
/// transport errors; oversized or non-UTF-8 lines are protocol errors.
/// An oversized line is consumed through its terminator before returning,
/// so the reader stays aligned on the next line.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::with_capacity(128);
    let limit = MAX_LINE_SIZE as u64 + 1;
    let bytes = reader
        .take(limit)
        .read_until(b'\n', &mut buf)
        .map_err(KvError::Transport)?;

    if bytes == 0 {
        return Err(KvError::Transport(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed by peer",
        )));
    }

    if buf.last() != Some(&b'\n') {
        if buf.len() > MAX_LINE_SIZE {
            // Discard the rest of the line so the next read starts on a frame
            skip_line(reader).map_err(KvError::Transport)?;
            return Err(KvError::Protocol(format!(
                "line exceeds {} bytes",
                MAX_LINE_SIZE
            )));
        }
        return Err(KvError::Transport(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed mid-line",
        )));
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    String::from_utf8(buf).map_err(|e| KvError::Protocol(format!("invalid UTF-8: {}", e)))
}

/// Consume bytes up to and including the next `\n`
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<()> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-line",
            ));
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes).map_err(KvError::Transport)?;
    writer.flush().map_err(KvError::Transport)?;
    Ok(())
}

/// Read one response from a stream
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let line = read_line(reader)?;
    tracing::trace!("Received response line: {:?}", line);
    decode_response(&line)
}

/// Read one command from a stream
#[doc(hidden)]
pub fn read_command<R: BufRead>(reader: &mut R) -> Result<Command> {
    let line = read_line(reader)?;
    decode_command(&line)
}

/// Write a response to a stream
#[doc(hidden)]
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes).map_err(KvError::Transport)?;
    writer.flush().map_err(KvError::Transport)?;
    Ok(())
}
