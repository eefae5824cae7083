//! Client Connection
//!
//! Owns one TCP stream to one server and exposes a synchronous
//! request/response primitive on top of the protocol codec.
//!
//! ## Lifecycle
//! ```text
//! Unconnected ──connect()──▶ Connected ──close() / transport error──▶ Closed
//!      │                                                               ▲
//!      └──────────────── connect() failed ─────────────────────────────┘
//! ```
//! Transitions only move forward. A closed connection is never reopened;
//! create a new instance to retry.

use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::error::{KvError, Result};
use crate::protocol::{encode_command, read_line, read_response, Command, Response};

/// Prefix the server's welcome line must start with
pub const HANDSHAKE_PREFIX: &str = "+OK";

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, no stream yet
    Unconnected,

    /// Handshake completed, ready for requests
    Connected,

    /// Closed explicitly, after a failed connect, or after a transport error
    Closed,
}

/// TCP stream whose reads and writes all fail once an absolute deadline passes
///
/// Before every socket call the remaining time is pushed down as the socket
/// timeout, so a request's write and all of its reads share one budget.
struct DeadlineStream {
    stream: TcpStream,
    deadline: Option<Instant>,
}

impl DeadlineStream {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            deadline: None,
        }
    }

    /// Reset the deadline to `now + timeout`; a zero timeout means no deadline
    fn arm(&mut self, timeout: Duration) {
        self.deadline = if timeout.is_zero() {
            None
        } else {
            Some(Instant::now() + timeout)
        };
    }

    fn remaining(&self) -> io::Result<Option<Duration>> {
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    Err(deadline_exceeded())
                } else {
                    Ok(Some(deadline - now))
                }
            }
        }
    }

    fn shutdown(&self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("Socket shutdown: {}", e);
        }
    }
}

impl Read for DeadlineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.stream.set_read_timeout(remaining)?;
        self.stream.read(buf).map_err(timeout_as_deadline)
    }
}

impl Write for DeadlineStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.stream.set_write_timeout(remaining)?;
        self.stream.write(buf).map_err(timeout_as_deadline)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

fn deadline_exceeded() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded")
}

// Unix reports socket timeouts as WouldBlock, Windows as TimedOut.
fn timeout_as_deadline(e: io::Error) -> io::Error {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => deadline_exceeded(),
        _ => e,
    }
}

/// A client connection to one KV server
pub struct Connection {
    /// Server host name or IP
    host: String,

    /// Server port
    port: u16,

    /// Per-operation timeout, re-applied before every request
    timeout: Duration,

    /// Lifecycle state
    state: ConnectionState,

    /// Buffered stream; writes go through `get_mut()`
    reader: Option<BufReader<DeadlineStream>>,

    /// Text after `+OK` in the welcome line
    banner: Option<String>,
}

impl Connection {
    /// Create an unconnected client for `host:port`
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
            state: ConnectionState::Unconnected,
            reader: None,
            banner: None,
        }
    }

    /// Create an unconnected client from resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.host.clone(), settings.port, settings.timeout)
    }

    /// Create a client and connect it in one step
    pub fn open(settings: &Settings) -> Result<Self> {
        let mut conn = Self::from_settings(settings);
        conn.connect()?;
        Ok(conn)
    }

    /// Dial the server and complete the handshake
    ///
    /// Any failure closes the stream and moves the connection to `Closed`.
    pub fn connect(&mut self) -> Result<()> {
        if self.state != ConnectionState::Unconnected {
            return Err(KvError::AlreadyUsed);
        }

        let addr = self.addr();
        tracing::debug!("Connecting to {}", addr);

        match self.establish(&addr) {
            Ok((reader, banner)) => {
                tracing::debug!("Connected to {} ({})", addr, banner);
                self.reader = Some(reader);
                self.banner = Some(banner);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Connection to {} failed: {}", addr, e);
                self.state = ConnectionState::Closed;
                Err(e)
            }
        }
    }

    fn establish(&self, addr: &str) -> Result<(BufReader<DeadlineStream>, String)> {
        let connect_err = |source: io::Error| KvError::Connect {
            addr: addr.to_string(),
            source,
        };

        let addrs: Vec<SocketAddr> = addr.to_socket_addrs().map_err(connect_err)?.collect();
        let stream = dial(&addrs, self.timeout).map_err(connect_err)?;

        // Disable Nagle's algorithm; every request is one small line
        stream.set_nodelay(true).map_err(connect_err)?;

        let mut reader = BufReader::new(DeadlineStream::new(stream));
        reader.get_mut().arm(self.timeout);

        let welcome = match read_line(&mut reader) {
            Ok(line) => line,
            Err(e) => {
                reader.get_ref().shutdown();
                return Err(match e {
                    KvError::Transport(source) => connect_err(source),
                    KvError::Protocol(msg) => KvError::Handshake(msg),
                    other => other,
                });
            }
        };

        if let Some(rest) = welcome.strip_prefix(HANDSHAKE_PREFIX) {
            let banner = rest.trim().to_string();
            return Ok((reader, banner));
        }

        tracing::warn!("Rejecting welcome line from {}: {:?}", addr, welcome);
        reader.get_ref().shutdown();
        Err(KvError::Handshake(welcome))
    }

    /// Send one command and wait for its response
    ///
    /// Requires `Connected`. The deadline is reset to `now + timeout` first.
    /// A transport failure moves the connection to `Closed`; the socket is
    /// released on `close()` or drop.
    pub fn send(&mut self, command: &Command) -> Result<Response> {
        if self.state != ConnectionState::Connected {
            return Err(KvError::NotConnected);
        }
        let bytes = encode_command(command)?;

        let result = match self.reader.as_mut() {
            Some(reader) => {
                reader.get_mut().arm(self.timeout);
                tracing::trace!(
                    "Sending {} to {}:{}",
                    command.command_type(),
                    self.host,
                    self.port
                );
                exchange(reader, &bytes)
            }
            None => Err(KvError::NotConnected),
        };

        if let Err(e) = &result {
            if e.is_transport() {
                tracing::warn!(
                    "{} to {}:{} failed: {}",
                    command.command_type(),
                    self.host,
                    self.port,
                    e
                );
                self.state = ConnectionState::Closed;
            }
        }

        result
    }

    /// Close the connection
    ///
    /// Idempotent and safe from any state.
    pub fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            tracing::debug!("Closing connection to {}:{}", self.host, self.port);
            reader.get_ref().shutdown();
        }
        self.state = ConnectionState::Closed;
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether requests can be sent
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Text the server sent after `+OK` in its welcome line
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Per-operation timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Server address as `host:port`
    pub fn addr(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

fn exchange(reader: &mut BufReader<DeadlineStream>, bytes: &[u8]) -> Result<Response> {
    let stream = reader.get_mut();
    stream.write_all(bytes).map_err(KvError::Transport)?;
    stream.flush().map_err(KvError::Transport)?;
    read_response(reader)
}

/// Try every resolved address in turn, keeping the last error
fn dial(addrs: &[SocketAddr], timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        let attempt = if timeout.is_zero() {
            TcpStream::connect(addr)
        } else {
            TcpStream::connect_timeout(addr, timeout)
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}

/// Join host and port, bracketing bare IPv6 literals
fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
