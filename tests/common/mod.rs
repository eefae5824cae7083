//! Test servers speaking the KV text protocol
//!
//! Shared by the network, client and integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use kvcli::config::Settings;
use kvcli::protocol::{read_command, write_response, Command, Response};

/// Welcome line sent by the real server
pub const WELCOME: &str = "+OK KV-Storage-Engine ready\r\n";

// =============================================================================
// Helper Functions
// =============================================================================

/// Settings pointing at `addr` with the given timeout
pub fn settings_for(addr: SocketAddr, timeout: Duration) -> Settings {
    Settings {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout,
    }
}

/// Accept exactly one connection and hand it to `handler`
pub fn spawn_raw<F>(handler: F) -> SocketAddr
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        handler(stream);
    });

    addr
}

/// Accept one connection, send `welcome`, then answer each incoming line
/// with the next entry of `replies` (raw, terminator included)
pub fn spawn_scripted(welcome: &'static str, replies: Vec<&'static str>) -> SocketAddr {
    spawn_raw(move |mut stream| {
        let _ = stream.write_all(welcome.as_bytes());
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        for reply in replies {
            if kvcli::protocol::read_line(&mut reader).is_err() {
                return;
            }
            let _ = stream.write_all(reply.as_bytes());
        }
        // Hold the socket open until the client goes away
        let _ = kvcli::protocol::read_line(&mut reader);
    })
}

/// In-memory KV server that accepts connections until the test exits
///
/// Connections are served one after another and share one store.
pub fn spawn_kv_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    thread::spawn(move || {
        let mut store = HashMap::new();
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => serve(stream, &mut store),
                Err(_) => break,
            }
        }
    });

    addr
}

fn serve(mut stream: TcpStream, store: &mut HashMap<String, String>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    if stream.write_all(WELCOME.as_bytes()).is_err() {
        return;
    }
    let mut reader = BufReader::new(stream.try_clone().expect("clone"));

    loop {
        let command = match read_command(&mut reader) {
            Ok(command) => command,
            Err(e) if e.is_transport() => return,
            Err(_) => {
                if write_response(&mut stream, &Response::error("INVALID_COMMAND")).is_err() {
                    return;
                }
                continue;
            }
        };

        let quit = command == Command::Quit;
        let response = execute(command, store);
        if write_response(&mut stream, &response).is_err() || quit {
            return;
        }
    }
}

fn execute(command: Command, store: &mut HashMap<String, String>) -> Response {
    match command {
        Command::Get { key } => match store.get(&key) {
            Some(value) => Response::with_value(value.clone()),
            None => Response::not_found(),
        },
        Command::Put { key, value } => {
            store.insert(key, value);
            Response::ok("STORED")
        }
        Command::Delete { key } => match store.remove(&key) {
            Some(_) => Response::ok("DELETED"),
            None => Response::not_found(),
        },
        Command::Ping => Response::ok("PONG"),
        Command::Quit => Response::ok("BYE"),
        Command::Status => Response::ok(format!("role=leader keys={}", store.len())),
    }
}
