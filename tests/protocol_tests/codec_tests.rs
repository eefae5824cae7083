//! Codec Tests
//!
//! Tests for command encoding and response decoding.

use std::io::Cursor;
use kvcli::protocol::{
    Command, Response, Status,
    encode_command, decode_command,
    encode_response, decode_response,
    read_command, write_command,
    read_response, write_response,
};
use kvcli::KvError;

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_ping() {
    let encoded = encode_command(&Command::Ping).unwrap();
    assert_eq!(encoded, b"PING\r\n");
}

#[test]
fn test_encode_quit_and_status() {
    assert_eq!(encode_command(&Command::Quit).unwrap(), b"QUIT\r\n");
    assert_eq!(encode_command(&Command::Status).unwrap(), b"STATUS\r\n");
}

#[test]
fn test_encode_get() {
    let cmd = Command::Get {
        key: "user:1".to_string(),
    };
    assert_eq!(encode_command(&cmd).unwrap(), b"GET user:1\r\n");
}

#[test]
fn test_encode_get_key_with_space() {
    let cmd = Command::Get {
        key: "my key".to_string(),
    };
    assert_eq!(encode_command(&cmd).unwrap(), b"GET my key\r\n");
}

#[test]
fn test_encode_delete() {
    let cmd = Command::Delete {
        key: "temp".to_string(),
    };
    assert_eq!(encode_command(&cmd).unwrap(), b"DELETE temp\r\n");
}

#[test]
fn test_encode_put() {
    let cmd = Command::Put {
        key: "counter".to_string(),
        value: "42".to_string(),
    };
    assert_eq!(encode_command(&cmd).unwrap(), b"PUT counter 42\r\n");
}

#[test]
fn test_encode_put_value_with_space() {
    let cmd = Command::Put {
        key: "k".to_string(),
        value: "v1 v2".to_string(),
    };
    assert_eq!(encode_command(&cmd).unwrap(), b"PUT k v1 v2\r\n");
}

#[test]
fn test_put_value_with_space_survives_value_frame() {
    let value = "v1 v2";
    let cmd = Command::Put {
        key: "k".to_string(),
        value: value.to_string(),
    };
    let encoded = encode_command(&cmd).unwrap();

    // The server echoes back everything after the key
    let line = String::from_utf8(encoded).unwrap();
    let echoed = line.trim_end().splitn(3, ' ').nth(2).unwrap();
    let resp = decode_response(&format!("+VALUE {}\r\n", echoed)).unwrap();

    assert_eq!(resp.value.as_deref(), Some(value));
}

// =============================================================================
// Argument Validation Tests
// =============================================================================

#[test]
fn test_encode_rejects_line_terminators() {
    let cases = vec![
        Command::Get { key: "a\r\nPING".to_string() },
        Command::Delete { key: "a\n".to_string() },
        Command::Put { key: "k".to_string(), value: "line1\nline2".to_string() },
        Command::Put { key: "k\r".to_string(), value: "v".to_string() },
    ];

    for cmd in cases {
        match encode_command(&cmd) {
            Err(KvError::InvalidArgument(msg)) => assert!(msg.contains("line terminator")),
            other => panic!("Expected InvalidArgument for {:?}, got {:?}", cmd, other),
        }
    }
}

#[test]
fn test_encode_rejects_empty_key() {
    let cmd = Command::Get { key: String::new() };
    assert!(matches!(encode_command(&cmd), Err(KvError::InvalidArgument(_))));
}

#[test]
fn test_encode_rejects_put_key_with_space() {
    let cmd = Command::Put {
        key: "two words".to_string(),
        value: "v".to_string(),
    };
    assert!(matches!(encode_command(&cmd), Err(KvError::InvalidArgument(_))));
}

#[test]
fn test_encode_rejects_empty_put_value() {
    let cmd = Command::Put {
        key: "k".to_string(),
        value: String::new(),
    };
    assert!(matches!(encode_command(&cmd), Err(KvError::InvalidArgument(_))));
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

#[test]
fn test_decode_ok_with_message() {
    let resp = decode_response("+OK stored\r\n").unwrap();
    assert!(resp.success());
    assert_eq!(resp.status, Status::Ok);
    assert_eq!(resp.message, "stored");
    assert_eq!(resp.value, None);
}

#[test]
fn test_decode_value_keeps_spaces() {
    let resp = decode_response("+VALUE hello world\n").unwrap();
    assert!(resp.success());
    assert_eq!(resp.message, "OK");
    assert_eq!(resp.value.as_deref(), Some("hello world"));
}

#[test]
fn test_decode_single_field_success() {
    let resp = decode_response("+PONG\r\n").unwrap();
    assert!(resp.success());
    assert_eq!(resp.message, "PONG");
    assert_eq!(resp.value, None);
}

#[test]
fn test_decode_value_token_without_data_is_message() {
    let resp = decode_response("+VALUE\r\n").unwrap();
    assert!(resp.success());
    assert_eq!(resp.message, "VALUE");
    assert_eq!(resp.value, None);
}

#[test]
fn test_decode_error_with_message() {
    let resp = decode_response("-ERR key not found\n").unwrap();
    assert!(!resp.success());
    assert_eq!(resp.status, Status::Error);
    assert_eq!(resp.message, "key not found");
    assert_eq!(resp.value, None);
}

#[test]
fn test_decode_error_without_space() {
    let resp = decode_response("-FAILED\r\n").unwrap();
    assert_eq!(resp.status, Status::Error);
    assert_eq!(resp.message, "FAILED");
}

#[test]
fn test_decode_not_found() {
    let resp = decode_response("-ERR NOT_FOUND\r\n").unwrap();
    assert!(!resp.success());
    assert!(resp.is_not_found());
    assert_eq!(resp.status, Status::NotFound);
    assert_eq!(resp.message, "NOT_FOUND");
}

#[test]
fn test_decode_not_found_requires_exact_message() {
    let resp = decode_response("-ERR NOT_FOUND yet\r\n").unwrap();
    assert_eq!(resp.status, Status::Error);
}

#[test]
fn test_decode_empty_response() {
    match decode_response("") {
        Err(KvError::Protocol(msg)) => assert_eq!(msg, "empty response"),
        other => panic!("Expected empty response error, got {:?}", other),
    }
    assert!(matches!(decode_response("\r\n"), Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_unknown_format() {
    match decode_response("?mystery\n") {
        Err(KvError::Protocol(msg)) => assert!(msg.starts_with("unknown response format")),
        other => panic!("Expected unknown format error, got {:?}", other),
    }
}

#[test]
fn test_decode_non_ascii_marker() {
    assert!(matches!(decode_response("é\r\n"), Err(KvError::Protocol(_))));
}

// =============================================================================
// Server-side Framing Tests
// =============================================================================

#[test]
fn test_encode_response_frames() {
    assert_eq!(encode_response(&Response::ok("STORED")), b"+OK STORED\r\n");
    assert_eq!(encode_response(&Response::with_value("a b")), b"+VALUE a b\r\n");
    assert_eq!(encode_response(&Response::not_found()), b"-ERR NOT_FOUND\r\n");
    assert_eq!(encode_response(&Response::error("boom")), b"-ERR boom\r\n");
}

#[test]
fn test_decode_command_variants() {
    assert_eq!(
        decode_command("get user:1\r\n").unwrap(),
        Command::Get { key: "user:1".to_string() }
    );
    assert_eq!(
        decode_command("SET k hello world").unwrap(),
        Command::Put { key: "k".to_string(), value: "hello world".to_string() }
    );
    assert_eq!(
        decode_command("DEL k").unwrap(),
        Command::Delete { key: "k".to_string() }
    );
    assert_eq!(decode_command("exit").unwrap(), Command::Quit);
    assert_eq!(decode_command("STATUS").unwrap(), Command::Status);
}

#[test]
fn test_decode_command_errors() {
    assert!(decode_command("").is_err());
    assert!(decode_command("GET").is_err());
    assert!(decode_command("PUT onlykey").is_err());
    assert!(decode_command("FLY away").is_err());
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_command_roundtrip() {
    let mut buf = Vec::new();
    let cmd = Command::Put {
        key: "k".to_string(),
        value: "v1 v2".to_string(),
    };
    write_command(&mut buf, &cmd).unwrap();

    let mut reader = Cursor::new(buf);
    assert_eq!(read_command(&mut reader).unwrap(), cmd);
}

#[test]
fn test_stream_reads_responses_in_order() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::ok("STORED")).unwrap();
    write_response(&mut buf, &Response::with_value("1")).unwrap();
    write_response(&mut buf, &Response::not_found()).unwrap();

    let mut reader = Cursor::new(buf);
    assert_eq!(read_response(&mut reader).unwrap(), Response::ok("STORED"));
    assert_eq!(read_response(&mut reader).unwrap(), Response::with_value("1"));
    assert_eq!(read_response(&mut reader).unwrap(), Response::not_found());
    assert!(read_response(&mut reader).unwrap_err().is_transport());
}

#[test]
fn test_write_command_validates_before_writing() {
    let mut buf = Vec::new();
    let cmd = Command::Get { key: "bad\nkey".to_string() };
    assert!(write_command(&mut buf, &cmd).is_err());
    assert!(buf.is_empty());
}
