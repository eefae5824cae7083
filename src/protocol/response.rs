//! Response definitions
//!
//! Represents decoded server responses.

/// Message the server uses for a successful value lookup
pub const OK_MESSAGE: &str = "OK";

/// Message the server uses for an absent key
pub const NOT_FOUND_MESSAGE: &str = "NOT_FOUND";

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error,
}

/// A decoded server response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Outcome reported by the server
    pub status: Status,

    /// Free-text message (`OK` for value frames)
    pub message: String,

    /// Value carried by a `+VALUE` frame
    ///
    /// Set for whichever command the frame answers. GET is the normal case;
    /// some servers also answer STATUS this way, which [`status_text`]
    /// relies on.
    ///
    /// [`status_text`]: Response::status_text
    pub value: Option<String>,
}

impl Response {
    /// Create an OK response with a message
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            value: None,
        }
    }

    /// Create an OK response carrying a value
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: OK_MESSAGE.to_string(),
            value: Some(value.into()),
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            message: NOT_FOUND_MESSAGE.to_string(),
            value: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            value: None,
        }
    }

    /// Whether the server reported success
    pub fn success(&self) -> bool {
        self.status == Status::Ok
    }

    /// Whether the server reported an absent key
    pub fn is_not_found(&self) -> bool {
        self.status == Status::NotFound
    }

    /// Value if present, otherwise the message
    ///
    /// STATUS replies may put their text in either place.
    pub fn status_text(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.message)
    }
}
