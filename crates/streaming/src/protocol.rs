//! Message model.
//!
//! Every exchange is a single [`Message`] of four text fields. `header` picks
//! the operation, `status` is empty on requests and carries the outcome on
//! responses. Which of `key`/`value` must be present depends on the header;
//! see [`Message::validate`].

use crate::error::{Result, StreamingError};
use std::fmt;
use std::str::FromStr;

/// Longest key accepted for any header, in bytes.
pub const MAX_KEY_LEN: usize = 20;

/// Operation selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Header {
    // Client-facing
    Connect,
    Disconnect,
    Get,
    Put,
    LogLevel,
    Help,
    Quit,
    // Node-facing
    AdminPut,
    Start,
    Stop,
    Metadata,
    AddNode,
    RemoveNode,
    Shutdown,
    Init,
}

impl Header {
    pub const ALL: [Header; 15] = [
        Header::Connect,
        Header::Disconnect,
        Header::Get,
        Header::Put,
        Header::LogLevel,
        Header::Help,
        Header::Quit,
        Header::AdminPut,
        Header::Start,
        Header::Stop,
        Header::Metadata,
        Header::AddNode,
        Header::RemoveNode,
        Header::Shutdown,
        Header::Init,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Header::Connect => "connect",
            Header::Disconnect => "disconnect",
            Header::Get => "get",
            Header::Put => "put",
            Header::LogLevel => "logLevel",
            Header::Help => "help",
            Header::Quit => "quit",
            Header::AdminPut => "admin_put",
            Header::Start => "start",
            Header::Stop => "stop",
            Header::Metadata => "metadata",
            Header::AddNode => "addNode",
            Header::RemoveNode => "removeNode",
            Header::Shutdown => "shutdown",
            Header::Init => "init",
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Header {
    type Err = StreamingError;

    fn from_str(s: &str) -> Result<Self> {
        Header::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| StreamingError::Format(format!("unknown header {s:?}")))
    }
}

/// Outcome carried by a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    GetSuccess,
    GetError,
    PutSuccess,
    PutUpdate,
    PutError,
    DeleteSuccess,
    DeleteError,
    ServerStopped,
    ServerWriteLock,
    /// The value field carries the serialized ring.
    ServerNotResponsible,
    ConnectSuccess,
    Success,
    Failed,
}

impl Status {
    pub const ALL: [Status; 13] = [
        Status::GetSuccess,
        Status::GetError,
        Status::PutSuccess,
        Status::PutUpdate,
        Status::PutError,
        Status::DeleteSuccess,
        Status::DeleteError,
        Status::ServerStopped,
        Status::ServerWriteLock,
        Status::ServerNotResponsible,
        Status::ConnectSuccess,
        Status::Success,
        Status::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::GetSuccess => "GET_SUCCESS",
            Status::GetError => "GET_ERROR",
            Status::PutSuccess => "PUT_SUCCESS",
            Status::PutUpdate => "PUT_UPDATE",
            Status::PutError => "PUT_ERROR",
            Status::DeleteSuccess => "DELETE_SUCCESS",
            Status::DeleteError => "DELETE_ERROR",
            Status::ServerStopped => "SERVER_STOPPED",
            Status::ServerWriteLock => "SERVER_WRITE_LOCK",
            Status::ServerNotResponsible => "SERVER_NOT_RESPONSIBLE",
            Status::ConnectSuccess => "CONNECT_SUCCESS",
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(
            self,
            Status::GetSuccess
                | Status::PutSuccess
                | Status::PutUpdate
                | Status::DeleteSuccess
                | Status::ConnectSuccess
                | Status::Success
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StreamingError;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| StreamingError::Format(format!("unknown status {s:?}")))
    }
}

/// Levels accepted by the `logLevel` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    All,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Off,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::All => "ALL",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Off => "OFF",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = StreamingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(LogLevel::All),
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "OFF" => Ok(LogLevel::Off),
            _ => Err(StreamingError::Validation(format!("unknown log level {s:?}"))),
        }
    }
}

/// One protocol message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub status: Option<Status>,
    pub key: String,
    pub value: String,
}

impl Message {
    /// A request: no status.
    pub fn request(header: Header, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header,
            status: None,
            key: key.into(),
            value: value.into(),
        }
    }

    /// A response with the given outcome.
    pub fn response(
        header: Header,
        status: Status,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            header,
            status: Some(status),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn get(key: impl Into<String>) -> Self {
        Self::request(Header::Get, key, "")
    }

    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::request(Header::Put, key, value)
    }

    pub fn admin_put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::request(Header::AdminPut, key, value)
    }

    /// A request carrying neither key nor value (`start`, `stop`, ...).
    pub fn command(header: Header) -> Self {
        Self::request(header, "", "")
    }

    /// Copy of this message's header and key answered with `status`.
    pub fn reply(&self, status: Status, value: impl Into<String>) -> Self {
        Self::response(self.header, status, self.key.clone(), value)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_some_and(Status::is_success)
    }

    /// Check the per-header presence rules and the key length limit.
    pub fn validate(&self) -> Result<()> {
        if self.key.len() > MAX_KEY_LEN {
            return Err(StreamingError::Validation(format!(
                "key is {} bytes, limit is {MAX_KEY_LEN}",
                self.key.len()
            )));
        }

        let has_key = !self.key.is_empty();
        let has_value = !self.value.is_empty();
        let ok = match self.header {
            Header::Connect | Header::Put | Header::AdminPut | Header::RemoveNode => {
                has_key && has_value
            }
            Header::Get | Header::AddNode => has_key,
            Header::Disconnect
            | Header::Help
            | Header::Shutdown
            | Header::Init
            | Header::Start
            | Header::Stop => !has_key && !has_value,
            Header::LogLevel => {
                self.key.parse::<LogLevel>()?;
                true
            }
            Header::Metadata => has_value || self.is_success(),
            Header::Quit => true,
        };

        if ok {
            Ok(())
        } else {
            Err(StreamingError::Validation(format!(
                "wrong fields for {}: key {}, value {}",
                self.header,
                if has_key { "present" } else { "missing" },
                if has_value { "present" } else { "missing" },
            )))
        }
    }
}
