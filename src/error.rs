//! Error types for the thermal coordinator
//!
//! Every error in this program is fatal: the protocol needs all peers to
//! agree each round, so there is nothing to retry. Errors carry:
//! - Numeric error codes for machine parsing
//! - Process exit codes per category
//! - User-facing hints

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration / input errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,
    InvalidInput = 103,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoNotFound = 203,

    // Setup errors (3xx)
    BindFailed = 300,
    AcceptFailed = 301,

    // Round errors (4xx)
    PeerReceive = 400,
    PeerSend = 401,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            _ => 90,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the coordinator
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration and input
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The initial central temperature could not be parsed
    #[error("Invalid initial temperature '{input}': {reason}")]
    InvalidTemperature { input: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // IO
    // ─────────────────────────────────────────────────────────────

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Peer setup
    // ─────────────────────────────────────────────────────────────

    /// Listening endpoint could not be created
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// An inbound connection failed before all peers were registered
    #[error("Failed to accept peer connection ({accepted} of {expected} registered): {source}")]
    Accept {
        accepted: usize,
        expected: usize,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Round I/O
    // ─────────────────────────────────────────────────────────────

    /// Receiving a report from a peer failed
    #[error("Failed to receive from peer {index} ({addr}) in round {round}: {source}")]
    PeerReceive {
        index: usize,
        addr: PeerAddr,
        round: u64,
        #[source]
        source: std::io::Error,
    },

    /// Sending an update to a peer failed
    #[error("Failed to send to peer {index} ({addr}) in round {round}: {source}")]
    PeerSend {
        index: usize,
        addr: PeerAddr,
        round: u64,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Remote address of a peer, when the transport has one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddr(pub Option<SocketAddr>);

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(addr) => write!(f, "{}", addr),
            None => write!(f, "local"),
        }
    }
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,
            Error::InvalidTemperature { .. } => ErrorCode::InvalidInput,

            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::Bind { .. } => ErrorCode::BindFailed,
            Error::Accept { .. } => ErrorCode::AcceptFailed,

            Error::PeerReceive { .. } => ErrorCode::PeerReceive,
            Error::PeerSend { .. } => ErrorCode::PeerSend,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Index of the peer involved in the failure, if any
    pub fn peer_index(&self) -> Option<usize> {
        match self {
            Error::PeerReceive { index, .. } | Error::PeerSend { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'thermal-coordinator config init' to create a default configuration file.",
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'thermal-coordinator config validate' to see details.",
            ),
            Error::InvalidTemperature { .. } => Some(
                "Pass the initial central temperature as a number, e.g. 'thermal-coordinator run 37.5'.",
            ),
            Error::Bind { .. } => Some(
                "Another coordinator may already be listening on this address. Change 'listen_addr' or use --listen.",
            ),
            Error::Accept { .. } => Some(
                "A peer failed while connecting. Restart the coordinator and all peer processes.",
            ),
            Error::PeerReceive { .. } | Error::PeerSend { .. } => Some(
                "A peer process exited or dropped its connection. Every peer must stay connected until the terminal message.",
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl Error {
    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid temperature error
    pub fn invalid_temperature(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidTemperature {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
