//! Fixed-size temperature messages
//!
//! Wire format (native byte order, no padding):
//!
//! ```text
//! [ value: f32 (4 bytes) ][ origin: i32 (4 bytes) ]
//! ```

use std::fmt;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Encoded size of a [`Message`] in bytes
pub const MESSAGE_SIZE: usize = 8;

/// Raw origin tag of a coordinator update
pub const ORIGIN_COORDINATOR: i32 = 0;

/// Raw origin tag of the terminal message
pub const ORIGIN_TERMINATE: i32 = -1;

// ─────────────────────────────────────────────────────────────────
// Origin
// ─────────────────────────────────────────────────────────────────

/// Who sent a message, and what it means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Per-round update from the coordinator
    Coordinator,
    /// Terminal notice; the value is the final converged result
    Terminate,
    /// Anything a peer put in the field. The coordinator never interprets it.
    Peer(i32),
}

impl Origin {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            ORIGIN_COORDINATOR => Origin::Coordinator,
            ORIGIN_TERMINATE => Origin::Terminate,
            other => Origin::Peer(other),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Origin::Coordinator => ORIGIN_COORDINATOR,
            Origin::Terminate => ORIGIN_TERMINATE,
            Origin::Peer(raw) => raw,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Coordinator => write!(f, "coordinator"),
            Origin::Terminate => write!(f, "terminate"),
            Origin::Peer(raw) => write!(f, "peer({})", raw),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────

/// The unit exchanged in both directions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Message {
    pub value: f32,
    pub origin: Origin,
}

impl Message {
    /// A round update carrying the new central temperature
    pub fn update(value: f32) -> Self {
        Self {
            value,
            origin: Origin::Coordinator,
        }
    }

    /// The terminal notice carrying the final central temperature
    pub fn terminate(value: f32) -> Self {
        Self {
            value,
            origin: Origin::Terminate,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.origin == Origin::Terminate
    }

    pub fn encode(&self) -> [u8; MESSAGE_SIZE] {
        let mut buf = [0u8; MESSAGE_SIZE];
        buf[..4].copy_from_slice(&self.value.to_ne_bytes());
        buf[4..].copy_from_slice(&self.origin.as_raw().to_ne_bytes());
        buf
    }

    pub fn decode(buf: &[u8; MESSAGE_SIZE]) -> Self {
        let value = f32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let origin = i32::from_ne_bytes([buf[4], buf[5], buf[6], buf[7]]);
        Self {
            value,
            origin: Origin::from_raw(origin),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Stream I/O
// ─────────────────────────────────────────────────────────────────

/// Read exactly one message. A closed stream or short read is an error.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Message> {
    let mut buf = [0u8; MESSAGE_SIZE];
    reader.read_exact(&mut buf).await?;
    Ok(Message::decode(&buf))
}

/// Write one message and flush it
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, msg: &Message) -> io::Result<()> {
    writer.write_all(&msg.encode()).await?;
    writer.flush().await
}
