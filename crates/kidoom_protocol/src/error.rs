//! # Transport Error Types
//!
//! All errors that can occur on the bridge's wire.

use thiserror::Error;

/// Errors that can occur on the framed transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Outbound operation invoked on a disconnected handle.
    #[error("not connected")]
    NotConnected,

    /// Unexpected tag during handshake, or a malformed header.
    #[error("protocol violation: expected tag 0x{expected:02x}, got 0x{got:02x}")]
    ProtocolViolation {
        /// The tag that was required at this point of the exchange.
        expected: u32,
        /// The tag that actually arrived.
        got: u32,
    },

    /// The peer closed the connection (zero-byte read or SHUTDOWN message).
    #[error("peer closed the connection")]
    PeerClosed,

    /// Underlying kernel error.
    #[error("i/o error during {op}: {source}")]
    Io {
        /// Operation that failed (`connect`, `send`, `recv`, ...).
        op: &'static str,
        /// The kernel-level error.
        #[source]
        source: std::io::Error,
    },

    /// Payload length exceeds the limit for its path.
    #[error("oversize payload: {len} bytes exceeds limit of {limit}")]
    Oversize {
        /// Declared payload length.
        len: u32,
        /// The per-path limit that was exceeded.
        limit: u32,
    },
}

impl TransportError {
    /// Wraps a kernel error with the name of the failing operation.
    #[must_use]
    pub fn io(op: &'static str, source: std::io::Error) -> Self {
        Self::Io { op, source }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
