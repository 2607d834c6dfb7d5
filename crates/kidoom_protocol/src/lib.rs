//! # KiDoom Protocol - The Wire
//!
//! Length-prefixed binary framing between the DOOM-side bridge and the
//! external vector renderer, over a local Unix stream socket.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────┬──────────────────┬─────────────────┐
//! │ tag          │ payload length   │ payload         │
//! │ 4 bytes (LE) │ 4 bytes (LE)     │ exactly N bytes │
//! └──────────────┴──────────────────┴─────────────────┘
//! ```
//!
//! No magic, no version, no checksum: peers are colocated on the same
//! machine and the transport is strictly local. Payload lengths are exact;
//! there is no re-synchronization, so a framing mismatch is fatal for the
//! connection.
//!
//! ## Handshake
//!
//! The peer creates and listens on the socket; the bridge connects and
//! blocks until the peer's first message, which must be `INIT_COMPLETE`
//! (payload ignored). Either side may send an empty `SHUTDOWN` to end the
//! session.
//!
//! ## Example
//!
//! ```rust,ignore
//! use kidoom_protocol::{BridgeTransport, MessageType, DEFAULT_SOCKET_PATH};
//!
//! let mut transport = BridgeTransport::new();
//! transport.connect(DEFAULT_SOCKET_PATH)?;
//! transport.send(MessageType::FrameData, json.as_bytes())?;
//! if let Some(msg) = transport.try_recv()? {
//!     // at most one message per tick
//! }
//! transport.close();
//! ```

pub mod error;
pub mod message;
pub mod transport;

// Re-exports for convenience
pub use error::{TransportError, TransportResult};
pub use message::{MessageHeader, MessageType};
pub use transport::{BridgeTransport, InboundMessage};

/// Default filesystem path of the peer's listening socket.
///
/// The peer is responsible for creating and bind-listening on it before
/// the bridge connects.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/kicad_doom.sock";

/// Socket send/receive buffer size requested at connect time (1 MiB).
///
/// Large OS-level buffers keep frame sends from blocking the game loop on
/// write-buffer pressure. Enlargement is best effort.
pub const SOCKET_BUFFER_BYTES: usize = 1_048_576;

/// Unknown-tag payloads at or above this size are connection-fatal;
/// smaller ones are drained and ignored.
pub const MAX_UNKNOWN_PAYLOAD: u32 = 65_536;

/// Key-event payloads at or above this size are connection-fatal.
pub const MAX_KEY_EVENT_PAYLOAD: u32 = 256;
