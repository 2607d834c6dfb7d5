//! # Framed Transport
//!
//! Length-prefixed messaging over a local Unix stream socket.
//!
//! ## Design
//!
//! - Single owned handle, default-constructed `Disconnected` (no hidden
//!   singleton)
//! - Blocking `connect` with an `INIT_COMPLETE` handshake
//! - `send` is all-or-nothing against short writes
//! - `try_recv` does a zero-timeout `poll(2)` readiness check and never
//!   blocks the game loop
//! - Any fatal wire error transitions the handle back to `Disconnected`
//!
//! ## Short-I/O Discipline
//!
//! Both `read` and `write` may return fewer bytes than requested; every
//! wire access loops until the full count is transferred. A zero return
//! is treated as the peer closing the connection.

use std::io::{Read, Write};
use std::os::fd::AsFd;
use std::os::unix::net::UnixStream;
use std::path::Path;

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::socket::{setsockopt, sockopt};

use crate::error::{TransportError, TransportResult};
use crate::message::{MessageHeader, MessageType};
use crate::{MAX_KEY_EVENT_PAYLOAD, MAX_UNKNOWN_PAYLOAD, SOCKET_BUFFER_BYTES};

/// A message received from the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    /// Decoded message tag.
    pub msg_type: MessageType,
    /// Exact payload bytes.
    pub payload: Vec<u8>,
}

/// Connection state of the transport handle.
enum ConnectionState {
    /// No socket. Inbound operations are no-ops, outbound ones are errors.
    Disconnected,
    /// Live socket, handshake completed.
    Connected(UnixStream),
}

/// The bridge's end of the framed Unix-socket protocol.
pub struct BridgeTransport {
    state: ConnectionState,
}

impl Default for BridgeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeTransport {
    /// Creates a disconnected handle.
    #[must_use]
    pub const fn new() -> Self {
        Self { state: ConnectionState::Disconnected }
    }

    /// Returns true if the handle holds a live connection.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Connects to the peer's socket and performs the init handshake.
    ///
    /// Blocks until the peer sends `INIT_COMPLETE` (its payload, if any, is
    /// discarded). Send and receive buffers are enlarged to 1 MiB on a
    /// best-effort basis so frame sends rarely block on buffer pressure.
    ///
    /// # Errors
    ///
    /// Returns an error on any system failure, a closed peer, or a first
    /// message that is not `INIT_COMPLETE`. On failure the handle is left
    /// `Disconnected` and the socket, if opened, is released.
    pub fn connect(&mut self, path: impl AsRef<Path>) -> TransportResult<()> {
        self.close();

        let path = path.as_ref();
        let mut stream =
            UnixStream::connect(path).map_err(|e| TransportError::io("connect", e))?;

        // Best effort: buffer-size failures are ignored.
        let _ = setsockopt(&stream, sockopt::SndBuf, &SOCKET_BUFFER_BYTES);
        let _ = setsockopt(&stream, sockopt::RcvBuf, &SOCKET_BUFFER_BYTES);

        let header = read_header(&mut stream, "handshake")?;
        if header.message_type() != Some(MessageType::InitComplete) {
            return Err(TransportError::ProtocolViolation {
                expected: MessageType::InitComplete as u32,
                got: header.tag,
            });
        }
        drain_payload(&mut stream, header.payload_len, "handshake")?;

        tracing::info!("connected to peer at {}", path.display());
        self.state = ConnectionState::Connected(stream);
        Ok(())
    }

    /// Sends one framed message: 8-byte header, then the exact payload.
    ///
    /// Loops until every byte is accepted by the kernel; may block on
    /// write-buffer pressure, which the enlarged socket buffers make rare.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] on a disconnected handle.
    /// Any wire failure is terminal: the handle transitions to
    /// `Disconnected` and the error is returned.
    pub fn send(&mut self, msg_type: MessageType, payload: &[u8]) -> TransportResult<()> {
        let ConnectionState::Connected(stream) = &mut self.state else {
            return Err(TransportError::NotConnected);
        };

        #[allow(clippy::cast_possible_truncation)]
        let header = MessageHeader::new(msg_type, payload.len() as u32);
        let result = write_exactly(stream, &header.encode(), "send")
            .and_then(|()| write_exactly(stream, payload, "send"));

        if result.is_err() {
            self.state = ConnectionState::Disconnected;
        }
        result
    }

    /// Drains at most one pending inbound message without blocking.
    ///
    /// A zero-timeout readiness check decides whether anything is buffered;
    /// if not, returns `Ok(None)` immediately. Unknown tags with payloads
    /// under 64 KiB are drained, logged, and reported as `Ok(None)`; an
    /// `INIT_COMPLETE` arriving mid-session is discarded the same way.
    ///
    /// Calling on a disconnected handle is a no-op (`Ok(None)`).
    ///
    /// # Errors
    ///
    /// [`TransportError::PeerClosed`] on a `SHUTDOWN` message or a peer
    /// hangup, [`TransportError::Oversize`] on an unknown tag with a
    /// payload of 64 KiB or more or a `KEY_EVENT` of 256 bytes or more,
    /// [`TransportError::Io`] on kernel failures. All of these are fatal:
    /// the handle transitions to `Disconnected`.
    pub fn try_recv(&mut self) -> TransportResult<Option<InboundMessage>> {
        let ConnectionState::Connected(stream) = &mut self.state else {
            return Ok(None);
        };

        let result = recv_one(stream);
        if result.is_err() {
            self.state = ConnectionState::Disconnected;
        }
        result
    }

    /// Closes the connection, best-effort sending a `SHUTDOWN` first.
    ///
    /// Idempotent; errors while sending the shutdown header are ignored.
    pub fn close(&mut self) {
        if let ConnectionState::Connected(stream) = &mut self.state {
            let header = MessageHeader::new(MessageType::Shutdown, 0);
            let _ = stream.write_all(&header.encode());
            tracing::info!("bridge socket closed");
        }
        self.state = ConnectionState::Disconnected;
    }
}

/// Receives and classifies one message from a ready socket.
fn recv_one(stream: &mut UnixStream) -> TransportResult<Option<InboundMessage>> {
    if !poll_readable(stream)? {
        return Ok(None);
    }

    let header = read_header(stream, "recv")?;
    match header.message_type() {
        Some(MessageType::Shutdown) => {
            tracing::info!("received SHUTDOWN from peer");
            Err(TransportError::PeerClosed)
        }
        Some(MessageType::KeyEvent) => {
            if header.payload_len >= MAX_KEY_EVENT_PAYLOAD {
                return Err(TransportError::Oversize {
                    len: header.payload_len,
                    limit: MAX_KEY_EVENT_PAYLOAD,
                });
            }
            let payload = read_payload(stream, header.payload_len, "recv")?;
            Ok(Some(InboundMessage { msg_type: MessageType::KeyEvent, payload }))
        }
        Some(MessageType::InitComplete) => {
            // Late handshake echo; payload is discarded per protocol.
            drain_payload(stream, header.payload_len, "recv")?;
            Ok(None)
        }
        Some(msg_type) => {
            let payload = read_payload(stream, header.payload_len, "recv")?;
            Ok(Some(InboundMessage { msg_type, payload }))
        }
        None => {
            if header.payload_len >= MAX_UNKNOWN_PAYLOAD {
                return Err(TransportError::Oversize {
                    len: header.payload_len,
                    limit: MAX_UNKNOWN_PAYLOAD,
                });
            }
            tracing::warn!(
                "ignoring unknown message tag 0x{:02x} ({} bytes)",
                header.tag,
                header.payload_len
            );
            drain_payload(stream, header.payload_len, "recv")?;
            Ok(None)
        }
    }
}

/// Zero-timeout readiness check on the socket's read side.
fn poll_readable(stream: &UnixStream) -> TransportResult<bool> {
    let mut fds = [PollFd::new(stream.as_fd(), PollFlags::POLLIN)];
    match poll(&mut fds, PollTimeout::ZERO) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(true),
        Err(errno) => Err(TransportError::io("poll", errno.into())),
    }
}

/// Reads one 8-byte header to completion.
fn read_header(stream: &mut UnixStream, op: &'static str) -> TransportResult<MessageHeader> {
    let mut bytes = [0u8; MessageHeader::SIZE];
    read_exactly(stream, &mut bytes, op)?;
    Ok(MessageHeader::decode(bytes))
}

/// Reads exactly `len` payload bytes.
fn read_payload(
    stream: &mut UnixStream,
    len: u32,
    op: &'static str,
) -> TransportResult<Vec<u8>> {
    let mut payload = vec![0u8; len as usize];
    read_exactly(stream, &mut payload, op)?;
    Ok(payload)
}

/// Reads and discards exactly `len` payload bytes.
fn drain_payload(stream: &mut UnixStream, len: u32, op: &'static str) -> TransportResult<()> {
    if len > 0 {
        read_payload(stream, len, op)?;
    }
    Ok(())
}

/// Reads until `buf` is full, looping over short reads.
fn read_exactly(
    stream: &mut UnixStream,
    buf: &mut [u8],
    op: &'static str,
) -> TransportResult<()> {
    let mut total = 0;
    while total < buf.len() {
        match stream.read(&mut buf[total..]) {
            Ok(0) => return Err(TransportError::PeerClosed),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(TransportError::io(op, e)),
        }
    }
    Ok(())
}

/// Writes the whole buffer, looping over short writes.
fn write_exactly(
    stream: &mut UnixStream,
    buf: &[u8],
    op: &'static str,
) -> TransportResult<()> {
    let mut total = 0;
    while total < buf.len() {
        match stream.write(&buf[total..]) {
            Ok(0) => return Err(TransportError::PeerClosed),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(TransportError::io(op, e)),
        }
    }
    Ok(())
}
