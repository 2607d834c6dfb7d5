//! # Message Envelope
//!
//! Every on-wire message is a fixed 8-byte header followed by an exact
//! payload: `[4 bytes: tag][4 bytes: payload length][N bytes: payload]`.
//! Both header integers are little-endian. No magic, no version, no
//! checksum - the transport is strictly local.

/// Message tags recognized on the wire.
///
/// Values must match the peer renderer's side of the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    /// Bridge -> peer: JSON frame record.
    FrameData = 0x01,
    /// Peer -> bridge: JSON `{pressed, key}` event.
    KeyEvent = 0x02,
    /// Peer -> bridge: handshake acknowledgment; payload is discarded.
    InitComplete = 0x03,
    /// Either direction: clean shutdown, empty payload.
    Shutdown = 0x04,
    /// Bridge -> peer: screenshot notice (external hook), JSON payload.
    Screenshot = 0x05,
}

impl MessageType {
    /// Decodes a raw tag value, if recognized.
    #[must_use]
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0x01 => Some(Self::FrameData),
            0x02 => Some(Self::KeyEvent),
            0x03 => Some(Self::InitComplete),
            0x04 => Some(Self::Shutdown),
            0x05 => Some(Self::Screenshot),
            _ => None,
        }
    }
}

/// The 8-byte message header present on every framed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// Raw message tag. Kept raw so unknown tags survive decoding.
    pub tag: u32,
    /// Exact payload length in bytes.
    pub payload_len: u32,
}

impl MessageHeader {
    /// Size of the encoded header in bytes.
    pub const SIZE: usize = 8;

    /// Creates a header for a known message type.
    #[inline]
    #[must_use]
    pub const fn new(msg_type: MessageType, payload_len: u32) -> Self {
        Self { tag: msg_type as u32, payload_len }
    }

    /// Encodes the header into its 8-byte wire form.
    #[inline]
    #[must_use]
    pub const fn encode(self) -> [u8; Self::SIZE] {
        let t = self.tag.to_le_bytes();
        let l = self.payload_len.to_le_bytes();
        [t[0], t[1], t[2], t[3], l[0], l[1], l[2], l[3]]
    }

    /// Decodes a header from its 8-byte wire form.
    #[inline]
    #[must_use]
    pub fn decode(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            tag: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            payload_len: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Decodes the tag, if it is one we recognize.
    #[inline]
    #[must_use]
    pub const fn message_type(self) -> Option<MessageType> {
        MessageType::from_u32(self.tag)
    }
}
