//! # Input Intake
//!
//! Parses inbound `KEY_EVENT` payloads and hands the result to the host's
//! key queue.
//!
//! The parser is lenient by design: it scans for the `"pressed":` and
//! `"key":` markers rather than parsing the document, because that is
//! exactly what the peer's hand-rolled emitter is matched against. Missing
//! fields default to released / zero. A garbled key event must never crash
//! the game, so parsing cannot fail.

/// A parsed key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// True for key-down, false for key-up.
    pub pressed: bool,
    /// Key code in the host game's own encoding; not translated here.
    pub key: u8,
}

/// The host's key queue seam.
///
/// The bridge pushes every parsed key event through this; the game polls
/// its own queue at frame cadence.
pub trait KeySink {
    /// Accepts one key transition.
    fn enqueue(&mut self, pressed: bool, key: u8);
}

/// Number of slots in [`RingKeyQueue`].
pub const KEY_QUEUE_SIZE: usize = 16;

/// A fixed 16-slot ring buffer key queue.
///
/// Matches the host game's own queue: each slot packs the pressed bit and
/// the key code into one `u16`, and a full queue overwrites the oldest
/// entry. Provided so hosts and tests do not have to write their own sink.
#[derive(Clone, Debug, Default)]
pub struct RingKeyQueue {
    slots: [u16; KEY_QUEUE_SIZE],
    write: usize,
    read: usize,
}

impl RingKeyQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no events are queued.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Pops the oldest queued event, if any.
    pub fn pop(&mut self) -> Option<KeyEvent> {
        if self.is_empty() {
            return None;
        }
        let packed = self.slots[self.read];
        self.read = (self.read + 1) % KEY_QUEUE_SIZE;
        #[allow(clippy::cast_possible_truncation)]
        let key = (packed & 0xFF) as u8;
        Some(KeyEvent { pressed: packed >> 8 != 0, key })
    }
}

impl KeySink for RingKeyQueue {
    fn enqueue(&mut self, pressed: bool, key: u8) {
        self.slots[self.write] = (u16::from(pressed) << 8) | u16::from(key);
        self.write = (self.write + 1) % KEY_QUEUE_SIZE;
    }
}

/// Parses a `KEY_EVENT` payload of the form `{"pressed": <bool>, "key": <int>}`.
///
/// Never fails; anything unparseable yields the released/zero default.
#[must_use]
pub fn parse_key_event(payload: &[u8]) -> KeyEvent {
    KeyEvent {
        pressed: parse_pressed(payload),
        key: parse_key(payload),
    }
}

/// Classifies as pressed if `true` appears anywhere after `"pressed":`.
fn parse_pressed(payload: &[u8]) -> bool {
    find(payload, b"\"pressed\":")
        .map(|at| find(&payload[at..], b"true").is_some())
        .unwrap_or(false)
}

/// Parses the decimal integer after `"key":`, skipping ASCII whitespace.
///
/// The value is reduced modulo 256, as the game's key codes are one byte.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn parse_key(payload: &[u8]) -> u8 {
    let Some(at) = find(payload, b"\"key\":") else {
        return 0;
    };
    let mut rest = &payload[at + b"\"key\":".len()..];
    while let [b, tail @ ..] = rest {
        if b.is_ascii_whitespace() {
            rest = tail;
        } else {
            break;
        }
    }

    let (negative, mut rest) = match rest {
        [b'-', tail @ ..] => (true, tail),
        [b'+', tail @ ..] => (false, tail),
        _ => (false, rest),
    };

    let mut value: i64 = 0;
    while let [b @ b'0'..=b'9', tail @ ..] = rest {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX));
        rest = tail;
    }
    if negative {
        value = -value;
    }
    value as u8
}

/// First index of `needle` in `haystack`, if present.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pressed_event() {
        let event = parse_key_event(b"{\"pressed\": true, \"key\": 97}");
        assert_eq!(event, KeyEvent { pressed: true, key: 97 });
    }

    #[test]
    fn test_parse_released_event() {
        let event = parse_key_event(b"{\"pressed\": false, \"key\": 173}");
        assert_eq!(event, KeyEvent { pressed: false, key: 173 });
    }

    #[test]
    fn test_whitespace_around_key_value() {
        let event = parse_key_event(b"{\"pressed\":true,\"key\": \t 13}");
        assert_eq!(event.key, 13);
    }

    #[test]
    fn test_missing_fields_default_to_released_zero() {
        assert_eq!(parse_key_event(b"{}"), KeyEvent::default());
        assert_eq!(parse_key_event(b""), KeyEvent::default());
        assert_eq!(parse_key_event(b"{\"key\": 5}").pressed, false);
        assert_eq!(parse_key_event(b"{\"pressed\": true}").key, 0);
    }

    #[test]
    fn test_garbage_never_panics() {
        for garbage in [
            &b"not json at all"[..],
            b"{\"pressed\":",
            b"{\"key\":}",
            b"{\"key\": -7}",
            b"{\"key\": 99999999999999999999}",
            b"\xff\xfe\x00",
        ] {
            let _ = parse_key_event(garbage);
        }
    }

    #[test]
    fn test_key_reduces_modulo_256() {
        // One-byte key codes, as the game expects.
        assert_eq!(parse_key_event(b"{\"key\": 353}").key, 97);
    }

    #[test]
    fn test_true_after_pressed_marker_counts() {
        // Lenient on purpose: any `true` after the marker classifies as
        // pressed, matching what the original extractor accepted.
        let event = parse_key_event(b"{\"pressed\": 1, \"truth\": true, \"key\": 2}");
        assert!(event.pressed);
    }

    #[test]
    fn test_ring_queue_fifo_order() {
        let mut queue = RingKeyQueue::new();
        queue.enqueue(true, 97);
        queue.enqueue(false, 97);
        assert_eq!(queue.pop(), Some(KeyEvent { pressed: true, key: 97 }));
        assert_eq!(queue.pop(), Some(KeyEvent { pressed: false, key: 97 }));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_ring_queue_wraps() {
        let mut queue = RingKeyQueue::new();
        for round in 0..3 {
            for k in 0..10u8 {
                queue.enqueue(true, k);
            }
            for k in 0..10u8 {
                assert_eq!(queue.pop(), Some(KeyEvent { pressed: true, key: k }), "round {round}");
            }
        }
        assert!(queue.is_empty());
    }
}
