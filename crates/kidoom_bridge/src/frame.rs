//! # Frame Serializer
//!
//! Renders a [`FrameSnapshot`] into one JSON document per frame.
//!
//! ## Zero-Allocation Design
//!
//! A single reusable scratch buffer backs every frame; integers are written
//! digit-by-digit so the hot path never touches the formatting machinery or
//! the allocator. Under the default [`OverflowPolicy::Truncate`] a frame
//! that would overrun the buffer drops elements from the end of the
//! overflowing array - the document stays well-formed and the rendering
//! loop never stalls on a serialization-size edge.

use crate::sampler::{FrameSnapshot, WeaponOverlay};

/// Default scratch buffer capacity (256 KiB).
///
/// Sized generously for the renderer's maximum wall and sprite counts; a
/// worst-case frame uses well under half of it.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 262_144;

/// Headroom kept in reserve so the document can always be closed after the
/// last complete array element.
const TAIL_RESERVE: usize = 96;

/// What to do when a frame outgrows the scratch buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Cut the overflowing array at its last complete element and emit a
    /// well-formed, smaller document. Preserves frame cadence.
    #[default]
    Truncate,
    /// Let the buffer grow. The enlarged capacity is retained, so growth
    /// happens at most a handful of times per session.
    Grow,
}

/// Reusable JSON encoder for frame records.
pub struct FrameEncoder {
    buf: Vec<u8>,
    limit: usize,
    policy: OverflowPolicy,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder {
    /// Creates an encoder with the default capacity and truncate policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SCRATCH_CAPACITY, OverflowPolicy::Truncate)
    }

    /// Creates an encoder with an explicit capacity and overflow policy.
    #[must_use]
    pub fn with_capacity(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            limit: capacity,
            policy,
        }
    }

    /// Encodes one frame record and returns the document bytes.
    ///
    /// The returned slice borrows the internal scratch buffer and is valid
    /// until the next call.
    pub fn encode(&mut self, frame: u64, snapshot: &FrameSnapshot) -> &[u8] {
        self.buf.clear();

        self.put(b"{\"frame\":");
        self.put_u64(frame);

        self.put(b",\"walls\":[");
        let mut emitted = 0usize;
        for wall in &snapshot.walls {
            let mark = self.buf.len();
            if emitted > 0 {
                self.put(b",");
            }
            self.put(b"[");
            self.put_i32(wall.x1);
            self.put(b",");
            self.put_i32(wall.y1_top);
            self.put(b",");
            self.put_i32(wall.y1_bottom);
            self.put(b",");
            self.put_i32(wall.x2);
            self.put(b",");
            self.put_i32(wall.y2_top);
            self.put(b",");
            self.put_i32(wall.y2_bottom);
            self.put(b",");
            self.put_i32(wall.distance);
            self.put(b",");
            self.put_i32(wall.silhouette);
            self.put(b"]");
            if self.rollback_if_overflowing(mark) {
                break;
            }
            emitted += 1;
        }

        self.put(b"],\"entities\":[");
        let mut emitted = 0usize;
        for entity in &snapshot.entities {
            let mark = self.buf.len();
            if emitted > 0 {
                self.put(b",");
            }
            self.put(b"{\"x\":");
            self.put_i32(entity.x);
            self.put(b",\"y_top\":");
            self.put_i32(entity.y_top);
            self.put(b",\"y_bottom\":");
            self.put_i32(entity.y_bottom);
            self.put(b",\"height\":");
            self.put_i32(entity.height);
            self.put(b",\"type\":");
            self.put_i32(entity.mobj_type);
            self.put(b",\"distance\":");
            self.put_i32(entity.distance);
            self.put(b"}");
            if self.rollback_if_overflowing(mark) {
                break;
            }
            emitted += 1;
        }

        self.put(b"],\"weapon\":");
        match snapshot.weapon {
            WeaponOverlay::Shown { x, y } => {
                self.put(b"{\"x\":");
                self.put_i32(x);
                self.put(b",\"y\":");
                self.put_i32(y);
                self.put(b",\"visible\":true}");
            }
            WeaponOverlay::Hidden => self.put(b"{\"visible\":false}"),
        }
        self.put(b"}");

        &self.buf
    }

    /// Rolls the buffer back to `mark` if the element just written crossed
    /// the truncation threshold. Returns true when the caller should stop
    /// emitting elements of the current array.
    fn rollback_if_overflowing(&mut self, mark: usize) -> bool {
        if self.policy == OverflowPolicy::Truncate
            && self.buf.len() > self.limit.saturating_sub(TAIL_RESERVE)
        {
            self.buf.truncate(mark);
            return true;
        }
        false
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn put_u64(&mut self, value: u64) {
        let mut digits = [0u8; 20];
        let mut len = 0;
        let mut v = value;
        loop {
            digits[len] = b'0' + (v % 10) as u8;
            len += 1;
            v /= 10;
            if v == 0 {
                break;
            }
        }
        while len > 0 {
            len -= 1;
            self.buf.push(digits[len]);
        }
    }

    fn put_i32(&mut self, value: i32) {
        if value < 0 {
            self.buf.push(b'-');
            self.put_u64(value.unsigned_abs().into());
        } else {
            #[allow(clippy::cast_sign_loss)]
            self.put_u64(value as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{EntityMark, WallSpan};

    fn wall(x1: i32) -> WallSpan {
        WallSpan {
            x1,
            y1_top: 4,
            y1_bottom: 132,
            x2: x1 + 20,
            y2_top: 4,
            y2_bottom: 132,
            distance: 508,
            silhouette: 3,
        }
    }

    fn entity(x: i32) -> EntityMark {
        EntityMark {
            x,
            y_top: 76,
            y_bottom: 132,
            height: 56,
            mobj_type: 9,
            distance: 120,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn snapshot(walls: usize, entities: usize) -> FrameSnapshot {
        FrameSnapshot {
            walls: (0..walls).map(|i| wall(i as i32)).collect(),
            entities: (0..entities).map(|i| entity(i as i32)).collect(),
            weapon: WeaponOverlay::Shown { x: 168, y: 180 },
        }
    }

    fn parse(doc: &[u8]) -> serde_json::Value {
        serde_json::from_slice(doc).expect("frame document must be valid JSON")
    }

    #[test]
    fn test_document_matches_schema() {
        let mut encoder = FrameEncoder::new();
        let doc = parse(encoder.encode(7, &snapshot(2, 1)));

        assert_eq!(doc["frame"], 7);
        let walls = doc["walls"].as_array().unwrap();
        assert_eq!(walls.len(), 2);
        assert_eq!(walls[0].as_array().unwrap().len(), 8);
        assert_eq!(walls[0][0], 0);
        assert_eq!(walls[1][0], 1);
        assert_eq!(walls[0][6], 508);
        assert_eq!(walls[0][7], 3);

        let entities = doc["entities"].as_array().unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0]["x"], 0);
        assert_eq!(entities[0]["type"], 9);
        assert_eq!(entities[0]["height"], 56);

        assert_eq!(doc["weapon"]["visible"], true);
        assert_eq!(doc["weapon"]["x"], 168);
        assert_eq!(doc["weapon"]["y"], 180);
    }

    #[test]
    fn test_empty_frame() {
        let mut encoder = FrameEncoder::new();
        let empty = FrameSnapshot::default();
        let doc = parse(encoder.encode(0, &empty));

        assert_eq!(doc["frame"], 0);
        assert!(doc["walls"].as_array().unwrap().is_empty());
        assert!(doc["entities"].as_array().unwrap().is_empty());
        assert_eq!(doc["weapon"]["visible"], false);
    }

    #[test]
    fn test_negative_numbers_encode_correctly() {
        let mut encoder = FrameEncoder::new();
        let mut snap = FrameSnapshot::default();
        snap.walls.push(WallSpan { silhouette: -1, ..wall(0) });
        let doc = parse(encoder.encode(1, &snap));
        assert_eq!(doc["walls"][0][7], -1);
    }

    #[test]
    fn test_truncation_keeps_document_well_formed() {
        // Capacity fits the preamble and a handful of walls, nothing more.
        let mut encoder = FrameEncoder::with_capacity(256, OverflowPolicy::Truncate);
        let snap = snapshot(64, 16);
        let bytes = encoder.encode(3, &snap).to_vec();
        assert!(bytes.len() <= 256);

        let doc = parse(&bytes);
        let walls = doc["walls"].as_array().unwrap();
        assert!(!walls.is_empty(), "at least one wall must survive");
        assert!(walls.len() < 64, "truncation must have dropped walls");
        // Every surviving element is complete.
        for w in walls {
            assert_eq!(w.as_array().unwrap().len(), 8);
        }
        // The weapon section always fits in the reserve.
        assert_eq!(doc["weapon"]["visible"], true);
    }

    #[test]
    fn test_grow_policy_emits_everything() {
        let mut encoder = FrameEncoder::with_capacity(256, OverflowPolicy::Grow);
        let snap = snapshot(64, 16);
        let doc = parse(encoder.encode(3, &snap));
        assert_eq!(doc["walls"].as_array().unwrap().len(), 64);
        assert_eq!(doc["entities"].as_array().unwrap().len(), 16);
    }

    #[test]
    fn test_scratch_buffer_is_reused() {
        let mut encoder = FrameEncoder::new();
        let snap = snapshot(8, 4);
        let first = encoder.encode(1, &snap).to_vec();
        let second = encoder.encode(1, &snap).to_vec();
        assert_eq!(first, second);
        assert!(encoder.buf.capacity() >= DEFAULT_SCRATCH_CAPACITY);
    }
}
