//! # KiDoom Bridge - Geometry Out, Keys In
//!
//! A one-way-dominant streaming bridge between a DOOM game loop and an
//! external vector renderer. Each rendered frame, the bridge samples the
//! renderer's intermediate geometry (wall draw-segments, visible sprites,
//! the weapon overlay), projects it into clipped 2D screen space, encodes
//! it as one compact JSON record, and ships it over the framed local
//! socket. In return it drains at most one inbound message per tick and
//! feeds key events into the host's key queue.
//!
//! ## Architecture
//!
//! - **Sampler**: pure, read-only view over the renderer's scratch state
//! - **Serializer**: reusable scratch buffer, no per-frame allocations
//! - **Transport** (`kidoom_protocol`): framed Unix-socket messaging
//! - **Input intake**: lenient key-event parse into the host's key sink
//!
//! Single-threaded, cooperative, driven by the host game loop. No locks,
//! no background threads, no async runtime.
//!
//! ## Example
//!
//! ```rust,ignore
//! use kidoom_bridge::{BridgeConfig, DoomBridge, RenderView, RingKeyQueue, TickStatus};
//!
//! let mut bridge = DoomBridge::new(BridgeConfig::default());
//! let mut keys = RingKeyQueue::new();
//! bridge.connect()?;
//!
//! // Per frame, between render completion and the next frame's setup:
//! let view: RenderView = host_render_view();
//! if bridge.frame_tick(&view, &mut keys)? == TickStatus::Shutdown {
//!     // peer ended the session
//! }
//! ```

pub mod bridge;
pub mod fixed;
pub mod frame;
pub mod input;
pub mod sampler;
pub mod view;

// Re-exports for convenience
pub use bridge::{BridgeConfig, DoomBridge, TickStatus};
pub use fixed::{Fixed, FRACBITS, FRACUNIT};
pub use frame::{FrameEncoder, OverflowPolicy, DEFAULT_SCRATCH_CAPACITY};
pub use input::{parse_key_event, KeyEvent, KeySink, RingKeyQueue, KEY_QUEUE_SIZE};
pub use sampler::{
    depth_bucket, project_y, sample, EntityMark, FrameSnapshot, WallSpan, WeaponOverlay,
    MAX_DEPTH, MIN_ENTITY_HEIGHT,
};
pub use view::{DrawSeg, RenderView, SectorHeights, VisSprite, WeaponSprite};
