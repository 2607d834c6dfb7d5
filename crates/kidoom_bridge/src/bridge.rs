//! # Bridge Orchestration
//!
//! The per-frame hook the host game loop drives. Each tick:
//!
//! 1. Sample the renderer's scratch geometry into the frame snapshot
//! 2. Encode the snapshot as one JSON frame record
//! 3. Send it as `FRAME_DATA` (all-or-nothing)
//! 4. Drain at most one inbound message; key events go to the host's key
//!    sink, a peer shutdown ends the session
//!
//! Everything runs single-threaded on the game loop's thread, between
//! frames. Send failures are terminal for the session; a garbled inbound
//! key event never is.

use std::path::PathBuf;
use std::time::Instant;

use kidoom_protocol::{
    BridgeTransport, MessageType, TransportError, TransportResult, DEFAULT_SOCKET_PATH,
};

use crate::frame::{FrameEncoder, OverflowPolicy, DEFAULT_SCRATCH_CAPACITY};
use crate::input::{parse_key_event, KeySink};
use crate::sampler::{self, FrameSnapshot};
use crate::view::RenderView;

/// How often the bridge logs a frame statistics line.
const STATS_INTERVAL_FRAMES: u64 = 100;

/// Bridge construction options.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Filesystem path of the peer's listening socket.
    pub socket_path: PathBuf,
    /// Capacity of the serializer's scratch buffer.
    pub scratch_capacity: usize,
    /// What to do when a frame outgrows the scratch buffer.
    pub overflow: OverflowPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            overflow: OverflowPolicy::Truncate,
        }
    }
}

impl BridgeConfig {
    /// Sets a custom socket path.
    #[must_use]
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }
}

/// Outcome of one frame tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    /// Session continues; run the next frame.
    Continue,
    /// The peer ended the session; the game loop should terminate.
    Shutdown,
}

/// The DOOM-side bridge object.
///
/// Owns the transport handle, the serializer scratch buffer, and the frame
/// counter. The host constructs one, connects it, and calls
/// [`DoomBridge::frame_tick`] once per rendered frame.
pub struct DoomBridge {
    transport: BridgeTransport,
    encoder: FrameEncoder,
    snapshot: FrameSnapshot,
    config: BridgeConfig,
    frame_index: u64,
    started: Option<Instant>,
}

impl Default for DoomBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl DoomBridge {
    /// Creates a disconnected bridge.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            transport: BridgeTransport::new(),
            encoder: FrameEncoder::with_capacity(config.scratch_capacity, config.overflow),
            snapshot: FrameSnapshot::with_capacity(256, 128),
            config,
            frame_index: 0,
            started: None,
        }
    }

    /// Connects to the peer and completes the init handshake.
    ///
    /// # Errors
    ///
    /// Propagates any transport failure; the bridge stays disconnected.
    pub fn connect(&mut self) -> TransportResult<()> {
        self.transport.connect(&self.config.socket_path).map_err(|e| {
            tracing::error!("connect failed: {e}");
            e
        })?;
        self.started = Some(Instant::now());
        Ok(())
    }

    /// Returns true if the session is live.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Number of frames successfully sent so far.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Runs one frame: sample, serialize, send, drain.
    ///
    /// Must be invoked between render completion and the next frame's
    /// setup, while `view`'s borrows are valid.
    ///
    /// # Errors
    ///
    /// A send failure or a fatal receive error is returned after the
    /// transport has transitioned to disconnected; the game loop is
    /// expected to terminate. A peer-initiated shutdown is not an error
    /// and is reported as [`TickStatus::Shutdown`].
    pub fn frame_tick(
        &mut self,
        view: &RenderView<'_>,
        keys: &mut dyn KeySink,
    ) -> TransportResult<TickStatus> {
        sampler::sample(view, &mut self.snapshot);
        let document = self.encoder.encode(self.frame_index, &self.snapshot);

        if let Err(e) = self.transport.send(MessageType::FrameData, document) {
            tracing::error!("frame send failed: {e}");
            return Err(e);
        }
        self.frame_index += 1;
        self.log_stats();

        match self.transport.try_recv() {
            Ok(Some(msg)) if msg.msg_type == MessageType::KeyEvent => {
                let event = parse_key_event(&msg.payload);
                keys.enqueue(event.pressed, event.key);
                Ok(TickStatus::Continue)
            }
            Ok(_) => Ok(TickStatus::Continue),
            Err(TransportError::PeerClosed) => {
                tracing::info!("peer ended the session");
                Ok(TickStatus::Shutdown)
            }
            Err(e) => {
                tracing::error!("recv failed: {e}");
                Err(e)
            }
        }
    }

    /// Ships a caller-supplied screenshot notice to the peer.
    ///
    /// The bridge does not capture screenshots itself; this only carries
    /// the host's JSON notice under the `SCREENSHOT` tag.
    ///
    /// # Errors
    ///
    /// Same terminal semantics as a frame send.
    pub fn send_screenshot_notice(&mut self, json: &str) -> TransportResult<()> {
        self.transport.send(MessageType::Screenshot, json.as_bytes()).map_err(|e| {
            tracing::error!("screenshot notice failed: {e}");
            e
        })
    }

    /// Closes the session, best-effort notifying the peer.
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// One info line every [`STATS_INTERVAL_FRAMES`] frames: cadence and
    /// current geometry counts.
    fn log_stats(&self) {
        if self.frame_index % STATS_INTERVAL_FRAMES != 0 {
            return;
        }
        let Some(started) = self.started else {
            return;
        };
        let elapsed = started.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let fps = self.frame_index as f64 / elapsed;
        tracing::info!(
            "frame {}: {:.1} fps | walls: {} | sprites: {}",
            self.frame_index,
            fps,
            self.snapshot.walls.len(),
            self.snapshot.entities.len()
        );
    }
}
