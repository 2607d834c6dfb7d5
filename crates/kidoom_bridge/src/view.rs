//! # Render View
//!
//! A borrowed, read-only snapshot of the host renderer's per-frame scratch
//! state. The host constructs one of these between `R_RenderPlayerView`
//! completing and the next frame's setup, and hands it to the bridge; the
//! bridge never reaches into renderer globals itself.

use crate::fixed::Fixed;

/// Ceiling and floor heights of a wall segment's front sector, in world
/// units (16.16 fixed-point).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectorHeights {
    /// Ceiling height.
    pub ceiling: Fixed,
    /// Floor height.
    pub floor: Fixed,
}

/// One completed wall draw-segment from the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawSeg {
    /// Leftmost screen column of the span (inclusive).
    pub x1: i32,
    /// Rightmost screen column of the span (inclusive).
    pub x2: i32,
    /// Projection scale at `x1` (16.16).
    pub scale1: Fixed,
    /// Projection scale at `x2` (16.16).
    pub scale2: Fixed,
    /// Front sector heights; `None` when the segment or its front sector
    /// is absent, which rejects the span.
    pub front: Option<SectorHeights>,
    /// Silhouette flag bits, passed through unchanged.
    pub silhouette: i32,
}

/// One visible sprite from the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisSprite {
    /// Leftmost screen column (inclusive).
    pub x1: i32,
    /// Rightmost screen column (inclusive).
    pub x2: i32,
    /// Projection scale (16.16); larger means closer.
    pub scale: Fixed,
    /// World-space top Z of the sprite.
    pub gzt: Fixed,
    /// World-space bottom Z of the sprite.
    pub gz: Fixed,
    /// The game's object-type tag, passed through as an integer.
    pub mobj_type: i32,
}

/// The console player's weapon overlay slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeaponSprite {
    /// Horizontal sway offset (16.16), relative to screen centre.
    pub sx: Fixed,
    /// Vertical bob offset (16.16), relative to the overlay baseline.
    pub sy: Fixed,
}

/// Read-only view over one rendered frame's geometry.
///
/// All slices and scalars are owned by the host renderer; the bridge only
/// borrows them for the duration of the frame hook.
#[derive(Clone, Copy, Debug)]
pub struct RenderView<'a> {
    /// Completed wall segments, in draw order.
    pub drawsegs: &'a [DrawSeg],
    /// Visible sprites, in projection order.
    pub sprites: &'a [VisSprite],
    /// Weapon overlay slot; `None` when the slot's state is absent.
    pub weapon: Option<WeaponSprite>,
    /// Width of the rendered view in pixels.
    pub viewwidth: i32,
    /// Height of the rendered view in pixels.
    pub viewheight: i32,
    /// Vertical screen centre (16.16).
    pub centeryfrac: Fixed,
    /// Player eye height in world units (16.16).
    pub viewz: Fixed,
}

impl<'a> RenderView<'a> {
    /// A 320x200 view with no geometry, for hosts that need a placeholder
    /// and for tests.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            drawsegs: &[],
            sprites: &[],
            weapon: None,
            viewwidth: 320,
            viewheight: 200,
            centeryfrac: Fixed::from_int(100),
            viewz: Fixed::ZERO,
        }
    }
}
