//! # Geometry Sampler
//!
//! Pure, read-only extraction of a [`RenderView`] into clipped screen-space
//! records: wall spans, entity marks, and the weapon overlay.
//!
//! ## Guarantees
//!
//! - Output order matches renderer input order; no sorting
//! - Every emitted coordinate lies inside the view rectangle
//! - Depth buckets are always in `[0, 999]`
//! - Zero- and single-pixel-wide spans are preserved
//! - All arithmetic is signed 32-bit, with 64-bit fixed-point intermediates

use crate::fixed::Fixed;
use crate::view::{RenderView, VisSprite};

/// Far bound of the depth bucket range.
pub const MAX_DEPTH: i32 = 999;

/// Minimum emitted entity height in pixels.
pub const MIN_ENTITY_HEIGHT: i32 = 5;

/// Scales above this are in the nearest bucket (distance 0).
const DEPTH_NEAR_SCALE: i32 = 0x20000;

/// Scales below this are in the farthest bucket (distance 999).
const DEPTH_FAR_SCALE: i32 = 0x800;

/// A wall span projected to screen space.
///
/// Serializes as the 8-tuple
/// `[x1, y1_top, y1_bottom, x2, y2_top, y2_bottom, distance, silhouette]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallSpan {
    /// Left column.
    pub x1: i32,
    /// Ceiling edge Y at `x1`.
    pub y1_top: i32,
    /// Floor edge Y at `x1`.
    pub y1_bottom: i32,
    /// Right column.
    pub x2: i32,
    /// Ceiling edge Y at `x2`.
    pub y2_top: i32,
    /// Floor edge Y at `x2`.
    pub y2_bottom: i32,
    /// Depth bucket, 0 (near) to 999 (far).
    pub distance: i32,
    /// Renderer silhouette bits, unchanged.
    pub silhouette: i32,
}

/// A visible entity projected to screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityMark {
    /// Horizontal centre of the sprite's span.
    pub x: i32,
    /// Top edge Y.
    pub y_top: i32,
    /// Bottom edge Y.
    pub y_bottom: i32,
    /// Height in pixels, at least [`MIN_ENTITY_HEIGHT`].
    pub height: i32,
    /// The game's object-type tag.
    pub mobj_type: i32,
    /// Depth bucket, 0 (near) to 999 (far).
    pub distance: i32,
}

/// The weapon overlay's screen position, if visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WeaponOverlay {
    /// Weapon slot has no state this frame.
    #[default]
    Hidden,
    /// Weapon overlay at a clamped screen position.
    Shown {
        /// Horizontal position.
        x: i32,
        /// Vertical position.
        y: i32,
    },
}

/// Sampled geometry for one frame.
///
/// The backing vectors are reused across frames: `clear` keeps capacity, so
/// after warm-up sampling does not allocate.
#[derive(Clone, Debug, Default)]
pub struct FrameSnapshot {
    /// Wall spans, in draw-segment order.
    pub walls: Vec<WallSpan>,
    /// Entity marks, in visible-sprite order.
    pub entities: Vec<EntityMark>,
    /// Weapon overlay state.
    pub weapon: WeaponOverlay,
}

impl FrameSnapshot {
    /// Creates a snapshot with pre-sized buffers.
    #[must_use]
    pub fn with_capacity(walls: usize, entities: usize) -> Self {
        Self {
            walls: Vec::with_capacity(walls),
            entities: Vec::with_capacity(entities),
            weapon: WeaponOverlay::Hidden,
        }
    }

    /// Empties the snapshot, retaining buffer capacity.
    pub fn clear(&mut self) {
        self.walls.clear();
        self.entities.clear();
        self.weapon = WeaponOverlay::Hidden;
    }
}

/// Maps a 16.16 projection scale to a depth bucket in `[0, 999]`.
///
/// Larger scales mean closer geometry, so near scales map to small
/// distances. Integer division, rounding toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn depth_bucket(scale: Fixed) -> i32 {
    let raw = scale.to_raw();
    if raw > DEPTH_NEAR_SCALE {
        return 0;
    }
    if raw < DEPTH_FAR_SCALE {
        return MAX_DEPTH;
    }
    let span = i64::from(DEPTH_NEAR_SCALE - DEPTH_FAR_SCALE);
    let offset = i64::from(raw - DEPTH_FAR_SCALE) * i64::from(MAX_DEPTH);
    let distance = i64::from(MAX_DEPTH) - offset / span;
    (distance as i32).clamp(0, MAX_DEPTH)
}

/// Projects a world-space Z to a screen Y, clamped to the view.
///
/// `y = (centeryfrac - fixedmul(world_z - viewz, scale)) >> FRACBITS`
#[must_use]
pub fn project_y(view: &RenderView<'_>, world_z: Fixed, scale: Fixed) -> i32 {
    let y = (view.centeryfrac - (world_z - view.viewz).mul(scale)).to_int();
    y.clamp(0, view.viewheight - 1)
}

/// Treats a non-positive scale as the smallest positive one.
///
/// The renderer should never hand out a non-positive scale; this clamp is
/// data-quality defensive code carried over from the original extractor.
fn sanitize_scale(scale: Fixed) -> Fixed {
    if scale.is_positive() { scale } else { Fixed::from_raw(1) }
}

/// Samples one frame's geometry into `out`.
///
/// `out` is cleared first; its buffers are reused across calls.
pub fn sample(view: &RenderView<'_>, out: &mut FrameSnapshot) {
    out.clear();
    sample_walls(view, out);
    sample_entities(view, out);
    out.weapon = sample_weapon(view);
}

fn span_on_screen(view: &RenderView<'_>, x1: i32, x2: i32) -> bool {
    x1 >= 0 && x2 >= 0 && x1 < view.viewwidth && x2 < view.viewwidth
}

fn sample_walls(view: &RenderView<'_>, out: &mut FrameSnapshot) {
    for seg in view.drawsegs {
        if !span_on_screen(view, seg.x1, seg.x2) || seg.x1 > seg.x2 {
            continue;
        }
        let Some(front) = seg.front else {
            continue;
        };

        let scale1 = sanitize_scale(seg.scale1);
        let scale2 = sanitize_scale(seg.scale2);
        let distance = depth_bucket(scale1);

        out.walls.push(WallSpan {
            x1: seg.x1,
            y1_top: project_y(view, front.ceiling, scale1),
            y1_bottom: project_y(view, front.floor, scale1),
            x2: seg.x2,
            y2_top: project_y(view, front.ceiling, scale2),
            y2_bottom: project_y(view, front.floor, scale2),
            distance,
            silhouette: seg.silhouette,
        });
    }
}

fn sample_entities(view: &RenderView<'_>, out: &mut FrameSnapshot) {
    for sprite in view.sprites {
        if !span_on_screen(view, sprite.x1, sprite.x2) {
            continue;
        }
        out.entities.push(project_sprite(view, sprite));
    }
}

fn project_sprite(view: &RenderView<'_>, sprite: &VisSprite) -> EntityMark {
    let scale = sanitize_scale(sprite.scale);
    let y_top = project_y(view, sprite.gzt, scale);
    let y_bottom = project_y(view, sprite.gz, scale);

    EntityMark {
        x: (sprite.x1 + sprite.x2) / 2,
        y_top,
        y_bottom,
        height: (y_bottom - y_top).max(MIN_ENTITY_HEIGHT),
        mobj_type: sprite.mobj_type,
        distance: depth_bucket(scale),
    }
}

fn sample_weapon(view: &RenderView<'_>) -> WeaponOverlay {
    let Some(weapon) = view.weapon else {
        return WeaponOverlay::Hidden;
    };

    let x = (weapon.sx.to_int() + view.viewwidth / 2).clamp(0, view.viewwidth - 1);
    let y = (weapon.sy.to_int() + view.viewheight - 32).clamp(0, view.viewheight - 1);
    WeaponOverlay::Shown { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{DrawSeg, SectorHeights, WeaponSprite};

    fn seg(x1: i32, x2: i32, scale: i32) -> DrawSeg {
        DrawSeg {
            x1,
            x2,
            scale1: Fixed::from_raw(scale),
            scale2: Fixed::from_raw(scale),
            front: Some(SectorHeights {
                ceiling: Fixed::from_int(128),
                floor: Fixed::ZERO,
            }),
            silhouette: 3,
        }
    }

    fn sprite(x1: i32, x2: i32, scale: i32) -> VisSprite {
        VisSprite {
            x1,
            x2,
            scale: Fixed::from_raw(scale),
            gzt: Fixed::from_int(56),
            gz: Fixed::ZERO,
            mobj_type: 9,
        }
    }

    fn view_over<'a>(
        drawsegs: &'a [DrawSeg],
        sprites: &'a [VisSprite],
        weapon: Option<WeaponSprite>,
    ) -> RenderView<'a> {
        RenderView {
            drawsegs,
            sprites,
            weapon,
            viewwidth: 320,
            viewheight: 200,
            centeryfrac: Fixed::from_int(100),
            viewz: Fixed::from_int(32),
        }
    }

    #[test]
    fn test_depth_bucket_boundaries() {
        assert_eq!(depth_bucket(Fixed::from_raw(0x20000)), 0);
        assert_eq!(depth_bucket(Fixed::from_raw(0x20001)), 0);
        assert_eq!(depth_bucket(Fixed::from_raw(0x800)), 999);
        assert_eq!(depth_bucket(Fixed::from_raw(0x7FF)), 999);

        // Midpoint of the bucket range lands on 500 give or take rounding.
        let mid = depth_bucket(Fixed::from_raw(0x10400));
        assert!((499..=501).contains(&mid), "midpoint was {mid}");
    }

    #[test]
    fn test_depth_bucket_is_monotonic() {
        // Growing scale (closer geometry) never increases the distance.
        let mut previous = MAX_DEPTH;
        for raw in (0x800..=0x20000).step_by(0x400) {
            let d = depth_bucket(Fixed::from_raw(raw));
            assert!((0..=MAX_DEPTH).contains(&d));
            assert!(d <= previous, "bucket regressed at {raw:#x}");
            previous = d;
        }
    }

    #[test]
    fn test_wall_rejection_rules() {
        let segs = [
            seg(-1, 30, 0x10000),
            seg(10, -1, 0x10000),
            seg(320, 330, 0x10000),
            seg(10, 320, 0x10000),
            seg(30, 10, 0x10000),
            DrawSeg { front: None, ..seg(10, 30, 0x10000) },
        ];
        let view = view_over(&segs, &[], None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);
        assert!(out.walls.is_empty());
    }

    #[test]
    fn test_single_column_wall_is_preserved() {
        let segs = [seg(42, 42, 0x10000)];
        let view = view_over(&segs, &[], None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);
        assert_eq!(out.walls.len(), 1);
        assert_eq!(out.walls[0].x1, 42);
        assert_eq!(out.walls[0].x2, 42);
    }

    #[test]
    fn test_wall_projection_scenario() {
        // One segment: x1=10, x2=30, scale 1.0, ceiling 128, floor 0,
        // viewz 32, centeryfrac 100px.
        let segs = [seg(10, 30, 0x10000)];
        let view = view_over(&segs, &[], None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);

        let wall = out.walls[0];
        assert_eq!(wall.x1, 10);
        assert_eq!(wall.x2, 30);
        // (100 - (128 - 32)) = 4; (100 - (0 - 32)) = 132.
        assert_eq!(wall.y1_top, 4);
        assert_eq!(wall.y1_bottom, 132);
        assert_eq!(wall.y2_top, 4);
        assert_eq!(wall.y2_bottom, 132);
        assert!((0..=999).contains(&wall.distance));
        assert_eq!(wall.silhouette, 3);
    }

    #[test]
    fn test_wall_projection_clamps_to_view() {
        // A huge scale throws the projected edges far outside the view.
        let segs = [seg(0, 5, 0x1F0000)];
        let view = view_over(&segs, &[], None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);

        let wall = out.walls[0];
        assert_eq!(wall.y1_top, 0);
        assert_eq!(wall.y1_bottom, 199);
        assert_eq!(wall.distance, 0);
    }

    #[test]
    fn test_non_positive_scale_falls_back_to_one() {
        let segs = [seg(10, 30, 0)];
        let view = view_over(&segs, &[], None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);

        // Scale of 1/65536 projects everything to centeryfrac.
        let wall = out.walls[0];
        assert_eq!(wall.y1_top, 99);
        assert_eq!(wall.y1_bottom, 100);
        assert_eq!(wall.distance, 999);
    }

    #[test]
    fn test_entity_projection_and_minimum_height() {
        let sprites = [sprite(100, 120, 0x10000)];
        let view = view_over(&[], &sprites, None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);

        let mark = out.entities[0];
        assert_eq!(mark.x, 110);
        // gzt=56: 100 - (56 - 32) = 76; gz=0: 100 + 32 = 132.
        assert_eq!(mark.y_top, 76);
        assert_eq!(mark.y_bottom, 132);
        assert_eq!(mark.height, 56);
        assert_eq!(mark.mobj_type, 9);

        // A flat sprite still reports the minimum height.
        let flat = [VisSprite { gzt: Fixed::ZERO, ..sprite(10, 10, 0x10000) }];
        let view = view_over(&[], &flat, None);
        sample(&view, &mut out);
        assert_eq!(out.entities[0].height, MIN_ENTITY_HEIGHT);
    }

    #[test]
    fn test_entity_rejection_rules() {
        let sprites = [
            sprite(-5, 20, 0x10000),
            sprite(5, -20, 0x10000),
            sprite(320, 340, 0x10000),
            sprite(300, 321, 0x10000),
        ];
        let view = view_over(&[], &sprites, None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);
        assert!(out.entities.is_empty());
    }

    #[test]
    fn test_output_preserves_input_order() {
        let segs = [seg(5, 10, 0x9000), seg(50, 60, 0x18000), seg(200, 210, 0xC00)];
        let sprites = [sprite(10, 20, 0x9000), sprite(100, 110, 0x1800)];
        let view = view_over(&segs, &sprites, None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);

        let xs: Vec<i32> = out.walls.iter().map(|w| w.x1).collect();
        assert_eq!(xs, [5, 50, 200]);
        let es: Vec<i32> = out.entities.iter().map(|e| e.x).collect();
        assert_eq!(es, [15, 105]);
    }

    #[test]
    fn test_weapon_overlay_projection() {
        let weapon = WeaponSprite {
            sx: Fixed::from_int(8),
            sy: Fixed::from_int(12),
        };
        let view = view_over(&[], &[], Some(weapon));
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);

        // x = 8 + 160 = 168; y = 12 + 200 - 32 = 180.
        assert_eq!(out.weapon, WeaponOverlay::Shown { x: 168, y: 180 });
    }

    #[test]
    fn test_weapon_overlay_hidden_and_clamped() {
        let view = view_over(&[], &[], None);
        let mut out = FrameSnapshot::default();
        sample(&view, &mut out);
        assert_eq!(out.weapon, WeaponOverlay::Hidden);

        let weapon = WeaponSprite {
            sx: Fixed::from_int(-500),
            sy: Fixed::from_int(500),
        };
        let view = view_over(&[], &[], Some(weapon));
        sample(&view, &mut out);
        assert_eq!(out.weapon, WeaponOverlay::Shown { x: 0, y: 199 });
    }

    #[test]
    fn test_snapshot_buffers_are_reused() {
        let segs = [seg(10, 30, 0x10000)];
        let view = view_over(&segs, &[], None);
        let mut out = FrameSnapshot::with_capacity(64, 32);
        sample(&view, &mut out);
        let capacity = out.walls.capacity();
        sample(&view, &mut out);
        assert_eq!(out.walls.capacity(), capacity);
        assert_eq!(out.walls.len(), 1);
    }
}
