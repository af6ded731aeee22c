#![forbid(unsafe_code)]

//! Viewport-aware placement of menu panels.
//!
//! [`Positioner`] computes where a panel of a given size goes relative to an
//! anchor rectangle. It flips to the mirrored side when the requested side
//! is too small, clamps the cross axis into the viewport, and shrinks the
//! panel's maximum height rather than pushing it away from the anchor.
//!
//! # Algorithm
//!
//! 1. Inset the viewport by the edge margin.
//! 2. Measure the room between the anchor and the inset edge on the
//!    requested side. If the panel fits, keep the side; otherwise flip when
//!    the mirror fits, or when neither fits, take whichever side is larger.
//! 3. Place the panel flush against the anchor (plus offset) on that side.
//!    If it is still too tall for a vertical side, cap `max_height`.
//! 4. Align along the side, then clamp the cross axis into the inset
//!    viewport. A panel taller than the whole viewport on a horizontal side
//!    is pinned to the top edge and capped.
//!
//! # Invariants
//!
//! - Pure: same request, same [`Position`]. Safe to call on every resize or
//!   scroll.
//! - When the panel fits inside the inset viewport, the returned rectangle
//!   (with `max_height` applied) lies inside it.

use cascade_core::geometry::{Rect, Sides, Size};

use crate::placement::{Align, Placement, Side};

/// Default distance kept between a panel and the viewport edge.
pub const DEFAULT_EDGE_MARGIN: i32 = 16;

/// Result of a positioning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Left edge of the panel.
    pub left: i32,
    /// Top edge of the panel.
    pub top: i32,
    /// Cap on the panel height when the full height does not fit.
    pub max_height: Option<i32>,
    /// The placement actually used after flipping.
    pub placement: Placement,
}

impl Position {
    /// The panel rectangle for a panel of `size`, honoring `max_height`.
    pub fn rect(&self, size: Size) -> Rect {
        let height = self.max_height.map_or(size.height, |cap| size.height.min(cap));
        Rect::new(self.left, self.top, size.width, height)
    }
}

/// Positioning request for one panel.
#[derive(Debug, Clone, Copy)]
pub struct Positioner {
    /// The anchor rectangle to position relative to.
    pub anchor: Rect,
    /// Preferred placement.
    pub placement: Placement,
    /// Gap between anchor and panel on the main axis.
    pub offset: i32,
    /// Distance the panel keeps from every viewport edge.
    pub margin: i32,
    /// Whether to flip when the preferred side lacks room.
    pub auto_flip: bool,
}

impl Positioner {
    /// Create a request anchored to the given rectangle.
    pub fn new(anchor: Rect, placement: Placement) -> Self {
        Self {
            anchor,
            placement,
            offset: 0,
            margin: DEFAULT_EDGE_MARGIN,
            auto_flip: true,
        }
    }

    /// Set the gap between anchor and panel.
    #[must_use]
    pub fn offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    /// Set the viewport edge margin.
    #[must_use]
    pub fn margin(mut self, margin: i32) -> Self {
        self.margin = margin.max(0);
        self
    }

    /// Enable or disable flipping.
    #[must_use]
    pub fn auto_flip(mut self, flip: bool) -> Self {
        self.auto_flip = flip;
        self
    }

    /// Place a panel of `menu_size` inside `viewport`.
    pub fn place(&self, menu_size: Size, viewport: Rect) -> Position {
        let bounds = viewport.inner(Sides::all(self.margin));
        let placement = if self.auto_flip {
            self.resolve_placement(menu_size, bounds)
        } else {
            self.placement
        };
        let side = placement.side();
        let room = self.available_space(side, bounds);

        let mut max_height = None;
        let (left, top) = if side.is_vertical() {
            let height = if menu_size.height > room {
                let capped = room.max(0);
                max_height = Some(capped);
                capped
            } else {
                menu_size.height
            };
            let top = match side {
                Side::Top => self.anchor.y - self.offset - height,
                _ => self.anchor.bottom() + self.offset,
            };
            let left = align_start(
                placement.align(),
                self.anchor.x,
                self.anchor.width,
                menu_size.width,
            );
            (clamp_span(left, menu_size.width, bounds.x, bounds.right()), top)
        } else {
            let left = match side {
                Side::Left => self.anchor.x - self.offset - menu_size.width,
                _ => self.anchor.right() + self.offset,
            };
            // Neither side fits: keep the panel on screen, overlapping the anchor.
            let left = if menu_size.width > room {
                clamp_span(left, menu_size.width, bounds.x, bounds.right())
            } else {
                left
            };
            let top = align_start(
                placement.align(),
                self.anchor.y,
                self.anchor.height,
                menu_size.height,
            );
            let top = if menu_size.height > bounds.height {
                max_height = Some(bounds.height);
                bounds.y
            } else {
                clamp_span(top, menu_size.height, bounds.y, bounds.bottom())
            };
            (left, top)
        };

        Position {
            left,
            top,
            max_height,
            placement,
        }
    }

    /// Resolve placement with flip logic.
    fn resolve_placement(&self, menu_size: Size, bounds: Rect) -> Placement {
        let primary = self.placement;
        let needed = if primary.side().is_vertical() {
            menu_size.height
        } else {
            menu_size.width
        };
        let available = self.available_space(primary.side(), bounds);
        if available >= needed {
            return primary;
        }

        let flipped = primary.flip();
        let flipped_available = self.available_space(flipped.side(), bounds);
        if flipped_available >= needed || flipped_available > available {
            flipped
        } else {
            primary
        }
    }

    /// Room between the anchor (plus offset) and the bounds edge on `side`.
    fn available_space(&self, side: Side, bounds: Rect) -> i32 {
        match side {
            Side::Top => self.anchor.y - self.offset - bounds.y,
            Side::Bottom => bounds.bottom() - self.anchor.bottom() - self.offset,
            Side::Left => self.anchor.x - self.offset - bounds.x,
            Side::Right => bounds.right() - self.anchor.right() - self.offset,
        }
    }
}

/// Leading coordinate of a span of `size` aligned against an anchor span.
fn align_start(align: Align, anchor_start: i32, anchor_len: i32, size: i32) -> i32 {
    match align {
        Align::Start => anchor_start,
        Align::Center => anchor_start + anchor_len / 2 - size / 2,
        Align::End => anchor_start + anchor_len - size,
    }
}

/// Clamp a span so it stays within `[lo, hi)`. When it is larger than the
/// range it is pinned to `lo`.
fn clamp_span(start: i32, size: i32, lo: i32, hi: i32) -> i32 {
    let start = if start + size > hi { hi - size } else { start };
    start.max(lo)
}
