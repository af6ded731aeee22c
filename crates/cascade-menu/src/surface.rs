#![forbid(unsafe_code)]

//! The host-side collaborator a menu drives.
//!
//! A menu never renders anything itself. It tells a [`MenuSurface`] which
//! panels to mount, where to put them, which item attributes to show, and
//! where focus goes; the surface reports back geometry (anchor, viewport,
//! measured panel and item sizes).
//!
//! # Invariants
//!
//! - Attributes flow one way: the menu writes [`ItemA11y`] from its own
//!   state and never reads them back from the surface.
//! - Panel ids are never reused within a session, so a late unmount of a
//!   closed panel cannot remove a newer one at the same level.

use bitflags::bitflags;
use cascade_core::geometry::{Rect, Size};

use crate::item_tree::{MenuNode, NodeId};
use crate::positioner::Position;

/// Identity of one mounted panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

impl PanelId {
    /// The root panel of a session.
    pub const ROOT: PanelId = PanelId(0);

    /// Raw numeric id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the root panel.
    #[inline]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

/// Hands out submenu panel ids. Never returns [`PanelId::ROOT`].
#[derive(Debug, Clone)]
pub(crate) struct PanelIds {
    next: u64,
}

impl Default for PanelIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl PanelIds {
    pub(crate) fn next(&mut self) -> PanelId {
        let id = PanelId(self.next);
        self.next += 1;
        id
    }
}

bitflags! {
    /// Global listeners a session needs while open.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Listeners: u8 {
        /// Pointer presses outside the anchor and every panel.
        const OUTSIDE_CLICK = 0b0001;
        /// Escape pressed anywhere in the document.
        const ESCAPE        = 0b0010;
        /// Viewport resize.
        const RESIZE        = 0b0100;
        /// Document or ancestor scroll.
        const SCROLL        = 0b1000;
    }
}

/// Direction for moving focus past the opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabDirection {
    Forward,
    Backward,
}

/// Accessibility attributes of one rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemA11y {
    /// Roving tab index: `0` for the single tabbable item, `-1` otherwise.
    pub tab_index: i8,
    /// `Some(open)` for submenu items, `None` for leaves.
    pub expanded: Option<bool>,
    /// Whether the item is disabled.
    pub disabled: bool,
}

/// Host operations a menu session depends on.
pub trait MenuSurface {
    /// Current bounding rectangle of the anchor, or `None` if it is gone.
    fn anchor_rect(&self) -> Option<Rect>;

    /// The visible viewport.
    fn viewport(&self) -> Rect;

    /// Create (or replace the contents of) a panel and return its measured
    /// natural size.
    fn mount_panel(&mut self, panel: PanelId, level: usize, nodes: &[MenuNode]) -> Size;

    /// Apply a computed position.
    fn position_panel(&mut self, panel: PanelId, position: &Position);

    /// Show or hide a mounted panel.
    fn set_panel_open(&mut self, panel: PanelId, open: bool);

    /// Remove a panel entirely. Unknown ids are ignored.
    fn unmount_panel(&mut self, panel: PanelId);

    /// Force layout so later geometry queries are accurate.
    fn flush_layout(&mut self, panel: PanelId);

    /// Rectangle of a rendered item, used to anchor its submenu.
    fn item_rect(&self, panel: PanelId, item: &NodeId) -> Option<Rect>;

    /// Write one item's accessibility attributes.
    fn set_item_state(&mut self, panel: PanelId, item: &NodeId, state: ItemA11y);

    /// Mirror whether the menu is expanded onto the anchor.
    fn set_anchor_expanded(&mut self, expanded: bool);

    /// Move focus to an item.
    fn focus_item(&mut self, panel: PanelId, item: &NodeId);

    /// Move focus back to the anchor.
    fn focus_anchor(&mut self);

    /// Move focus to the focusable element after (or before) the anchor.
    fn focus_beside_anchor(&mut self, direction: TabDirection);

    /// Replace the set of attached global listeners.
    fn set_listeners(&mut self, listeners: Listeners);
}
