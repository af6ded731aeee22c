#![forbid(unsafe_code)]

//! In-memory [`MenuSurface`] that records everything a session does.
//!
//! Panels are laid out as a vertical list of fixed-height rows, so item
//! rectangles follow directly from the panel position. Tests can move or
//! remove the anchor and shrink the viewport between inputs.

use std::collections::BTreeMap;

use cascade_core::geometry::{Rect, Size};
use cascade_menu::item_tree::{MenuNode, NodeId};
use cascade_menu::positioner::Position;
use cascade_menu::surface::{ItemA11y, Listeners, MenuSurface, PanelId, TabDirection};

/// Default row height of a rendered item.
pub const ITEM_HEIGHT: i32 = 24;
/// Default panel width.
pub const PANEL_WIDTH: i32 = 160;

/// Where the surface last put focus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Elsewhere,
    Anchor,
    Item(PanelId, NodeId),
    BesideAnchor(TabDirection),
}

/// Everything known about one mounted panel.
#[derive(Debug, Clone)]
pub struct PanelRecord {
    pub level: usize,
    pub items: Vec<NodeId>,
    pub size: Size,
    pub position: Option<Position>,
    pub open: bool,
    pub a11y: BTreeMap<NodeId, ItemA11y>,
}

impl PanelRecord {
    /// The panel rectangle after `max_height` is applied.
    pub fn rect(&self) -> Option<Rect> {
        self.position.map(|p| p.rect(self.size))
    }
}

/// One call made by a session, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Mount(PanelId),
    Unmount(PanelId),
    Show(PanelId, bool),
    Position(PanelId),
    FocusItem(PanelId, NodeId),
    FocusAnchor,
    FocusBesideAnchor(TabDirection),
    Listeners(Listeners),
    AnchorExpanded(bool),
}

/// Recording surface.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub anchor: Option<Rect>,
    pub viewport: Rect,
    pub item_height: i32,
    pub panel_width: i32,
    pub focus: Focus,
    pub anchor_expanded: bool,
    pub listeners: Listeners,
    panels: BTreeMap<PanelId, PanelRecord>,
    calls: Vec<SurfaceCall>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(Rect::new(100, 100, 80, 24), Rect::new(0, 0, 1000, 800))
    }
}

impl RecordingSurface {
    pub fn new(anchor: Rect, viewport: Rect) -> Self {
        Self {
            anchor: Some(anchor),
            viewport,
            item_height: ITEM_HEIGHT,
            panel_width: PANEL_WIDTH,
            focus: Focus::Elsewhere,
            anchor_expanded: false,
            listeners: Listeners::empty(),
            panels: BTreeMap::new(),
            calls: Vec::new(),
        }
    }

    /// A surface whose anchor cannot be resolved.
    pub fn without_anchor() -> Self {
        Self {
            anchor: None,
            ..Self::default()
        }
    }

    pub fn panel(&self, panel: PanelId) -> Option<&PanelRecord> {
        self.panels.get(&panel)
    }

    /// Every mounted panel, root first.
    pub fn panels(&self) -> impl Iterator<Item = (PanelId, &PanelRecord)> + '_ {
        self.panels.iter().map(|(id, record)| (*id, record))
    }

    /// Mounted panel ids.
    pub fn mounted(&self) -> Vec<PanelId> {
        self.panels.keys().copied().collect()
    }

    /// Panels currently shown.
    pub fn visible(&self) -> Vec<PanelId> {
        self.panels
            .iter()
            .filter(|(_, p)| p.open)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Last attributes written for `item` in `panel`.
    pub fn a11y(&self, panel: PanelId, item: &str) -> Option<ItemA11y> {
        self.panels
            .get(&panel)?
            .a11y
            .get(&NodeId::new(item))
            .copied()
    }

    /// The item that currently holds focus, if any.
    pub fn focused_item(&self) -> Option<&str> {
        match &self.focus {
            Focus::Item(_, id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// How many times listeners were (re)attached or detached.
    pub fn listener_writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Listeners(_)))
            .count()
    }
}

impl MenuSurface for RecordingSurface {
    fn anchor_rect(&self) -> Option<Rect> {
        self.anchor
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn mount_panel(&mut self, panel: PanelId, level: usize, nodes: &[MenuNode]) -> Size {
        let size = Size::new(self.panel_width, self.item_height * nodes.len() as i32);
        let open = self.panels.get(&panel).is_some_and(|p| p.open);
        self.panels.insert(
            panel,
            PanelRecord {
                level,
                items: nodes.iter().map(|n| n.id.clone()).collect(),
                size,
                position: None,
                open,
                a11y: BTreeMap::new(),
            },
        );
        self.calls.push(SurfaceCall::Mount(panel));
        tracing::trace!(panel = panel.get(), level, items = nodes.len(), "mount panel");
        size
    }

    fn position_panel(&mut self, panel: PanelId, position: &Position) {
        if let Some(record) = self.panels.get_mut(&panel) {
            record.position = Some(*position);
        }
        self.calls.push(SurfaceCall::Position(panel));
    }

    fn set_panel_open(&mut self, panel: PanelId, open: bool) {
        if let Some(record) = self.panels.get_mut(&panel) {
            record.open = open;
        }
        self.calls.push(SurfaceCall::Show(panel, open));
    }

    fn unmount_panel(&mut self, panel: PanelId) {
        self.panels.remove(&panel);
        if matches!(&self.focus, Focus::Item(p, _) if *p == panel) {
            self.focus = Focus::Elsewhere;
        }
        self.calls.push(SurfaceCall::Unmount(panel));
        tracing::trace!(panel = panel.get(), "unmount panel");
    }

    fn flush_layout(&mut self, _panel: PanelId) {}

    fn item_rect(&self, panel: PanelId, item: &NodeId) -> Option<Rect> {
        let record = self.panels.get(&panel)?;
        let position = record.position?;
        let row = record.items.iter().position(|id| id == item)?;
        Some(Rect::new(
            position.left,
            position.top + row as i32 * self.item_height,
            record.size.width,
            self.item_height,
        ))
    }

    fn set_item_state(&mut self, panel: PanelId, item: &NodeId, state: ItemA11y) {
        if let Some(record) = self.panels.get_mut(&panel) {
            record.a11y.insert(item.clone(), state);
        }
    }

    fn set_anchor_expanded(&mut self, expanded: bool) {
        self.anchor_expanded = expanded;
        self.calls.push(SurfaceCall::AnchorExpanded(expanded));
    }

    fn focus_item(&mut self, panel: PanelId, item: &NodeId) {
        self.focus = Focus::Item(panel, item.clone());
        self.calls.push(SurfaceCall::FocusItem(panel, item.clone()));
    }

    fn focus_anchor(&mut self) {
        self.focus = Focus::Anchor;
        self.calls.push(SurfaceCall::FocusAnchor);
    }

    fn focus_beside_anchor(&mut self, direction: TabDirection) {
        self.focus = Focus::BesideAnchor(direction);
        self.calls.push(SurfaceCall::FocusBesideAnchor(direction));
    }

    fn set_listeners(&mut self, listeners: Listeners) {
        self.listeners = listeners;
        self.calls.push(SurfaceCall::Listeners(listeners));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_menu::item_tree::{MenuEntry, MenuTree};
    use cascade_menu::placement::Placement;

    #[test]
    fn item_rects_follow_rows() {
        let tree = MenuTree::build(&[MenuEntry::item("A").id("a"), MenuEntry::item("B").id("b")])
            .expect("tree");
        let mut surface = RecordingSurface::default();
        let size = surface.mount_panel(PanelId::ROOT, 0, tree.roots());
        assert_eq!(size, Size::new(PANEL_WIDTH, 2 * ITEM_HEIGHT));
        assert!(surface.item_rect(PanelId::ROOT, &NodeId::new("b")).is_none());

        surface.position_panel(
            PanelId::ROOT,
            &Position {
                left: 10,
                top: 50,
                max_height: None,
                placement: Placement::BottomStart,
            },
        );
        assert_eq!(
            surface.item_rect(PanelId::ROOT, &NodeId::new("b")),
            Some(Rect::new(10, 74, PANEL_WIDTH, ITEM_HEIGHT))
        );
    }

    #[test]
    fn unmount_drops_focus_inside_panel() {
        let mut surface = RecordingSurface::default();
        surface.mount_panel(PanelId::ROOT, 0, &[]);
        surface.focus_item(PanelId::ROOT, &NodeId::new("x"));
        surface.unmount_panel(PanelId::ROOT);
        assert_eq!(surface.focus, Focus::Elsewhere);
        assert!(surface.mounted().is_empty());
    }
}
