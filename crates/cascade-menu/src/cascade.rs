#![forbid(unsafe_code)]

//! Submenu cascade: the stack of open submenu panels.
//!
//! The root panel is implicit level 0. Every open submenu is a
//! [`CascadeEntry`] at level 1, 2, ... and each level moves through
//! `Opening → Open → Closing`:
//!
//! ```text
//! open_at(L) ──► Opening ──(open window)──► Open
//!                   │                         │
//!                   └────── close_from(≤L) ───┴──► Closing ──(teardown)──► unmounted
//! ```
//!
//! Pointer timing lives here too: hover intent (dwell on a submenu item
//! before it opens) and auto-close (grace period after the pointer leaves a
//! submenu region).
//!
//! # Invariants
//!
//! 1. **Contiguous**: `entries[i].level == i + 1` in every reachable state.
//! 2. **One transition per level**: while a level is `Opening`, non-forced
//!    open and close requests for it are ignored, never queued.
//! 3. **Deepest first**: closing level L closes every level ≥ L, deepest
//!    first, and cancels their settle and auto-close timers.
//! 4. **Single hover intent**: at most one hover-intent timer exists; every
//!    pointer move cancels the previous one first.
//! 5. **Unique panels**: a new panel never reuses an id, so deferred
//!    teardown only ever removes the panel it was scheduled for.
//!
//! # Failure Modes
//!
//! - A submenu item without a resolvable rectangle is not opened
//!   ([`IgnoreReason::MissingAnchor`]).
//! - If a submenu's anchor item disappears during a reposition, that level
//!   and everything deeper is force-closed.

use std::time::Duration;

use cascade_core::event::Interaction;
use cascade_core::geometry::{Rect, Size};
use cascade_core::timer::{CancelToken, TimerQueue, after_transition};

use crate::LOG_TARGET;
use crate::config::MenuConfig;
use crate::event::{MenuEvent, PointerTarget};
use crate::item_tree::{MenuTree, NodeId};
use crate::positioner::{Position, Positioner};
use crate::request::{IgnoreReason, Request};
use crate::session::TimerKind;
use crate::surface::{MenuSurface, PanelId, PanelIds};

/// Lifecycle phase of one submenu level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmenuPhase {
    /// Mounted and animating in. Requests for this level are ignored.
    Opening,
    /// Fully open.
    Open,
    /// Removed from the stack, waiting for its panel to be torn down.
    Closing,
}

/// Deferred cascade steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CascadeTimer {
    /// Pointer dwell on a submenu item in the panel at `level`.
    HoverIntent { level: usize, item: NodeId },
    /// Open window of the submenu at `level` elapsed.
    SubmenuSettled { level: usize, panel: PanelId },
    /// Remove a closed submenu panel.
    SubmenuTeardown { panel: PanelId },
    /// Pointer stayed outside the region of `level`.
    AutoClose { level: usize },
}

/// One open submenu.
#[derive(Debug, Clone)]
pub struct CascadeEntry {
    /// Level, starting at 1.
    pub level: usize,
    /// Item in the parent panel that opened this submenu.
    pub anchor_item: NodeId,
    /// The mounted panel.
    pub panel: PanelId,
    pub state: SubmenuPhase,
    /// Whether the keyboard or pointer opened it.
    pub origin: Interaction,
    /// Measured natural size of the panel.
    pub size: Size,
    settle: Option<CancelToken>,
    auto_close: Option<CancelToken>,
}

impl CascadeEntry {
    /// Whether an auto-close timer is pending for this level.
    pub fn auto_close_pending(&self) -> bool {
        self.auto_close.is_some()
    }
}

/// Ordered open submenus, level 1 first.
#[derive(Debug, Clone, Default)]
pub struct CascadeStack {
    entries: Vec<CascadeEntry>,
}

impl CascadeStack {
    /// Number of open submenu levels.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CascadeEntry] {
        &self.entries
    }

    /// Entry at `level` (1-based).
    pub fn get(&self, level: usize) -> Option<&CascadeEntry> {
        self.entries.get(level.checked_sub(1)?)
    }

    fn get_mut(&mut self, level: usize) -> Option<&mut CascadeEntry> {
        self.entries.get_mut(level.checked_sub(1)?)
    }

    /// Panel shown at `level`; level 0 is the root panel.
    pub fn panel_at(&self, level: usize) -> Option<PanelId> {
        if level == 0 {
            Some(PanelId::ROOT)
        } else {
            self.get(level).map(|e| e.panel)
        }
    }

    /// Item that opened the panel at `level`; `None` for the root.
    pub fn anchor_at(&self, level: usize) -> Option<&NodeId> {
        self.get(level).map(|e| &e.anchor_item)
    }

    /// Level of a mounted panel.
    pub fn level_of(&self, panel: PanelId) -> Option<usize> {
        if panel.is_root() {
            return Some(0);
        }
        self.entries.iter().find(|e| e.panel == panel).map(|e| e.level)
    }

    /// Whether any level is still opening.
    pub fn any_opening(&self) -> bool {
        self.entries.iter().any(|e| e.state == SubmenuPhase::Opening)
    }

    /// Levels are exactly `1..=depth`.
    pub fn is_contiguous(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, e)| e.level == i + 1)
    }

    fn push(&mut self, entry: CascadeEntry) {
        debug_assert_eq!(entry.level, self.entries.len() + 1);
        self.entries.push(entry);
    }

    /// Remove every entry at `level` or deeper, deepest first.
    fn truncate_from(&mut self, level: usize) -> Vec<CascadeEntry> {
        let keep = level.saturating_sub(1).min(self.entries.len());
        let mut closed = self.entries.split_off(keep);
        closed.reverse();
        for entry in &mut closed {
            entry.state = SubmenuPhase::Closing;
        }
        closed
    }
}

/// A pending hover-intent timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverIntent {
    /// Level of the panel containing `item`.
    pub level: usize,
    pub item: NodeId,
    pub token: CancelToken,
}

/// A submenu finished opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settled {
    pub level: usize,
    pub origin: Interaction,
}

/// Borrowed session state the controller works against.
pub(crate) struct Ctx<'a, S: ?Sized> {
    pub surface: &'a mut S,
    pub timers: &'a mut TimerQueue<TimerKind>,
    pub events: &'a mut Vec<MenuEvent>,
    pub tree: &'a MenuTree,
    pub config: &'a MenuConfig,
    pub panel_ids: &'a mut PanelIds,
    pub now: Duration,
}

impl<S: ?Sized> Ctx<'_, S> {
    fn schedule(&mut self, delay: Duration, timer: CascadeTimer) -> CancelToken {
        after_transition(self.timers, self.now, delay, TimerKind::Cascade(timer))
    }
}

/// Owns the cascade stack, hover intent, and last known pointer target.
#[derive(Debug, Clone, Default)]
pub struct CascadeController {
    stack: CascadeStack,
    hover: Option<HoverIntent>,
    pointer: PointerTarget,
}

impl CascadeController {
    pub fn stack(&self) -> &CascadeStack {
        &self.stack
    }

    /// The pending hover intent, if any.
    pub fn hover_intent(&self) -> Option<&HoverIntent> {
        self.hover.as_ref()
    }

    /// Last pointer target seen.
    pub fn pointer(&self) -> &PointerTarget {
        &self.pointer
    }

    pub(crate) fn set_pointer(&mut self, target: PointerTarget) {
        self.pointer = target;
    }

    /// Open a submenu for `item` at `level`, closing whatever is at that
    /// level or deeper first.
    pub(crate) fn open_at<S: MenuSurface + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, S>,
        level: usize,
        item: &NodeId,
        origin: Interaction,
    ) -> Request {
        if self
            .stack
            .get(level)
            .is_some_and(|e| e.state == SubmenuPhase::Opening)
        {
            return ignored(level, IgnoreReason::SubmenuOpening, "submenu open ignored");
        }
        if level == 0 || level > self.stack.depth() + 1 {
            return ignored(level, IgnoreReason::UnknownTarget, "submenu open ignored");
        }

        let tree = ctx.tree;
        let parent_anchor = self.stack.anchor_at(level - 1).cloned();
        let Some(node) = tree
            .children(parent_anchor.as_ref())
            .iter()
            .find(|n| n.id == *item)
        else {
            return ignored(level, IgnoreReason::UnknownTarget, "submenu open ignored");
        };
        if !node.has_submenu() || node.disabled {
            return ignored(level, IgnoreReason::Disabled, "submenu open ignored");
        }
        let Some(parent_panel) = self.stack.panel_at(level - 1) else {
            return ignored(level, IgnoreReason::UnknownTarget, "submenu open ignored");
        };
        let Some(anchor_rect) = ctx.surface.item_rect(parent_panel, item) else {
            return ignored(level, IgnoreReason::MissingAnchor, "submenu open ignored");
        };

        self.cancel_hover(ctx.timers);
        if self.stack.depth() >= level {
            let _ = self.close_from(ctx, level, true);
        }

        let panel = ctx.panel_ids.next();
        let size = ctx.surface.mount_panel(panel, level, node.children());
        let position = place_submenu(ctx.config, level, anchor_rect, size, ctx.surface.viewport());
        ctx.surface.position_panel(panel, &position);
        ctx.surface.flush_layout(panel);
        ctx.surface.set_panel_open(panel, true);

        let settle = ctx.schedule(
            ctx.config.timing.submenu_open(),
            CascadeTimer::SubmenuSettled { level, panel },
        );
        self.stack.push(CascadeEntry {
            level,
            anchor_item: item.clone(),
            panel,
            state: SubmenuPhase::Opening,
            origin,
            size,
            settle: Some(settle),
            auto_close: None,
        });
        ctx.events.push(MenuEvent::SubmenuOpen {
            level,
            item: item.clone(),
        });

        tracing::debug!(
            target: LOG_TARGET,
            level,
            item = %item,
            panel = panel.get(),
            placement = %position.placement,
            ?origin,
            "submenu opening"
        );
        Request::Applied
    }

    /// Close `level` and everything deeper.
    ///
    /// Non-forced requests are ignored while `level` is opening.
    pub(crate) fn close_from<S: MenuSurface + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, S>,
        level: usize,
        force: bool,
    ) -> Request {
        let level = level.max(1);
        let Some(entry) = self.stack.get(level) else {
            return Request::Ignored(IgnoreReason::AlreadyClosed);
        };
        if !force && entry.state == SubmenuPhase::Opening {
            return ignored(level, IgnoreReason::SubmenuOpening, "submenu close ignored");
        }

        if self.hover.as_ref().is_some_and(|h| h.level >= level) {
            self.cancel_hover(ctx.timers);
        }

        let teardown = ctx.config.timing.submenu_teardown();
        for mut entry in self.stack.truncate_from(level) {
            if let Some(token) = entry.settle.take() {
                token.cancel(ctx.timers);
            }
            if let Some(token) = entry.auto_close.take() {
                token.cancel(ctx.timers);
            }
            ctx.surface.set_panel_open(entry.panel, false);
            ctx.schedule(teardown, CascadeTimer::SubmenuTeardown { panel: entry.panel });
            ctx.events.push(MenuEvent::SubmenuClose { level: entry.level });
            tracing::debug!(
                target: LOG_TARGET,
                level = entry.level,
                panel = entry.panel.get(),
                force,
                "submenu closing"
            );
        }
        Request::Applied
    }

    /// Close every submenu and drop the hover intent.
    pub(crate) fn close_all<S: MenuSurface + ?Sized>(&mut self, ctx: &mut Ctx<'_, S>) {
        self.cancel_hover(ctx.timers);
        if !self.stack.is_empty() {
            let _ = self.close_from(ctx, 1, true);
        }
    }

    /// Forget the pointer after the session closes.
    pub(crate) fn reset_pointer(&mut self) {
        self.pointer = PointerTarget::Outside;
    }

    /// Click on an enabled submenu item in the panel at `level`.
    pub(crate) fn toggle_submenu<S: MenuSurface + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, S>,
        level: usize,
        item: &NodeId,
    ) -> Request {
        if self.stack.any_opening() {
            return ignored(level + 1, IgnoreReason::SubmenuOpening, "submenu click ignored");
        }
        if self.stack.anchor_at(level + 1) == Some(item) {
            self.close_from(ctx, level + 1, false)
        } else {
            self.open_at(ctx, level + 1, item, Interaction::Pointer)
        }
    }

    /// Track the pointer: restart hover intent and arm or cancel auto-close.
    pub(crate) fn pointer_moved<S: MenuSurface + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, S>,
        target: PointerTarget,
    ) {
        self.cancel_hover(ctx.timers);
        if let PointerTarget::Item { level, id } = &target {
            let opens_submenu = ctx
                .tree
                .get(id)
                .is_some_and(|node| node.has_submenu() && !node.disabled);
            let already_open = self.stack.anchor_at(level + 1) == Some(id);
            if opens_submenu && !already_open && *level <= self.stack.depth() {
                let token = ctx.schedule(
                    ctx.config.timing.hover_intent(),
                    CascadeTimer::HoverIntent {
                        level: *level,
                        item: id.clone(),
                    },
                );
                self.hover = Some(HoverIntent {
                    level: *level,
                    item: id.clone(),
                    token,
                });
            }
        }
        self.pointer = target;
        self.update_auto_close(ctx);
    }

    fn update_auto_close<S: ?Sized>(&mut self, ctx: &mut Ctx<'_, S>) {
        let delay = ctx.config.timing.auto_close();
        for entry in &mut self.stack.entries {
            let inside = region_contains(entry, &self.pointer);
            match (inside, entry.auto_close) {
                (true, Some(token)) => {
                    token.cancel(ctx.timers);
                    entry.auto_close = None;
                }
                (false, None) => {
                    entry.auto_close = Some(ctx.schedule(
                        delay,
                        CascadeTimer::AutoClose { level: entry.level },
                    ));
                }
                _ => {}
            }
        }
    }

    /// Re-run placement for every open level.
    pub(crate) fn reposition<S: MenuSurface + ?Sized>(&mut self, ctx: &mut Ctx<'_, S>) {
        let mut lost = None;
        for entry in &self.stack.entries {
            let Some(parent) = self.stack.panel_at(entry.level - 1) else {
                lost = Some(entry.level);
                break;
            };
            let Some(rect) = ctx.surface.item_rect(parent, &entry.anchor_item) else {
                lost = Some(entry.level);
                break;
            };
            let position =
                place_submenu(ctx.config, entry.level, rect, entry.size, ctx.surface.viewport());
            ctx.surface.position_panel(entry.panel, &position);
            ctx.surface.flush_layout(entry.panel);
        }
        if let Some(level) = lost {
            tracing::warn!(
                target: LOG_TARGET,
                level,
                "submenu anchor item disappeared; closing"
            );
            let _ = self.close_from(ctx, level, true);
        }
    }

    /// Handle a due cascade timer.
    pub(crate) fn fire<S: MenuSurface + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, S>,
        timer: CascadeTimer,
    ) -> Option<Settled> {
        match timer {
            CascadeTimer::HoverIntent { level, item } => {
                self.fire_hover(ctx, level, &item);
                None
            }
            CascadeTimer::SubmenuSettled { level, panel } => {
                let entry = self
                    .stack
                    .get_mut(level)
                    .filter(|e| e.panel == panel && e.state == SubmenuPhase::Opening)?;
                entry.state = SubmenuPhase::Open;
                entry.settle = None;
                tracing::debug!(target: LOG_TARGET, level, panel = panel.get(), "submenu open");
                Some(Settled {
                    level,
                    origin: entry.origin,
                })
            }
            CascadeTimer::SubmenuTeardown { panel } => {
                ctx.surface.unmount_panel(panel);
                None
            }
            CascadeTimer::AutoClose { level } => {
                self.fire_auto_close(ctx, level);
                None
            }
        }
    }

    fn fire_hover<S: MenuSurface + ?Sized>(
        &mut self,
        ctx: &mut Ctx<'_, S>,
        level: usize,
        item: &NodeId,
    ) {
        if self
            .hover
            .as_ref()
            .is_some_and(|h| h.level == level && h.item == *item)
        {
            self.hover = None;
        }
        let still_over = matches!(
            &self.pointer,
            PointerTarget::Item { level: l, id } if *l == level && id == item
        );
        if !still_over || self.stack.anchor_at(level + 1) == Some(item) {
            return;
        }
        let _ = self.open_at(ctx, level + 1, item, Interaction::Pointer);
    }

    fn fire_auto_close<S: MenuSurface + ?Sized>(&mut self, ctx: &mut Ctx<'_, S>, level: usize) {
        let Some(entry) = self.stack.get_mut(level) else {
            return;
        };
        entry.auto_close = None;
        if region_contains(entry, &self.pointer) {
            return;
        }
        if entry.state == SubmenuPhase::Opening {
            // Still animating in: wait another grace period.
            entry.auto_close = Some(ctx.schedule(
                ctx.config.timing.auto_close(),
                CascadeTimer::AutoClose { level },
            ));
            return;
        }
        tracing::debug!(target: LOG_TARGET, level, "submenu auto-close");
        let _ = self.close_from(ctx, level, false);
    }

    fn cancel_hover(&mut self, timers: &mut TimerQueue<TimerKind>) {
        if let Some(hover) = self.hover.take() {
            hover.token.cancel(timers);
        }
    }
}

/// Whether the pointer is inside the region kept open by `entry`: its own
/// panel, any deeper panel, or its anchor item.
fn region_contains(entry: &CascadeEntry, pointer: &PointerTarget) -> bool {
    match pointer {
        PointerTarget::Panel { level } => *level >= entry.level,
        PointerTarget::Item { level, id } => {
            *level >= entry.level || (*level + 1 == entry.level && *id == entry.anchor_item)
        }
        PointerTarget::Outside | PointerTarget::Anchor => false,
    }
}

fn place_submenu(
    config: &MenuConfig,
    level: usize,
    anchor: Rect,
    size: Size,
    viewport: Rect,
) -> Position {
    Positioner::new(anchor, config.layout.submenu_placement_at(level))
        .offset(config.layout.submenu_offset)
        .margin(config.layout.edge_margin)
        .place(size, viewport)
}

fn ignored(level: usize, reason: IgnoreReason, message: &'static str) -> Request {
    tracing::debug!(target: LOG_TARGET, level, %reason, "{message}");
    Request::Ignored(reason)
}
