#![forbid(unsafe_code)]

//! Top-level menu session: open/close lifecycle and input routing.
//!
//! A [`MenuSession`] owns everything about one anchored menu: the item
//! tree, the root panel, the submenu cascade, focus, global listeners, and
//! the timer queue that drives every deferred step. Hosts forward input with
//! [`MenuSession::handle_input`], call [`MenuSession::tick`] whenever time
//! passes, and collect [`MenuEvent`]s with [`MenuSession::drain_events`].
//!
//! # State Machine
//!
//! ```text
//!           open()                 open window
//! Closed ──────────► Opening ───────────────────► Open
//!   ▲                                               │ close()
//!   │            close window (or skip_animation)   ▼
//!   └──────────────────────────────────────────── Closing
//! ```
//!
//! Requests that arrive while `Opening` or `Closing` are ignored, never
//! queued.
//!
//! # Invariants
//!
//! - `is_open()` is true exactly in `Opening` and `Open`.
//! - Listeners are attached one tick after opening (so the click that opened
//!   the menu is not seen as an outside click) and detached on close.
//! - `close()` on a closed session changes nothing and emits nothing.
//! - Accessibility attributes are recomputed from state after every
//!   request; exactly one item per mounted panel has `tab_index == 0`.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Anchor missing at construction | [`MenuError::MissingAnchor`] |
//! | Anchor missing on `open` | Stays closed, logged at warn |
//! | Anchor disappears while open (noticed on reposition, close, or `set_items`) | Force-closed without focus restore, logged at warn |
//! | Pointer input on an item outside the panel open at its level | [`Request::Ignored`] with `UnknownTarget` |
//! | Request during a transition | [`Request::Ignored`], logged at debug |

use std::time::Duration;

use cascade_core::clock::{Clock, SystemClock};
use cascade_core::event::{Interaction, KeyCode, KeyEvent};
use cascade_core::geometry::{Rect, Size};
use cascade_core::timer::{TimerQueue, after_transition};

use crate::LOG_TARGET;
use crate::cascade::{CascadeController, CascadeStack, CascadeTimer, Ctx, HoverIntent};
use crate::config::MenuConfig;
use crate::error::MenuError;
use crate::event::{MenuEvent, MenuInput, PointerTarget};
use crate::item_tree::{MenuEntry, MenuTree, NodeId};
use crate::keyboard::{CascadeOps, KeyboardNavigator, first_focusable};
use crate::positioner::Positioner;
use crate::request::{IgnoreReason, Request};
use crate::surface::{ItemA11y, Listeners, MenuSurface, PanelId, PanelIds, TabDirection};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl SessionPhase {
    /// Opening or fully open.
    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }

    /// Opening or closing.
    #[inline]
    pub const fn is_transitioning(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// Every deferred step a session schedules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Show the root panel and attach listeners on the tick after opening.
    ShowRoot,
    /// Root open window elapsed.
    SessionSettled,
    /// Root close window elapsed; unmount.
    SessionTeardown,
    /// A submenu step.
    Cascade(CascadeTimer),
}

/// One anchored menu.
pub struct MenuSession<S, C = SystemClock> {
    surface: S,
    clock: C,
    config: MenuConfig,
    navigator: KeyboardNavigator,
    tree: MenuTree,
    phase: SessionPhase,
    interaction: Interaction,
    timers: TimerQueue<TimerKind>,
    cascade: CascadeController,
    panel_ids: PanelIds,
    listeners: Listeners,
    focused: Option<NodeId>,
    root_size: Size,
    anchor_click: bool,
    events: Vec<MenuEvent>,
}

impl<S: MenuSurface, C: Clock> MenuSession<S, C> {
    /// Create a closed session with an empty item list.
    ///
    /// Fails if the configuration is invalid or the surface has no anchor.
    pub fn new(surface: S, clock: C, config: MenuConfig) -> Result<Self, MenuError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(MenuError::InvalidConfig(errors));
        }
        if surface.anchor_rect().is_none() {
            return Err(MenuError::MissingAnchor);
        }
        let navigator = KeyboardNavigator::new().typeahead(config.behavior.typeahead);
        Ok(Self {
            surface,
            clock,
            config,
            navigator,
            tree: MenuTree::default(),
            phase: SessionPhase::Closed,
            interaction: Interaction::Pointer,
            timers: TimerQueue::new(),
            cascade: CascadeController::default(),
            panel_ids: PanelIds::default(),
            listeners: Listeners::empty(),
            focused: None,
            root_size: Size::default(),
            anchor_click: false,
            events: Vec::new(),
        })
    }

    /// Builder-style [`set_items`](Self::set_items).
    pub fn with_items(mut self, entries: &[MenuEntry]) -> Result<Self, MenuError> {
        self.set_items(entries)?;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open the menu.
    ///
    /// Keyboard opens focus the first enabled item; pointer opens leave
    /// focus alone.
    pub fn open(&mut self, interaction: Interaction) -> Request {
        let _span = tracing::debug_span!("menu.open", ?interaction).entered();
        if self.phase != SessionPhase::Closed {
            let reason = if self.phase.is_transitioning() {
                IgnoreReason::Transitioning
            } else {
                IgnoreReason::AlreadyOpen
            };
            tracing::debug!(target: LOG_TARGET, phase = ?self.phase, %reason, "open ignored");
            return Request::Ignored(reason);
        }
        let Some(anchor) = self.surface.anchor_rect() else {
            tracing::warn!(target: LOG_TARGET, "menu anchor missing; not opening");
            return Request::Ignored(IgnoreReason::MissingAnchor);
        };

        self.interaction = interaction;
        self.focused = None;
        self.mount_root(anchor);
        self.phase = SessionPhase::Opening;
        self.surface.set_anchor_expanded(true);
        self.events.push(MenuEvent::Open);

        if interaction.is_keyboard() {
            self.focus_first(0);
        }

        let now = self.clock.now();
        after_transition(&mut self.timers, now, Duration::ZERO, TimerKind::ShowRoot);
        after_transition(
            &mut self.timers,
            now,
            self.config.timing.session_open(),
            TimerKind::SessionSettled,
        );

        tracing::debug!(target: LOG_TARGET, items = self.tree.roots().len(), "menu opening");
        self.project_a11y();
        Request::Applied
    }

    /// Close the menu.
    ///
    /// `restore_focus` returns focus to the anchor (unless an anchor click
    /// is handling focus itself). `skip_animation` unmounts immediately.
    pub fn close(&mut self, restore_focus: bool, skip_animation: bool) -> Request {
        let _span = tracing::debug_span!("menu.close", restore_focus, skip_animation).entered();
        match self.phase {
            SessionPhase::Closed => Request::Ignored(IgnoreReason::AlreadyClosed),
            SessionPhase::Opening | SessionPhase::Closing => {
                tracing::debug!(target: LOG_TARGET, phase = ?self.phase, "close ignored");
                Request::Ignored(IgnoreReason::Transitioning)
            }
            SessionPhase::Open => {
                self.close_now(restore_focus, skip_animation);
                self.project_a11y();
                Request::Applied
            }
        }
    }

    /// Open if closed, close (restoring focus) if open.
    pub fn toggle(&mut self, interaction: Interaction) -> Request {
        if self.phase.is_open() {
            self.close(true, false)
        } else {
            self.open(interaction)
        }
    }

    /// Whether the menu is opening or open.
    pub fn is_open(&self) -> bool {
        self.phase.is_open()
    }

    /// Replace the item list.
    ///
    /// While open, submenus are force-closed and the root panel is
    /// remounted and repositioned. While closed or closing only the items
    /// are swapped. On error the previous items stay.
    pub fn set_items(&mut self, entries: &[MenuEntry]) -> Result<(), MenuError> {
        let tree = MenuTree::build(entries)?;
        if !self.phase.is_open() {
            self.tree = tree;
            return Ok(());
        }

        let (cascade, mut ctx) = self.split();
        cascade.close_all(&mut ctx);
        self.tree = tree;
        self.focused = None;
        tracing::debug!(target: LOG_TARGET, items = self.tree.roots().len(), "menu items replaced");

        match self.surface.anchor_rect() {
            Some(anchor) => {
                self.mount_root(anchor);
                if self.interaction.is_keyboard() && self.phase.is_open() {
                    self.focus_first(0);
                }
                self.project_a11y();
            }
            None => self.force_close_missing_anchor(),
        }
        Ok(())
    }

    /// Re-run placement for the root and every open submenu.
    pub fn reposition(&mut self) -> Request {
        if !self.phase.is_open() {
            return Request::Ignored(IgnoreReason::AlreadyClosed);
        }
        let Some(anchor) = self.surface.anchor_rect() else {
            self.force_close_missing_anchor();
            return Request::Applied;
        };
        self.position_root(anchor);
        self.surface.flush_layout(PanelId::ROOT);
        let (cascade, mut ctx) = self.split();
        cascade.reposition(&mut ctx);
        self.sync_focus();
        self.project_a11y();
        Request::Applied
    }

    // -----------------------------------------------------------------------
    // Input and time
    // -----------------------------------------------------------------------

    /// Route one input.
    pub fn handle_input(&mut self, input: MenuInput) -> Request {
        let request = match input {
            MenuInput::Key(key) => self.key(key, false),
            MenuInput::DocumentKey(key) => self.key(key, true),
            MenuInput::PointerMove(target) => self.pointer_move(target),
            MenuInput::Click(target) => self.click(target),
            MenuInput::Resize => self.viewport_changed(Listeners::RESIZE),
            MenuInput::Scroll => self.viewport_changed(Listeners::SCROLL),
        };
        self.sync_focus();
        self.project_a11y();
        request
    }

    /// Run every timer due at the clock's current time.
    ///
    /// Timers scheduled while this runs wait for the next call, even with a
    /// zero delay. Returns how many fired.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mark = self.timers.watermark();
        let mut fired = 0;
        while let Some((_, kind)) = self.timers.pop_due(now, mark) {
            fired += 1;
            self.fire(kind);
        }
        if fired > 0 {
            self.sync_focus();
            self.project_a11y();
        }
        fired
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<MenuEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Open submenus.
    pub fn cascade(&self) -> &CascadeStack {
        self.cascade.stack()
    }

    /// The pending hover intent, if any.
    pub fn hover_intent(&self) -> Option<&HoverIntent> {
        self.cascade.hover_intent()
    }

    pub fn focused_item(&self) -> Option<&NodeId> {
        self.focused.as_ref()
    }

    /// Kinds of every pending timer, in no particular order.
    pub fn pending_timers(&self) -> impl Iterator<Item = &TimerKind> + '_ {
        self.timers.iter().map(|(_, kind)| kind)
    }

    /// When the next timer is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Currently attached global listeners.
    pub fn listeners(&self) -> Listeners {
        self.listeners
    }

    /// How the current (or last) open was triggered.
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn split(&mut self) -> (&mut CascadeController, Ctx<'_, S>) {
        let now = self.clock.now();
        (
            &mut self.cascade,
            Ctx {
                surface: &mut self.surface,
                timers: &mut self.timers,
                events: &mut self.events,
                tree: &self.tree,
                config: &self.config,
                panel_ids: &mut self.panel_ids,
                now,
            },
        )
    }

    fn mount_root(&mut self, anchor: Rect) {
        self.root_size = self
            .surface
            .mount_panel(PanelId::ROOT, 0, self.tree.roots());
        self.position_root(anchor);
        self.surface.flush_layout(PanelId::ROOT);
    }

    fn position_root(&mut self, anchor: Rect) {
        let layout = &self.config.layout;
        let position = Positioner::new(anchor, layout.placement)
            .offset(layout.offset)
            .margin(layout.edge_margin)
            .place(self.root_size, self.surface.viewport());
        self.surface.position_panel(PanelId::ROOT, &position);
    }

    fn close_now(&mut self, restore_focus: bool, skip_animation: bool) {
        if self.surface.anchor_rect().is_none() {
            self.force_close_missing_anchor();
        } else {
            self.begin_close(restore_focus, skip_animation);
        }
    }

    fn begin_close(&mut self, restore_focus: bool, skip_animation: bool) {
        let (cascade, mut ctx) = self.split();
        cascade.close_all(&mut ctx);
        cascade.reset_pointer();
        self.detach_listeners();
        self.timers.cancel_where(|k| {
            matches!(k, TimerKind::ShowRoot | TimerKind::SessionSettled)
        });
        self.surface.set_panel_open(PanelId::ROOT, false);
        self.phase = SessionPhase::Closing;
        self.events.push(MenuEvent::Close);

        if restore_focus && !self.anchor_click {
            self.surface.focus_anchor();
        }
        self.surface.set_anchor_expanded(false);
        self.focused = None;
        tracing::debug!(target: LOG_TARGET, restore_focus, skip_animation, "menu closing");

        if skip_animation {
            self.teardown();
        } else {
            after_transition(
                &mut self.timers,
                self.clock.now(),
                self.config.timing.session_close(),
                TimerKind::SessionTeardown,
            );
        }
    }

    /// Unmount the root and any submenu panels still waiting for teardown.
    fn teardown(&mut self) {
        let mut pending = Vec::new();
        self.timers.cancel_where(|k| match k {
            TimerKind::SessionTeardown => true,
            TimerKind::Cascade(CascadeTimer::SubmenuTeardown { panel }) => {
                pending.push(*panel);
                true
            }
            _ => false,
        });
        for panel in pending {
            self.surface.unmount_panel(panel);
        }
        self.surface.unmount_panel(PanelId::ROOT);
        self.phase = SessionPhase::Closed;
        tracing::debug!(target: LOG_TARGET, "menu closed");
    }

    fn force_close_missing_anchor(&mut self) {
        tracing::warn!(
            target: LOG_TARGET,
            phase = ?self.phase,
            "menu anchor disappeared; force-closing"
        );
        match self.phase {
            SessionPhase::Closed => {}
            SessionPhase::Closing => self.teardown(),
            SessionPhase::Opening | SessionPhase::Open => self.begin_close(false, true),
        }
    }

    fn attach_listeners(&mut self) {
        if self.listeners != Listeners::all() {
            self.listeners = Listeners::all();
            self.surface.set_listeners(self.listeners);
            tracing::debug!(target: LOG_TARGET, "listeners attached");
        }
    }

    fn detach_listeners(&mut self) {
        if !self.listeners.is_empty() {
            self.listeners = Listeners::empty();
            self.surface.set_listeners(self.listeners);
            tracing::debug!(target: LOG_TARGET, "listeners detached");
        }
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::ShowRoot => {
                if self.phase.is_open() {
                    self.surface.set_panel_open(PanelId::ROOT, true);
                    self.attach_listeners();
                }
            }
            TimerKind::SessionSettled => {
                if self.phase == SessionPhase::Opening {
                    self.phase = SessionPhase::Open;
                    tracing::debug!(target: LOG_TARGET, "menu open");
                }
            }
            TimerKind::SessionTeardown => {
                if self.phase == SessionPhase::Closing {
                    self.teardown();
                }
            }
            TimerKind::Cascade(timer) => {
                let (cascade, mut ctx) = self.split();
                let settled = cascade.fire(&mut ctx, timer);
                if let Some(settled) = settled.filter(|s| s.origin.is_keyboard()) {
                    self.focus_first(settled.level);
                }
            }
        }
    }

    fn key(&mut self, key: KeyEvent, document: bool) -> Request {
        if !self.phase.is_open() {
            return Request::Ignored(IgnoreReason::AlreadyClosed);
        }
        if document
            && (key.code != KeyCode::Escape
                || !key.is_press()
                || !self.listeners.contains(Listeners::ESCAPE))
        {
            return Request::Ignored(IgnoreReason::Unhandled);
        }
        let navigator = self.navigator;
        navigator.handle_key(self, &key)
    }

    fn pointer_move(&mut self, target: PointerTarget) -> Request {
        if !self.phase.is_open() {
            return Request::Ignored(IgnoreReason::AlreadyClosed);
        }
        let stale = match &target {
            PointerTarget::Item { level, id } => !self.is_open_item(*level, id),
            other => other.level().is_some_and(|l| l > self.cascade.stack().depth()),
        };
        if stale {
            return Request::Ignored(IgnoreReason::UnknownTarget);
        }
        let (cascade, mut ctx) = self.split();
        cascade.pointer_moved(&mut ctx, target);
        Request::Applied
    }

    fn click(&mut self, target: PointerTarget) -> Request {
        match target {
            PointerTarget::Anchor => {
                self.anchor_click = true;
                let request = self.toggle(Interaction::Pointer);
                self.anchor_click = false;
                request
            }
            PointerTarget::Outside => {
                if self.phase.is_open() && self.listeners.contains(Listeners::OUTSIDE_CLICK) {
                    self.close(false, false)
                } else {
                    Request::Ignored(IgnoreReason::Unhandled)
                }
            }
            PointerTarget::Panel { .. } => Request::Ignored(IgnoreReason::Unhandled),
            PointerTarget::Item { level, id } => self.click_item(level, id),
        }
    }

    fn click_item(&mut self, level: usize, id: NodeId) -> Request {
        if !self.phase.is_open() {
            return Request::Ignored(IgnoreReason::AlreadyClosed);
        }
        if !self.is_open_item(level, &id) {
            tracing::debug!(target: LOG_TARGET, item = %id, level, "click on closed panel ignored");
            return Request::Ignored(IgnoreReason::UnknownTarget);
        }
        let Some(node) = self.tree.get(&id) else {
            return Request::Ignored(IgnoreReason::UnknownTarget);
        };
        if !node.is_focusable() {
            return Request::Ignored(IgnoreReason::Disabled);
        }
        if node.has_submenu() {
            let (cascade, mut ctx) = self.split();
            cascade.set_pointer(PointerTarget::Item {
                level,
                id: id.clone(),
            });
            cascade.toggle_submenu(&mut ctx, level, &id)
        } else {
            self.select(&id)
        }
    }

    /// Whether `id` is an item of the panel currently open at `level`.
    fn is_open_item(&self, level: usize, id: &NodeId) -> bool {
        let stack = self.cascade.stack();
        level <= stack.depth()
            && self
                .tree
                .children(stack.anchor_at(level))
                .iter()
                .any(|n| n.id == *id)
    }

    fn select(&mut self, id: &NodeId) -> Request {
        let path = self.tree.ancestry(id).unwrap_or_else(|| vec![id.clone()]);
        tracing::debug!(target: LOG_TARGET, item = %id, depth = path.len(), "menu item selected");
        self.events.push(MenuEvent::Select {
            item_id: id.clone(),
            path,
        });
        if self.config.behavior.close_on_select {
            let _ = self.close(true, false);
        }
        Request::Applied
    }

    fn viewport_changed(&mut self, listener: Listeners) -> Request {
        if !self.phase.is_open() || !self.listeners.contains(listener) {
            return Request::Ignored(IgnoreReason::Unhandled);
        }
        self.reposition()
    }

    fn focus(&mut self, level: usize, id: &NodeId) {
        let Some(panel) = self.cascade.stack().panel_at(level) else {
            return;
        };
        self.focused = Some(id.clone());
        self.surface.focus_item(panel, id);
    }

    fn focus_first(&mut self, level: usize) {
        let items = self.tree.children(self.cascade.stack().anchor_at(level));
        if let Some(id) = first_focusable(items).map(|n| n.id.clone()) {
            self.focus(level, &id);
        }
    }

    /// Drop focus that points into a panel which is no longer open.
    fn sync_focus(&mut self) {
        let Some(focused) = &self.focused else {
            return;
        };
        let stack = self.cascade.stack();
        let visible = self.phase.is_open()
            && (0..=stack.depth()).any(|level| {
                self.tree
                    .children(stack.anchor_at(level))
                    .iter()
                    .any(|n| n.id == *focused)
            });
        if !visible {
            self.focused = None;
        }
    }

    /// Write roving tab index, expanded, and disabled for every mounted
    /// panel.
    fn project_a11y(&mut self) {
        if self.phase == SessionPhase::Closed {
            return;
        }
        let stack = self.cascade.stack();
        for level in 0..=stack.depth() {
            let Some(panel) = stack.panel_at(level) else {
                continue;
            };
            let items = self.tree.children(stack.anchor_at(level));
            let tabbable = self
                .focused
                .as_ref()
                .filter(|f| items.iter().any(|n| n.id == **f))
                .or_else(|| first_focusable(items).map(|n| &n.id));
            let expanded_item = stack.anchor_at(level + 1);
            for node in items.iter().filter(|n| !n.is_divider()) {
                let state = ItemA11y {
                    tab_index: if tabbable == Some(&node.id) { 0 } else { -1 },
                    expanded: node
                        .has_submenu()
                        .then(|| expanded_item == Some(&node.id)),
                    disabled: node.disabled,
                };
                self.surface.set_item_state(panel, &node.id, state);
            }
        }
    }
}

impl<S: MenuSurface, C: Clock> CascadeOps for MenuSession<S, C> {
    fn tree(&self) -> &MenuTree {
        &self.tree
    }

    fn depth(&self) -> usize {
        self.cascade.stack().depth()
    }

    fn submenu_anchor(&self, level: usize) -> Option<&NodeId> {
        self.cascade.stack().anchor_at(level)
    }

    fn focused_item(&self) -> Option<&NodeId> {
        self.focused.as_ref()
    }

    fn focus_item(&mut self, level: usize, item: &NodeId) {
        self.focus(level, item);
    }

    fn open_submenu(&mut self, level: usize, item: &NodeId) -> Request {
        let (cascade, mut ctx) = self.split();
        cascade.open_at(&mut ctx, level, item, Interaction::Keyboard)
    }

    fn close_submenus(&mut self, level: usize) -> Request {
        let (cascade, mut ctx) = self.split();
        let request = cascade.close_from(&mut ctx, level, false);
        if request.is_applied() {
            self.sync_focus();
            self.project_a11y();
        }
        request
    }

    fn select_item(&mut self, item: &NodeId) -> Request {
        self.select(item)
    }

    fn close_session(&mut self, restore_focus: bool) -> Request {
        self.close(restore_focus, false)
    }

    fn focus_beside_anchor(&mut self, direction: TabDirection) {
        self.surface.focus_beside_anchor(direction);
    }
}

impl<S, C> std::fmt::Debug for MenuSession<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuSession")
            .field("phase", &self.phase)
            .field("depth", &self.cascade.stack().depth())
            .field("focused", &self.focused)
            .field("listeners", &self.listeners)
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_tree::MenuNode;
    use crate::positioner::Position;
    use cascade_core::clock::VirtualClock;

    /// Fixed anchor, rows 20px tall, nothing recorded.
    struct NullSurface {
        anchor: Option<Rect>,
        positions: Vec<(PanelId, Position)>,
    }

    impl MenuSurface for NullSurface {
        fn anchor_rect(&self) -> Option<Rect> {
            self.anchor
        }
        fn viewport(&self) -> Rect {
            Rect::new(0, 0, 800, 600)
        }
        fn mount_panel(&mut self, _panel: PanelId, _level: usize, nodes: &[MenuNode]) -> Size {
            Size::new(100, 20 * nodes.len() as i32)
        }
        fn position_panel(&mut self, panel: PanelId, position: &Position) {
            self.positions.retain(|(p, _)| *p != panel);
            self.positions.push((panel, *position));
        }
        fn set_panel_open(&mut self, _panel: PanelId, _open: bool) {}
        fn unmount_panel(&mut self, panel: PanelId) {
            self.positions.retain(|(p, _)| *p != panel);
        }
        fn flush_layout(&mut self, _panel: PanelId) {}
        fn item_rect(&self, panel: PanelId, _item: &NodeId) -> Option<Rect> {
            self.positions
                .iter()
                .find(|(p, _)| *p == panel)
                .map(|(_, pos)| Rect::new(pos.left, pos.top, 100, 20))
        }
        fn set_item_state(&mut self, _panel: PanelId, _item: &NodeId, _state: ItemA11y) {}
        fn set_anchor_expanded(&mut self, _expanded: bool) {}
        fn focus_item(&mut self, _panel: PanelId, _item: &NodeId) {}
        fn focus_anchor(&mut self) {}
        fn focus_beside_anchor(&mut self, _direction: TabDirection) {}
        fn set_listeners(&mut self, _listeners: Listeners) {}
    }

    fn session() -> (MenuSession<NullSurface, VirtualClock>, VirtualClock) {
        let clock = VirtualClock::new();
        let surface = NullSurface {
            anchor: Some(Rect::new(10, 10, 40, 20)),
            positions: Vec::new(),
        };
        let session = MenuSession::new(surface, clock.clone(), MenuConfig::default())
            .and_then(|s| {
                s.with_items(&[
                    MenuEntry::item("One").id("one"),
                    MenuEntry::item("Two").id("two").submenu(vec![MenuEntry::item("Three")]),
                ])
            })
            .expect("session");
        (session, clock)
    }

    #[test]
    fn phase_helpers() {
        assert!(!SessionPhase::Closed.is_open());
        assert!(SessionPhase::Opening.is_open() && SessionPhase::Opening.is_transitioning());
        assert!(SessionPhase::Open.is_open() && !SessionPhase::Open.is_transitioning());
        assert!(!SessionPhase::Closing.is_open() && SessionPhase::Closing.is_transitioning());
    }

    #[test]
    fn invalid_config_lists_every_problem() {
        let surface = NullSurface {
            anchor: Some(Rect::new(0, 0, 1, 1)),
            positions: Vec::new(),
        };
        let config = MenuConfig::default()
            .edge_margin(-1)
            .hover_intent(Duration::from_millis(500));
        match MenuSession::new(surface, VirtualClock::new(), config) {
            Err(MenuError::InvalidConfig(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn open_schedules_show_and_settle() {
        let (mut session, clock) = session();
        assert!(session.open(Interaction::Keyboard).is_applied());
        let kinds: Vec<&TimerKind> = session.pending_timers().collect();
        assert!(kinds.contains(&&TimerKind::ShowRoot));
        assert!(kinds.contains(&&TimerKind::SessionSettled));
        assert_eq!(session.focused_item().map(NodeId::as_str), Some("one"));

        // ShowRoot fires on the first tick; SessionSettled waits.
        assert_eq!(session.tick(), 1);
        assert_eq!(session.listeners(), Listeners::all());
        clock.advance_ms(150);
        assert_eq!(session.tick(), 1);
        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn keyboard_submenu_focuses_first_item_once_settled() {
        let (mut session, clock) = session();
        session.open(Interaction::Keyboard);
        session.tick();
        clock.advance_ms(150);
        session.tick();

        session.handle_input(MenuInput::Key(KeyEvent::new(KeyCode::End)));
        session.handle_input(MenuInput::Key(KeyEvent::new(KeyCode::Right)));
        assert_eq!(session.cascade().depth(), 1);
        assert_eq!(session.focused_item().map(NodeId::as_str), Some("two"));

        clock.advance_ms(300);
        session.tick();
        assert_eq!(session.focused_item().map(NodeId::as_str), Some("item-1-0"));
    }

    #[test]
    fn reposition_when_closed_is_ignored() {
        let (mut session, _clock) = session();
        assert_eq!(
            session.reposition(),
            Request::Ignored(IgnoreReason::AlreadyClosed)
        );
    }
}
