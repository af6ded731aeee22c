#![forbid(unsafe_code)]

//! Keyboard navigation across cascade levels.
//!
//! The navigator acts on the panel that holds focus: the deepest open panel
//! containing the focused item, or the root panel when nothing is focused.
//! It never touches session state directly; everything goes through
//! [`CascadeOps`].
//!
//! | Key | Effect |
//! |-----|--------|
//! | `Down` / `Up` | Next / previous enabled sibling, wrapping |
//! | `Home` / `End` | First / last enabled sibling |
//! | `Right` | Open the focused submenu item, or focus into it if open |
//! | `Left` | Close the current submenu and focus its anchor item |
//! | `Escape` | Close the innermost submenu, else the whole menu |
//! | `Tab` / `BackTab` | Close the menu and move focus past the opener |
//! | `Enter` / `Space` | Activate: open the submenu or select the leaf |
//! | printable | Jump to the next item starting with that character |
//!
//! Dividers and disabled items are never focused.

use cascade_core::event::{KeyCode, KeyEvent};
use unicode_segmentation::UnicodeSegmentation;

use crate::item_tree::{MenuNode, MenuTree, NodeId};
use crate::request::{IgnoreReason, Request};
use crate::surface::TabDirection;

/// Capabilities the navigator needs from a session.
pub trait CascadeOps {
    /// The current item tree.
    fn tree(&self) -> &MenuTree;

    /// Number of open submenu levels.
    fn depth(&self) -> usize;

    /// Item that opened the panel at `level`; `None` for the root.
    fn submenu_anchor(&self, level: usize) -> Option<&NodeId>;

    /// The focused item, if any.
    fn focused_item(&self) -> Option<&NodeId>;

    /// Move focus to `item` in the panel at `level`.
    fn focus_item(&mut self, level: usize, item: &NodeId);

    /// Open the submenu of `item` at `level` with keyboard origin.
    fn open_submenu(&mut self, level: usize, item: &NodeId) -> Request;

    /// Close the submenu at `level` and everything deeper.
    fn close_submenus(&mut self, level: usize) -> Request;

    /// Activate a leaf item.
    fn select_item(&mut self, item: &NodeId) -> Request;

    /// Close the whole menu.
    fn close_session(&mut self, restore_focus: bool) -> Request;

    /// Move focus to the element after (or before) the opener.
    fn focus_beside_anchor(&mut self, direction: TabDirection);
}

/// Where focus currently is: panel level and focused item.
pub fn focus_position<O: CascadeOps + ?Sized>(ops: &O) -> (usize, Option<NodeId>) {
    let Some(focused) = ops.focused_item() else {
        return (0, None);
    };
    for level in (0..=ops.depth()).rev() {
        let items = ops.tree().children(ops.submenu_anchor(level));
        if items.iter().any(|n| n.id == *focused) {
            return (level, Some(focused.clone()));
        }
    }
    (0, None)
}

/// First focusable node of a panel.
pub fn first_focusable(items: &[MenuNode]) -> Option<&MenuNode> {
    items.iter().find(|n| n.is_focusable())
}

/// Keyboard navigator.
#[derive(Debug, Clone, Copy)]
pub struct KeyboardNavigator {
    typeahead: bool,
}

impl Default for KeyboardNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardNavigator {
    /// Navigator with typeahead enabled.
    pub const fn new() -> Self {
        Self { typeahead: true }
    }

    /// Enable or disable first-character typeahead.
    #[must_use]
    pub const fn typeahead(mut self, enabled: bool) -> Self {
        self.typeahead = enabled;
        self
    }

    /// Handle one key event.
    pub fn handle_key<O: CascadeOps + ?Sized>(&self, ops: &mut O, key: &KeyEvent) -> Request {
        if !key.is_press() || key.has_command_modifier() {
            return Request::Ignored(IgnoreReason::Unhandled);
        }
        match key.code {
            KeyCode::Down => move_focus(ops, Step::Next),
            KeyCode::Up => move_focus(ops, Step::Previous),
            KeyCode::Home => move_focus(ops, Step::First),
            KeyCode::End => move_focus(ops, Step::Last),
            KeyCode::Right => enter_submenu(ops),
            KeyCode::Left => {
                let (level, _) = focus_position(ops);
                if level == 0 {
                    Request::Ignored(IgnoreReason::Unhandled)
                } else {
                    leave_submenu(ops, level)
                }
            }
            KeyCode::Escape => {
                let depth = ops.depth();
                if depth > 0 {
                    leave_submenu(ops, depth)
                } else {
                    ops.close_session(true)
                }
            }
            KeyCode::Tab => tab_out(ops, TabDirection::Forward),
            KeyCode::BackTab => tab_out(ops, TabDirection::Backward),
            KeyCode::Enter | KeyCode::Char(' ') => activate(ops),
            KeyCode::Char(ch) if self.typeahead => typeahead(ops, ch),
            KeyCode::Char(_) => Request::Ignored(IgnoreReason::Unhandled),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next,
    Previous,
    First,
    Last,
}

fn move_focus<O: CascadeOps + ?Sized>(ops: &mut O, step: Step) -> Request {
    let (level, current) = focus_position(ops);
    let target = {
        let items = ops.tree().children(ops.submenu_anchor(level));
        let index = current
            .as_ref()
            .and_then(|id| items.iter().position(|n| n.id == *id));
        let found = match step {
            Step::Next => cycle(items, index, true),
            Step::Previous => cycle(items, index, false),
            Step::First => items.iter().position(MenuNode::is_focusable),
            Step::Last => items.iter().rposition(MenuNode::is_focusable),
        };
        found.map(|i| items[i].id.clone())
    };
    match target {
        Some(id) => {
            ops.focus_item(level, &id);
            Request::Applied
        }
        None => Request::Ignored(IgnoreReason::Unhandled),
    }
}

/// Next focusable index after (or before) `current`, wrapping. With no
/// current index, forward starts at the first item and backward at the last.
fn cycle(items: &[MenuNode], current: Option<usize>, forward: bool) -> Option<usize> {
    let len = items.len();
    if len == 0 {
        return None;
    }
    let start = current.unwrap_or(if forward { len - 1 } else { 0 });
    (1..=len)
        .map(|k| {
            if forward {
                (start + k) % len
            } else {
                (start + len - k % len) % len
            }
        })
        .find(|&i| items[i].is_focusable())
}

fn enter_submenu<O: CascadeOps + ?Sized>(ops: &mut O) -> Request {
    let (level, Some(current)) = focus_position(ops) else {
        return Request::Ignored(IgnoreReason::Unhandled);
    };
    let opens = ops
        .tree()
        .get(&current)
        .is_some_and(|n| n.has_submenu() && n.is_focusable());
    if !opens {
        return Request::Ignored(IgnoreReason::Unhandled);
    }
    if ops.submenu_anchor(level + 1) == Some(&current) {
        let first = first_focusable(ops.tree().children(Some(&current))).map(|n| n.id.clone());
        match first {
            Some(id) => {
                ops.focus_item(level + 1, &id);
                Request::Applied
            }
            None => Request::Ignored(IgnoreReason::Unhandled),
        }
    } else {
        ops.open_submenu(level + 1, &current)
    }
}

fn leave_submenu<O: CascadeOps + ?Sized>(ops: &mut O, level: usize) -> Request {
    let anchor = ops.submenu_anchor(level).cloned();
    let request = ops.close_submenus(level);
    if let (true, Some(anchor)) = (request.is_applied(), anchor) {
        ops.focus_item(level - 1, &anchor);
    }
    request
}

fn tab_out<O: CascadeOps + ?Sized>(ops: &mut O, direction: TabDirection) -> Request {
    let request = ops.close_session(false);
    if request.is_applied() {
        ops.focus_beside_anchor(direction);
    }
    request
}

fn activate<O: CascadeOps + ?Sized>(ops: &mut O) -> Request {
    let (_, Some(current)) = focus_position(ops) else {
        return Request::Ignored(IgnoreReason::Unhandled);
    };
    let Some(node) = ops.tree().get(&current) else {
        return Request::Ignored(IgnoreReason::UnknownTarget);
    };
    if !node.is_focusable() {
        return Request::Ignored(IgnoreReason::Disabled);
    }
    if node.has_submenu() {
        enter_submenu(ops)
    } else {
        ops.select_item(&current)
    }
}

fn typeahead<O: CascadeOps + ?Sized>(ops: &mut O, ch: char) -> Request {
    let needle: String = ch.to_lowercase().collect();
    let (level, current) = focus_position(ops);
    let target = {
        let items = ops.tree().children(ops.submenu_anchor(level));
        let len = items.len();
        let index = current
            .as_ref()
            .and_then(|id| items.iter().position(|n| n.id == *id));
        let start = index.unwrap_or(len.saturating_sub(1));
        (1..=len)
            .map(|k| (start + k) % len)
            .find(|&i| items[i].is_focusable() && starts_with_grapheme(&items[i].text, &needle))
            .map(|i| items[i].id.clone())
    };
    match target {
        Some(id) => {
            ops.focus_item(level, &id);
            Request::Applied
        }
        None => Request::Ignored(IgnoreReason::Unhandled),
    }
}

fn starts_with_grapheme(label: &str, needle: &str) -> bool {
    label
        .trim_start()
        .graphemes(true)
        .next()
        .is_some_and(|g| g.to_lowercase() == needle)
}
