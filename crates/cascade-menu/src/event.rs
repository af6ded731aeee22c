#![forbid(unsafe_code)]

//! Input delivered to a menu session and events it reports back.

use cascade_core::event::KeyEvent;

use crate::item_tree::NodeId;

/// What the pointer is over, as resolved by the host.
///
/// Levels count panels: `0` is the root panel, `1` the first submenu.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PointerTarget {
    /// Not over the anchor or any panel.
    #[default]
    Outside,
    /// Over the element the menu is anchored to.
    Anchor,
    /// Over panel chrome (padding, a divider) at `level`.
    Panel { level: usize },
    /// Over an item in the panel at `level`.
    Item { level: usize, id: NodeId },
}

impl PointerTarget {
    /// Shorthand for an item target.
    pub fn item(level: usize, id: impl Into<NodeId>) -> Self {
        Self::Item {
            level,
            id: id.into(),
        }
    }

    /// Panel level the pointer is inside, if any.
    pub fn level(&self) -> Option<usize> {
        match self {
            Self::Panel { level } | Self::Item { level, .. } => Some(*level),
            Self::Outside | Self::Anchor => None,
        }
    }
}

/// Input a host forwards to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuInput {
    /// Key pressed while focus is inside the menu.
    Key(KeyEvent),
    /// Key seen by the document-level listener (focus may be elsewhere).
    DocumentKey(KeyEvent),
    /// Pointer moved onto a new target.
    PointerMove(PointerTarget),
    /// Primary button click (or tap) on a target.
    Click(PointerTarget),
    /// The viewport was resized.
    Resize,
    /// The document or an ancestor of the anchor scrolled.
    Scroll,
}

/// Something that happened, for the host to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// The root panel was mounted and the session started opening.
    Open,
    /// The session started closing.
    Close,
    /// A leaf item was activated.
    Select {
        item_id: NodeId,
        /// Ids from the top level down to the item, inclusive.
        path: Vec<NodeId>,
    },
    /// A submenu panel was mounted at `level`.
    SubmenuOpen { level: usize, item: NodeId },
    /// The submenu at `level` was closed.
    SubmenuClose { level: usize },
}
