#![forbid(unsafe_code)]

//! Declarative menu items and the node tree built from them.
//!
//! Hosts describe a menu as a list of [`MenuEntry`] values: items with an
//! optional nested submenu list, and dividers. [`MenuTree::build`] turns the
//! list into immutable [`MenuNode`]s with stable [`NodeId`]s and an index
//! for path lookups.
//!
//! # Invariants
//!
//! - Every node has an id, unique within the tree. Items without an explicit
//!   id get one derived from their index path (`item-1-0`), which is stable
//!   as long as the entry list does not change shape.
//! - An item whose submenu list is empty is a leaf.
//! - Building is pure: the same entries always yield the same tree.
//!
//! # Failure Modes
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Two entries share an id | [`MenuError::DuplicateItemId`] |

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::MenuError;

/// Stable identity of a menu node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config-file", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(transparent))]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create an id from any string.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Declarative input
// ---------------------------------------------------------------------------

/// One entry in a declarative menu list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(tag = "type", rename_all = "kebab-case"))]
pub enum MenuEntry {
    /// A selectable item, possibly opening a submenu.
    Item(ItemSpec),
    /// A visual separator. Never focusable.
    Divider,
}

/// Description of a selectable item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-file", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ItemSpec {
    /// Explicit id; derived from the index path when absent.
    pub id: Option<String>,
    /// Label text.
    pub text: String,
    /// Disabled items are shown but cannot be focused or activated.
    pub disabled: bool,
    /// Nested entries. `Some(empty)` behaves like `None`.
    pub submenu: Option<Vec<MenuEntry>>,
}

impl MenuEntry {
    /// A leaf item with the given label.
    pub fn item(text: impl Into<String>) -> Self {
        Self::Item(ItemSpec {
            text: text.into(),
            ..ItemSpec::default()
        })
    }

    /// A divider.
    pub const fn divider() -> Self {
        Self::Divider
    }

    /// Set an explicit id. No effect on dividers.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        if let Self::Item(spec) = &mut self {
            spec.id = Some(id.into());
        }
        self
    }

    /// Mark the item disabled. No effect on dividers.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        if let Self::Item(spec) = &mut self {
            spec.disabled = disabled;
        }
        self
    }

    /// Attach a submenu. No effect on dividers.
    #[must_use]
    pub fn submenu(mut self, entries: Vec<MenuEntry>) -> Self {
        if let Self::Item(spec) = &mut self {
            spec.submenu = Some(entries);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Submenu(Vec<MenuNode>),
    Divider,
}

/// An immutable, renderable menu node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub id: NodeId,
    pub text: String,
    pub disabled: bool,
    pub kind: NodeKind,
}

impl MenuNode {
    /// Whether activating this node opens a submenu.
    pub fn has_submenu(&self) -> bool {
        matches!(&self.kind, NodeKind::Submenu(children) if !children.is_empty())
    }

    /// Whether this node is a divider.
    pub fn is_divider(&self) -> bool {
        matches!(self.kind, NodeKind::Divider)
    }

    /// Whether keyboard focus may land on this node.
    pub fn is_focusable(&self) -> bool {
        !self.disabled && !self.is_divider()
    }

    /// Submenu children, empty for leaves and dividers.
    pub fn children(&self) -> &[MenuNode] {
        match &self.kind {
            NodeKind::Submenu(children) => children,
            _ => &[],
        }
    }
}

/// A built menu: root nodes plus an id index.
#[derive(Debug, Clone, Default)]
pub struct MenuTree {
    roots: Vec<MenuNode>,
    index: AHashMap<NodeId, Vec<usize>>,
}

impl MenuTree {
    /// Build a tree from declarative entries.
    pub fn build(entries: &[MenuEntry]) -> Result<Self, MenuError> {
        let mut index = AHashMap::new();
        let mut path = Vec::new();
        let roots = build_level(entries, &mut path, &mut index)?;
        Ok(Self { roots, index })
    }

    /// Top-level nodes.
    pub fn roots(&self) -> &[MenuNode] {
        &self.roots
    }

    /// Number of nodes, dividers included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up a node by id.
    pub fn get(&self, id: &NodeId) -> Option<&MenuNode> {
        let path = self.index.get(id)?;
        self.node_at(path)
    }

    /// Ids from the top level down to `id`, inclusive.
    pub fn ancestry(&self, id: &NodeId) -> Option<Vec<NodeId>> {
        let path = self.index.get(id)?;
        let mut out = Vec::with_capacity(path.len());
        let mut level = self.roots.as_slice();
        for &i in path {
            let node = level.get(i)?;
            out.push(node.id.clone());
            level = node.children();
        }
        Some(out)
    }

    /// Nodes of the panel opened by `parent`, or the roots for `None`.
    pub fn children(&self, parent: Option<&NodeId>) -> &[MenuNode] {
        match parent {
            None => &self.roots,
            Some(id) => self.get(id).map_or(&[], MenuNode::children),
        }
    }

    fn node_at(&self, path: &[usize]) -> Option<&MenuNode> {
        let (&last, parents) = path.split_last()?;
        let mut level = self.roots.as_slice();
        for &i in parents {
            level = level.get(i)?.children();
        }
        level.get(last)
    }
}

fn build_level(
    entries: &[MenuEntry],
    path: &mut Vec<usize>,
    index: &mut AHashMap<NodeId, Vec<usize>>,
) -> Result<Vec<MenuNode>, MenuError> {
    let mut nodes = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        path.push(i);
        let node = match entry {
            MenuEntry::Divider => MenuNode {
                id: NodeId::new(derived_id("divider", path)),
                text: String::new(),
                disabled: true,
                kind: NodeKind::Divider,
            },
            MenuEntry::Item(spec) => {
                let id = spec
                    .id
                    .as_deref()
                    .map_or_else(|| NodeId::new(derived_id("item", path)), NodeId::new);
                let kind = match spec.submenu.as_deref() {
                    Some(children) if !children.is_empty() => {
                        NodeKind::Submenu(build_level(children, path, index)?)
                    }
                    _ => NodeKind::Leaf,
                };
                MenuNode {
                    id,
                    text: spec.text.clone(),
                    disabled: spec.disabled,
                    kind,
                }
            }
        };
        if index.insert(node.id.clone(), path.clone()).is_some() {
            return Err(MenuError::DuplicateItemId(node.id.to_string()));
        }
        nodes.push(node);
        path.pop();
    }
    Ok(nodes)
}

fn derived_id(prefix: &str, path: &[usize]) -> String {
    let mut id = String::from(prefix);
    for i in path {
        id.push('-');
        id.push_str(&i.to_string());
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<MenuEntry> {
        vec![
            MenuEntry::item("Cut").id("cut"),
            MenuEntry::item("Share").id("share").submenu(vec![
                MenuEntry::item("Mail").id("mail"),
                MenuEntry::item("More").submenu(vec![MenuEntry::item("Fax")]),
            ]),
            MenuEntry::divider(),
            MenuEntry::item("Delete").disabled(true),
        ]
    }

    #[test]
    fn builds_kinds_and_derived_ids() {
        let tree = MenuTree::build(&sample()).expect("valid tree");
        let roots = tree.roots();
        assert_eq!(roots.len(), 4);
        assert_eq!(roots[0].id, "cut");
        assert!(roots[1].has_submenu());
        assert!(roots[2].is_divider());
        assert_eq!(roots[2].id, "divider-2");
        assert_eq!(roots[3].id, "item-3");
        assert!(!roots[3].is_focusable());
        assert_eq!(roots[1].children()[1].id, "item-1-1");
        assert_eq!(roots[1].children()[1].children()[0].id, "item-1-1-0");
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn empty_submenu_is_a_leaf() {
        let tree = MenuTree::build(&[MenuEntry::item("x").submenu(Vec::new())]).expect("tree");
        assert!(!tree.roots()[0].has_submenu());
        assert_eq!(tree.roots()[0].kind, NodeKind::Leaf);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let entries = vec![
            MenuEntry::item("A").id("same"),
            MenuEntry::item("B").submenu(vec![MenuEntry::item("C").id("same")]),
        ];
        let err = MenuTree::build(&entries).expect_err("duplicate");
        assert!(matches!(err, MenuError::DuplicateItemId(id) if id == "same"));
    }

    #[test]
    fn lookups() {
        let tree = MenuTree::build(&sample()).expect("valid tree");
        let fax = NodeId::new("item-1-1-0");
        assert_eq!(tree.get(&fax).map(|n| n.text.as_str()), Some("Fax"));
        let ancestry = tree.ancestry(&fax).expect("ancestry");
        assert_eq!(ancestry, vec![NodeId::new("share"), NodeId::new("item-1-1"), fax.clone()]);
        assert_eq!(tree.children(Some(&NodeId::new("share"))).len(), 2);
        assert_eq!(tree.children(None).len(), 4);
        assert!(tree.children(Some(&NodeId::new("cut"))).is_empty());
        assert!(tree.get(&NodeId::new("missing")).is_none());
    }

    #[test]
    fn build_is_deterministic() {
        let a = MenuTree::build(&sample()).expect("tree");
        let b = MenuTree::build(&sample()).expect("tree");
        assert_eq!(a.roots(), b.roots());
    }
}
