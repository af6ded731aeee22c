#![forbid(unsafe_code)]

//! Anchored popup menus with submenu cascades.
//!
//! # Role in Cascade
//! `cascade-menu` is the interaction engine: it decides where panels go,
//! which submenus are open, where focus is, and when each deferred step
//! runs. Rendering is the host's job, reached through the
//! [`surface::MenuSurface`] trait.
//!
//! # Components
//! - [`positioner`]: viewport-aware placement with flip and clamp.
//! - [`item_tree`]: declarative entries to an immutable node tree.
//! - [`cascade`]: the stack of open submenus, hover intent, auto-close.
//! - [`keyboard`]: arrow/Home/End/Escape/Tab/typeahead navigation.
//! - [`session`]: open/close lifecycle, listeners, input routing.
//!
//! # Example
//!
//! ```ignore
//! use cascade_core::{Interaction, VirtualClock};
//! use cascade_menu::{MenuConfig, MenuEntry, MenuSession};
//!
//! let mut session = MenuSession::new(surface, VirtualClock::new(), MenuConfig::default())?
//!     .with_items(&[
//!         MenuEntry::item("Copy").id("copy"),
//!         MenuEntry::item("Share").submenu(vec![MenuEntry::item("Mail")]),
//!     ])?;
//! session.open(Interaction::Keyboard);
//! session.tick();
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod event;
pub mod item_tree;
pub mod keyboard;
pub mod placement;
pub mod positioner;
pub mod request;
pub mod session;
pub mod surface;

pub use cascade::{CascadeEntry, CascadeStack, CascadeTimer, HoverIntent, SubmenuPhase};
pub use config::{BehaviorConfig, LayoutConfig, MenuConfig, TimingConfig};
pub use error::MenuError;
pub use event::{MenuEvent, MenuInput, PointerTarget};
pub use item_tree::{ItemSpec, MenuEntry, MenuNode, MenuTree, NodeId, NodeKind};
pub use keyboard::{CascadeOps, KeyboardNavigator};
pub use placement::{Align, ParsePlacementError, Placement, Side};
pub use positioner::{DEFAULT_EDGE_MARGIN, Position, Positioner};
pub use request::{IgnoreReason, Request};
pub use session::{MenuSession, SessionPhase, TimerKind};
pub use surface::{ItemA11y, Listeners, MenuSurface, PanelId, TabDirection};

/// Tracing target for every event this crate emits.
pub const LOG_TARGET: &str = "cascade.menu";
