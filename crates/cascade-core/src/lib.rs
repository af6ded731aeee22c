#![forbid(unsafe_code)]

//! Core: geometry, key events, clocks, and deferred timers.
//!
//! # Role in Cascade
//! `cascade-core` holds the primitives every menu component shares but none
//! of them owns: rectangles and sizes in viewport pixels, canonical keyboard
//! events, a [`clock::Clock`] abstraction so tests can run in virtual time,
//! and the [`timer::TimerQueue`] that backs every deferred step (hover intent,
//! animation windows, teardown).
//!
//! # How it fits in the system
//! `cascade-menu` builds the interaction state machine on top of these types.
//! Nothing in this crate knows about menus; it stays single-threaded and
//! deterministic so the same inputs replayed against a
//! [`clock::VirtualClock`] always produce the same timer firings.

pub mod clock;
pub mod event;
pub mod geometry;
pub mod timer;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use event::{Interaction, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use geometry::{Rect, Sides, Size};
pub use timer::{CancelToken, TimerId, TimerQueue, after_transition};
