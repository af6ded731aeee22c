#![forbid(unsafe_code)]

//! Virtual-time driver around a [`MenuSession`].
//!
//! [`Harness`] pairs a session over a [`RecordingSurface`] with a shared
//! [`VirtualClock`] and offers one-line helpers for the inputs end-to-end
//! tests send most: key presses, hovers, clicks, and time advances.

use std::time::Duration;

use cascade_core::clock::VirtualClock;
use cascade_core::event::{Interaction, KeyCode, KeyEvent};
use cascade_menu::config::MenuConfig;
use cascade_menu::error::MenuError;
use cascade_menu::event::{MenuEvent, MenuInput, PointerTarget};
use cascade_menu::item_tree::MenuEntry;
use cascade_menu::request::Request;
use cascade_menu::session::MenuSession;

use crate::surface::RecordingSurface;

/// Upper bound on timer batches [`Harness::run_until_idle`] will process.
const MAX_IDLE_STEPS: usize = 10_000;

/// Session plus virtual clock.
#[derive(Debug)]
pub struct Harness {
    pub session: MenuSession<RecordingSurface, VirtualClock>,
    pub clock: VirtualClock,
}

impl Harness {
    /// Harness with default config and surface.
    pub fn new(entries: &[MenuEntry]) -> Result<Self, MenuError> {
        Self::with(RecordingSurface::default(), MenuConfig::default(), entries)
    }

    /// Harness with an explicit surface and config.
    pub fn with(
        surface: RecordingSurface,
        config: MenuConfig,
        entries: &[MenuEntry],
    ) -> Result<Self, MenuError> {
        let clock = VirtualClock::new();
        let session = MenuSession::new(surface, clock.clone(), config)?.with_items(entries)?;
        Ok(Self { session, clock })
    }

    pub fn surface(&self) -> &RecordingSurface {
        self.session.surface()
    }

    pub fn surface_mut(&mut self) -> &mut RecordingSurface {
        self.session.surface_mut()
    }

    /// Advance time and run due timers. Returns how many fired.
    pub fn advance(&mut self, ms: u64) -> usize {
        self.clock.advance_ms(ms);
        self.session.tick()
    }

    /// Run a tick without moving time (zero-delay steps).
    pub fn tick(&mut self) -> usize {
        self.session.tick()
    }

    /// Jump from deadline to deadline until no timer is pending.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        for _ in 0..MAX_IDLE_STEPS {
            let Some(deadline) = self.session.next_deadline() else {
                break;
            };
            self.clock.set(deadline);
            fired += self.session.tick();
        }
        fired
    }

    /// Open the menu and let the open transition finish.
    pub fn open_settled(&mut self, interaction: Interaction) -> Request {
        let request = self.session.open(interaction);
        let open_ms = self.session.config().timing.session_open_ms;
        self.tick();
        self.advance(open_ms);
        request
    }

    /// Let a submenu open window elapse.
    pub fn settle_submenu(&mut self) -> usize {
        let ms = self.session.config().timing.submenu_open_ms;
        self.advance(ms)
    }

    pub fn press(&mut self, code: KeyCode) -> Request {
        self.session.handle_input(MenuInput::Key(KeyEvent::new(code)))
    }

    pub fn document_key(&mut self, code: KeyCode) -> Request {
        self.session
            .handle_input(MenuInput::DocumentKey(KeyEvent::new(code)))
    }

    pub fn hover(&mut self, target: PointerTarget) -> Request {
        self.session.handle_input(MenuInput::PointerMove(target))
    }

    /// Hover an item in the panel at `level`.
    pub fn hover_item(&mut self, level: usize, id: &str) -> Request {
        self.hover(PointerTarget::item(level, id))
    }

    pub fn click(&mut self, target: PointerTarget) -> Request {
        self.session.handle_input(MenuInput::Click(target))
    }

    /// Click an item in the panel at `level`.
    pub fn click_item(&mut self, level: usize, id: &str) -> Request {
        self.click(PointerTarget::item(level, id))
    }

    /// Focused item id as a string.
    pub fn focused(&self) -> Option<&str> {
        self.session.focused_item().map(|id| id.as_str())
    }

    /// Open submenu levels.
    pub fn depth(&self) -> usize {
        self.session.cascade().depth()
    }

    /// Anchor item id of each open level, level 1 first.
    pub fn open_path(&self) -> Vec<String> {
        self.session
            .cascade()
            .entries()
            .iter()
            .map(|e| e.anchor_item.to_string())
            .collect()
    }

    pub fn events(&mut self) -> Vec<MenuEvent> {
        self.session.drain_events()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        cascade_core::clock::Clock::now(&self.clock)
    }
}
