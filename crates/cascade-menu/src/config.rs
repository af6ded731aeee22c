#![forbid(unsafe_code)]

//! Menu configuration.
//!
//! [`MenuConfig`] gathers every tunable of a menu session: transition and
//! hover timings, placement, and selection behavior. Defaults match the
//! behavior of a stock desktop menu, so `MenuConfig::default()` is what most
//! hosts want.
//!
//! # Loading
//!
//! With the `config-file` feature, a config can be read from TOML or JSON.
//! Missing fields keep their defaults; durations are whole milliseconds.
//!
//! ```toml
//! [timing]
//! hover_intent_ms = 120
//! auto_close_ms = 400
//!
//! [layout]
//! placement = "bottom-end"
//! edge_margin = 8
//! ```
//!
//! ```rust,ignore
//! let config = MenuConfig::from_toml_file("menu.toml")?;
//! ```

#[cfg(feature = "config-file")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "config-file")]
use crate::error::MenuError;
use crate::placement::Placement;
use crate::positioner::DEFAULT_EDGE_MARGIN;

// ---------------------------------------------------------------------------
// Top-level MenuConfig
// ---------------------------------------------------------------------------

/// Configuration for one menu session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct MenuConfig {
    /// Transition and pointer timings.
    pub timing: TimingConfig,
    /// Placement of the root panel and submenus.
    pub layout: LayoutConfig,
    /// Selection and keyboard behavior.
    pub behavior: BehaviorConfig,
}

/// Transition and pointer timings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct TimingConfig {
    /// Pointer dwell before a hovered submenu item opens. Default: 100.
    pub hover_intent_ms: u64,
    /// Grace period after the pointer leaves a submenu. Default: 300.
    pub auto_close_ms: u64,
    /// Submenu open transition. Default: 300.
    pub submenu_open_ms: u64,
    /// Delay before a closed submenu panel is unmounted. Default: 200.
    pub submenu_teardown_ms: u64,
    /// Root panel open transition. Default: 150.
    pub session_open_ms: u64,
    /// Root panel close transition. Default: 150.
    pub session_close_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            hover_intent_ms: 100,
            auto_close_ms: 300,
            submenu_open_ms: 300,
            submenu_teardown_ms: 200,
            session_open_ms: 150,
            session_close_ms: 150,
        }
    }
}

impl TimingConfig {
    pub fn hover_intent(&self) -> Duration {
        Duration::from_millis(self.hover_intent_ms)
    }

    pub fn auto_close(&self) -> Duration {
        Duration::from_millis(self.auto_close_ms)
    }

    pub fn submenu_open(&self) -> Duration {
        Duration::from_millis(self.submenu_open_ms)
    }

    pub fn submenu_teardown(&self) -> Duration {
        Duration::from_millis(self.submenu_teardown_ms)
    }

    pub fn session_open(&self) -> Duration {
        Duration::from_millis(self.session_open_ms)
    }

    pub fn session_close(&self) -> Duration {
        Duration::from_millis(self.session_close_ms)
    }
}

/// Panel placement parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct LayoutConfig {
    /// Root panel placement relative to the anchor. Default: `bottom-start`.
    pub placement: Placement,
    /// Placement of odd submenu levels relative to their anchor item.
    /// Default: `right-start`.
    pub submenu_placement: Placement,
    /// Mirror `submenu_placement` on even levels. Default: true.
    pub alternate_submenu_sides: bool,
    /// Distance kept from the viewport edges. Default: 16.
    pub edge_margin: i32,
    /// Gap between the anchor and the root panel. Default: 0.
    pub offset: i32,
    /// Gap between a submenu item and its panel. Default: 0.
    pub submenu_offset: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            placement: Placement::BottomStart,
            submenu_placement: Placement::RightStart,
            alternate_submenu_sides: true,
            edge_margin: DEFAULT_EDGE_MARGIN,
            offset: 0,
            submenu_offset: 0,
        }
    }
}

impl LayoutConfig {
    /// Placement for a submenu panel at `level`.
    pub fn submenu_placement_at(&self, level: usize) -> Placement {
        Placement::for_submenu_level(
            self.submenu_placement,
            level,
            self.alternate_submenu_sides,
        )
    }
}

/// Selection and keyboard behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct BehaviorConfig {
    /// Close the session after a leaf is selected. Default: true.
    pub close_on_select: bool,
    /// Jump to items by typing their first character. Default: true.
    pub typeahead: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            close_on_select: true,
            typeahead: true,
        }
    }
}

impl MenuConfig {
    /// Set the root panel placement.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.layout.placement = placement;
        self
    }

    /// Set the base submenu placement.
    #[must_use]
    pub fn submenu_placement(mut self, placement: Placement) -> Self {
        self.layout.submenu_placement = placement;
        self
    }

    /// Enable or disable mirroring submenus on even levels.
    #[must_use]
    pub fn alternate_submenu_sides(mut self, alternate: bool) -> Self {
        self.layout.alternate_submenu_sides = alternate;
        self
    }

    /// Set the viewport edge margin.
    #[must_use]
    pub fn edge_margin(mut self, margin: i32) -> Self {
        self.layout.edge_margin = margin;
        self
    }

    /// Set the gap between anchor and root panel.
    #[must_use]
    pub fn offset(mut self, offset: i32) -> Self {
        self.layout.offset = offset;
        self
    }

    /// Set the hover-intent delay.
    #[must_use]
    pub fn hover_intent(mut self, delay: Duration) -> Self {
        self.timing.hover_intent_ms = saturating_millis(delay);
        self
    }

    /// Set the auto-close grace period.
    #[must_use]
    pub fn auto_close(mut self, delay: Duration) -> Self {
        self.timing.auto_close_ms = saturating_millis(delay);
        self
    }

    /// Set both root panel transition durations.
    #[must_use]
    pub fn session_transition(mut self, duration: Duration) -> Self {
        let ms = saturating_millis(duration);
        self.timing.session_open_ms = ms;
        self.timing.session_close_ms = ms;
        self
    }

    /// Set whether selecting a leaf closes the session.
    #[must_use]
    pub fn close_on_select(mut self, close: bool) -> Self {
        self.behavior.close_on_select = close;
        self
    }

    /// Enable or disable typeahead.
    #[must_use]
    pub fn typeahead(mut self, enabled: bool) -> Self {
        self.behavior.typeahead = enabled;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, MenuError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MenuError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.layout.edge_margin < 0 {
            errors.push(format!(
                "layout.edge_margin must be >= 0, got {}",
                self.layout.edge_margin
            ));
        }

        // Hover must resolve before the pointer is considered gone.
        if self.timing.hover_intent_ms >= self.timing.auto_close_ms {
            errors.push(format!(
                "timing.hover_intent_ms ({}) must be shorter than timing.auto_close_ms ({})",
                self.timing.hover_intent_ms, self.timing.auto_close_ms
            ));
        }

        errors
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
