#![forbid(unsafe_code)]

//! Outcome of a menu request.
//!
//! Requests that race an in-flight transition are dropped, never queued. The
//! caller learns why through [`IgnoreReason`]; nothing is an error.

use std::fmt;

/// Why a request had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The session is opening or closing.
    Transitioning,
    /// A submenu at the requested level (or any level, for clicks) is still
    /// opening.
    SubmenuOpening,
    /// Already open.
    AlreadyOpen,
    /// Already closed.
    AlreadyClosed,
    /// The anchor element (or a submenu's anchor item) could not be
    /// resolved.
    MissingAnchor,
    /// The target item is disabled or a divider.
    Disabled,
    /// The target is not part of any open panel.
    UnknownTarget,
    /// The input has no meaning in the current state.
    Unhandled,
}

impl IgnoreReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transitioning => "transitioning",
            Self::SubmenuOpening => "submenu_opening",
            Self::AlreadyOpen => "already_open",
            Self::AlreadyClosed => "already_closed",
            Self::MissingAnchor => "missing_anchor",
            Self::Disabled => "disabled",
            Self::UnknownTarget => "unknown_target",
            Self::Unhandled => "unhandled",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an open, close, or input request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// The request changed state.
    Applied,
    /// The request was dropped.
    Ignored(IgnoreReason),
}

impl Request {
    /// Whether the request changed state.
    #[inline]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Why the request was dropped, if it was.
    #[inline]
    pub const fn ignored_reason(self) -> Option<IgnoreReason> {
        match self {
            Self::Applied => None,
            Self::Ignored(reason) => Some(reason),
        }
    }
}
