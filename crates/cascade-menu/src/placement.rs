#![forbid(unsafe_code)]

//! Declarative panel placement relative to an anchor.
//!
//! A [`Placement`] names the side of the anchor the panel appears on and how
//! it aligns along that side: `bottom-start` hangs below the anchor with
//! left edges aligned, `right-end` sits to the right with bottom edges
//! aligned. It is a pure attribute of one positioning request.

use std::fmt;
use std::str::FromStr;

/// The side of the anchor a panel is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// The mirrored side on the same axis.
    pub const fn flip(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether the panel stacks above/below the anchor.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Alignment along the chosen side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    Center,
    End,
}

/// Where to place a panel relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    TopStart,
    TopCenter,
    TopEnd,
    #[default]
    BottomStart,
    BottomCenter,
    BottomEnd,
    LeftStart,
    LeftCenter,
    LeftEnd,
    RightStart,
    RightCenter,
    RightEnd,
}

impl Placement {
    /// All twelve placements.
    pub const ALL: [Placement; 12] = [
        Self::TopStart,
        Self::TopCenter,
        Self::TopEnd,
        Self::BottomStart,
        Self::BottomCenter,
        Self::BottomEnd,
        Self::LeftStart,
        Self::LeftCenter,
        Self::LeftEnd,
        Self::RightStart,
        Self::RightCenter,
        Self::RightEnd,
    ];

    /// Build a placement from its parts.
    pub const fn new(side: Side, align: Align) -> Self {
        match (side, align) {
            (Side::Top, Align::Start) => Self::TopStart,
            (Side::Top, Align::Center) => Self::TopCenter,
            (Side::Top, Align::End) => Self::TopEnd,
            (Side::Bottom, Align::Start) => Self::BottomStart,
            (Side::Bottom, Align::Center) => Self::BottomCenter,
            (Side::Bottom, Align::End) => Self::BottomEnd,
            (Side::Left, Align::Start) => Self::LeftStart,
            (Side::Left, Align::Center) => Self::LeftCenter,
            (Side::Left, Align::End) => Self::LeftEnd,
            (Side::Right, Align::Start) => Self::RightStart,
            (Side::Right, Align::Center) => Self::RightCenter,
            (Side::Right, Align::End) => Self::RightEnd,
        }
    }

    /// The side of the anchor.
    pub const fn side(self) -> Side {
        match self {
            Self::TopStart | Self::TopCenter | Self::TopEnd => Side::Top,
            Self::BottomStart | Self::BottomCenter | Self::BottomEnd => Side::Bottom,
            Self::LeftStart | Self::LeftCenter | Self::LeftEnd => Side::Left,
            Self::RightStart | Self::RightCenter | Self::RightEnd => Side::Right,
        }
    }

    /// The alignment along the side.
    pub const fn align(self) -> Align {
        match self {
            Self::TopStart | Self::BottomStart | Self::LeftStart | Self::RightStart => Align::Start,
            Self::TopCenter | Self::BottomCenter | Self::LeftCenter | Self::RightCenter => {
                Align::Center
            }
            Self::TopEnd | Self::BottomEnd | Self::LeftEnd | Self::RightEnd => Align::End,
        }
    }

    /// The mirrored placement on the main axis, keeping alignment.
    pub const fn flip(self) -> Self {
        Self::new(self.side().flip(), self.align())
    }

    /// Placement for a submenu panel at `level` (1 = first submenu).
    ///
    /// Odd levels use `base`; even levels use its mirror when `alternate`
    /// is set, so deep cascades fold back instead of running off one edge.
    pub const fn for_submenu_level(base: Placement, level: usize, alternate: bool) -> Self {
        if alternate && level % 2 == 0 {
            base.flip()
        } else {
            base
        }
    }

    /// Kebab-case name, e.g. `"bottom-end"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopStart => "top-start",
            Self::TopCenter => "top-center",
            Self::TopEnd => "top-end",
            Self::BottomStart => "bottom-start",
            Self::BottomCenter => "bottom-center",
            Self::BottomEnd => "bottom-end",
            Self::LeftStart => "left-start",
            Self::LeftCenter => "left-center",
            Self::LeftEnd => "left-end",
            Self::RightStart => "right-start",
            Self::RightCenter => "right-center",
            Self::RightEnd => "right-end",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a placement name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown placement `{0}` (expected e.g. `bottom-start` or `right-end`)")]
pub struct ParsePlacementError(pub String);

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParsePlacementError(s.to_owned()))
    }
}

#[cfg(feature = "config-file")]
impl serde::Serialize for Placement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "config-file")]
impl<'de> serde::Deserialize<'de> for Placement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
