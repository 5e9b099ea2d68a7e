//! Position of the selection details popup.
//!
//! The popup starts pinned to the top-right corner of the viewer. The
//! first drag converts it to a top/left placement; it never goes back.

use pid_core::{Point, Vec2};
use serde::Serialize;
use std::fmt;

/// A CSS offset: a pixel value or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Anchor {
    Px(f64),
    #[serde(serialize_with = "serialize_auto")]
    Auto,
}

fn serialize_auto<S: serde::Serializer>(s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str("auto")
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopupPosition {
    pub top: f64,
    pub left: Anchor,
    pub right: Anchor,
}

impl Default for PopupPosition {
    fn default() -> Self {
        Self {
            top: 8.0,
            left: Anchor::Auto,
            right: Anchor::Px(8.0),
        }
    }
}

impl PopupPosition {
    /// Inline CSS for the popup element.
    pub fn to_css(&self) -> String {
        format!("top: {}px; left: {}; right: {};", self.top, self.left, self.right)
    }
}

/// State captured when a popup drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupDrag {
    start: Point,
    origin: Vec2,
}

impl PopupDrag {
    /// Start dragging. `offset` is the popup's top-left corner relative to
    /// its container, as laid out when the pointer went down.
    pub fn begin(pointer: Point, offset: Point) -> (Self, PopupPosition) {
        let drag = Self {
            start: pointer,
            origin: offset.to_vec2(),
        };
        (drag, drag.position_at(pointer))
    }

    /// Position after the pointer moved to `pointer` (cumulative delta).
    pub fn position_at(&self, pointer: Point) -> PopupPosition {
        let delta = pointer - self.start;
        PopupPosition {
            top: self.origin.y + delta.y,
            left: Anchor::Px(self.origin.x + delta.x),
            right: Anchor::Auto,
        }
    }
}
