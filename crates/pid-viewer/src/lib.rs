//! Diagram viewport controller.
//!
//! Platform-agnostic: front ends translate their native events into
//! `InputEvent`s (or call the controller methods directly) and render the
//! markup it produces.

pub mod controller;
pub mod input;
pub mod listeners;
pub mod popup;
pub mod shortcuts;

pub use controller::{Selection, ViewerConfig, ViewerSnapshot, ViewportController};
pub use input::{InputEvent, Modifiers, Viewport};
pub use listeners::{ListenerEvent, ListenerId, ListenerRegistry, ListenerTarget};
pub use popup::{Anchor, PopupPosition};
pub use shortcuts::{ShortcutAction, ShortcutMap};
