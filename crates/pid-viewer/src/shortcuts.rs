//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the wasm bridge and native front ends share it.
//!
//! Command-key combos are left unbound so the browser keeps its own page
//! zoom on ⌘+ / ⌘-.

use crate::input::Modifiers;

/// Pan distance per arrow key press, in pixels.
pub const ARROW_PAN: f64 = 40.0;
/// Shift multiplies the arrow pan distance by this.
pub const ARROW_PAN_SHIFT_FACTOR: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortcutAction {
    ZoomIn,
    ZoomOut,
    ResetView,
    Deselect,
    /// Move the diagram by this many pixels.
    Pan { dx: f64, dy: f64 },
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"+"`, `"ArrowLeft"`).
    /// `pan_step` is the unshifted arrow distance in pixels.
    pub fn resolve(key: &str, modifiers: Modifiers, pan_step: f64) -> Option<ShortcutAction> {
        if modifiers.command() || modifiers.alt {
            return None;
        }

        let step = if modifiers.shift {
            pan_step * ARROW_PAN_SHIFT_FACTOR
        } else {
            pan_step
        };

        match key {
            // `+` is Shift+= on most layouts.
            "+" | "=" => Some(ShortcutAction::ZoomIn),
            "-" | "_" => Some(ShortcutAction::ZoomOut),
            "0" => Some(ShortcutAction::ResetView),
            "Escape" => Some(ShortcutAction::Deselect),
            "ArrowLeft" => Some(ShortcutAction::Pan { dx: -step, dy: 0.0 }),
            "ArrowRight" => Some(ShortcutAction::Pan { dx: step, dy: 0.0 }),
            "ArrowUp" => Some(ShortcutAction::Pan { dx: 0.0, dy: -step }),
            "ArrowDown" => Some(ShortcutAction::Pan { dx: 0.0, dy: step }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(key: &str) -> Option<ShortcutAction> {
        ShortcutMap::resolve(key, Modifiers::NONE, ARROW_PAN)
    }

    #[test]
    fn resolve_view_shortcuts() {
        assert_eq!(resolve("="), Some(ShortcutAction::ZoomIn));
        assert_eq!(resolve("-"), Some(ShortcutAction::ZoomOut));
        assert_eq!(resolve("0"), Some(ShortcutAction::ResetView));
        assert_eq!(resolve("Escape"), Some(ShortcutAction::Deselect));
        assert_eq!(resolve("q"), None);
    }

    #[test]
    fn shifted_plus_still_zooms() {
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            ShortcutMap::resolve("+", shift, ARROW_PAN),
            Some(ShortcutAction::ZoomIn)
        );
    }

    #[test]
    fn arrows_pan_and_shift_accelerates() {
        assert_eq!(
            resolve("ArrowLeft"),
            Some(ShortcutAction::Pan { dx: -40.0, dy: 0.0 })
        );
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            ShortcutMap::resolve("ArrowDown", shift, ARROW_PAN),
            Some(ShortcutAction::Pan { dx: 0.0, dy: 160.0 })
        );
    }

    #[test]
    fn command_combos_are_left_to_the_browser() {
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("=", cmd, ARROW_PAN), None);
        assert_eq!(ShortcutMap::resolve("0", cmd, ARROW_PAN), None);
    }
}
