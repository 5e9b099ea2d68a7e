//! Listener bookkeeping.
//!
//! Every event subscription the viewer holds is an entry here, so it can be
//! released exactly once. Scene listeners (one click per unit plus the
//! background) live as long as the scene; gesture listeners (document
//! pointer-move and pointer-up) live as long as one pan or popup drag and
//! are released through a single `GestureListeners` handle.

use pid_core::UnitId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Unit(UnitId),
    /// The viewer's own background.
    Background,
    /// The whole document (used for gesture tracking).
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerEvent {
    Click,
    PointerMove,
    PointerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub target: ListenerTarget,
    pub event: ListenerEvent,
}

/// All live subscriptions. Ids are never reused.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next: u64,
    active: BTreeMap<ListenerId, Listener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, target: ListenerTarget, event: ListenerEvent) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.active.insert(id, Listener { target, event });
        log::trace!("attach {id:?} {event:?} on {target:?}");
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        let removed = self.active.remove(&id).is_some();
        if removed {
            log::trace!("detach {id:?}");
        }
        removed
    }

    pub fn get(&self, id: ListenerId) -> Option<Listener> {
        self.active.get(&id).copied()
    }

    pub fn is_attached(&self, id: ListenerId) -> bool {
        self.active.contains_key(&id)
    }

    /// First live listener for `target`/`event`, oldest first.
    pub fn find(&self, target: ListenerTarget, event: ListenerEvent) -> Option<ListenerId> {
        self.active
            .iter()
            .find(|(_, l)| l.target == target && l.event == event)
            .map(|(id, _)| *id)
    }

    pub fn count(&self, pred: impl Fn(&Listener) -> bool) -> usize {
        self.active.values().filter(|l| pred(l)).count()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ListenerId, Listener)> + '_ {
        self.active.iter().map(|(id, l)| (*id, *l))
    }

    pub fn clear(&mut self) {
        if !self.active.is_empty() {
            log::trace!("detach all {} listeners", self.active.len());
        }
        self.active.clear();
    }
}

/// The document-level move/up pair held for one gesture.
///
/// Dropping the handle without calling `release` leaks the subscriptions,
/// so the owner keeps it in a single slot and releases it on every exit.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "gesture listeners must be released"]
pub struct GestureListeners {
    pub pointer_move: ListenerId,
    pub pointer_up: ListenerId,
}

impl GestureListeners {
    pub fn acquire(registry: &mut ListenerRegistry) -> Self {
        Self {
            pointer_move: registry.attach(ListenerTarget::Document, ListenerEvent::PointerMove),
            pointer_up: registry.attach(ListenerTarget::Document, ListenerEvent::PointerUp),
        }
    }

    pub fn release(self, registry: &mut ListenerRegistry) {
        registry.detach(self.pointer_move);
        registry.detach(self.pointer_up);
    }

    pub fn owns(&self, id: ListenerId) -> bool {
        id == self.pointer_move || id == self.pointer_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut reg = ListenerRegistry::new();
        let a = reg.attach(ListenerTarget::Background, ListenerEvent::Click);
        assert!(reg.detach(a));
        assert!(!reg.detach(a));
        let b = reg.attach(ListenerTarget::Background, ListenerEvent::Click);
        assert_ne!(a, b);
        assert!(!reg.is_attached(a));
    }

    #[test]
    fn gesture_pair_is_released_together() {
        let mut reg = ListenerRegistry::new();
        let scene = reg.attach(ListenerTarget::Background, ListenerEvent::Click);
        let gesture = GestureListeners::acquire(&mut reg);
        assert_eq!(reg.len(), 3);
        assert_eq!(
            reg.find(ListenerTarget::Document, ListenerEvent::PointerUp),
            Some(gesture.pointer_up)
        );
        gesture.release(&mut reg);
        assert_eq!(reg.len(), 1);
        assert!(reg.is_attached(scene));
        assert_eq!(reg.count(|l| l.target == ListenerTarget::Document), 0);
    }
}
