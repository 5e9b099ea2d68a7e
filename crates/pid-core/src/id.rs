//! Element ids of loaded diagrams.
//!
//! Every `id` attribute the loader keeps is interned once, so selection,
//! hover and listener bookkeeping compare ids as integers. Lookups coming
//! from outside (the browser, the CLI) go through [`UnitId::lookup`] so a
//! stray string never grows the table.

use crate::model::LEGEND_ID;
use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Shared by every scene. Regenerated diagrams reuse the same equipment ids,
/// so the table stays small across reloads.
static ELEMENT_IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An SVG element `id`, usually naming an equipment unit
/// (`unit-aeration-tank`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(Spur);

impl UnitId {
    pub fn intern(id: &str) -> Self {
        Self(ELEMENT_IDS.get_or_intern(id))
    }

    /// The id of an `id="…"` attribute value: surrounding whitespace is
    /// ignored and a blank value means the element has no id.
    pub fn from_attribute(value: &str) -> Option<Self> {
        let id = value.trim();
        (!id.is_empty()).then(|| Self::intern(id))
    }

    /// An id that some loaded diagram has used, without interning `id`.
    pub fn lookup(id: &str) -> Option<Self> {
        ELEMENT_IDS.get(id.trim()).map(Self)
    }

    pub fn as_str(&self) -> &'static str {
        ELEMENT_IDS.resolve(&self.0)
    }

    /// The reserved id of the diagram legend group.
    pub fn is_legend(&self) -> bool {
        self.as_str() == LEGEND_ID
    }

    /// `#id`, as used in diagnostics.
    pub fn selector(&self) -> String {
        format!("#{}", self.as_str())
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.as_str())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UnitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UnitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Self::from_attribute(&id).ok_or_else(|| serde::de::Error::custom("empty element id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_values_are_trimmed() {
        let id = UnitId::from_attribute("  unit-aeration-tank ").unwrap();
        assert_eq!(id, UnitId::intern("unit-aeration-tank"));
        assert_eq!(id.selector(), "#unit-aeration-tank");
        assert_eq!(UnitId::from_attribute(" \t"), None);
    }

    #[test]
    fn lookup_does_not_intern() {
        assert!(UnitId::lookup("unit-never-drawn").is_none());
        let id = UnitId::intern("unit-clarifier");
        assert_eq!(UnitId::lookup(" unit-clarifier"), Some(id));
    }

    #[test]
    fn legend_id_is_reserved() {
        assert!(UnitId::intern(LEGEND_ID).is_legend());
        assert!(!UnitId::intern("unit-pump-1").is_legend());
    }

    #[test]
    fn serializes_as_the_bare_id() {
        let id = UnitId::intern("unit-pump-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"unit-pump-1\"");
        assert_eq!(format!("{id:?}"), "UnitId(unit-pump-1)");
        assert!(serde_json::from_str::<UnitId>("\"  \"").is_err());
    }
}
