//! Allow-list validation for externally supplied diagram markup.
//!
//! The loader asks these rules whether an attribute or stylesheet may
//! survive. Every rejection becomes a `SceneDiagnostic` rather than an
//! error; the scene is always produced.

use serde::Serialize;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a loader finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticSeverity {
    /// Content was dropped or the document was unusable.
    Warning,
    /// A harmless normalisation (e.g. a missing `viewBox`).
    Info,
}

/// A single loader finding.
#[derive(Debug, Clone, Serialize)]
pub struct SceneDiagnostic {
    /// Tag name or `#id` of the element concerned; empty for document-level findings.
    pub element: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    /// Short rule identifier (e.g. "element-not-allowed").
    pub rule: &'static str,
}

impl SceneDiagnostic {
    pub fn warning(rule: &'static str, element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
            severity: DiagnosticSeverity::Warning,
            rule,
        }
    }

    pub fn info(rule: &'static str, element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
            severity: DiagnosticSeverity::Info,
            rule,
        }
    }
}

// ─── Attribute rules ─────────────────────────────────────────────────────

const ALLOWED_ATTRIBUTES: &[&str] = &[
    // geometry
    "x", "y", "x1", "y1", "x2", "y2", "cx", "cy", "r", "rx", "ry", "width", "height", "d",
    "points", "dx", "dy", "transform", "viewBox", "preserveAspectRatio",
    // markers & gradients
    "refX", "refY", "markerWidth", "markerHeight", "markerUnits", "orient", "marker-start",
    "marker-mid", "marker-end", "offset", "stop-color", "stop-opacity", "gradientUnits",
    "gradientTransform", "fx", "fy", "fr", "spreadMethod",
    // paint
    "fill", "fill-opacity", "fill-rule", "stroke", "stroke-width", "stroke-opacity",
    "stroke-dasharray", "stroke-dashoffset", "stroke-linecap", "stroke-linejoin",
    "stroke-miterlimit", "opacity", "color", "visibility", "display", "vector-effect",
    // text
    "font-family", "font-size", "font-weight", "font-style", "text-anchor",
    "dominant-baseline", "alignment-baseline", "letter-spacing", "text-decoration",
    // misc
    "style", "xml:space", "type", "media",
];

/// Why an attribute was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeVerdict {
    Keep,
    /// Not in the allow-list.
    Unknown,
    /// Event handler or script-bearing value.
    Unsafe,
}

/// Decide whether an attribute (namespace-stripped name) may be kept.
///
/// `href`/`xlink:href` are only kept as local `#fragment` references.
pub fn check_attribute(name: &str, value: &str) -> AttributeVerdict {
    if name.len() > 2 && name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on")) {
        return AttributeVerdict::Unsafe;
    }
    if value_is_unsafe(value) {
        return AttributeVerdict::Unsafe;
    }
    if name == "href" {
        return if value.trim_start().starts_with('#') {
            AttributeVerdict::Keep
        } else {
            AttributeVerdict::Unsafe
        };
    }
    if name == "style" && !stylesheet_is_safe(value) {
        return AttributeVerdict::Unsafe;
    }
    if ALLOWED_ATTRIBUTES.contains(&name) {
        AttributeVerdict::Keep
    } else {
        AttributeVerdict::Unknown
    }
}

fn value_is_unsafe(value: &str) -> bool {
    let lowered: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    lowered.contains("javascript:") || lowered.contains("vbscript:") || lowered.contains("data:text/html")
}

/// A `<style>` body or `style` attribute may not fetch or execute anything.
/// `url(#id)` references to local paint servers are fine.
pub fn stylesheet_is_safe(css: &str) -> bool {
    let lowered = css.to_ascii_lowercase();
    if lowered.contains("@import") || lowered.contains("expression(") || value_is_unsafe(&lowered) {
        return false;
    }
    let mut rest = lowered.as_str();
    while let Some(pos) = rest.find("url(") {
        let arg = rest[pos + 4..].trim_start().trim_start_matches(['"', '\'']);
        if !arg.starts_with('#') {
            return false;
        }
        rest = &rest[pos + 4..];
    }
    true
}
