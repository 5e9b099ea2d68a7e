//! SVG markup emission from a validated `Scene`.
//!
//! Two outputs share one node writer:
//! - `render_viewer` wraps the diagram in the pan/zoom group and adds the
//!   interactive stylesheet (hover, selection pulse, animated pipes).
//! - `render_static` produces a standalone document for downloads, report
//!   embedding and rasterization.
//!
//! Only the validated model is written; the input string is never echoed.

use pid_core::model::*;
use pid_core::{NodeIndex, Scene, Theme, UnitId, ViewTransform};
use std::borrow::Cow;
use std::fmt::Write;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Theme-dependent colors for the viewer stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerTheme {
    pub background: &'static str,
    pub pipe: &'static str,
    pub hover: &'static str,
    pub selected: &'static str,
}

impl ViewerTheme {
    /// Light theme: white sheet, grey pipes.
    pub fn light() -> Self {
        Self {
            background: "#ffffff",
            pipe: "#9ca3af",
            hover: "#2563eb",
            selected: "#db2777",
        }
    }

    /// Dark theme: slate sheet, muted pipes.
    pub fn dark() -> Self {
        Self {
            background: "#1e293b",
            pipe: "#64748b",
            hover: "#2563eb",
            selected: "#db2777",
        }
    }

    pub fn for_theme(theme: Theme) -> Self {
        if theme.is_dark() {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

/// Everything the viewer markup depends on besides the scene.
#[derive(Debug, Clone, Copy)]
pub struct ViewerState {
    pub transform: ViewTransform,
    pub selected: Option<UnitId>,
    pub theme: Theme,
}

// ─── Documents ───────────────────────────────────────────────────────────

/// Markup for the live viewer.
pub fn render_viewer(scene: &Scene, state: &ViewerState) -> String {
    let theme = ViewerTheme::for_theme(state.theme);
    let mut out = String::with_capacity(4096);
    let _ = writeln!(
        out,
        r#"<svg xmlns="{SVG_NS}" class="pid-viewer" viewBox="{}" width="100%" height="100%" style="background:{}">"#,
        scene.view_box, theme.background
    );
    out.push_str("<style>");
    out.push_str(&interactive_css(&theme));
    out.push_str("</style>\n");
    let _ = writeln!(
        out,
        r#"<g class="pid-viewport" transform="{}">"#,
        state.transform.to_svg_attribute()
    );
    for idx in scene.top_level() {
        write_node(&mut out, scene, idx, state.selected, 1);
    }
    out.push_str("</g>\n</svg>\n");
    out
}

/// A standalone, sanitized SVG document. `size` sets explicit `width` and
/// `height` (user units); without it the document scales to its container.
pub fn render_static(scene: &Scene, size: Option<(f64, f64)>) -> String {
    let mut out = String::with_capacity(4096);
    let _ = write!(out, r#"<svg xmlns="{SVG_NS}" viewBox="{}""#, scene.view_box);
    if let Some((w, h)) = size {
        let _ = write!(out, r#" width="{w}" height="{h}""#);
    }
    out.push_str(">\n");
    for idx in scene.top_level() {
        write_node(&mut out, scene, idx, None, 1);
    }
    out.push_str("</svg>\n");
    out
}

/// The stylesheet injected into the viewer.
pub fn interactive_css(theme: &ViewerTheme) -> String {
    format!(
        "
.{UNIT_CLASS} {{ cursor: pointer; transition: stroke 0.2s ease-in-out, stroke-width 0.2s ease-in-out; transform-box: fill-box; transform-origin: center; }}
.{UNIT_CLASS}:hover > * {{ stroke: {hover}; stroke-width: 2.5px; }}
.{UNIT_CLASS}.{SELECTED_CLASS} > * {{ stroke: {selected}; stroke-width: 2.5px; }}
@keyframes pulse-effect {{
  0%, 100% {{ transform: scale(1); filter: drop-shadow(0 0 5px rgba(219, 39, 119, 0.7)); }}
  50% {{ transform: scale(1.03); filter: drop-shadow(0 0 12px rgba(219, 39, 119, 1)); }}
}}
.{UNIT_CLASS}.{SELECTED_CLASS} {{ animation: pulse-effect 2.5s infinite ease-in-out; }}
@keyframes flow-effect {{ to {{ stroke-dashoffset: -24; }} }}
.{PIPE_CLASS} {{ stroke-dasharray: 8 16; animation: flow-effect 1.5s linear infinite; stroke-width: 1.5px; stroke: {pipe}; }}
",
        hover = theme.hover,
        selected = theme.selected,
        pipe = theme.pipe,
    )
}

// ─── Nodes ───────────────────────────────────────────────────────────────

fn write_node(
    out: &mut String,
    scene: &Scene,
    idx: NodeIndex,
    selected: Option<UnitId>,
    depth: usize,
) {
    let node = &scene.graph.graph[idx];
    let tag = node.kind.tag();
    indent(out, depth);
    out.push('<');
    out.push_str(tag);

    if let Some(id) = node.id {
        write_attr(out, "id", id.as_str());
    }
    let is_selected = node.role == NodeRole::Unit && node.id.is_some() && node.id == selected;
    if !node.classes.is_empty() || is_selected {
        let mut classes: Vec<&str> = node
            .classes
            .iter()
            .map(String::as_str)
            .filter(|c| *c != SELECTED_CLASS)
            .collect();
        if is_selected {
            classes.push(SELECTED_CLASS);
        }
        write_attr(out, "class", &classes.join(" "));
    }
    for (name, value) in &node.attributes {
        write_attr(out, name, value);
    }

    let children = scene.graph.children(idx);
    if node.text.is_none() && children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');
    if let Some(text) = &node.text {
        out.push_str(&escape_xml(text));
    }
    if !children.is_empty() {
        out.push('\n');
        for child in children {
            write_node(out, scene, child, selected, depth + 1);
        }
        indent(out, depth);
    }
    let _ = writeln!(out, "</{tag}>");
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, r#" {name}="{}""#, escape_xml(value));
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Escape text for XML/HTML attribute values and character data.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pid_core::load_scene;

    const SVG: &str = r#"<svg viewBox="0 0 100 50">
        <g class="equipment-unit" id="pump"><title>Pump &amp; motor</title><circle cx="10" cy="10" r="5"/></g>
        <g class="equipment-unit selected-unit" id="tank"><rect width="20" height="20"/></g>
        <path class="pipe-flow" d="M0 0 L 10 10"/>
        <script>alert(1)</script>
    </svg>"#;

    fn state(selected: Option<&str>) -> ViewerState {
        ViewerState {
            transform: ViewTransform {
                scale: 1.5,
                translate_x: 10.0,
                translate_y: -4.0,
            },
            selected: selected.map(UnitId::intern),
            theme: Theme::Light,
        }
    }

    #[test]
    fn viewer_wraps_content_in_transform_group() {
        let scene = load_scene(SVG);
        let out = render_viewer(&scene, &state(None));
        assert!(out.contains(r#"viewBox="0 0 100 50""#));
        assert!(out.contains(r#"transform="translate(10 -4) scale(1.5)""#));
        assert!(out.contains("@keyframes flow-effect"));
        assert!(!out.contains("<script"));
    }

    #[test]
    fn selected_marker_only_on_selected_unit() {
        let scene = load_scene(SVG);
        let out = render_viewer(&scene, &state(Some("pump")));
        assert!(out.contains(r#"id="pump" class="equipment-unit selected-unit""#));
        // A stale marker from the source document is not carried over.
        assert!(out.contains(r#"id="tank" class="equipment-unit""#));
        assert_eq!(out.matches("equipment-unit selected-unit\"").count(), 1);
    }

    #[test]
    fn text_is_escaped() {
        let scene = load_scene(SVG);
        let out = render_static(&scene, None);
        assert!(out.contains("<title>Pump &amp; motor</title>"));
    }

    #[test]
    fn static_document_has_no_viewer_css() {
        let scene = load_scene(SVG);
        let out = render_static(&scene, Some((200.0, 100.0)));
        assert!(out.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50" width="200" height="100">"#));
        assert!(!out.contains("pulse-effect"));
        // Static output parses back to the same units.
        let again = load_scene(&out);
        assert_eq!(again.units.len(), 2);
        assert!(again.diagnostics.is_empty());
    }

    #[test]
    fn dark_theme_changes_pipe_color() {
        let css = interactive_css(&ViewerTheme::dark());
        assert!(css.contains("stroke: #64748b"));
    }
}
