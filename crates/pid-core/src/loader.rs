//! Scene loader: untrusted SVG string → validated `Scene`.
//!
//! The loader never fails. A document that cannot be parsed yields an empty
//! scene with the default view box; everything dropped or normalised along
//! the way is recorded as a `SceneDiagnostic`.
//!
//! Mixed content inside text elements is flattened: a node keeps the
//! concatenation of its own text children, and child `<tspan>`s follow it.

use crate::geometry::resolve_bounds;
use crate::id::UnitId;
use crate::model::*;
use crate::parser::parse_view_box;
use crate::sanitize::{AttributeVerdict, SceneDiagnostic, check_attribute, stylesheet_is_safe};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse and validate a diagram.
///
/// A `<!DOCTYPE>` declaration is accepted; entity expansion stays bounded by
/// the parser's own nesting limits.
pub fn load_scene(document: &str) -> Scene {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = match roxmltree::Document::parse_with_options(document, options) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("diagram is not well-formed XML: {e}");
            return empty_with(SceneDiagnostic::warning(
                "malformed-document",
                "",
                format!("Document could not be parsed: {e}"),
            ));
        }
    };

    let root = doc.root_element();
    if !is_svg_element(root) || root.tag_name().name() != "svg" {
        log::warn!("diagram root is <{}>, expected <svg>", root.tag_name().name());
        return empty_with(SceneDiagnostic::warning(
            "not-svg",
            root.tag_name().name(),
            "Document root is not an <svg> element",
        ));
    }

    let mut loader = Loader::default();
    let (view_box, view_box_declared) = match loader.view_box(root) {
        Some(vb) => (vb, true),
        None => (ViewBox::DEFAULT, false),
    };
    let scene_root = loader.graph.root;
    for child in root.children().filter(|n| n.is_element()) {
        loader.visit(child, scene_root);
    }

    let Loader {
        graph,
        pending_units,
        diagnostics,
        ..
    } = loader;
    let bounds = resolve_bounds(&graph);
    let units = pending_units
        .into_iter()
        .map(|(id, node, description)| InteractiveUnit {
            id,
            description,
            node,
            bounds: bounds.get(&node).copied(),
        })
        .collect::<Vec<_>>();

    log::debug!(
        "loaded scene: {} elements, {} units, {} diagnostics",
        graph.len(),
        units.len(),
        diagnostics.len()
    );

    Scene {
        view_box,
        view_box_declared,
        graph,
        units,
        bounds,
        diagnostics,
    }
}

fn empty_with(diagnostic: SceneDiagnostic) -> Scene {
    let mut scene = Scene::empty();
    scene.diagnostics.push(diagnostic);
    scene
}

fn is_svg_element(node: roxmltree::Node<'_, '_>) -> bool {
    matches!(node.tag_name().namespace(), None | Some(SVG_NS))
}

// ─── Loader state ────────────────────────────────────────────────────────

#[derive(Default)]
struct Loader {
    graph: SceneGraph,
    /// Units in document order: id, group node, trimmed title.
    pending_units: Vec<(UnitId, NodeIndex, Option<String>)>,
    seen_ids: HashSet<UnitId>,
    diagnostics: Vec<SceneDiagnostic>,
}

impl Loader {
    /// The declared view box, or `None` (with a diagnostic) when unusable.
    fn view_box(&mut self, root: roxmltree::Node<'_, '_>) -> Option<ViewBox> {
        match root.attribute("viewBox").map(parse_view_box) {
            Some(Ok(vb)) => Some(vb),
            Some(Err(e)) => {
                self.diagnostics.push(SceneDiagnostic::info(
                    "invalid-view-box",
                    "svg",
                    format!("{e}; using {}", ViewBox::DEFAULT),
                ));
                None
            }
            None => {
                self.diagnostics.push(SceneDiagnostic::info(
                    "missing-view-box",
                    "svg",
                    format!("No viewBox; using {}", ViewBox::DEFAULT),
                ));
                None
            }
        }
    }

    fn visit(&mut self, element: roxmltree::Node<'_, '_>, parent: NodeIndex) {
        let tag = element.tag_name().name();
        let kind = is_svg_element(element)
            .then(|| ElementKind::from_tag(tag))
            .flatten()
            .filter(|k| *k != ElementKind::Root);
        let Some(kind) = kind else {
            self.diagnostics.push(SceneDiagnostic::warning(
                "element-not-allowed",
                tag,
                format!("<{tag}> is not allowed and was removed with its content"),
            ));
            return;
        };

        let mut node = SceneNode::new(kind);
        node.id = element.attribute("id").and_then(UnitId::from_attribute);
        let label = node.id.map_or_else(|| tag.to_string(), |id| id.selector());

        for attr in element.attributes() {
            let name = match attr.namespace() {
                Some(XML_NS) => format!("xml:{}", attr.name()),
                _ => attr.name().to_string(),
            };
            match name.as_str() {
                "id" => continue,
                "class" => {
                    node.classes = attr.value().split_whitespace().map(str::to_string).collect();
                    continue;
                }
                _ => {}
            }
            match check_attribute(&name, attr.value()) {
                AttributeVerdict::Keep => node.attributes.push((name, attr.value().to_string())),
                AttributeVerdict::Unknown => self.diagnostics.push(SceneDiagnostic::info(
                    "attribute-not-allowed",
                    label.clone(),
                    format!("attribute `{name}` was removed"),
                )),
                AttributeVerdict::Unsafe => self.diagnostics.push(SceneDiagnostic::warning(
                    "unsafe-attribute",
                    label.clone(),
                    format!("unsafe attribute `{name}` was removed"),
                )),
            }
        }

        if kind.keeps_text() {
            let text: String = element
                .children()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            if !text.trim().is_empty() {
                node.text = Some(text);
            }
        }
        if kind == ElementKind::Style
            && let Some(css) = node.text.as_deref()
            && !stylesheet_is_safe(css)
        {
            self.diagnostics.push(SceneDiagnostic::warning(
                "unsafe-stylesheet",
                label,
                "<style> references external content and was removed",
            ));
            return;
        }

        let duplicate = match node.id {
            Some(id) if !self.seen_ids.insert(id) => {
                self.diagnostics.push(SceneDiagnostic::warning(
                    "duplicate-id",
                    label.clone(),
                    "id already used earlier in the document; element is not interactive",
                ));
                true
            }
            _ => false,
        };

        node.role = if kind == ElementKind::Group
            && node.has_class(UNIT_CLASS)
            && node.id.is_some()
            && !duplicate
        {
            NodeRole::Unit
        } else if node.id.is_some_and(|id| id.is_legend()) && !duplicate {
            NodeRole::Legend
        } else if node.has_class(PIPE_CLASS) {
            NodeRole::Pipe
        } else {
            NodeRole::Plain
        };

        let role = node.role;
        let id = node.id;
        let idx = self.graph.add_node(parent, node);
        if role == NodeRole::Unit
            && let Some(id) = id
        {
            self.pending_units.push((id, idx, unit_description(element)));
        }

        for child in element.children().filter(|n| n.is_element()) {
            self.visit(child, idx);
        }
    }
}

/// Trimmed text of the first direct `<title>` child.
fn unit_description(group: roxmltree::Node<'_, '_>) -> Option<String> {
    let title = group
        .children()
        .find(|n| n.is_element() && is_svg_element(*n) && n.tag_name().name() == "title")?;
    let text: String = title
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::DiagnosticSeverity;

    fn rules(scene: &Scene) -> Vec<&'static str> {
        scene.diagnostics.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn malformed_document_is_empty_with_default_box() {
        let scene = load_scene("<svg><g></svg>");
        assert!(scene.is_empty());
        assert!(scene.units.is_empty());
        assert_eq!(scene.view_box, ViewBox::DEFAULT);
        assert_eq!(rules(&scene), vec!["malformed-document"]);
    }

    #[test]
    fn non_svg_root_is_empty() {
        let scene = load_scene("<html><body/></html>");
        assert!(scene.is_empty());
        assert_eq!(rules(&scene), vec!["not-svg"]);
    }

    #[test]
    fn missing_view_box_falls_back_with_info() {
        let scene = load_scene(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="5" height="5"/></svg>"#);
        assert_eq!(scene.view_box, ViewBox::DEFAULT);
        assert!(!scene.view_box_declared);
        assert_eq!(scene.diagnostics[0].severity, DiagnosticSeverity::Info);
        assert_eq!(scene.top_level().len(), 1);
    }

    #[test]
    fn units_need_class_and_id() {
        let svg = r#"<svg viewBox="0 0 100 100">
            <g class="equipment-unit" id="pump-1"><title> Feed pump </title><rect width="10" height="10"/></g>
            <g class="equipment-unit"><rect width="10" height="10"/></g>
            <g id="not-a-unit"><rect width="10" height="10"/></g>
        </svg>"#;
        let scene = load_scene(svg);
        assert_eq!(scene.units.len(), 1);
        let unit = &scene.units[0];
        assert_eq!(unit.id.as_str(), "pump-1");
        assert_eq!(unit.description.as_deref(), Some("Feed pump"));
        assert!(unit.bounds.is_some());
    }

    #[test]
    fn scripts_and_handlers_are_removed() {
        let svg = r#"<svg viewBox="0 0 10 10">
            <script>alert(1)</script>
            <foreignObject><div/></foreignObject>
            <rect width="1" height="1" onclick="alert(1)" fill="red"/>
        </svg>"#;
        let scene = load_scene(svg);
        assert_eq!(scene.top_level().len(), 1);
        let rect = &scene.graph.graph[scene.top_level()[0]];
        assert_eq!(rect.attr("onclick"), None);
        assert_eq!(rect.attr("fill"), Some("red"));
        let r = rules(&scene);
        assert!(r.contains(&"unsafe-attribute"));
        assert_eq!(r.iter().filter(|r| **r == "element-not-allowed").count(), 2);
    }

    #[test]
    fn duplicate_unit_ids_keep_first() {
        let svg = r#"<svg viewBox="0 0 10 10">
            <g class="equipment-unit" id="tank"><title>First</title></g>
            <g class="equipment-unit" id="tank"><title>Second</title></g>
        </svg>"#;
        let scene = load_scene(svg);
        assert_eq!(scene.units.len(), 1);
        assert_eq!(scene.units[0].description.as_deref(), Some("First"));
        assert!(rules(&scene).contains(&"duplicate-id"));
    }

    #[test]
    fn roles_for_pipes_and_legend() {
        let svg = r#"<svg viewBox="0 0 10 10">
            <path class="pipe-flow" d="M0 0 L 5 5"/>
            <g id="pid-legend"><text>Legend</text></g>
        </svg>"#;
        let scene = load_scene(svg);
        let top = scene.top_level();
        assert_eq!(scene.graph.graph[top[0]].role, NodeRole::Pipe);
        assert_eq!(scene.graph.graph[top[1]].role, NodeRole::Legend);
    }

    #[test]
    fn external_stylesheet_is_dropped() {
        let svg = r#"<svg viewBox="0 0 10 10"><style>@import url(http://x/y.css);</style></svg>"#;
        let scene = load_scene(svg);
        assert!(scene.is_empty());
        assert!(rules(&scene).contains(&"unsafe-stylesheet"));
    }
}
