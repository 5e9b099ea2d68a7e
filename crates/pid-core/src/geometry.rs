//! Scene-space bounds resolution.
//!
//! Computes an axis-aligned bounding box for every measurable visual node,
//! composing nested `transform` attributes. Groups take the union of their
//! children. Used for hit testing, so boxes are approximate for text.

use crate::model::*;
use crate::parser::{parse_length, parse_number_list, parse_points, parse_transform};
use kurbo::{Affine, BezPath, Point, Rect, Shape};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Font size assumed when a text element declares none.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Average advance of a glyph relative to the font size.
const GLYPH_ADVANCE: f64 = 0.6;

/// Resolve scene-space bounds for all measurable nodes.
///
/// Nodes with no measurable geometry (empty groups, `<use>`, metadata) are
/// absent from the map.
pub fn resolve_bounds(graph: &SceneGraph) -> HashMap<NodeIndex, Rect> {
    let mut bounds = HashMap::new();
    for child in graph.children(graph.root) {
        resolve_node(graph, child, Affine::IDENTITY, DEFAULT_FONT_SIZE, &mut bounds);
    }
    bounds
}

fn resolve_node(
    graph: &SceneGraph,
    idx: NodeIndex,
    parent_ctm: Affine,
    inherited_font: f64,
    bounds: &mut HashMap<NodeIndex, Rect>,
) -> Option<Rect> {
    let node = &graph.graph[idx];
    if !node.kind.is_visual() {
        return None;
    }

    let ctm = match node.attr("transform").map(parse_transform) {
        Some(Ok(local)) => parent_ctm * local,
        Some(Err(e)) => {
            log::debug!("ignoring transform on <{}>: {e}", node.kind.tag());
            parent_ctm
        }
        None => parent_ctm,
    };
    let font_size = node
        .attr("font-size")
        .and_then(parse_length)
        .unwrap_or(inherited_font);

    let resolved = if node.kind == ElementKind::Group {
        let mut acc: Option<Rect> = None;
        for child in graph.children(idx) {
            if let Some(r) = resolve_node(graph, child, ctm, font_size, bounds) {
                acc = Some(acc.map_or(r, |a| a.union(r)));
            }
        }
        acc
    } else {
        let local = local_bounds(node, font_size).map(|r| inflate_by_stroke(node, r));
        // tspans contribute to their text's box; don't recurse further.
        local.map(|r| ctm.transform_rect_bbox(r))
    };

    if let Some(r) = resolved {
        bounds.insert(idx, r);
    }
    resolved
}

/// Untransformed bounds of a single shape.
fn local_bounds(node: &SceneNode, font_size: f64) -> Option<Rect> {
    let num = |name: &str| node.attr(name).and_then(parse_length);
    match node.kind {
        ElementKind::Rect => {
            let (w, h) = (num("width")?, num("height")?);
            if w <= 0.0 || h <= 0.0 {
                return None;
            }
            let (x, y) = (num("x").unwrap_or(0.0), num("y").unwrap_or(0.0));
            Some(Rect::new(x, y, x + w, y + h))
        }
        ElementKind::Circle => {
            let r = num("r")?;
            let (cx, cy) = (num("cx").unwrap_or(0.0), num("cy").unwrap_or(0.0));
            (r > 0.0).then(|| Rect::new(cx - r, cy - r, cx + r, cy + r))
        }
        ElementKind::Ellipse => {
            let (rx, ry) = (num("rx")?, num("ry")?);
            let (cx, cy) = (num("cx").unwrap_or(0.0), num("cy").unwrap_or(0.0));
            (rx > 0.0 && ry > 0.0).then(|| Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        }
        ElementKind::Line => {
            let x1 = num("x1").unwrap_or(0.0);
            let y1 = num("y1").unwrap_or(0.0);
            let x2 = num("x2").unwrap_or(0.0);
            let y2 = num("y2").unwrap_or(0.0);
            Some(Rect::new(x1, y1, x2, y2).abs())
        }
        ElementKind::Polyline | ElementKind::Polygon => {
            let points = parse_points(node.attr("points")?).ok()?;
            points_bounds(&points)
        }
        ElementKind::Path => {
            let path = BezPath::from_svg(node.attr("d")?).ok()?;
            if path.elements().is_empty() {
                return None;
            }
            Some(path.bounding_box())
        }
        ElementKind::Text | ElementKind::TextSpan => text_bounds(node, font_size),
        _ => None,
    }
}

fn points_bounds(points: &[(f64, f64)]) -> Option<Rect> {
    let (&(x0, y0), rest) = points.split_first()?;
    let mut r = Rect::new(x0, y0, x0, y0);
    for &(x, y) in rest {
        r = r.union_pt(Point::new(x, y));
    }
    Some(r)
}

/// Approximate a text run's box from its anchor point, glyph count and size.
fn text_bounds(node: &SceneNode, font_size: f64) -> Option<Rect> {
    let text = node.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    let first = |name: &str| {
        node.attr(name)
            .and_then(|v| parse_number_list(v).ok())
            .and_then(|v| v.first().copied())
    };
    let x = first("x").unwrap_or(0.0);
    let y = first("y").unwrap_or(0.0);
    let width = text.chars().count() as f64 * font_size * GLYPH_ADVANCE;
    let left = match node.attr("text-anchor") {
        Some("middle") => x - width / 2.0,
        Some("end") => x - width,
        _ => x,
    };
    Some(Rect::new(
        left,
        y - font_size * 0.8,
        left + width,
        y + font_size * 0.2,
    ))
}

fn inflate_by_stroke(node: &SceneNode, r: Rect) -> Rect {
    let half = node
        .attr("stroke-width")
        .and_then(parse_length)
        .map(|w| w / 2.0)
        .unwrap_or(0.0);
    if half > 0.0 { r.inflate(half, half) } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::UnitId;

    fn shape(kind: ElementKind, attrs: &[(&str, &str)]) -> SceneNode {
        let mut node = SceneNode::new(kind);
        node.attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        node
    }

    #[test]
    fn rect_bounds() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let r = graph.add_node(
            root,
            shape(ElementKind::Rect, &[("x", "10"), ("y", "20"), ("width", "30"), ("height", "40")]),
        );
        let bounds = resolve_bounds(&graph);
        assert_eq!(bounds[&r], Rect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn group_unions_children_through_transform() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let mut g = shape(ElementKind::Group, &[("transform", "translate(100 0)")]);
        g.id = Some(UnitId::intern("unit-geom-test"));
        let g = graph.add_node(root, g);
        graph.add_node(g, shape(ElementKind::Circle, &[("cx", "0"), ("cy", "0"), ("r", "10")]));
        graph.add_node(
            g,
            shape(ElementKind::Rect, &[("x", "20"), ("y", "0"), ("width", "10"), ("height", "10")]),
        );
        let bounds = resolve_bounds(&graph);
        assert_eq!(bounds[&g], Rect::new(90.0, -10.0, 130.0, 10.0));
    }

    #[test]
    fn path_and_polygon_bounds() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let p = graph.add_node(root, shape(ElementKind::Path, &[("d", "M 0 0 L 50 0 L 50 25 Z")]));
        let q = graph.add_node(root, shape(ElementKind::Polygon, &[("points", "5,5 15,5 10,20")]));
        let bounds = resolve_bounds(&graph);
        assert_eq!(bounds[&p], Rect::new(0.0, 0.0, 50.0, 25.0));
        assert_eq!(bounds[&q], Rect::new(5.0, 5.0, 15.0, 20.0));
    }

    #[test]
    fn stroke_inflates_lines() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let l = graph.add_node(
            root,
            shape(
                ElementKind::Line,
                &[("x1", "0"), ("y1", "10"), ("x2", "100"), ("y2", "10"), ("stroke-width", "4")],
            ),
        );
        let bounds = resolve_bounds(&graph);
        assert_eq!(bounds[&l], Rect::new(-2.0, 8.0, 102.0, 12.0));
    }

    #[test]
    fn middle_anchored_text() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let mut t = shape(
            ElementKind::Text,
            &[("x", "100"), ("y", "50"), ("font-size", "10"), ("text-anchor", "middle")],
        );
        t.text = Some("Pump".into());
        let t = graph.add_node(root, t);
        let b = resolve_bounds(&graph)[&t];
        assert!((b.width() - 24.0).abs() < 1e-9);
        assert!((b.center().x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn metadata_and_degenerate_shapes_are_skipped() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let d = graph.add_node(root, SceneNode::new(ElementKind::Defs));
        graph.add_node(d, shape(ElementKind::Rect, &[("width", "10"), ("height", "10")]));
        let z = graph.add_node(root, shape(ElementKind::Rect, &[("width", "0"), ("height", "10")]));
        let bounds = resolve_bounds(&graph);
        assert!(!bounds.contains_key(&d));
        assert!(!bounds.contains_key(&z));
        assert!(bounds.is_empty());
    }
}
