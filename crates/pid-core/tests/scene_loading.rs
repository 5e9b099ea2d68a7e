//! Integration tests: SVG text → validated Scene.
//!
//! Exercises the loader end to end on a realistic aeration/clarifier
//! diagram and on a document that is not well-formed.

use pid_core::model::{NodeRole, ViewBox};
use pid_core::sanitize::DiagnosticSeverity;
use pid_core::{Rect, UnitId, load_scene};
use pretty_assertions::assert_eq;

const PLANT: &str = include_str!("fixtures/aeration_clarifier.svg");
const GARBLED: &str = include_str!("fixtures/garbled.svg");
const DOCTYPE: &str = include_str!("fixtures/doctype.svg");

// ─── Units ──────────────────────────────────────────────────────────────

#[test]
fn units_in_document_order_with_descriptions() {
    let scene = load_scene(PLANT);
    let units: Vec<(&str, Option<&str>)> = scene
        .units
        .iter()
        .map(|u| (u.id.as_str(), u.description.as_deref()))
        .collect();
    assert_eq!(
        units,
        vec![
            ("unit-equalization-tank", Some("Equalization Tank - 60 m3")),
            ("unit-aeration-tank", Some("Aeration Tank - 150 m3")),
            ("unit-secondary-clarifier", Some("Secondary Clarifier - 8 m dia")),
            ("unit-air-blower", Some("Air Blower - 2 x 45 m3/h")),
        ]
    );
}

#[test]
fn unit_bounds_compose_group_transforms() {
    let scene = load_scene(PLANT);
    let aeration = scene
        .unit(UnitId::intern("unit-aeration-tank"))
        .expect("aeration tank missing");
    assert_eq!(aeration.bounds, Some(Rect::new(239.0, 99.0, 401.0, 221.0)));

    let blower = scene.unit(UnitId::intern("unit-air-blower")).unwrap();
    assert_eq!(blower.bounds, Some(Rect::new(279.0, 279.0, 321.0, 321.0)));
}

#[test]
fn legend_is_not_interactive() {
    let scene = load_scene(PLANT);
    assert!(scene.unit(UnitId::intern("pid-legend")).is_none());
    let legend = scene
        .graph
        .get_by_id(UnitId::intern("pid-legend"))
        .expect("legend kept");
    assert_eq!(legend.role, NodeRole::Legend);
}

#[test]
fn pipes_are_tagged() {
    let scene = load_scene(PLANT);
    let pipes = scene
        .top_level()
        .into_iter()
        .filter(|idx| scene.graph.graph[*idx].role == NodeRole::Pipe)
        .count();
    assert_eq!(pipes, 3);
}

// ─── Sanitizing ─────────────────────────────────────────────────────────

#[test]
fn script_and_handlers_never_reach_the_model() {
    let scene = load_scene(PLANT);
    for idx in scene.graph.graph.node_indices() {
        let node = &scene.graph.graph[idx];
        assert!(node.attr("onclick").is_none());
        assert!(node.text.as_deref().is_none_or(|t| !t.contains("pwned")));
    }
    let rules: Vec<&str> = scene.diagnostics.iter().map(|d| d.rule).collect();
    assert_eq!(rules, vec!["element-not-allowed", "unsafe-attribute"]);
    assert!(
        scene
            .diagnostics
            .iter()
            .all(|d| d.severity == DiagnosticSeverity::Warning)
    );
}

#[test]
fn local_paint_references_survive() {
    let scene = load_scene(PLANT);
    let style = scene
        .graph
        .graph
        .node_weights()
        .find(|n| n.kind == pid_core::ElementKind::Style)
        .expect("stylesheet kept");
    assert!(style.text.as_deref().unwrap().contains("url(#water)"));
}

// ─── Degraded input ─────────────────────────────────────────────────────

#[test]
fn garbled_document_degrades_to_empty_scene() {
    let scene = load_scene(GARBLED);
    assert!(scene.units.is_empty());
    assert!(scene.is_empty());
    assert_eq!(scene.view_box, ViewBox::new(0.0, 0.0, 1000.0, 750.0));
    assert_eq!(scene.diagnostics.len(), 1);
    assert_eq!(scene.diagnostics[0].rule, "malformed-document");
}

#[test]
fn doctype_declaration_is_accepted() {
    let scene = load_scene(DOCTYPE);
    assert_eq!(scene.view_box, ViewBox::new(0.0, 0.0, 400.0, 300.0));
    assert_eq!(scene.units.len(), 1);
    assert_eq!(scene.units[0].id, UnitId::intern("unit-screen"));
    assert!(!scene.diagnostics.iter().any(|d| d.rule == "malformed-document"));
}

#[test]
fn empty_input_degrades_to_empty_scene() {
    let scene = load_scene("");
    assert!(scene.units.is_empty());
    assert_eq!(scene.view_box, ViewBox::DEFAULT);
}

#[test]
fn reload_replaces_units_wholesale() {
    let first = load_scene(PLANT);
    let second = load_scene(
        r#"<svg viewBox="0 0 10 10"><g class="equipment-unit" id="unit-new"><rect width="1" height="1"/></g></svg>"#,
    );
    assert_eq!(first.units.len(), 4);
    assert_eq!(second.units.len(), 1);
    assert_eq!(second.units[0].id.as_str(), "unit-new");
    assert_eq!(second.view_box, ViewBox::new(0.0, 0.0, 10.0, 10.0));
}
