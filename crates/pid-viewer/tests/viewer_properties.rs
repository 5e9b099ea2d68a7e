//! Viewport controller behaviour on a realistic diagram.
//!
//! The viewport is sized to the fixture's view box, so viewer pixels and
//! root user units coincide and expected values can be read off the SVG.

use pid_core::model::{SELECTED_CLASS, ViewBox};
use pid_core::{Point, UnitId, ViewTransform};
use pid_viewer::{
    InputEvent, ListenerEvent, ListenerTarget, Modifiers, ViewerConfig, Viewport,
    ViewportController,
};
use pretty_assertions::assert_eq;

const PLANT: &str = include_str!("fixtures/aeration_clarifier.svg");
const EPS: f64 = 1e-9;

const AERATION: Point = Point::new(320.0, 160.0);
const CLARIFIER: Point = Point::new(540.0, 160.0);
const BLOWER: Point = Point::new(300.0, 300.0);
const OPEN_SHEET: Point = Point::new(700.0, 50.0);
const LEGEND: Point = Point::new(700.0, 330.0);
/// On the pipe between the aeration tank and the clarifier.
const PIPE: Point = Point::new(440.0, 160.0);

fn plant() -> ViewportController {
    let mut c = ViewportController::new(Viewport::new(800.0, 400.0), ViewerConfig::default());
    c.load_scene(PLANT);
    c
}

fn unit(id: &str) -> UnitId {
    UnitId::intern(id)
}

fn assert_close(a: Point, b: Point) {
    assert!(
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS,
        "{a:?} != {b:?}"
    );
}

fn selected_markers(markup: &str) -> usize {
    markup
        .matches(&format!("equipment-unit {SELECTED_CLASS}\""))
        .count()
}

// ─── Zoom ───────────────────────────────────────────────────────────────

#[test]
fn zoom_is_clamped() {
    let mut c = plant();
    for _ in 0..100 {
        c.zoom_in();
    }
    assert_eq!(c.transform().scale, 10.0);
    for _ in 0..200 {
        c.zoom_out();
    }
    assert_eq!(c.transform().scale, 0.1);
    c.zoom(1000.0, Some(AERATION));
    assert_eq!(c.transform().scale, 10.0);
}

#[test]
fn zoom_keeps_point_under_pivot() {
    for factor in [1.1, 1.0 / 1.1, 2.0, 0.5] {
        let mut c = plant();
        c.begin_pan(OPEN_SHEET);
        c.update_pan(Point::new(720.0, 30.0));
        c.end_pan();
        c.zoom(1.7, None);

        let pivot = Point::new(123.0, 321.0);
        let before = c.transform().to_scene(pivot);
        c.zoom(factor, Some(pivot));
        let after = c.transform().to_scene(pivot);
        assert_close(before, after);
    }
}

#[test]
fn zoom_round_trip_restores_transform() {
    let mut c = plant();
    c.zoom(1.3, Some(Point::new(10.0, 20.0)));
    let start = c.transform();
    c.zoom(2.0, Some(CLARIFIER));
    c.zoom(0.5, Some(CLARIFIER));
    let end = c.transform();
    assert!((start.scale - end.scale).abs() < EPS);
    assert!((start.translate_x - end.translate_x).abs() < EPS);
    assert!((start.translate_y - end.translate_y).abs() < EPS);
}

#[test]
fn reset_is_idempotent() {
    let mut c = plant();
    c.zoom(3.0, Some(BLOWER));
    c.pan_by(15.0, -5.0);
    assert_eq!(c.reset_view(), ViewTransform::IDENTITY);
    assert_eq!(c.reset_view(), ViewTransform::IDENTITY);
}

// ─── Pan ────────────────────────────────────────────────────────────────

#[test]
fn pan_never_starts_on_a_unit() {
    let mut c = plant();
    for point in [AERATION, CLARIFIER, BLOWER] {
        assert!(!c.begin_pan(point));
        assert!(!c.is_panning());
        assert!(c.update_pan(Point::new(0.0, 0.0)).is_none());
    }
    assert_eq!(c.listeners().count(|l| l.target == ListenerTarget::Document), 0);

    // Pipes and the legend are not units.
    assert!(c.begin_pan(PIPE));
    c.end_pan();
    assert!(c.begin_pan(LEGEND));
    c.end_pan();
}

#[test]
fn pan_moves_by_pointer_delta_at_any_scale() {
    let mut c = plant();
    c.zoom(2.0, Some(Point::new(0.0, 0.0)));
    assert!(c.begin_pan(OPEN_SHEET));
    c.update_pan(Point::new(650.0, 80.0));
    c.update_pan(Point::new(600.0, 100.0));
    let t = c.transform();
    assert_eq!((t.translate_x, t.translate_y), (-100.0, 50.0));
    assert_eq!(t.scale, 2.0);
}

#[test]
fn leaving_the_viewer_ends_the_pan() {
    let mut c = plant();
    c.begin_pan(OPEN_SHEET);
    assert!(c.gesture_active());
    assert!(c.handle_event(&InputEvent::PointerLeave));
    assert!(!c.gesture_active());
    assert_eq!(c.listeners().count(|l| l.target == ListenerTarget::Document), 0);
    let frozen = c.transform();
    c.handle_event(&InputEvent::PointerMove { x: 0.0, y: 0.0 });
    assert_eq!(c.transform(), frozen);
}

// ─── Selection ──────────────────────────────────────────────────────────

#[test]
fn only_one_unit_is_selected() {
    let mut c = plant();
    c.click(AERATION);
    c.click(CLARIFIER);
    assert_eq!(
        c.selection().map(|s| s.unit_id),
        Some(unit("unit-secondary-clarifier"))
    );
    let markup = c.render_markup();
    assert_eq!(selected_markers(&markup), 1);
    assert!(markup.contains(&format!(
        r#"id="unit-secondary-clarifier" class="equipment-unit {SELECTED_CLASS}""#
    )));
}

#[test]
fn background_click_clears_selection() {
    let mut c = plant();
    c.click(BLOWER);
    assert!(c.selection().is_some());
    c.click(OPEN_SHEET);
    assert!(c.selection().is_none());
    assert_eq!(selected_markers(&c.render_markup()), 0);

    // Clicking a pipe or the legend is a background click too.
    c.click(BLOWER);
    c.click(PIPE);
    assert!(c.selection().is_none());
    c.click(BLOWER);
    c.click(LEGEND);
    assert!(c.selection().is_none());
}

#[test]
fn units_under_a_trailing_pipe_group_stay_clickable() {
    let mut c = ViewportController::new(Viewport::new(1000.0, 750.0), ViewerConfig::default());
    c.load_scene(
        r##"<svg viewBox="0 0 1000 750">
            <g class="equipment-unit" id="unit-aeration-tank"><rect x="100" y="100" width="100" height="100" fill="#e0f2fe"/></g>
            <g class="equipment-unit" id="unit-clarifier"><circle cx="650" cy="150" r="50" fill="#e0f2fe"/></g>
            <g id="pipes" stroke="#334155" stroke-width="4">
                <path d="M200 150 L600 150" fill="none"/>
                <path d="M50 50 L50 700 L900 700"/>
            </g>
        </svg>"##,
    );
    c.click(Point::new(150.0, 150.0));
    assert_eq!(c.selection().map(|s| s.unit_id), Some(unit("unit-aeration-tank")));
    c.click(Point::new(650.0, 150.0));
    assert_eq!(c.selection().map(|s| s.unit_id), Some(unit("unit-clarifier")));
    c.click(Point::new(400.0, 400.0));
    assert!(c.selection().is_none());
}

#[test]
fn unknown_unit_is_not_selectable() {
    let mut c = plant();
    c.select_unit(unit("unit-air-blower"));
    assert!(!c.select_unit(unit("pid-legend")));
    assert_eq!(c.selection().map(|s| s.unit_id), Some(unit("unit-air-blower")));
}

// ─── Loading ────────────────────────────────────────────────────────────

#[test]
fn malformed_input_gives_empty_scene_with_default_box() {
    let mut c = plant();
    c.click(AERATION);
    let scene = c.load_scene("<svg viewBox='0 0 10 10'><g class=\"equipment-unit\" id=\"x\">");
    assert!(scene.units.is_empty());
    assert_eq!(scene.view_box, ViewBox::new(0.0, 0.0, 1000.0, 750.0));
    assert!(c.selection().is_none());
    assert!(!c.diagnostics().is_empty());
    // Only the background listener remains.
    assert_eq!(c.listeners().len(), 1);
    assert!(c.background_listener().is_some());
}

#[test]
fn reload_releases_old_listeners() {
    let mut c = plant();
    let old_unit = c.unit_listener(unit("unit-aeration-tank")).unwrap();
    let old_background = c.background_listener().unwrap();
    assert_eq!(c.listeners().len(), 4 + 1);

    c.load_scene(
        r#"<svg viewBox="0 0 800 400"><g class="equipment-unit" id="unit-sludge-pump"><rect x="10" y="10" width="50" height="50"/></g></svg>"#,
    );
    assert!(!c.listeners().is_attached(old_unit));
    assert!(!c.listeners().is_attached(old_background));
    assert_eq!(c.listeners().len(), 1 + 1);
    assert_eq!(
        c.listeners()
            .count(|l| l.event == ListenerEvent::Click && matches!(l.target, ListenerTarget::Unit(_))),
        1
    );

    // Events for the old scene's listeners are dropped.
    assert!(!c.dispatch(old_unit, AERATION));
    assert!(c.selection().is_none());
}

#[test]
fn reload_during_a_pan_releases_the_gesture() {
    let mut c = plant();
    c.begin_pan(OPEN_SHEET);
    c.load_scene(PLANT);
    assert!(!c.gesture_active());
    assert_eq!(c.listeners().len(), 5);
}

#[test]
fn teardown_releases_everything() {
    let mut c = plant();
    c.click(AERATION);
    c.begin_popup_drag(Point::new(700.0, 20.0), Point::new(600.0, 8.0));
    c.teardown();
    assert!(c.listeners().is_empty());
    assert!(!c.gesture_active());
}

// ─── End to end ─────────────────────────────────────────────────────────

#[test]
fn aeration_and_clarifier_walkthrough() {
    let mut c = plant();
    assert_eq!(c.scene().units.len(), 4);
    assert_eq!(c.scene().view_box, ViewBox::new(0.0, 0.0, 800.0, 400.0));

    // Inspect the aeration tank.
    assert!(c.handle_event(&InputEvent::Click {
        x: AERATION.x,
        y: AERATION.y
    }));
    let selection = c.selection().cloned().unwrap();
    assert_eq!(selection.unit_id, unit("unit-aeration-tank"));
    assert_eq!(selection.description.as_deref(), Some("Aeration Tank - 150 m3"));

    // Drag its popup out of the way.
    assert!(c.begin_popup_drag(Point::new(760.0, 16.0), Point::new(600.0, 8.0)));
    c.handle_event(&InputEvent::PointerMove { x: 700.0, y: 216.0 });
    c.handle_event(&InputEvent::PointerUp { x: 700.0, y: 216.0 });
    assert_eq!(c.popup().to_css(), "top: 208px; left: 540px; right: auto;");

    // Zoom in on the clarifier with the wheel; it stays under the cursor.
    let before = c.transform().to_scene(CLARIFIER);
    c.handle_event(&InputEvent::Wheel {
        x: CLARIFIER.x,
        y: CLARIFIER.y,
        delta_y: -120.0,
    });
    assert!((c.transform().scale - 1.1).abs() < EPS);
    assert_close(c.transform().to_scene(CLARIFIER), before);

    // Still the clarifier under the same pixel after zooming.
    c.click(CLARIFIER);
    assert_eq!(
        c.selection().map(|s| s.description.clone()),
        Some(Some("Secondary Clarifier - 8 m dia".to_string()))
    );

    // Pan from the open sheet, then come back with the keyboard.
    assert!(c.handle_event(&InputEvent::PointerDown { x: 700.0, y: 50.0 }));
    c.handle_event(&InputEvent::PointerMove { x: 660.0, y: 50.0 });
    c.handle_event(&InputEvent::PointerUp { x: 660.0, y: 50.0 });
    let panned = c.transform();
    c.handle_event(&InputEvent::Key {
        key: "ArrowRight".into(),
        modifiers: Modifiers::NONE,
    });
    assert!((c.transform().translate_x - (panned.translate_x + 40.0)).abs() < EPS);

    // Escape deselects, `0` resets.
    c.handle_key("Escape", Modifiers::NONE);
    assert!(c.selection().is_none());
    c.handle_key("0", Modifiers::NONE);
    assert_eq!(c.transform(), ViewTransform::IDENTITY);

    // The sanitized export never carries the script or the inline handler.
    let saved = c.save_svg();
    assert!(!saved.contains("<script"));
    assert!(!saved.contains("onclick"));
    assert!(saved.contains(r#"id="unit-aeration-tank""#));
}
