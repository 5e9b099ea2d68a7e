//! Diagram viewport controller.
//!
//! Owns the view transform, the unit selection and the popup position for
//! one mounted scene. All input arrives as pixel coordinates relative to
//! the viewer element and is mapped into root user space before it touches
//! the transform or the hit tester.
//!
//! Gestures (pan, popup drag) hold a pair of document listeners in a single
//! slot; `release_gesture` is the only way out of that slot and is called
//! from every exit path: pointer up, pointer leave, reload, teardown.

use crate::input::{InputEvent, Modifiers, Viewport};
use crate::listeners::{GestureListeners, ListenerEvent, ListenerId, ListenerRegistry, ListenerTarget};
use crate::popup::{PopupDrag, PopupPosition};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use pid_core::model::ViewBox;
use pid_core::{
    Point, ScaleLimits, Scene, SceneDiagnostic, Settings, Theme, UnitId, Vec2, ViewTransform,
    load_scene,
};
use pid_render::{HitTarget, ViewerState, hit_test, render_static, render_viewer};
use serde::Serialize;

/// The selected unit and the text shown in its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub unit_id: UnitId,
    pub description: Option<String>,
}

/// Viewer tuning taken from `Settings`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    pub limits: ScaleLimits,
    pub toolbar_zoom_step: f64,
    pub wheel_zoom_step: f64,
    pub pan_step: f64,
    pub default_view_box: ViewBox,
    pub theme: Theme,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ViewerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            limits: settings.zoom_limits,
            toolbar_zoom_step: settings.toolbar_zoom_step,
            wheel_zoom_step: settings.wheel_zoom_step,
            pan_step: settings.pan_step,
            default_view_box: settings.default_view_box,
            theme: settings.theme,
        }
    }
}

#[derive(Debug)]
enum Gesture {
    Pan {
        /// `pointer - translate` at pan start, in user space.
        anchor: Vec2,
        listeners: GestureListeners,
    },
    PopupDrag {
        drag: PopupDrag,
        listeners: GestureListeners,
    },
}

impl Gesture {
    fn into_listeners(self) -> GestureListeners {
        match self {
            Self::Pan { listeners, .. } | Self::PopupDrag { listeners, .. } => listeners,
        }
    }
}

/// Serializable view of the controller, for front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSnapshot {
    pub transform: ViewTransform,
    pub selection: Option<Selection>,
    pub popup: PopupPosition,
    pub popup_css: String,
    pub view_box: String,
    pub unit_count: usize,
    pub panning: bool,
    pub dragging_popup: bool,
}

pub struct ViewportController {
    config: ViewerConfig,
    viewport: Viewport,
    scene: Scene,
    transform: ViewTransform,
    selection: Option<Selection>,
    popup: PopupPosition,
    gesture: Option<Gesture>,
    listeners: ListenerRegistry,
}

impl ViewportController {
    pub fn new(viewport: Viewport, config: ViewerConfig) -> Self {
        let mut scene = Scene::empty();
        scene.view_box = config.default_view_box;
        Self {
            config,
            viewport,
            scene,
            transform: ViewTransform::IDENTITY,
            selection: None,
            popup: PopupPosition::default(),
            gesture: None,
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn with_settings(viewport: Viewport, settings: &Settings) -> Self {
        Self::new(viewport, ViewerConfig::from_settings(settings))
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn popup(&self) -> PopupPosition {
        self.popup
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Problems found while loading the current scene.
    pub fn diagnostics(&self) -> &[SceneDiagnostic] {
        &self.scene.diagnostics
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Pan { .. }))
    }

    pub fn is_dragging_popup(&self) -> bool {
        matches!(self.gesture, Some(Gesture::PopupDrag { .. }))
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Click listener registered for `unit`, if any.
    pub fn unit_listener(&self, unit: UnitId) -> Option<ListenerId> {
        self.listeners.find(ListenerTarget::Unit(unit), ListenerEvent::Click)
    }

    pub fn background_listener(&self) -> Option<ListenerId> {
        self.listeners.find(ListenerTarget::Background, ListenerEvent::Click)
    }

    // ─── Configuration ───────────────────────────────────────────────────

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
    }

    /// Take new settings. The current scale is re-clamped to the new limits.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.config = ViewerConfig::from_settings(settings);
        self.transform.scale = self.config.limits.clamp(self.transform.scale);
    }

    /// Viewer-element pixel → root user-space point.
    pub fn to_user(&self, pixel: Point) -> Point {
        self.viewport.to_user(&self.scene.view_box, pixel)
    }

    // ─── Scene ───────────────────────────────────────────────────────────

    /// Parse a new diagram and rewire the scene listeners.
    ///
    /// Never fails: a garbled document yields an empty scene with the
    /// default view box, and the problems are reported by `diagnostics`.
    /// The selection is cleared; the view transform and popup position are
    /// kept.
    pub fn load_scene(&mut self, document: &str) -> &Scene {
        self.release_gesture();
        self.detach_scene_listeners();

        let mut scene = load_scene(document);
        if !scene.view_box_declared {
            scene.view_box = self.config.default_view_box;
        }
        self.scene = scene;
        self.selection = None;

        for unit in &self.scene.units {
            self.listeners
                .attach(ListenerTarget::Unit(unit.id), ListenerEvent::Click);
        }
        self.listeners
            .attach(ListenerTarget::Background, ListenerEvent::Click);

        log::debug!(
            "loaded scene: {} units, {} diagnostics, view box {}",
            self.scene.units.len(),
            self.scene.diagnostics.len(),
            self.scene.view_box
        );
        &self.scene
    }

    fn detach_scene_listeners(&mut self) {
        let stale: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, l)| l.target != ListenerTarget::Document)
            .map(|(id, _)| id)
            .collect();
        for id in stale {
            self.listeners.detach(id);
        }
    }

    // ─── Zoom ────────────────────────────────────────────────────────────

    /// Multiply the scale by `factor`, keeping the scene point under `pivot`
    /// (viewer pixels) in place. Without a pivot the viewer centre is used.
    pub fn zoom(&mut self, factor: f64, pivot: Option<Point>) -> ViewTransform {
        let pivot = self.to_user(pivot.unwrap_or_else(|| self.viewport.center()));
        self.transform = self.transform.zoomed(factor, pivot, self.config.limits);
        self.transform
    }

    /// Toolbar zoom in, about the viewer centre.
    pub fn zoom_in(&mut self) -> ViewTransform {
        self.zoom(self.config.toolbar_zoom_step, None)
    }

    /// Toolbar zoom out, about the viewer centre.
    pub fn zoom_out(&mut self) -> ViewTransform {
        self.zoom(1.0 / self.config.toolbar_zoom_step, None)
    }

    /// Wheel zoom about the cursor. Scrolling up (negative delta) zooms in;
    /// a zero delta (horizontal scroll) does nothing.
    pub fn wheel(&mut self, pointer: Point, delta_y: f64) -> ViewTransform {
        let step = self.config.wheel_zoom_step;
        if delta_y < 0.0 {
            self.zoom(step, Some(pointer))
        } else if delta_y > 0.0 {
            self.zoom(1.0 / step, Some(pointer))
        } else {
            self.transform
        }
    }

    pub fn reset_view(&mut self) -> ViewTransform {
        self.transform = ViewTransform::IDENTITY;
        self.transform
    }

    // ─── Pan ─────────────────────────────────────────────────────────────

    /// What the pointer is over, as the hit tester sees it.
    pub fn target_at(&self, pointer: Point) -> HitTarget {
        hit_test(&self.scene, &self.transform, self.to_user(pointer))
    }

    /// Start panning. Returns `false` (and stays idle) when the pointer is
    /// over an interactive unit or another gesture is in progress.
    pub fn begin_pan(&mut self, pointer: Point) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        if let HitTarget::Unit(unit) = self.target_at(pointer) {
            log::trace!("pan suppressed over {unit:?}");
            return false;
        }
        let anchor = self.to_user(pointer).to_vec2() - self.transform.translate();
        let listeners = GestureListeners::acquire(&mut self.listeners);
        self.gesture = Some(Gesture::Pan { anchor, listeners });
        true
    }

    /// Follow the pointer while panning.
    pub fn update_pan(&mut self, pointer: Point) -> Option<ViewTransform> {
        let Some(Gesture::Pan { anchor, .. }) = &self.gesture else {
            return None;
        };
        let translate = self.to_user(pointer).to_vec2() - *anchor;
        self.transform = self.transform.with_translate(translate);
        Some(self.transform)
    }

    pub fn end_pan(&mut self) {
        if self.is_panning() {
            self.release_gesture();
        }
    }

    /// Move the diagram by a pixel offset (keyboard panning).
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> ViewTransform {
        let vb = self.scene.view_box;
        let delta = Vec2::new(
            self.viewport.to_user_length(&vb, dx),
            self.viewport.to_user_length(&vb, dy),
        );
        self.transform = self
            .transform
            .with_translate(self.transform.translate() + delta);
        self.transform
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Make `unit` the sole selection. Unknown ids leave the selection as is.
    pub fn select_unit(&mut self, unit: UnitId) -> bool {
        let Some(found) = self.scene.unit(unit) else {
            log::debug!("select: no unit {unit:?} in scene");
            return false;
        };
        self.selection = Some(Selection {
            unit_id: found.id,
            description: found.description.clone(),
        });
        true
    }

    pub fn clear_selection(&mut self) {
        if self.is_dragging_popup() {
            self.release_gesture();
        }
        self.selection = None;
    }

    // ─── Popup ───────────────────────────────────────────────────────────

    /// Start dragging the popup. `offset` is its top-left corner relative
    /// to the viewer container. Ignored when nothing is selected.
    pub fn begin_popup_drag(&mut self, pointer: Point, offset: Point) -> bool {
        if self.selection.is_none() || self.gesture.is_some() {
            return false;
        }
        let (drag, position) = PopupDrag::begin(pointer, offset);
        let listeners = GestureListeners::acquire(&mut self.listeners);
        self.popup = position;
        self.gesture = Some(Gesture::PopupDrag { drag, listeners });
        true
    }

    pub fn update_popup_drag(&mut self, pointer: Point) -> Option<PopupPosition> {
        let Some(Gesture::PopupDrag { drag, .. }) = &self.gesture else {
            return None;
        };
        self.popup = drag.position_at(pointer);
        Some(self.popup)
    }

    pub fn end_popup_drag(&mut self) {
        if self.is_dragging_popup() {
            self.release_gesture();
        }
    }

    // ─── Event routing ───────────────────────────────────────────────────

    /// Deliver an event to a listener. Returns `false` for listeners that
    /// are no longer attached (e.g. from a previous scene).
    pub fn dispatch(&mut self, id: ListenerId, pointer: Point) -> bool {
        let Some(listener) = self.listeners.get(id) else {
            log::trace!("dropping event for detached {id:?}");
            return false;
        };
        match (listener.target, listener.event) {
            (ListenerTarget::Unit(unit), ListenerEvent::Click) => self.select_unit(unit),
            (ListenerTarget::Background, ListenerEvent::Click) => {
                self.clear_selection();
                true
            }
            (ListenerTarget::Document, ListenerEvent::PointerMove) => match self.gesture {
                Some(Gesture::Pan { .. }) => self.update_pan(pointer).is_some(),
                Some(Gesture::PopupDrag { .. }) => self.update_popup_drag(pointer).is_some(),
                None => false,
            },
            (ListenerTarget::Document, ListenerEvent::PointerUp) => {
                self.release_gesture();
                true
            }
            _ => false,
        }
    }

    /// Click at a pointer position: routed to the unit under it, or to the
    /// background.
    pub fn click(&mut self, pointer: Point) -> bool {
        let target = match self.target_at(pointer) {
            HitTarget::Unit(unit) => ListenerTarget::Unit(unit),
            HitTarget::Background => ListenerTarget::Background,
        };
        match self.listeners.find(target, ListenerEvent::Click) {
            Some(id) => self.dispatch(id, pointer),
            None => false,
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        match self
            .listeners
            .find(ListenerTarget::Document, ListenerEvent::PointerMove)
        {
            Some(id) => self.dispatch(id, pointer),
            None => false,
        }
    }

    pub fn pointer_up(&mut self, pointer: Point) -> bool {
        match self
            .listeners
            .find(ListenerTarget::Document, ListenerEvent::PointerUp)
        {
            Some(id) => self.dispatch(id, pointer),
            None => false,
        }
    }

    /// The pointer left the viewer element: a pan ends, a popup drag
    /// (tracked on the document) carries on.
    pub fn pointer_leave(&mut self) {
        self.end_pan();
    }

    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, modifiers, self.config.pan_step)?;
        match action {
            ShortcutAction::ZoomIn => {
                self.zoom_in();
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
            }
            ShortcutAction::ResetView => {
                self.reset_view();
            }
            ShortcutAction::Deselect => self.clear_selection(),
            ShortcutAction::Pan { dx, dy } => {
                self.pan_by(dx, dy);
            }
        }
        Some(action)
    }

    /// Route a platform event. Returns `true` if the view or selection
    /// may have changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.begin_pan(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::PointerLeave => {
                let was_panning = self.is_panning();
                self.pointer_leave();
                was_panning
            }
            InputEvent::Click { x, y } => self.click(Point::new(*x, *y)),
            InputEvent::Wheel { x, y, delta_y } => {
                let before = self.transform;
                self.wheel(Point::new(*x, *y), *delta_y) != before
            }
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers).is_some(),
        }
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Live viewer markup for the current state.
    pub fn render_markup(&self) -> String {
        render_viewer(
            &self.scene,
            &ViewerState {
                transform: self.transform,
                selected: self.selection.as_ref().map(|s| s.unit_id),
                theme: self.config.theme,
            },
        )
    }

    /// Sanitized standalone document, independent of the live transform.
    pub fn save_svg(&self) -> String {
        render_static(&self.scene, None)
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            transform: self.transform,
            selection: self.selection.clone(),
            popup: self.popup,
            popup_css: self.popup.to_css(),
            view_box: self.scene.view_box.to_string(),
            unit_count: self.scene.units.len(),
            panning: self.is_panning(),
            dragging_popup: self.is_dragging_popup(),
        }
    }

    // ─── Teardown ────────────────────────────────────────────────────────

    fn release_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            gesture.into_listeners().release(&mut self.listeners);
        }
    }

    /// Unmount: release the active gesture and every scene listener.
    pub fn teardown(&mut self) {
        self.release_gesture();
        self.listeners.clear();
    }
}

impl Drop for ViewportController {
    fn drop(&mut self) {
        self.teardown();
    }
}
