//! WASM bridge for PID Draft: exposes the viewport controller and report
//! export to the results page.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards pointer,
//! wheel and key events, then swaps in `render_markup()` and positions the
//! popup from `state_json()`.

use chrono::NaiveDate;
use pid_core::{Point, Settings, Theme, UnitId};
use pid_export::{ExportOptions, ReportFormat};
use pid_render::RasterOptions;
use pid_viewer::{Modifiers, ShortcutAction, Viewport, ViewportController};
use wasm_bindgen::prelude::*;

/// The browser-facing diagram viewer.
///
/// Owns a `ViewportController`; dropping it from JS (`free()`) detaches
/// every listener the controller still holds.
#[wasm_bindgen]
pub struct PidViewport {
    controller: ViewportController,
    raster_scale: f32,
}

#[wasm_bindgen]
impl PidViewport {
    /// Create a viewer for an element of `width` × `height` CSS pixels.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self::from_settings(width, height, &Settings::default())
    }

    /// Create a viewer configured from a settings JSON document. Invalid
    /// settings fall back to the defaults.
    pub fn with_settings(width: f64, height: f64, settings_json: &str) -> PidViewport {
        console_error_panic_hook_setup();
        let settings = Settings::from_json(settings_json).unwrap_or_else(|e| {
            log::warn!("ignoring settings: {e}");
            Settings::default()
        });
        Self::from_settings(width, height, &settings)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.controller.set_viewport(Viewport::new(width, height));
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.controller
            .set_theme(if is_dark { Theme::Dark } else { Theme::Light });
    }

    /// Load a new diagram. Returns the number of interactive units.
    pub fn set_svg(&mut self, svg: &str) -> usize {
        self.controller.load_scene(svg).units.len()
    }

    // ─── Pointer & wheel ─────────────────────────────────────────────────

    /// Returns true if a pan started.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.controller.begin_pan(Point::new(x, y))
    }

    /// Returns true if the view or popup moved.
    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.controller.pointer_move(Point::new(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.controller.pointer_up(Point::new(x, y))
    }

    /// Returns true if a pan was ended.
    pub fn handle_pointer_leave(&mut self) -> bool {
        let was_panning = self.controller.is_panning();
        self.controller.pointer_leave();
        was_panning
    }

    /// Returns true if the scale changed.
    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        let before = self.controller.transform();
        self.controller.wheel(Point::new(x, y), delta_y) != before
    }

    /// Returns true if the selection changed hands (a unit was selected or
    /// the background cleared it).
    pub fn handle_click(&mut self, x: f64, y: f64) -> bool {
        self.controller.click(Point::new(x, y))
    }

    /// Handle a key press. Returns the action name (`zoomIn`, `zoomOut`,
    /// `resetView`, `deselect`, `pan`) or an empty string when the key is
    /// not a viewer shortcut and should reach the browser.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.controller
            .handle_key(key, modifiers)
            .map(action_name)
            .unwrap_or_default()
            .to_string()
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.controller.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.controller.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.controller.reset_view();
    }

    /// Select a unit by element id. Returns false for unknown ids.
    pub fn select_unit(&mut self, id: &str) -> bool {
        UnitId::lookup(id).is_some_and(|unit| self.controller.select_unit(unit))
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear_selection();
    }

    // ─── Popup ───────────────────────────────────────────────────────────

    /// Start dragging the detail popup. `offset_x`/`offset_y` is the pointer
    /// position inside the popup header.
    pub fn begin_popup_drag(&mut self, x: f64, y: f64, offset_x: f64, offset_y: f64) -> bool {
        self.controller
            .begin_popup_drag(Point::new(x, y), Point::new(offset_x, offset_y))
    }

    pub fn update_popup_drag(&mut self, x: f64, y: f64) -> bool {
        self.controller
            .update_popup_drag(Point::new(x, y))
            .is_some()
    }

    pub fn end_popup_drag(&mut self) {
        self.controller.end_popup_drag();
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Live SVG markup for the viewer element.
    pub fn render_markup(&self) -> String {
        self.controller.render_markup()
    }

    /// Transform, selection and popup placement as JSON.
    pub fn state_json(&self) -> String {
        serde_json::to_string(&self.controller.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Problems found while loading the diagram, as a JSON array.
    pub fn diagnostics_json(&self) -> String {
        serde_json::to_string(self.controller.diagnostics()).unwrap_or_else(|_| "[]".to_string())
    }

    /// True while a pan or popup drag holds document listeners.
    pub fn gesture_active(&self) -> bool {
        self.controller.gesture_active()
    }

    /// Sanitized standalone SVG for download.
    pub fn save_svg(&self) -> String {
        self.controller.save_svg()
    }

    /// PNG for download, rendered from the document rather than the live
    /// view.
    pub fn save_png(&self) -> Result<Vec<u8>, JsValue> {
        let options = RasterOptions {
            scale: self.raster_scale,
            ..RasterOptions::default()
        };
        pid_render::scene_to_png(self.controller.scene(), &options)
            .map_err(|e| JsValue::from_str(&format!("Could not create PNG: {e}")))
    }
}

impl PidViewport {
    fn from_settings(width: f64, height: f64, settings: &Settings) -> Self {
        Self {
            controller: ViewportController::with_settings(Viewport::new(width, height), settings),
            raster_scale: settings.raster_scale,
        }
    }
}

fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::ResetView => "resetView",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::Pan { .. } => "pan",
    }
}

// ─── Report export (no viewer needed) ────────────────────────────────────

/// A generated file, handed to JS for a Blob download.
#[wasm_bindgen]
pub struct ExportedFile {
    filename: String,
    mime: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl ExportedFile {
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.mime.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// Export a report from the JSON design results and project data.
/// `format` is `html`, `rtf` or `doc`.
#[wasm_bindgen]
pub fn export_report(
    results_json: &str,
    project_json: &str,
    format: &str,
) -> Result<ExportedFile, JsValue> {
    let format = ReportFormat::parse(format)
        .ok_or_else(|| JsValue::from_str(&format!("unknown report format `{format}`")))?;
    export(results_json, project_json, format).map_err(|e| JsValue::from_str(&e))
}

fn export(results_json: &str, project_json: &str, format: ReportFormat) -> Result<ExportedFile, String> {
    let options = ExportOptions::new(today());
    let download = pid_export::export_report_json(results_json, project_json, format, &options)
        .map_err(|e| e.to_string())?;
    Ok(ExportedFile {
        filename: download.filename,
        mime: download.mime.to_string(),
        bytes: download.bytes,
    })
}

/// The browser's local date; the system clock is unavailable on wasm32.
#[cfg(target_arch = "wasm32")]
fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Set up panic hook for WASM debugging.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("PID Draft WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
