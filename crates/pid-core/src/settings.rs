//! User preferences.
//!
//! `Settings` is plain data with serde defaults, so a partial or older
//! file still loads. `SettingsStore` owns the on-disk copy: it reads once
//! at startup and writes back after every `update`.

use crate::model::ViewBox;
use crate::transform::ScaleLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read or write settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    /// Supersampling factor for PNG export.
    pub raster_scale: f32,
    pub zoom_limits: ScaleLimits,
    /// Factor applied by the zoom-in/zoom-out buttons.
    pub toolbar_zoom_step: f64,
    /// Factor applied per wheel notch.
    pub wheel_zoom_step: f64,
    /// Arrow-key pan distance in viewport pixels (Shift multiplies by 4).
    pub pan_step: f64,
    /// Used when a diagram has no usable `viewBox`.
    pub default_view_box: ViewBox,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            raster_scale: 2.0,
            zoom_limits: ScaleLimits::DEFAULT,
            toolbar_zoom_step: 1.2,
            wheel_zoom_step: 1.1,
            pan_step: 40.0,
            default_view_box: ViewBox::DEFAULT,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.raster_scale.is_finite() && self.raster_scale > 0.0 && self.raster_scale <= 8.0) {
            return Err(SettingsError::Invalid(format!(
                "rasterScale must be in (0, 8], got {}",
                self.raster_scale
            )));
        }
        if !self.zoom_limits.is_valid() {
            return Err(SettingsError::Invalid(format!(
                "zoomLimits {}..{} is not a positive range",
                self.zoom_limits.min, self.zoom_limits.max
            )));
        }
        for (name, step) in [
            ("toolbarZoomStep", self.toolbar_zoom_step),
            ("wheelZoomStep", self.wheel_zoom_step),
        ] {
            if !(step.is_finite() && step > 1.0) {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be greater than 1, got {step}"
                )));
            }
        }
        if !(self.pan_step.is_finite() && self.pan_step > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "panStep must be positive, got {}",
                self.pan_step
            )));
        }
        if !self.default_view_box.is_valid() {
            return Err(SettingsError::Invalid(format!(
                "defaultViewBox `{}` has a non-positive extent",
                self.default_view_box
            )));
        }
        Ok(())
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

/// Settings bound to a file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Read settings from `path`. A missing file yields defaults and is not
    /// created until the first `update`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(text) => Settings::from_json(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", path.display());
                Settings::default()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        Ok(Self { path, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` and persist. An invalid result is rejected and the
    /// previous settings are kept.
    pub fn update(&mut self, change: impl FnOnce(&mut Settings)) -> Result<(), SettingsError> {
        let mut next = self.settings.clone();
        change(&mut next);
        next.validate()?;
        if next == self.settings {
            return Ok(());
        }
        write_settings(&self.path, &next)?;
        self.settings = next;
        log::debug!("settings saved to {}", self.path.display());
        Ok(())
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, settings.to_json()?).map_err(io_err)
}
