use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pid_core::{SettingsStore, Theme};

/// Overrides the settings file location.
pub const SETTINGS_VAR: &str = "PID_DRAFT_SETTINGS";

#[derive(Args)]
pub struct SettingsArgs {
    /// Settings file (defaults to $PID_DRAFT_SETTINGS, then ~/.config/pid-draft/settings.json)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Set the viewer theme: light or dark
    #[arg(long, value_parser = parse_theme)]
    pub theme: Option<Theme>,

    /// Flip between light and dark
    #[arg(long, conflicts_with = "theme")]
    pub toggle_theme: bool,

    /// PNG supersampling factor
    #[arg(long)]
    pub raster_scale: Option<f32>,
}

fn parse_theme(input: &str) -> Result<Theme, String> {
    Theme::parse(input).ok_or_else(|| format!("unknown theme `{input}` (expected light or dark)"))
}

pub fn default_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SETTINGS_VAR) {
        return PathBuf::from(path);
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".config/pid-draft/settings.json"),
        None => PathBuf::from("pid-draft-settings.json"),
    }
}

pub fn run(args: &SettingsArgs) -> Result<()> {
    let path = args.path.clone().unwrap_or_else(default_path);
    let mut store = SettingsStore::load(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;

    if args.theme.is_some() || args.toggle_theme || args.raster_scale.is_some() {
        store
            .update(|s| {
                if let Some(theme) = args.theme {
                    s.theme = theme;
                }
                if args.toggle_theme {
                    s.theme = s.theme.toggled();
                }
                if let Some(scale) = args.raster_scale {
                    s.raster_scale = scale;
                }
            })
            .context("settings were not changed")?;
    }

    println!("# {}", store.path().display());
    println!("{}", store.settings().to_json()?);
    Ok(())
}
