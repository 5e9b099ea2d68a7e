use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pid_core::{DiagnosticSeverity, Scene, load_scene};
use serde::Serialize;

#[derive(Args)]
pub struct InspectArgs {
    /// SVG diagram file
    pub file: PathBuf,

    /// Print a JSON summary instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnitSummary<'a> {
    id: &'a str,
    description: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SceneSummary<'a> {
    view_box: String,
    view_box_declared: bool,
    units: Vec<UnitSummary<'a>>,
    diagnostics: &'a [pid_core::SceneDiagnostic],
}

fn summarize(scene: &Scene) -> SceneSummary<'_> {
    SceneSummary {
        view_box: scene.view_box.to_string(),
        view_box_declared: scene.view_box_declared,
        units: scene
            .units
            .iter()
            .map(|u| UnitSummary {
                id: u.id.as_str(),
                description: u.description.as_deref(),
            })
            .collect(),
        diagnostics: &scene.diagnostics,
    }
}

pub fn run(args: &InspectArgs) -> Result<()> {
    let svg = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let scene = load_scene(&svg);
    let summary = summarize(&scene);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let fallback = if summary.view_box_declared { "" } else { " (default)" };
    println!("File:        {}", args.file.display());
    println!("View box:    {}{fallback}", summary.view_box);
    println!("Units:       {}", summary.units.len());
    for unit in &summary.units {
        match unit.description {
            Some(text) => println!("  {:<28} {text}", unit.id),
            None => println!("  {}", unit.id),
        }
    }
    if !summary.diagnostics.is_empty() {
        println!("Findings:    {}", summary.diagnostics.len());
        for d in summary.diagnostics {
            let level = match d.severity {
                DiagnosticSeverity::Warning => "warning",
                DiagnosticSeverity::Info => "info",
            };
            let element = if d.element.is_empty() {
                String::new()
            } else {
                format!(" {}:", d.element)
            };
            println!("  {level} [{}]{element} {}", d.rule, d.message);
        }
    }
    Ok(())
}
