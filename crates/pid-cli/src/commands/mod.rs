pub mod design;
pub mod diagram;
pub mod inspect;
pub mod report;
pub mod settings;

use anyhow::{Context, Result};
use pid_core::ProjectType;
use pid_export::Download;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid", path.display()))
}

/// Write pretty JSON to `output`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Save a download to `output`, defaulting to its own filename in the
/// current directory.
pub fn save_download(download: &Download, output: Option<&Path>) -> Result<PathBuf> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&download.filename));
    fs::write(&path, &download.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "Wrote {} ({}, {} bytes)",
        path.display(),
        download.mime,
        download.bytes.len()
    );
    Ok(path)
}

pub fn parse_project_type(input: &str) -> Result<ProjectType, String> {
    ProjectType::parse(input).ok_or_else(|| {
        let codes: Vec<_> = ProjectType::ALL.iter().map(|t| t.code()).collect();
        format!("unknown project type `{input}` (expected one of {})", codes.join(", "))
    })
}
