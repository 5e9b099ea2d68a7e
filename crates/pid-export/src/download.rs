//! Downloadable artifacts and their filenames.

use crate::ExportError;
use pid_core::ProjectType;
use pid_core::design::DesignResults;
use pid_core::load_scene;
use pid_render::{RasterOptions, render_static, scene_to_png};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Rtf,
    /// Word 2003 XML, saved as `.doc`.
    #[serde(rename = "doc")]
    WordXml,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [Self::Html, Self::Rtf, Self::WordXml];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Rtf => "rtf",
            Self::WordXml => "doc",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html;charset=utf-8",
            Self::Rtf => "application/rtf",
            Self::WordXml => "application/msword",
        }
    }

    /// Accepts the extension or a common alias (`word`, `wordml`, `htm`).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "rtf" => Some(Self::Rtf),
            "doc" | "word" | "wordml" | "xml" => Some(Self::WordXml),
            _ => None,
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn text(filename: String, mime: &'static str, text: String) -> Self {
        Self {
            filename,
            mime,
            bytes: text.into_bytes(),
        }
    }
}

/// Lowercase, hyphen-separated, `[a-z0-9_-]` only.
///
/// `Sewage Treatment Plant (STP)` → `sewage-treatment-plant-stp`.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_whitespace() || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

pub fn project_slug(project_type: ProjectType) -> String {
    slug(project_type.label())
}

pub fn report_filename(project_type: ProjectType, format: ReportFormat) -> String {
    format!("{}-report.{}", project_slug(project_type), format.extension())
}

pub fn diagram_svg_filename(project_type: ProjectType) -> String {
    format!("{}-pid.svg", project_slug(project_type))
}

pub fn diagram_png_filename(project_type: ProjectType) -> String {
    format!("{}-pid.png", project_slug(project_type))
}

/// The diagram as a standalone sanitized SVG file.
pub fn diagram_svg(
    results: &DesignResults,
    project_type: ProjectType,
) -> Result<Download, ExportError> {
    if !results.has_diagram() {
        return Err(ExportError::NoDiagram);
    }
    let scene = load_scene(&results.process_flow_diagram.svg_content);
    if scene.is_empty() {
        return Err(ExportError::NoDiagram);
    }
    Ok(Download::text(
        diagram_svg_filename(project_type),
        "image/svg+xml",
        render_static(&scene, None),
    ))
}

/// The diagram rasterized to PNG, independent of any live view transform.
pub fn diagram_png(
    results: &DesignResults,
    project_type: ProjectType,
    options: &RasterOptions,
) -> Result<Download, ExportError> {
    if !results.has_diagram() {
        return Err(ExportError::NoDiagram);
    }
    let scene = load_scene(&results.process_flow_diagram.svg_content);
    let bytes = scene_to_png(&scene, options)?;
    Ok(Download {
        filename: diagram_png_filename(project_type),
        mime: "image/png",
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugs_follow_labels() {
        assert_eq!(
            project_slug(ProjectType::Stp),
            "sewage-treatment-plant-stp"
        );
        assert_eq!(
            project_slug(ProjectType::Ro),
            "reverse-osmosis-ro-plant"
        );
        assert_eq!(slug("  Waste -- to   Energy! "), "waste-to-energy");
        assert_eq!(slug("m³/day"), "mday");
    }

    #[test]
    fn filenames() {
        assert_eq!(
            report_filename(ProjectType::Stp, ReportFormat::Html),
            "sewage-treatment-plant-stp-report.html"
        );
        assert_eq!(
            report_filename(ProjectType::Etp, ReportFormat::WordXml),
            "effluent-treatment-plant-etp-report.doc"
        );
        assert_eq!(
            diagram_png_filename(ProjectType::Wtp),
            "water-treatment-plant-wtp-pid.png"
        );
    }

    #[test]
    fn formats_parse_from_aliases() {
        assert_eq!(ReportFormat::parse("HTM"), Some(ReportFormat::Html));
        assert_eq!(ReportFormat::parse("word"), Some(ReportFormat::WordXml));
        assert_eq!(ReportFormat::parse("pdf"), None);
        for format in ReportFormat::ALL {
            assert_eq!(ReportFormat::parse(format.extension()), Some(format));
        }
    }

    #[test]
    fn missing_diagram_is_an_error() {
        let results = DesignResults::default();
        assert!(matches!(
            diagram_svg(&results, ProjectType::Stp),
            Err(ExportError::NoDiagram)
        ));
    }
}
