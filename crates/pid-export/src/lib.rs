//! Report and diagram exports.
//!
//! A design result plus the project parameters become one self-contained
//! document in HTML, RTF or Word 2003 XML. Every format shares the section
//! order fixed in `report`; the diagram is always re-emitted from the
//! sanitized scene, never copied from the model's raw string.

pub mod download;
pub mod html;
pub mod markdown;
pub mod report;
pub mod rtf;
pub mod wordml;

pub use download::{Download, ReportFormat, diagram_png, diagram_svg, report_filename, slug};
pub use report::{ExportOptions, Report};

use pid_core::ProjectData;
use pid_core::design::DesignResults;
use pid_render::RasterError;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("the design has no process diagram")]
    NoDiagram,
    #[error("could not rasterize the diagram: {0}")]
    Raster(#[from] RasterError),
    #[error("invalid export input: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render a report in `format`.
pub fn export_report(
    results: &DesignResults,
    project: &ProjectData,
    format: ReportFormat,
    options: &ExportOptions,
) -> Download {
    let report = Report::build(results, project, options);
    let text = match format {
        ReportFormat::Html => html::render(&report),
        ReportFormat::Rtf => rtf::render(&report),
        ReportFormat::WordXml => wordml::render(&report),
    };
    log::debug!(
        "exported {format} report ({} bytes) for {}",
        text.len(),
        project.project_type.code()
    );
    Download::text(
        report_filename(project.project_type, format),
        format.mime(),
        text,
    )
}

/// `export_report` from the JSON wire forms of the design and project.
pub fn export_report_json(
    results_json: &str,
    project_json: &str,
    format: ReportFormat,
    options: &ExportOptions,
) -> Result<Download, ExportError> {
    let results: DesignResults = serde_json::from_str(results_json)?;
    let project: ProjectData = serde_json::from_str(project_json)?;
    Ok(export_report(&results, &project, format, options))
}
