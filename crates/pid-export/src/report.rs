//! Format-independent report layout.
//!
//! `Report::build` decides what goes into a report and in which order; the
//! HTML, RTF and WordprocessingML writers only decide how it looks.

use chrono::NaiveDate;
use pid_core::design::{CLIENT_SCOPE, DesignResults};
use pid_core::project::{ProjectData, location};
use pid_core::{Scene, load_scene};
use pid_render::RasterOptions;

pub const SUMMARY_TITLE: &str = "Report Summary";
pub const CALCULATIONS_TITLE: &str = "Design Calculations";
pub const DIAGRAM_TITLE: &str = "Process & Instrumentation Diagram";
pub const BOM_TITLE: &str = "Bill of Materials";
pub const COMPLIANCE_TITLE: &str = "Compliance Checklist";
pub const CLIENT_SCOPE_TITLE: &str = "Client Scope / Exclusions";
pub const ABBREVIATIONS_TITLE: &str = "Abbreviations & Acronyms";

/// Shown in place of a diagram the design service did not return.
pub const NO_DIAGRAM_NOTE: &str = "Process & Instrumentation Diagram was not generated.";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Date printed in the report header.
    pub date: NaiveDate,
    /// Used for the embedded diagram in RTF and Word output.
    pub raster: RasterOptions,
}

impl ExportOptions {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            raster: RasterOptions::default(),
        }
    }

    /// Options dated today, in local time.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckItem {
    pub compliant: bool,
    pub item: String,
    pub details: String,
}

#[derive(Debug)]
pub enum Block {
    Markdown(String),
    Table {
        headers: &'static [&'static str],
        rows: Vec<Vec<String>>,
    },
    Bullets(Vec<String>),
    Checklist(Vec<CheckItem>),
    /// The sanitized diagram.
    Diagram(Box<Scene>),
    Note(String),
}

#[derive(Debug)]
pub struct Section {
    pub title: &'static str,
    pub blocks: Vec<Block>,
}

#[derive(Debug)]
pub struct Report {
    pub title: String,
    /// Label/value pairs shown under the title.
    pub meta: Vec<(&'static str, String)>,
    pub sections: Vec<Section>,
    pub raster: RasterOptions,
}

impl Report {
    pub fn build(results: &DesignResults, project: &ProjectData, options: &ExportOptions) -> Self {
        Self {
            title: report_title(project),
            meta: header_meta(project, options.date),
            sections: vec![
                summary(results),
                calculations(results),
                diagram(results),
                bill_of_materials(results),
                compliance(results),
                client_scope(),
                abbreviations(results),
            ],
            raster: options.raster.clone(),
        }
    }
}

/// `Sewage Treatment Plant (STP) 500 KLD (500 m³/day)`; solid-waste plants
/// are sized in tonnes per day only.
pub fn report_title(project: &ProjectData) -> String {
    let kind = project.project_type;
    let flow = format_number(project.flow_rate);
    if kind.is_solid_waste() {
        format!("{} {flow} {}", kind.label(), kind.capacity_unit())
    } else {
        format!("{} {flow} {} ({flow} m³/day)", kind.label(), kind.capacity_unit())
    }
}

fn header_meta(project: &ProjectData, date: NaiveDate) -> Vec<(&'static str, String)> {
    let mut meta = Vec::new();
    let place = location(&project.location).map_or(project.location.as_str(), |l| l.name);
    meta.push(("Location", place.to_string()));
    if let Some(tech) = project.technology.as_deref().filter(|t| !t.trim().is_empty()) {
        meta.push(("Technology", tech.to_string()));
    }
    if !project.effluent_types.is_empty() {
        let kinds: Vec<&str> = project.effluent_types.iter().map(|e| e.label()).collect();
        meta.push(("Effluent", kinds.join(", ")));
    }
    if let Some(to) = project.to_address.as_deref().filter(|t| !t.trim().is_empty()) {
        meta.push(("Prepared for", to.trim().to_string()));
    }
    if let Some(from) = project.from_address.as_deref().filter(|t| !t.trim().is_empty()) {
        meta.push(("Prepared by", from.trim().to_string()));
    }
    meta.push(("Date", date.format("%d %B %Y").to_string()));
    meta
}

// ─── Sections ────────────────────────────────────────────────────────────

fn not_provided() -> Block {
    Block::Note("Not provided.".to_string())
}

fn summary(results: &DesignResults) -> Section {
    let blocks = if results.report_summary.trim().is_empty() {
        vec![not_provided()]
    } else {
        vec![Block::Markdown(results.report_summary.clone())]
    };
    Section {
        title: SUMMARY_TITLE,
        blocks,
    }
}

fn calculations(results: &DesignResults) -> Section {
    let rows: Vec<Vec<String>> = results
        .design_calculations
        .iter()
        .map(|c| {
            vec![
                c.parameter.clone(),
                c.value.clone(),
                c.unit.clone(),
                c.description.clone(),
            ]
        })
        .collect();
    Section {
        title: CALCULATIONS_TITLE,
        blocks: vec![table(&["Parameter", "Value", "Unit", "Description"], rows)],
    }
}

fn diagram(results: &DesignResults) -> Section {
    let block = if results.has_diagram() {
        let scene = load_scene(&results.process_flow_diagram.svg_content);
        if scene.is_empty() {
            log::warn!("diagram could not be parsed; leaving it out of the report");
            Block::Note(NO_DIAGRAM_NOTE.to_string())
        } else {
            Block::Diagram(Box::new(scene))
        }
    } else {
        Block::Note(NO_DIAGRAM_NOTE.to_string())
    };
    Section {
        title: DIAGRAM_TITLE,
        blocks: vec![block],
    }
}

fn bill_of_materials(results: &DesignResults) -> Section {
    let rows: Vec<Vec<String>> = results
        .bill_of_materials
        .iter()
        .map(|b| {
            vec![
                b.name.clone(),
                format_number(b.quantity),
                b.unit.clone(),
                b.vendor_suggestion.clone(),
            ]
        })
        .collect();
    Section {
        title: BOM_TITLE,
        blocks: vec![table(
            &["Item Name", "Quantity", "Unit", "Vendor Suggestion"],
            rows,
        )],
    }
}

fn compliance(results: &DesignResults) -> Section {
    let items: Vec<CheckItem> = results
        .compliance_checklist
        .iter()
        .map(|c| CheckItem {
            compliant: c.compliant,
            item: c.item.clone(),
            details: c.details.clone(),
        })
        .collect();
    let block = if items.is_empty() {
        not_provided()
    } else {
        Block::Checklist(items)
    };
    Section {
        title: COMPLIANCE_TITLE,
        blocks: vec![block],
    }
}

fn client_scope() -> Section {
    Section {
        title: CLIENT_SCOPE_TITLE,
        blocks: vec![Block::Bullets(
            CLIENT_SCOPE.iter().map(|s| s.to_string()).collect(),
        )],
    }
}

fn abbreviations(results: &DesignResults) -> Section {
    let rows: Vec<Vec<String>> = results
        .abbreviations
        .iter()
        .map(|a| vec![a.term.clone(), a.definition.clone()])
        .collect();
    Section {
        title: ABBREVIATIONS_TITLE,
        blocks: vec![table(&["Term", "Definition"], rows)],
    }
}

fn table(headers: &'static [&'static str], rows: Vec<Vec<String>>) -> Block {
    if rows.is_empty() {
        not_provided()
    } else {
        Block::Table { headers, rows }
    }
}

/// Whole numbers print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pid_core::ProjectType;
    use pid_core::design::BomItem;
    use pretty_assertions::assert_eq;

    fn options() -> ExportOptions {
        ExportOptions::new(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
    }

    #[test]
    fn sections_in_fixed_order() {
        let project = ProjectData::new(ProjectType::Stp, "Maharashtra");
        let report = Report::build(&DesignResults::default(), &project, &options());
        let titles: Vec<&str> = report.sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec![
                SUMMARY_TITLE,
                CALCULATIONS_TITLE,
                DIAGRAM_TITLE,
                BOM_TITLE,
                COMPLIANCE_TITLE,
                CLIENT_SCOPE_TITLE,
                ABBREVIATIONS_TITLE,
            ]
        );
        assert!(matches!(
            &report.sections[2].blocks[0],
            Block::Note(n) if n == NO_DIAGRAM_NOTE
        ));
    }

    #[test]
    fn header_uses_board_name_and_date() {
        let mut project = ProjectData::new(ProjectType::Stp, "Maharashtra");
        project.flow_rate = 500.0;
        project.technology = Some("MBBR".into());
        let report = Report::build(&DesignResults::default(), &project, &options());
        assert_eq!(report.title, "Sewage Treatment Plant (STP) 500 KLD (500 m³/day)");
        assert_eq!(
            report.meta,
            vec![
                ("Location", "Maharashtra (MPCB)".to_string()),
                ("Technology", "MBBR".to_string()),
                ("Date", "14 March 2025".to_string()),
            ]
        );
    }

    #[test]
    fn solid_waste_title_has_no_volume() {
        let mut project = ProjectData::new(ProjectType::Swm, "CPCB");
        project.flow_rate = 20.0;
        assert_eq!(report_title(&project), "Solid Waste Management (SWM) 20 TPD");
    }

    #[test]
    fn quantities_drop_trailing_zero() {
        let results = DesignResults {
            bill_of_materials: vec![BomItem {
                name: "Air blower".into(),
                quantity: 2.0,
                unit: "Nos".into(),
                vendor_suggestion: "Kirloskar".into(),
            }],
            ..DesignResults::default()
        };
        let project = ProjectData::new(ProjectType::Stp, "Delhi");
        let report = Report::build(&results, &project, &options());
        let Block::Table { rows, .. } = &report.sections[3].blocks[0] else {
            panic!("expected BOM table");
        };
        assert_eq!(rows[0][1], "2");
        assert_eq!(format_number(2.5), "2.5");
    }
}
