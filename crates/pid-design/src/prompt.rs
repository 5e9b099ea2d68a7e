//! Prompt assembly for the three design-service calls.
//!
//! Everything here is plain string building from `ProjectData`; the
//! network layer only decides where the text goes.

use chrono::NaiveDate;
use pid_core::ProjectData;
use pid_core::ProjectType;
use std::fmt::Write;

/// Requirements for the generated diagram. Shared by the design and
/// diagram-only schemas so both produce markup the viewer can load.
pub const DIAGRAM_REQUIREMENTS: &str = "A complete, professional, CAD-style SVG document for the \
Process & Instrumentation Diagram (P&ID). The root <svg> element MUST carry a viewBox tightly \
cropped around the drawing and MUST NOT carry width or height attributes, so the diagram scales \
with its container. Keep the layout compact with a landscape aspect ratio (16:9 or 4:3). Wrap \
every major piece of equipment (tanks, pumps, blowers, filters) in a <g> element with a unique \
id such as 'unit-aeration-tank' and the class 'equipment-unit', and give that group a <title> \
child with a short description such as 'Aeration Tank - 150 m3'. Draw every connecting pipe as a \
<path> with the class 'pipe-flow'. Draw instruments with standard symbols, each with a <title>. \
All labels MUST be native SVG <text> elements at a uniform readable size such as 12px, aligned \
with text-anchor, with a normal font weight; never bold, never outlined into paths, never \
raster images. Include a legend as a <g id='pid-legend'> in a corner with the title 'Legend', \
explaining the equipment symbols and pipe line styles. Legend elements MUST NOT have the \
'equipment-unit' class.";

pub const ANALYSIS_SYSTEM_INSTRUCTION: &str = "You are an assistant that extracts technical \
parameters from the special instructions a user gives for a water or waste treatment plant \
design. Read the provided text, files and audio, fill in the JSON object with the specific \
values you find, and write a complete summary of the instructions.";

pub const DIAGRAM_SYSTEM_INSTRUCTION: &str = "You are an expert engineering assistant from India \
who draws professional, CAD-style Process & Instrumentation Diagrams (P&IDs) for water and waste \
treatment plants. Produce ONLY a valid SVG string for the user's project, following Indian \
engineering standards, P&ID conventions and every requirement in the response schema.";

/// Offer validity quoted in the report's addressing block.
pub const OFFER_VALIDITY: &str = "30 Calendar Days";

/// Dates as written in Indian correspondence, `14/03/2025`.
pub fn offer_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn design_system_instruction(project: &ProjectData) -> String {
    format!(
        "You are an expert engineering assistant from India, specializing in the design of water \
and wastewater treatment plants to Indian regulatory, design and operational standards (CPCB, BIS \
and state Pollution Control Board norms).

Your task is to prepare a complete, modular, step-by-step preliminary design for a {kind}.

**User-Provided Context:**
The user may attach special instructions as text, files (images, documents) or a voice recording. \
Analyze all of it and give it priority in the design. A technology named in a voice note or \
document must be used; a site layout image should inform the P&ID layout.

**Rules:**
1. **Indian Standards:** Base every calculation, suggestion and compliance check on the standards \
that apply in {location}, India. Cite IS codes or CPCB guidelines where relevant.
2. **JSON Only:** Return one valid JSON object that conforms to the response schema, with no text, \
markdown or explanation outside it.
3. **Practical:** Write for Indian engineers, contractors and government clients. Suggest vendors \
that are commonly available and trusted in India.
4. **Complete:** Fill every field of the schema: `designCalculations`, `processFlowDiagram`, \
`complianceChecklist`, `billOfMaterials`, `reportSummary` and `abbreviations`. Leave no section empty.
5. **Acronyms:** List every technical acronym used in the report (BOD, COD, STP, P&ID, ...) in \
`abbreviations` with its definition.
",
        kind = project.project_type,
        location = project.location,
    )
}

/// The user turn for a full design.
pub fn design_prompt(project: &ProjectData, today: NaiveDate) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str("Prepare a preliminary design report for the project below.\n");

    if let Some(to) = non_empty(project.to_address.as_deref()) {
        let _ = write!(
            out,
            "
**Report Addressing:**
The 'reportSummary' MUST open by formally addressing the recipient with the address block below, \
followed by one blank line, then the subject line with the offer date and validity.

**To Address:**
{to}

**Header Details:**
Sub: Offer for the requirement | Offer Date: {date} | Validity: {OFFER_VALIDITY}
",
            date = offer_date(today),
        );
    }

    let _ = write!(
        out,
        "\n**Project Details:**\n- **Project Type:** {}\n",
        project.project_type
    );
    if let Some(tech) = non_empty(project.technology.as_deref()) {
        let _ = writeln!(
            out,
            "- **Selected Technology:** {tech}. The user requested this technology; the whole \
design, including the P&ID, calculations and equipment selection, MUST be based on it."
        );
    }
    let _ = writeln!(out, "- **Location:** {}, India", project.location);
    out.push_str(&parameter_lines(project));
    let _ = writeln!(
        out,
        "- **Plant Capacity (Key Design Parameter):** {} {}",
        number(project.flow_rate),
        project.project_type.capacity_unit()
    );

    if project.project_type == ProjectType::Etp && !project.effluent_types.is_empty() {
        let pollutants: Vec<&str> = project.effluent_types.iter().map(|e| e.label()).collect();
        let _ = write!(
            out,
            "
**ETP Specifics:**
- **Key Pollutants to Treat:** {}.
- **Required Technologies:** Add treatment stages for these pollutants: chemical precipitation \
with coagulation/flocculation for heavy metals, oil skimmers or separators for oils and greases, \
and reverse osmosis or evaporators as a final stage for high TDS. Show them in the calculations \
and the process flow.
",
            pollutants.join(", ")
        );
    }

    if let Some(price) = project.estimated_price.filter(|p| *p > 0.0) {
        let _ = write!(
            out,
            "
**Commercial Offer Details:**
- **Estimated Price:** {} INR
- **Payment Terms:** 80% as advance, balance on commissioning of the project.
- **Taxes:** GST and other applicable taxes are extra.
- Include a section titled \"### Commercial Offer\" in the 'reportSummary' built from these details.
",
            number(price)
        );
    }

    out.push_str(
        "
**Mandatory Report Section (inside 'reportSummary'):**
- Include a section titled exactly \"### Recommended use of processed water\" with advice on the \
most suitable reuse of the treated water for this plant type (landscaping, flushing or \
construction for an STP; process reuse for an ETP where quality permits).

**Your Task:**
Return the complete design in the required JSON format. The 'processFlowDiagram' MUST hold a \
valid, professional, CAD-style SVG that follows the schema and standard P&ID conventions.
",
    );
    out
}

/// The user turn for instruction analysis.
pub fn analysis_prompt(project: &ProjectData) -> String {
    let kind = project.project_type;
    let mut out = String::with_capacity(1024);
    out.push_str("Analyze the special instructions given in the attached files and audio.");
    // The text note goes inline: a separate text part has triggered server errors.
    if let Some(note) = non_empty(project.special_instructions_text.as_deref()) {
        let _ = write!(out, "\n\nUser's text note: \"{note}\"");
    }
    let _ = writeln!(out, "\n\nExtract these parameters for a {kind}:");
    for detail in kind.parameters() {
        let _ = writeln!(out, "- {} ({})", detail.label, detail.unit);
    }
    out.push_str("- technology (e.g. MBBR, SBR)\n");
    if kind == ProjectType::Etp {
        out.push_str(
            "Also identify the pollutants to treat (effluentTypes): \"Heavy Metals\", \
\"Oils and Greases\" or \"High TDS Effluents\".\n",
        );
    }
    out.push_str(
        "
Also write a concise, one-paragraph summary that combines everything the user said in text, \
files and audio.

Return one valid JSON object that follows the schema. Include a parameter only when the \
instructions give a specific value for it; never invent or assume values.
",
    );
    out
}

/// The user turn for regenerating only the diagram.
pub fn diagram_prompt(project: &ProjectData) -> String {
    let kind = project.project_type;
    format!(
        "Using the project data and special instructions below (and any attached files or audio), \
regenerate the Process & Instrumentation Diagram (P&ID).

Project Type: {kind}
Technology Preference: {tech}
Plant Capacity: {capacity} {unit}
Influent BOD: {input_bod} mg/L
Target Effluent BOD: {output_bod} mg/L
Special Instructions Summary: {summary}

Return one valid JSON object whose only key is 'svgContent', holding the complete SVG for the P&ID.
",
        tech = non_empty(project.technology.as_deref()).unwrap_or("Not specified"),
        capacity = number(project.flow_rate),
        unit = kind.capacity_unit(),
        input_bod = number(project.input_bod),
        output_bod = number(project.output_bod),
        summary = non_empty(project.special_instructions_text.as_deref()).unwrap_or("None"),
    )
}

fn parameter_lines(project: &ProjectData) -> String {
    let mut out = String::new();
    for detail in project.project_type.parameters() {
        let _ = writeln!(
            out,
            "- **{}:** {} {}",
            detail.label,
            number(project.value(detail.name)),
            detail.unit
        );
    }
    out
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pid_core::project::EffluentType;
    use pretty_assertions::assert_eq;

    fn stp() -> ProjectData {
        let mut project = ProjectData::new(ProjectType::Stp, "Telangana");
        project.flow_rate = 100.0;
        project.input_bod = 250.0;
        project.output_bod = 10.0;
        project
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn design_prompt_lists_parameters_with_units() {
        let prompt = design_prompt(&stp(), date());
        assert!(prompt.contains("- **Project Type:** Sewage Treatment Plant (STP)"));
        assert!(prompt.contains("- **Influent BOD:** 250 mg/L"));
        assert!(prompt.contains("- **Plant Capacity (Key Design Parameter):** 100 KLD"));
        assert!(prompt.contains("### Recommended use of processed water"));
        assert!(!prompt.contains("Report Addressing"));
        assert!(!prompt.contains("Commercial Offer"));
        assert!(!prompt.contains("ETP Specifics"));
    }

    #[test]
    fn optional_blocks_follow_project_fields() {
        let mut project = stp();
        project.project_type = ProjectType::Etp;
        project.effluent_types = vec![EffluentType::HeavyMetals, EffluentType::HighTds];
        project.to_address = Some("  The Secretary\nGreen Valley Society ".into());
        project.estimated_price = Some(1_250_000.0);
        project.technology = Some("ZLD".into());

        let prompt = design_prompt(&project, date());
        assert!(prompt.contains("The Secretary\nGreen Valley Society\n"));
        assert!(prompt.contains("Offer Date: 04/03/2025 | Validity: 30 Calendar Days"));
        assert!(prompt.contains("**Key Pollutants to Treat:** Heavy Metals, High TDS Effluents."));
        assert!(prompt.contains("**Estimated Price:** 1250000 INR"));
        assert!(prompt.contains("**Selected Technology:** ZLD."));
    }

    #[test]
    fn zero_price_is_not_an_offer() {
        let mut project = stp();
        project.estimated_price = Some(0.0);
        assert!(!design_prompt(&project, date()).contains("Commercial Offer"));
    }

    #[test]
    fn solid_waste_capacity_is_in_tonnes() {
        let mut project = ProjectData::new(ProjectType::Wte, "Delhi");
        project.flow_rate = 300.0;
        assert!(design_prompt(&project, date()).contains("300 TPD"));
        assert!(diagram_prompt(&project).contains("Plant Capacity: 300 TPD"));
    }

    #[test]
    fn analysis_prompt_inlines_text_note() {
        let mut project = stp();
        project.special_instructions_text = Some("Use MBBR, 200 KLD".into());
        let prompt = analysis_prompt(&project);
        assert!(prompt.contains("User's text note: \"Use MBBR, 200 KLD\""));
        assert!(prompt.contains("- Effluent COD Target (mg/L)"));
        assert!(!prompt.contains("effluentTypes"));

        project.project_type = ProjectType::Etp;
        assert!(analysis_prompt(&project).contains("effluentTypes"));
    }

    #[test]
    fn diagram_prompt_defaults() {
        let prompt = diagram_prompt(&stp());
        assert!(prompt.contains("Technology Preference: Not specified"));
        assert!(prompt.contains("Special Instructions Summary: None"));
        assert!(prompt.contains("Influent BOD: 250 mg/L"));
    }

    #[test]
    fn system_instruction_names_type_and_location() {
        let text = design_system_instruction(&stp());
        assert!(text.contains("preliminary design for a Sewage Treatment Plant (STP)."));
        assert!(text.contains("standards that apply in Telangana, India"));
        assert_eq!(offer_date(date()), "04/03/2025");
    }
}
