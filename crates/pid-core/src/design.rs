//! The design service's structured result.
//!
//! Field names mirror the JSON the model is asked to produce (camelCase).
//! Every list defaults to empty so a partial answer still deserializes;
//! `is_complete` tells the caller whether anything was left out.

use crate::project::{EffluentType, ParameterName, ProjectData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DesignCalculation {
    pub parameter: String,
    pub value: String,
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplianceItem {
    pub id: String,
    pub item: String,
    pub compliant: bool,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub vendor_suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFlowDiagram {
    pub svg_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Abbreviation {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignResults {
    pub design_calculations: Vec<DesignCalculation>,
    pub process_flow_diagram: ProcessFlowDiagram,
    pub compliance_checklist: Vec<ComplianceItem>,
    pub bill_of_materials: Vec<BomItem>,
    /// Markdown.
    pub report_summary: String,
    pub abbreviations: Vec<Abbreviation>,
}

impl DesignResults {
    pub fn has_diagram(&self) -> bool {
        !self.process_flow_diagram.svg_content.trim().is_empty()
    }

    /// Names of the top-level sections that came back empty.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.design_calculations.is_empty() {
            missing.push("designCalculations");
        }
        if !self.has_diagram() {
            missing.push("processFlowDiagram");
        }
        if self.compliance_checklist.is_empty() {
            missing.push("complianceChecklist");
        }
        if self.bill_of_materials.is_empty() {
            missing.push("billOfMaterials");
        }
        if self.report_summary.trim().is_empty() {
            missing.push("reportSummary");
        }
        if self.abbreviations.is_empty() {
            missing.push("abbreviations");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_sections().is_empty()
    }

    /// Replace the diagram after a regeneration.
    pub fn set_diagram(&mut self, svg: impl Into<String>) {
        self.process_flow_diagram.svg_content = svg.into();
    }
}

// ─── Instruction analysis ────────────────────────────────────────────────

/// Values the model found in the user's free-form instructions.
///
/// Only parameters actually mentioned are present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedParameters {
    /// Keyed by `ProjectData` field name (`flowRate`, `inputBOD`, ...).
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effluent_types: Vec<EffluentType>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterAnalysis {
    pub parameters: ExtractedParameters,
    pub summary: String,
}

impl ParameterAnalysis {
    /// Merge the extracted values into `project`. Unknown keys and
    /// non-numeric values are ignored. Returns the keys that were applied.
    pub fn apply_to(&self, project: &mut ProjectData) -> Vec<ParameterName> {
        let mut applied = Vec::new();
        for (key, value) in &self.parameters.values {
            let Some(name) = ParameterName::from_key(key) else {
                log::debug!("ignoring extracted parameter `{key}`");
                continue;
            };
            let Some(value) = value.as_f64().filter(|v| v.is_finite()) else {
                continue;
            };
            project.set_value(name, value);
            applied.push(name);
        }
        if let Some(tech) = self.parameters.technology.as_deref().map(str::trim)
            && !tech.is_empty()
        {
            project.technology = Some(tech.to_string());
        }
        if !self.parameters.effluent_types.is_empty() {
            project.effluent_types = self.parameters.effluent_types.clone();
        }
        if !self.summary.trim().is_empty() {
            project.special_instructions_text = Some(self.summary.trim().to_string());
        }
        applied
    }
}

// ─── Client scope ────────────────────────────────────────────────────────

/// Items excluded from the supplier's scope, listed in every report.
pub const CLIENT_SCOPE: &[&str] = &[
    "All civil works",
    "Incoming pipeline up to battery limit",
    "Treated water outlet pipeline from battery limit",
    "Three-phase incoming power supply up to control panel",
    "Treated water storage and associated pumping systems",
    "Material lifting and unloading above 50 kg (using forklifts, cranes, etc.) to be arranged by the client, including site unloading",
    "Provision of network connectivity (Internet / Wi-Fi) for the control panel, if required",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectType;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_results_deserialize() {
        let json = r##"{"reportSummary": "# Hi", "processFlowDiagram": {"svgContent": "<svg/>"}}"##;
        let results: DesignResults = serde_json::from_str(json).unwrap();
        assert!(results.has_diagram());
        assert_eq!(
            results.missing_sections(),
            vec![
                "designCalculations",
                "complianceChecklist",
                "billOfMaterials",
                "abbreviations"
            ]
        );
    }

    #[test]
    fn bom_uses_camel_case() {
        let json = r#"{"name":"Blower","quantity":2,"unit":"Nos","vendorSuggestion":"Kay"}"#;
        let item: BomItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.vendor_suggestion, "Kay");
        assert_eq!(item.quantity, 2.0);
    }

    #[test]
    fn analysis_applies_known_keys() {
        let json = r#"{
            "parameters": {"flowRate": 250, "inputBOD": 300, "bogus": 1, "technology": "SBR",
                           "effluentTypes": ["Oils and Greases"]},
            "summary": "  250 KLD STP using SBR.  "
        }"#;
        let analysis: ParameterAnalysis = serde_json::from_str(json).unwrap();
        let mut project = ProjectData::new(ProjectType::Stp, "Kerala");
        let applied = analysis.apply_to(&mut project);
        assert_eq!(applied, vec![ParameterName::FlowRate, ParameterName::InputBod]);
        assert_eq!(project.flow_rate, 250.0);
        assert_eq!(project.technology.as_deref(), Some("SBR"));
        assert_eq!(project.effluent_types, vec![EffluentType::OilsAndGrease]);
        assert_eq!(
            project.special_instructions_text.as_deref(),
            Some("250 KLD STP using SBR.")
        );
    }

    #[test]
    fn client_scope_is_fixed() {
        assert_eq!(CLIENT_SCOPE.len(), 7);
    }
}
