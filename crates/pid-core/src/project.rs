//! Project parameters collected by the proposal wizard.
//!
//! The wire format is the camelCase JSON the design service expects;
//! `ProjectType` and `EffluentType` serialize as their display labels.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Project type ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    #[serde(rename = "Sewage Treatment Plant (STP)")]
    Stp,
    #[serde(rename = "Effluent Treatment Plant (ETP)")]
    Etp,
    #[serde(rename = "Water Treatment Plant (WTP)")]
    Wtp,
    #[serde(rename = "Reverse Osmosis (RO) Plant")]
    Ro,
    #[serde(rename = "Common Effluent Treatment Plant (CETP)")]
    Cetp,
    #[serde(rename = "Solid Waste Management (SWM)")]
    Swm,
    #[serde(rename = "Waste to Energy (WTE)")]
    Wte,
}

impl ProjectType {
    /// Wizard order.
    pub const ALL: [ProjectType; 7] = [
        Self::Stp,
        Self::Etp,
        Self::Cetp,
        Self::Wtp,
        Self::Ro,
        Self::Swm,
        Self::Wte,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Stp => "Sewage Treatment Plant (STP)",
            Self::Etp => "Effluent Treatment Plant (ETP)",
            Self::Wtp => "Water Treatment Plant (WTP)",
            Self::Ro => "Reverse Osmosis (RO) Plant",
            Self::Cetp => "Common Effluent Treatment Plant (CETP)",
            Self::Swm => "Solid Waste Management (SWM)",
            Self::Wte => "Waste to Energy (WTE)",
        }
    }

    /// Short code, e.g. `STP`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Stp => "STP",
            Self::Etp => "ETP",
            Self::Wtp => "WTP",
            Self::Ro => "RO",
            Self::Cetp => "CETP",
            Self::Swm => "SWM",
            Self::Wte => "WTE",
        }
    }

    /// Accepts a code (`etp`) or a full label.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(input) || t.label() == input)
    }

    /// Solid-waste plants are sized in tonnes per day, liquid plants in KLD.
    pub fn capacity_unit(self) -> &'static str {
        if self.is_solid_waste() { "TPD" } else { "KLD" }
    }

    pub fn is_solid_waste(self) -> bool {
        matches!(self, Self::Swm | Self::Wte)
    }

    /// Industrial effluent plants, which take pollutant categories.
    pub fn takes_effluent_types(self) -> bool {
        matches!(self, Self::Etp | Self::Cetp)
    }

    pub fn technologies(self) -> &'static [Technology] {
        match self {
            Self::Stp => STP_TECHNOLOGIES,
            Self::Etp | Self::Cetp => EFFLUENT_TECHNOLOGIES,
            Self::Wtp => WTP_TECHNOLOGIES,
            Self::Ro => RO_TECHNOLOGIES,
            Self::Swm => SWM_TECHNOLOGIES,
            Self::Wte => WTE_TECHNOLOGIES,
        }
    }

    /// Input parameters shown for this plant type, in form order.
    pub fn parameters(self) -> &'static [ParameterDetail] {
        match self {
            Self::Stp => STP_PARAMETERS,
            Self::Etp | Self::Cetp => EFFLUENT_PARAMETERS,
            Self::Wtp => WTP_PARAMETERS,
            Self::Ro => RO_PARAMETERS,
            Self::Swm => SWM_PARAMETERS,
            Self::Wte => WTE_PARAMETERS,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffluentType {
    #[serde(rename = "Heavy Metals")]
    HeavyMetals,
    #[serde(rename = "Oils and Greases")]
    OilsAndGrease,
    #[serde(rename = "High TDS Effluents")]
    HighTds,
}

impl EffluentType {
    pub const ALL: [EffluentType; 3] = [Self::HeavyMetals, Self::OilsAndGrease, Self::HighTds];

    pub fn label(self) -> &'static str {
        match self {
            Self::HeavyMetals => "Heavy Metals",
            Self::OilsAndGrease => "Oils and Greases",
            Self::HighTds => "High TDS Effluents",
        }
    }
}

// ─── Catalogue ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Technology {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const fn tech(id: &'static str, name: &'static str, description: &'static str) -> Technology {
    Technology {
        id,
        name,
        description,
    }
}

const STP_TECHNOLOGIES: &[Technology] = &[
    tech("MBBR", "MBBR", "Moving Bed Biofilm Reactor"),
    tech("SBR", "SBR", "Sequencing Batch Reactor"),
    tech("MBR", "MBR", "Membrane Bioreactor"),
    tech("ASP", "ASP", "Activated Sludge Process"),
];

const EFFLUENT_TECHNOLOGIES: &[Technology] = &[
    tech("ZLD", "ZLD", "Zero Liquid Discharge"),
    tech("Physico-Chemical", "Physico-Chemical", "Chemical treatment and clarification"),
    tech("Biological", "Advanced Biological", "Biological treatment with nutrient removal"),
];

const WTP_TECHNOLOGIES: &[Technology] = &[
    tech(
        "Conventional",
        "Conventional Filtration",
        "Coagulation, flocculation, sedimentation, filtration",
    ),
    tech("UF", "Ultrafiltration (UF)", "Membrane-based filtration for fine particles"),
    tech("NF", "Nanofiltration (NF)", "Membrane-based filtration for hardness and organics"),
];

const RO_TECHNOLOGIES: &[Technology] = &[
    tech("Single Pass", "Single Pass RO", "Standard Reverse Osmosis process"),
    tech("Double Pass", "Double Pass RO", "Two-stage RO for high purity water"),
];

const SWM_TECHNOLOGIES: &[Technology] = &[
    tech(
        "OWC",
        "Organic Waste Composter (OWC)",
        "Mechanical composting for organic fraction of MSW",
    ),
    tech("Composting", "Composting", "Aerobic decomposition of organic waste"),
    tech("Vermicomposting", "Vermicomposting", "Using earthworms to decompose waste"),
    tech("Incineration", "Incineration", "Controlled burning of waste"),
    tech("Landfill", "Sanitary Landfill", "Engineered disposal of residual waste"),
];

const WTE_TECHNOLOGIES: &[Technology] = &[
    tech(
        "Incineration",
        "Incineration",
        "Mass burn combustion to generate heat/electricity",
    ),
    tech("Gasification", "Gasification", "Converting waste into syngas"),
    tech("Anaerobic Digestion", "Anaerobic Digestion", "Biogas production from organic waste"),
];

/// A regulatory jurisdiction: state pollution control board or the central board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: &'static str,
    pub name: &'static str,
}

pub const LOCATIONS: &[Location] = &[
    Location { id: "Andhra Pradesh", name: "Andhra Pradesh (APPCB)" },
    Location { id: "Arunachal Pradesh", name: "Arunachal Pradesh (APSPCB)" },
    Location { id: "Assam", name: "Assam (PCBA)" },
    Location { id: "Bihar", name: "Bihar (BSPCB)" },
    Location { id: "Chhattisgarh", name: "Chhattisgarh (CECB)" },
    Location { id: "Delhi", name: "Delhi (DPCC)" },
    Location { id: "Goa", name: "Goa (GSPCB)" },
    Location { id: "Gujarat", name: "Gujarat (GPCB)" },
    Location { id: "Haryana", name: "Haryana (HSPCB)" },
    Location { id: "Himachal Pradesh", name: "Himachal Pradesh (HPSPCB)" },
    Location { id: "Jharkhand", name: "Jharkhand (JSPCB)" },
    Location { id: "Karnataka", name: "Karnataka (KSPCB)" },
    Location { id: "Kerala", name: "Kerala (KSPCB)" },
    Location { id: "Madhya Pradesh", name: "Madhya Pradesh (MPPCB)" },
    Location { id: "Maharashtra", name: "Maharashtra (MPCB)" },
    Location { id: "Manipur", name: "Manipur (MPCB)" },
    Location { id: "Meghalaya", name: "Meghalaya (MSPCB)" },
    Location { id: "Mizoram", name: "Mizoram (MPCB)" },
    Location { id: "Nagaland", name: "Nagaland (NPCB)" },
    Location { id: "Odisha", name: "Odisha (OSPCB)" },
    Location { id: "Puducherry", name: "Puducherry (PPCC)" },
    Location { id: "Punjab", name: "Punjab (PPCB)" },
    Location { id: "Rajasthan", name: "Rajasthan (RSPCB)" },
    Location { id: "Sikkim", name: "Sikkim (SPCB)" },
    Location { id: "Tamil Nadu", name: "Tamil Nadu (TNPCB)" },
    Location { id: "Telangana", name: "Telangana (TSPCB)" },
    Location { id: "Tripura", name: "Tripura (TSPCB)" },
    Location { id: "Uttar Pradesh", name: "Uttar Pradesh (UPPCB)" },
    Location { id: "Uttarakhand", name: "Uttarakhand (UEPPCB)" },
    Location { id: "West Bengal", name: "West Bengal (WBPCB)" },
    Location { id: "CPCB", name: "Central (CPCB) - Pan-India" },
];

pub fn location(id: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|l| l.id == id)
}

// ─── Parameters ──────────────────────────────────────────────────────────

/// The five numeric slots of `ProjectData`. Their meaning depends on the
/// plant type (e.g. `InputBod` is turbidity for a WTP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterName {
    FlowRate,
    #[serde(rename = "inputBOD")]
    InputBod,
    #[serde(rename = "inputCOD")]
    InputCod,
    #[serde(rename = "outputBOD")]
    OutputBod,
    #[serde(rename = "outputCOD")]
    OutputCod,
}

impl ParameterName {
    pub fn key(self) -> &'static str {
        match self {
            Self::FlowRate => "flowRate",
            Self::InputBod => "inputBOD",
            Self::InputCod => "inputCOD",
            Self::OutputBod => "outputBOD",
            Self::OutputCod => "outputCOD",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [
            Self::FlowRate,
            Self::InputBod,
            Self::InputCod,
            Self::OutputBod,
            Self::OutputCod,
        ]
        .into_iter()
        .find(|p| p.key() == key)
    }
}

/// Label, unit and accepted range of one form input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterDetail {
    pub name: ParameterName,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

const fn param(
    name: ParameterName,
    label: &'static str,
    unit: &'static str,
    min: f64,
    max: f64,
    step: f64,
) -> ParameterDetail {
    ParameterDetail {
        name,
        label,
        unit,
        min,
        max,
        step,
    }
}

use ParameterName::*;

const STP_PARAMETERS: &[ParameterDetail] = &[
    param(FlowRate, "Plant Capacity", "KLD", 1.0, 10000.0, 1.0),
    param(InputBod, "Influent BOD", "mg/L", 50.0, 1000.0, 10.0),
    param(InputCod, "Influent COD", "mg/L", 100.0, 2000.0, 10.0),
    param(OutputBod, "Effluent BOD Target", "mg/L", 5.0, 30.0, 1.0),
    param(OutputCod, "Effluent COD Target", "mg/L", 10.0, 100.0, 5.0),
];

const EFFLUENT_PARAMETERS: &[ParameterDetail] = &[
    param(FlowRate, "Plant Capacity", "KLD", 1.0, 10000.0, 1.0),
    param(InputBod, "Influent BOD", "mg/L", 100.0, 5000.0, 50.0),
    param(InputCod, "Influent COD", "mg/L", 200.0, 10000.0, 50.0),
    param(OutputBod, "Effluent BOD Target", "mg/L", 10.0, 100.0, 5.0),
    param(OutputCod, "Effluent COD Target", "mg/L", 50.0, 250.0, 10.0),
];

const WTP_PARAMETERS: &[ParameterDetail] = &[
    param(FlowRate, "Plant Capacity", "KLD", 100.0, 50000.0, 100.0),
    param(InputBod, "Influent Turbidity", "NTU", 1.0, 500.0, 5.0),
    param(InputCod, "Influent Hardness", "mg/L as CaCO₃", 50.0, 1000.0, 10.0),
    param(OutputBod, "Effluent Turbidity Target", "NTU", 0.0, 5.0, 1.0),
    param(OutputCod, "Effluent Hardness Target", "mg/L as CaCO₃", 0.0, 150.0, 5.0),
];

const RO_PARAMETERS: &[ParameterDetail] = &[
    param(FlowRate, "Plant Capacity", "KLD", 1.0, 5000.0, 1.0),
    param(InputBod, "Influent TDS", "mg/L", 200.0, 45000.0, 100.0),
    param(InputCod, "Influent Hardness", "mg/L as CaCO₃", 50.0, 2000.0, 20.0),
    param(OutputBod, "Effluent TDS Target", "mg/L", 10.0, 500.0, 10.0),
    param(OutputCod, "Recovery Rate Target", "%", 25.0, 90.0, 1.0),
];

const SWM_PARAMETERS: &[ParameterDetail] = &[
    param(FlowRate, "Plant Capacity", "TPD", 10.0, 5000.0, 10.0),
    param(InputBod, "Moisture Content", "%", 10.0, 80.0, 1.0),
    param(InputCod, "Organic Fraction", "%", 20.0, 90.0, 1.0),
    param(OutputBod, "Combustible Fraction", "%", 10.0, 70.0, 1.0),
];

const WTE_PARAMETERS: &[ParameterDetail] = &[
    param(FlowRate, "Plant Capacity", "TPD", 10.0, 5000.0, 10.0),
    param(InputBod, "Moisture Content", "%", 10.0, 80.0, 1.0),
    param(InputCod, "Calorific Value", "kcal/kg", 800.0, 4000.0, 50.0),
];

// ─── Project data ────────────────────────────────────────────────────────

/// A file attached to the special-instructions step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub name: String,
    pub mime_type: String,
    /// Base64 payload, no `data:` prefix.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub project_type: ProjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    pub location: String,
    pub flow_rate: f64,
    #[serde(rename = "inputBOD")]
    pub input_bod: f64,
    #[serde(rename = "inputCOD")]
    pub input_cod: f64,
    #[serde(rename = "outputBOD")]
    pub output_bod: f64,
    #[serde(rename = "outputCOD")]
    pub output_cod: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effluent_types: Vec<EffluentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_instructions_files: Vec<AttachedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions_audio: Option<AttachedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_price: Option<f64>,
}

/// A parameter outside its form range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterIssue {
    pub parameter: ParameterName,
    pub label: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for ParameterIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside {}..={}",
            self.label, self.value, self.min, self.max
        )
    }
}

impl ProjectData {
    /// A new project with every parameter at the bottom of its range.
    pub fn new(project_type: ProjectType, location: impl Into<String>) -> Self {
        let mut data = Self {
            project_type,
            technology: None,
            location: location.into(),
            flow_rate: 0.0,
            input_bod: 0.0,
            input_cod: 0.0,
            output_bod: 0.0,
            output_cod: 0.0,
            effluent_types: Vec::new(),
            special_instructions_text: None,
            special_instructions_files: Vec::new(),
            special_instructions_audio: None,
            from_address: None,
            to_address: None,
            estimated_price: None,
        };
        for detail in project_type.parameters() {
            data.set_value(detail.name, detail.min);
        }
        data
    }

    pub fn value(&self, name: ParameterName) -> f64 {
        match name {
            FlowRate => self.flow_rate,
            InputBod => self.input_bod,
            InputCod => self.input_cod,
            OutputBod => self.output_bod,
            OutputCod => self.output_cod,
        }
    }

    pub fn set_value(&mut self, name: ParameterName, value: f64) {
        let slot = match name {
            FlowRate => &mut self.flow_rate,
            InputBod => &mut self.input_bod,
            InputCod => &mut self.input_cod,
            OutputBod => &mut self.output_bod,
            OutputCod => &mut self.output_cod,
        };
        *slot = value;
    }

    /// Parameters shown for this project type that fall outside their range.
    pub fn validate(&self) -> Vec<ParameterIssue> {
        self.project_type
            .parameters()
            .iter()
            .filter_map(|d| {
                let value = self.value(d.name);
                let ok = value.is_finite() && value >= d.min && value <= d.max;
                (!ok).then_some(ParameterIssue {
                    parameter: d.name,
                    label: d.label,
                    value,
                    min: d.min,
                    max: d.max,
                })
            })
            .collect()
    }

    pub fn has_instructions(&self) -> bool {
        self.special_instructions_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
            || !self.special_instructions_files.is_empty()
            || self.special_instructions_audio.is_some()
    }
}
