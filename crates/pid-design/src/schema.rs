//! Response schemas sent with each request.
//!
//! Written in the OpenAPI subset the generateContent endpoint accepts
//! (`type` names upper-case). Field names match the camelCase wire format
//! of `pid_core::design`, so a conforming response deserializes directly.

use crate::prompt::DIAGRAM_REQUIREMENTS;
use pid_core::ProjectType;
use pid_core::project::EffluentType;
use serde_json::{Map, Value, json};

fn string_fields(fields: &[&str]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "STRING" })))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields,
    })
}

fn diagram_property() -> Value {
    json!({ "type": "STRING", "description": DIAGRAM_REQUIREMENTS })
}

/// Schema for `DesignResults`.
pub fn design_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "designCalculations": {
                "type": "ARRAY",
                "items": string_fields(&["parameter", "value", "unit", "description"]),
            },
            "processFlowDiagram": diagram_schema(),
            "complianceChecklist": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "item": { "type": "STRING" },
                        "compliant": { "type": "BOOLEAN" },
                        "details": { "type": "STRING" },
                    },
                    "required": ["id", "item", "compliant", "details"],
                },
            },
            "billOfMaterials": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "quantity": { "type": "NUMBER" },
                        "unit": { "type": "STRING" },
                        "vendorSuggestion": { "type": "STRING" },
                    },
                    "required": ["name", "quantity", "unit", "vendorSuggestion"],
                },
            },
            "reportSummary": {
                "type": "STRING",
                "description": "A summary of the design in Markdown format.",
            },
            "abbreviations": {
                "type": "ARRAY",
                "items": string_fields(&["term", "definition"]),
                "description": "Every technical acronym used in the report (BOD, COD, ETP, ...) with its full definition.",
            },
        },
        "required": [
            "designCalculations",
            "processFlowDiagram",
            "complianceChecklist",
            "billOfMaterials",
            "reportSummary",
            "abbreviations",
        ],
    })
}

/// Schema for `ProcessFlowDiagram`, alone or nested in a design.
pub fn diagram_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": { "svgContent": diagram_property() },
        "required": ["svgContent"],
    })
}

/// Schema for `ParameterAnalysis`; the parameter keys depend on the plant type.
pub fn analysis_schema(project_type: ProjectType) -> Value {
    let mut parameters = Map::new();
    for detail in project_type.parameters() {
        parameters.insert(
            detail.name.key().to_string(),
            json!({
                "type": "NUMBER",
                "description": format!("The value for \"{}\" in {}.", detail.label, detail.unit),
            }),
        );
    }

    let ids: Vec<&str> = project_type.technologies().iter().map(|t| t.id).collect();
    parameters.insert(
        "technology".to_string(),
        json!({
            "type": "STRING",
            "description": format!(
                "The treatment technology mentioned (e.g. \"MBBR\", \"SBR\", \"ZLD\"). Possible values: {}.",
                ids.join(", ")
            ),
        }),
    );

    if project_type == ProjectType::Etp {
        let kinds: Vec<String> = EffluentType::ALL
            .iter()
            .map(|e| format!("\"{}\"", e.label()))
            .collect();
        parameters.insert(
            "effluentTypes".to_string(),
            json!({
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": format!("Effluent types to treat. Possible values: {}.", kinds.join(", ")),
            }),
        );
    }

    json!({
        "type": "OBJECT",
        "properties": {
            "parameters": {
                "type": "OBJECT",
                "properties": parameters,
                "description": "The extracted parameters. Include a parameter only when a specific value is mentioned or clearly implied; never guess or use defaults.",
            },
            "summary": {
                "type": "STRING",
                "description": "A concise one-paragraph summary of all the user's special instructions from text, files and audio, shown to the user for confirmation.",
            },
        },
        "required": ["parameters", "summary"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn design_schema_requires_every_section() {
        let schema = design_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required.len(), 6);
        for key in &required {
            assert!(schema["properties"].get(*key).is_some(), "{key}");
        }
        assert_eq!(
            schema["properties"]["billOfMaterials"]["items"]["properties"]["quantity"]["type"],
            "NUMBER"
        );
    }

    #[test]
    fn diagram_schema_is_shared() {
        assert_eq!(
            design_schema()["properties"]["processFlowDiagram"],
            diagram_schema()
        );
        let description = diagram_schema()["properties"]["svgContent"]["description"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(description.contains("equipment-unit"));
        assert!(description.contains("pipe-flow"));
        assert!(description.contains("pid-legend"));
    }

    #[test]
    fn analysis_keys_follow_project_type() {
        let stp = analysis_schema(ProjectType::Stp);
        let props = &stp["properties"]["parameters"]["properties"];
        for key in ["flowRate", "inputBOD", "inputCOD", "outputBOD", "outputCOD", "technology"] {
            assert!(props.get(key).is_some(), "{key}");
        }
        assert!(props.get("effluentTypes").is_none());

        let wte = analysis_schema(ProjectType::Wte);
        let props = &wte["properties"]["parameters"]["properties"];
        assert!(props.get("outputBOD").is_none());

        let etp = analysis_schema(ProjectType::Etp);
        assert!(
            etp["properties"]["parameters"]["properties"]["effluentTypes"]["description"]
                .as_str()
                .unwrap()
                .contains("\"Oils and Greases\"")
        );
    }
}
