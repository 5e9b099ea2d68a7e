//! Pulling the JSON payload out of model text.

use crate::DesignError;
use serde::de::DeserializeOwned;

/// The JSON object inside `raw`.
///
/// Accepts a bare object, one wrapped in a markdown code fence, or one
/// surrounded by stray prose. Returns `None` when there is no `{ .. }` span.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let text = strip_fence(raw.trim());
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Decode model text as `T`, tolerating fences and surrounding prose.
pub fn decode<T: DeserializeOwned>(raw: &str, context: &'static str) -> Result<T, DesignError> {
    if raw.trim().is_empty() {
        return Err(DesignError::EmptyResponse);
    }
    let json = extract_json_object(raw).unwrap_or(raw);
    serde_json::from_str(json).map_err(|source| {
        log::warn!("{context}: response was not valid JSON ({} bytes)", raw.len());
        log::trace!("{context}: raw response: {raw}");
        DesignError::InvalidJson { context, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Svg {
        #[serde(rename = "svgContent")]
        svg_content: String,
    }

    #[test]
    fn bare_object() {
        assert_eq!(extract_json_object(r#" {"a":1} "#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn fenced_object() {
        let raw = "```json\n{\"svgContent\": \"<svg/>\"}\n```\n";
        let svg: Svg = decode(raw, "diagram").unwrap();
        assert_eq!(svg.svg_content, "<svg/>");
    }

    #[test]
    fn object_inside_prose() {
        let raw = "Here is the design:\n{\"svgContent\": \"<svg>{}</svg>\"}\nThanks.";
        assert_eq!(
            extract_json_object(raw),
            Some("{\"svgContent\": \"<svg>{}</svg>\"}")
        );
    }

    #[test]
    fn no_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn decode_errors() {
        assert!(matches!(
            decode::<Svg>("   ", "diagram"),
            Err(DesignError::EmptyResponse)
        ));
        assert!(matches!(
            decode::<Svg>("{\"svgContent\": 3}", "diagram"),
            Err(DesignError::InvalidJson { context: "diagram", .. })
        ));
    }
}
