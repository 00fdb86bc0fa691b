//! Parsing helpers for text-analysis responses
//!
//! Models often wrap the JSON payload in extra prose, so the outermost
//! `{...}` slice is extracted before deserializing.

use crate::error::{Error, Result};

use super::types::{Narrative, NarrativeAnalysis};

fn truncate_raw(s: &str) -> String {
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Parse a narrative from a model response
///
/// A JSON object must match the structured schema. A response without any
/// JSON object is accepted as free text; an empty response is an error.
pub fn parse_narrative(response: &str) -> Result<Narrative> {
    let response = response.trim();
    if response.is_empty() {
        return Err(Error::InvalidData("Empty narrative response".into()));
    }

    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            let analysis: NarrativeAnalysis = serde_json::from_str(json_str).map_err(|e| {
                Error::InvalidData(format!(
                    "Invalid narrative JSON from AI: {} | Raw: {}",
                    e,
                    truncate_raw(json_str)
                ))
            })?;
            if analysis.is_empty() {
                return Err(Error::InvalidData(format!(
                    "Narrative JSON has no content | Raw: {}",
                    truncate_raw(json_str)
                )));
            }
            Ok(Narrative::Structured(analysis))
        }
        (Some(_), _) | (_, Some(_)) => Err(Error::InvalidData(format!(
            "Malformed JSON in narrative response | Raw: {}",
            truncate_raw(response)
        ))),
        _ => Ok(Narrative::Text(response.to_string())),
    }
}
