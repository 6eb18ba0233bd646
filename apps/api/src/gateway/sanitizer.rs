//! Response Sanitizer — pulls the JSON object out of free-form model output.
//!
//! The model is told to answer with a bare JSON object but routinely wraps it
//! in prose or markdown fences. Extraction is a heuristic: strip fences, then
//! take everything from the first `{` to the last `}`. When that region does
//! not parse, a string-aware brace matcher starting at the first `{` is tried.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed model response: {0}")]
pub struct MalformedResponse(pub String);

/// Returns the brace-delimited payload embedded in `raw`.
pub fn extract_payload(raw: &str) -> Result<&str, MalformedResponse> {
    let text = strip_json_fences(raw);

    let start = text
        .find('{')
        .ok_or_else(|| MalformedResponse("no opening brace".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| MalformedResponse("no closing brace".to_string()))?;

    if end < start {
        return Err(MalformedResponse(
            "closing brace precedes opening brace".to_string(),
        ));
    }

    Ok(&text[start..=end])
}

/// Extracts and parses the payload.
pub fn parse_payload(raw: &str) -> Result<Value, MalformedResponse> {
    let candidate = extract_payload(raw)?;

    let first_err = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    // `candidate` starts at the first `{`, so the balanced region starts there too.
    balanced_object(candidate)
        .and_then(|region| serde_json::from_str::<Value>(region).ok())
        .ok_or_else(|| MalformedResponse(format!("payload is not valid JSON: {first_err}")))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };

    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped)
}

/// Returns the object starting at `text[0] == '{'` up to its matching `}`,
/// ignoring braces inside string literals.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
