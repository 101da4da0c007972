//! Recovers a recommendation list from raw model text.
//!
//! Model replies are nominally a JSON array but arrive wrapped in code fences,
//! cut off mid-array, or with dangling commas. [`repair`] applies a fixed
//! sequence of string-level fixes, then [`recover_recommendations`] parses the
//! result strictly and validates each record. The step order matters: changing
//! it changes which malformed replies recover.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{NO_REASON, Recommendation, UNKNOWN_ELEMENT};

const OPENING_FENCES: [&str; 2] = ["```json\n", "```json\r\n"];
const CLOSING_FENCES: [&str; 2] = ["\n```", "\r\n```"];

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("trailing comma pattern is valid"));

/// Apply the text repairs, in order:
/// strip a leading ```` ```json ```` fence, strip a trailing fence, trim,
/// cut after the last `}` and close the array, drop commas before `]`/`}`.
pub fn repair(raw: &str) -> String {
    let mut text = raw;

    for fence in OPENING_FENCES {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest;
            break;
        }
    }
    for fence in CLOSING_FENCES {
        if let Some(rest) = text.strip_suffix(fence) {
            text = rest;
            break;
        }
    }

    let text = text.trim();

    // Assume the array was intact up to its last complete object.
    let closed = match text.rfind('}') {
        Some(idx) => format!("{}]", &text[..=idx]),
        None => text.to_string(),
    };

    TRAILING_COMMA.replace_all(&closed, "$1").into_owned()
}

/// Turn raw model text into validated recommendations.
///
/// Never fails: text that still is not a JSON array after [`repair`] yields an
/// empty list, indistinguishable from a model that suggested nothing.
pub fn recover_recommendations(raw: &str) -> Vec<Recommendation> {
    let cleaned = repair(raw);
    debug!("Cleaned model output: {}", cleaned);

    let records: Vec<Value> = match serde_json::from_str(&cleaned) {
        Ok(records) => records,
        Err(e) => {
            warn!("Failed to parse recommendations JSON: {}", e);
            return Vec::new();
        }
    };

    records.iter().map(validate_record).collect()
}

/// Build a recommendation from one parsed record, defaulting each missing or
/// non-string field on its own.
pub fn validate_record(record: &Value) -> Recommendation {
    let string_field = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);

    Recommendation {
        element: string_field("element").unwrap_or_else(|| UNKNOWN_ELEMENT.to_string()),
        reason: string_field("reason").unwrap_or_else(|| NO_REASON.to_string()),
        selector_code: string_field("selector_code").or_else(|| string_field("selectorCode")),
    }
}
