use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One interactive node found in a page, plus a selector to find it again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElement {
    #[serde(flatten)]
    pub kind: ElementKind,
    pub tag_name: String,
    /// Every attribute of the source node, verbatim.
    pub attributes: BTreeMap<String, String>,
    pub selector: String,
}

/// Category-specific payload. Serialized with a `type` tag so the inventory
/// reads as one flat JSON object per element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Button {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Input {
        placeholder: String,
        input_type: String,
    },
    Select {
        options: Vec<String>,
    },
    Form {
        action: String,
        method: String,
    },
    Link {
        text: String,
        href: String,
    },
}

impl InteractiveElement {
    pub fn category(&self) -> &'static str {
        match self.kind {
            ElementKind::Button { .. } => "button",
            ElementKind::Input { .. } => "input",
            ElementKind::Select { .. } => "select",
            ElementKind::Form { .. } => "form",
            ElementKind::Link { .. } => "link",
        }
    }
}

/// A validated tagging recommendation, most important first in any list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub element: String,
    pub reason: String,
    /// Display hint only; never checked against the page.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub selector_code: Option<String>,
}

/// Result of one end-to-end run over a URL.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub url: String,
    pub elements: Vec<InteractiveElement>,
    pub recommendations: Vec<Recommendation>,
}

pub const UNKNOWN_ELEMENT: &str = "Unknown Element";
pub const NO_REASON: &str = "No reason provided";

pub const UNNAMED_BUTTON: &str = "Unnamed Button";
pub const UNNAMED_LINK: &str = "Unnamed Link";
pub const NO_PLACEHOLDER: &str = "No placeholder";
pub const NO_ACTION: &str = "No action specified";
pub const DEFAULT_FORM_METHOD: &str = "get";
pub const DEFAULT_HREF: &str = "#";
