use std::collections::BTreeMap;

use scraper::node::Element;
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::error::ExtractError;
use crate::types::{
    DEFAULT_FORM_METHOD, DEFAULT_HREF, ElementKind, InteractiveElement, NO_ACTION,
    NO_PLACEHOLDER, UNNAMED_BUTTON, UNNAMED_LINK,
};

/// The closed set of element categories the extractor recognizes.
///
/// Each category is scanned independently over the whole document, so a node
/// matching two predicates shows up once per matching scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Button,
    Input,
    Select,
    Form,
    Link,
}

impl Category {
    /// Order in which categories appear in the inventory.
    pub const SCAN_ORDER: [Category; 5] = [
        Category::Button,
        Category::Input,
        Category::Select,
        Category::Form,
        Category::Link,
    ];

    pub fn matches(self, el: &Element) -> bool {
        let input_type = || {
            if el.name() == "input" {
                el.attr("type")
            } else {
                None
            }
        };

        match self {
            Category::Button => {
                el.name() == "button" || matches!(input_type(), Some("button" | "submit"))
            }
            Category::Input => {
                matches!(input_type(), Some("text" | "search" | "email" | "password"))
            }
            Category::Select => el.name() == "select",
            Category::Form => el.name() == "form",
            Category::Link => el.name() == "a",
        }
    }
}

/// Parse a fetched body into a document tree.
///
/// The HTML parser accepts any tag soup, so the only rejected input is one that
/// cannot be text markup at all.
pub fn parse_document(body: &str) -> Result<Html, ExtractError> {
    if body.contains('\0') {
        return Err(ExtractError::UnparsableDocument(
            "body contains NUL bytes (binary content)".to_string(),
        ));
    }
    Ok(Html::parse_document(body))
}

/// Scan a parsed document for interactive elements, category by category,
/// each in document order.
pub fn extract_elements(document: &Html) -> Vec<InteractiveElement> {
    let mut elements = Vec::new();

    for category in Category::SCAN_ORDER {
        let before = elements.len();
        elements.extend(
            document
                .tree
                .root()
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| category.matches(el.value()))
                .map(|el| build_element(category, el)),
        );
        debug!("{:?} scan matched {} elements", category, elements.len() - before);
    }

    elements
}

/// Parse and scan in one step.
pub fn extract_from_markup(body: &str) -> Result<Vec<InteractiveElement>, ExtractError> {
    let document = parse_document(body)?;
    Ok(extract_elements(&document))
}

/// Best-effort selector: `#id` when the node has a non-empty id, otherwise the
/// tag name followed by each class token. Not guaranteed to be unique.
pub fn synthesize_selector(el: &Element) -> String {
    if let Some(id) = el.attr("id").filter(|id| !id.is_empty()) {
        return format!("#{}", id);
    }

    let mut selector = el.name().to_ascii_lowercase();
    if let Some(class) = el.attr("class") {
        for token in class.split_whitespace() {
            selector.push('.');
            selector.push_str(token);
        }
    }
    selector
}

fn build_element(category: Category, el: ElementRef<'_>) -> InteractiveElement {
    let node = el.value();
    let attr = |name: &str| node.attr(name).map(str::to_string);
    // Empty values count as missing for every defaulted field.
    let non_empty = |name: &str| attr(name).filter(|v| !v.is_empty());

    let kind = match category {
        Category::Button => {
            let text = trimmed_text(el);
            let text = if text.is_empty() {
                non_empty("value").unwrap_or_else(|| UNNAMED_BUTTON.to_string())
            } else {
                text
            };
            ElementKind::Button { text }
        }
        Category::Input => ElementKind::Input {
            placeholder: non_empty("placeholder").unwrap_or_else(|| NO_PLACEHOLDER.to_string()),
            input_type: attr("type").unwrap_or_default(),
        },
        Category::Select => ElementKind::Select {
            options: el
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "option")
                .map(trimmed_text)
                .collect(),
        },
        Category::Form => ElementKind::Form {
            action: non_empty("action").unwrap_or_else(|| NO_ACTION.to_string()),
            method: non_empty("method").unwrap_or_else(|| DEFAULT_FORM_METHOD.to_string()),
        },
        Category::Link => {
            let text = trimmed_text(el);
            ElementKind::Link {
                text: if text.is_empty() {
                    UNNAMED_LINK.to_string()
                } else {
                    text
                },
                href: non_empty("href").unwrap_or_else(|| DEFAULT_HREF.to_string()),
            }
        }
    };

    InteractiveElement {
        kind,
        tag_name: node.name().to_string(),
        attributes: node
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>(),
        selector: synthesize_selector(node),
    }
}

fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<InteractiveElement> {
        extract_from_markup(html).unwrap()
    }

    #[test]
    fn id_wins_over_class() {
        let els = extract(r#"<button id="x" class="btn primary">Go</button>"#);
        assert_eq!(els.len(), 1);
        assert_eq!(els[0].selector, "#x");
    }

    #[test]
    fn id_is_not_escaped() {
        let els = extract(r#"<a id="nav:main item">Home</a>"#);
        assert_eq!(els[0].selector, "#nav:main item");
    }

    #[test]
    fn class_tokens_join_with_dots() {
        let els = extract(r#"<a class="nav link" href="/x">X</a>"#);
        assert_eq!(els[0].selector, "a.nav.link");

        let els = extract("<a class=\"  nav \t link  \">X</a>");
        assert_eq!(els[0].selector, "a.nav.link");
    }

    #[test]
    fn empty_id_and_empty_class_fall_back_to_tag() {
        let els = extract(r#"<button id="" class="">Go</button>"#);
        assert_eq!(els[0].selector, "button");
    }

    #[test]
    fn selectors_are_not_unique() {
        let els = extract("<form></form><div><form></form></div>");
        assert_eq!(els.len(), 2);
        assert_eq!(els[0].selector, "form");
        assert_eq!(els[1].selector, "form");
    }

    #[test]
    fn categories_follow_fixed_order() {
        let html = r#"
            <a href="/first">First</a>
            <form action="/s"><input type="search" name="q"></form>
            <select><option>A</option></select>
            <button>Go</button>
        "#;
        let categories: Vec<_> = extract(html).iter().map(|e| e.category()).collect();
        assert_eq!(categories, ["button", "input", "select", "form", "link"]);
    }

    #[test]
    fn document_order_within_category() {
        let html = r#"
            <div><button id="one">1</button></div>
            <input type="submit" id="two" value="Send">
            <section><button id="three">3</button></section>
        "#;
        let selectors: Vec<_> = extract(html).into_iter().map(|e| e.selector).collect();
        assert_eq!(selectors, ["#one", "#two", "#three"]);
    }

    #[test]
    fn submit_input_is_a_button() {
        let els = extract(r#"<input type="submit" value="Send">"#);
        assert_eq!(els.len(), 1);
        assert_eq!(
            els[0].kind,
            ElementKind::Button {
                text: "Send".into()
            }
        );
        assert_eq!(els[0].tag_name, "input");
    }

    #[test]
    fn button_text_fallbacks() {
        let els = extract(r#"<button>   </button><input type="button">"#);
        assert_eq!(
            els[0].kind,
            ElementKind::Button {
                text: UNNAMED_BUTTON.into()
            }
        );
        assert_eq!(
            els[1].kind,
            ElementKind::Button {
                text: UNNAMED_BUTTON.into()
            }
        );
    }

    #[test]
    fn text_like_inputs_only() {
        let html = r#"
            <input type="text" placeholder="Name">
            <input type="email">
            <input type="password">
            <input type="checkbox">
            <input type="hidden" value="t">
            <input name="no-type">
            <input type="TEXT">
        "#;
        let els = extract(html);
        assert_eq!(els.len(), 3);
        assert_eq!(
            els[0].kind,
            ElementKind::Input {
                placeholder: "Name".into(),
                input_type: "text".into()
            }
        );
        assert_eq!(
            els[1].kind,
            ElementKind::Input {
                placeholder: NO_PLACEHOLDER.into(),
                input_type: "email".into()
            }
        );
    }

    #[test]
    fn select_collects_trimmed_options_with_duplicates() {
        let html = r#"
            <select name="size">
                <option> Small </option>
                <optgroup label="big"><option>Large</option><option>Large</option></optgroup>
            </select>
        "#;
        let els = extract(html);
        assert_eq!(
            els[0].kind,
            ElementKind::Select {
                options: vec!["Small".into(), "Large".into(), "Large".into()]
            }
        );
    }

    #[test]
    fn form_defaults() {
        let els = extract(r#"<form class="signup"></form><form action="/go" method="post"></form>"#);
        assert_eq!(
            els[0].kind,
            ElementKind::Form {
                action: NO_ACTION.into(),
                method: "get".into()
            }
        );
        assert_eq!(els[0].selector, "form.signup");
        assert_eq!(
            els[1].kind,
            ElementKind::Form {
                action: "/go".into(),
                method: "post".into()
            }
        );
    }

    #[test]
    fn link_without_href() {
        let els = extract("<a>  Sign Up </a><a href=\"/x\"><img alt=\"logo\"></a>");
        assert_eq!(
            els[0].kind,
            ElementKind::Link {
                text: "Sign Up".into(),
                href: "#".into()
            }
        );
        assert_eq!(
            els[1].kind,
            ElementKind::Link {
                text: UNNAMED_LINK.into(),
                href: "/x".into()
            }
        );
    }

    #[test]
    fn empty_attributes_take_defaults() {
        let html = r#"
            <input type="submit" value="">
            <input type="text" placeholder="">
            <form action="" method=""></form>
            <a href="">Go</a>
        "#;
        let els = extract(html);
        assert_eq!(
            els[0].kind,
            ElementKind::Button {
                text: UNNAMED_BUTTON.into()
            }
        );
        assert_eq!(
            els[1].kind,
            ElementKind::Input {
                placeholder: NO_PLACEHOLDER.into(),
                input_type: "text".into()
            }
        );
        assert_eq!(
            els[2].kind,
            ElementKind::Form {
                action: NO_ACTION.into(),
                method: DEFAULT_FORM_METHOD.into()
            }
        );
        assert_eq!(
            els[3].kind,
            ElementKind::Link {
                text: "Go".into(),
                href: DEFAULT_HREF.into()
            }
        );
        // The raw attributes still carry the empty values.
        assert_eq!(els[3].attributes["href"], "");
    }

    #[test]
    fn attributes_are_mirrored() {
        let els = extract(r#"<a href="/p" data-track="cta" aria-label="Pricing">Pricing</a>"#);
        let attrs = &els[0].attributes;
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs["data-track"], "cta");
        assert_eq!(attrs["aria-label"], "Pricing");
        assert_eq!(attrs["href"], "/p");
    }

    #[test]
    fn no_interactive_elements_is_empty_not_error() {
        assert!(extract("<html><body><p>Hello</p></body></html>").is_empty());
        assert!(extract("").is_empty());
        assert!(extract("just some text").is_empty());
    }

    #[test]
    fn binary_body_is_unparsable() {
        let err = extract_from_markup("\u{0}\u{1}PNG").unwrap_err();
        assert!(matches!(err, ExtractError::UnparsableDocument(_)));
    }

    #[test]
    fn tag_soup_still_extracts() {
        let els = extract("<div><button id=b>Go<a href=/x>Link");
        assert_eq!(els[0].selector, "#b");
        assert!(els.iter().any(|e| e.category() == "link"));
    }
}
