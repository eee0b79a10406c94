//! Selector parsing and matching.
//!
//! Only descendant chains of simple selectors are supported:
//!
//! ```text
//! selector := simple (whitespace simple)*
//! simple   := name | "#" name | "." name
//! ```
//!
//! A parsed selector stores its parts reversed, so `parts[0]` is tested
//! against the element itself and the remaining parts against its ancestors,
//! nearest first.

use serde::Serialize;
use thiserror::Error;
use wisp_dom::{DomTree, ElementData, NodeId};

/// A single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Examples: `div`, `p`, `body`, `h1`
    Type(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Example: `#main`
    Id(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Example: `.highlight`
    ///
    /// NOTE: The whole `class` attribute is compared, so `.a` does not match
    /// `class="a b"`.
    Class(String),
}

impl SimpleSelector {
    /// Check whether `element` satisfies this condition.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.tag_name == *name,
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.class_name() == Some(class.as_str()),
        }
    }
}

/// Why a selector could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector text was empty or all whitespace.
    #[error("empty selector")]
    Empty,

    /// The selector uses syntax outside the supported subset.
    #[error("unsupported selector '{selector}': {reason}")]
    Unsupported {
        /// The full selector text.
        selector: String,
        /// Which part was rejected and why.
        reason: String,
    },
}

/// A descendant selector, stored target first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSelector {
    /// The selector as written, whitespace collapsed.
    pub text: String,
    /// Simple selectors in reverse source order.
    pub parts: Vec<SimpleSelector>,
}

impl ParsedSelector {
    /// The part the element itself must match.
    #[must_use]
    pub fn subject(&self) -> Option<&SimpleSelector> {
        self.parts.first()
    }

    /// Match against an element and its ancestors, innermost first.
    ///
    /// The element must match `parts[0]`. Then each ancestor that matches the
    /// next outstanding part consumes it; ancestors that don't are skipped.
    /// The selector matches once every part has been consumed.
    #[must_use]
    pub fn matches<'a>(
        &self,
        element: &ElementData,
        ancestors: impl IntoIterator<Item = &'a ElementData>,
    ) -> bool {
        let Some(subject) = self.subject() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }

        let mut next = 1;
        for ancestor in ancestors {
            if next >= self.parts.len() {
                break;
            }
            if self.parts[next].matches(ancestor) {
                next += 1;
            }
        }
        next >= self.parts.len()
    }

    /// Match against an element already placed in `tree`, using its ancestor chain.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        let Some(element) = tree.as_element(node_id) else {
            return false;
        };
        self.matches(
            element,
            tree.ancestors(node_id).filter_map(|id| tree.as_element(id)),
        )
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn parse_simple(selector: &str, part: &str) -> Result<SimpleSelector, SelectorError> {
    let unsupported = |reason: String| SelectorError::Unsupported {
        selector: selector.to_string(),
        reason,
    };

    let (kind, name): (fn(String) -> SimpleSelector, &str) =
        if let Some(name) = part.strip_prefix('#') {
            (SimpleSelector::Id, name)
        } else if let Some(name) = part.strip_prefix('.') {
            (SimpleSelector::Class, name)
        } else {
            (SimpleSelector::Type, part)
        };

    if name.is_empty() {
        return Err(unsupported(format!("'{part}' has no name")));
    }
    if let Some(bad) = name.chars().find(|&c| !is_name_char(c)) {
        let reason = match bad {
            '>' | '+' | '~' => format!("combinator '{bad}' is not supported"),
            '*' => "universal selector is not supported".to_string(),
            '[' => "attribute selectors are not supported".to_string(),
            ':' => "pseudo-classes are not supported".to_string(),
            '#' | '.' => format!("compound selector '{part}' is not supported"),
            _ => format!("unexpected '{bad}' in '{part}'"),
        };
        return Err(unsupported(reason));
    }

    Ok(match kind(name.to_string()) {
        SimpleSelector::Type(tag) => SimpleSelector::Type(tag.to_ascii_lowercase()),
        other => other,
    })
}

/// Parse a descendant selector such as `body div #myid`.
///
/// # Errors
///
/// Returns [`SelectorError::Empty`] for blank input and
/// [`SelectorError::Unsupported`] for anything beyond type, id and class
/// selectors separated by whitespace.
pub fn parse_selector(raw: &str) -> Result<ParsedSelector, SelectorError> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    if words.is_empty() {
        return Err(SelectorError::Empty);
    }
    let text = words.join(" ");

    let parts = words
        .iter()
        .rev()
        .map(|part| parse_simple(&text, part))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedSelector { text, parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_dom::Attribute;

    fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        ElementData::new(
            tag,
            attrs
                .iter()
                .map(|(name, value)| Attribute::new(*name, *value))
                .collect(),
        )
    }

    #[test]
    fn test_parse_reverses_parts() {
        let selector = parse_selector("  body   div\t#myid ").unwrap();
        assert_eq!(selector.text, "body div #myid");
        assert_eq!(
            selector.parts,
            vec![
                SimpleSelector::Id("myid".into()),
                SimpleSelector::Type("div".into()),
                SimpleSelector::Type("body".into()),
            ]
        );
    }

    #[test]
    fn test_type_selectors_are_lowercased() {
        let selector = parse_selector("DIV .Note").unwrap();
        assert_eq!(
            selector.parts,
            vec![
                SimpleSelector::Class("Note".into()),
                SimpleSelector::Type("div".into()),
            ]
        );
    }

    #[test]
    fn test_rejects_unsupported_syntax() {
        for raw in ["div > p", "a:hover", "*", "div.note", "[href]", "#", "p ~ a"] {
            assert!(
                matches!(parse_selector(raw), Err(SelectorError::Unsupported { .. })),
                "{raw} should be rejected"
            );
        }
        assert_eq!(parse_selector("   "), Err(SelectorError::Empty));
    }

    #[test]
    fn test_simple_selector_matching() {
        let img = element("img", &[("id", "myid"), ("class", "a b")]);
        assert!(SimpleSelector::Type("img".into()).matches(&img));
        assert!(SimpleSelector::Id("myid".into()).matches(&img));
        assert!(SimpleSelector::Class("a b".into()).matches(&img));
        assert!(!SimpleSelector::Class("a".into()).matches(&img));
        assert!(!SimpleSelector::Id("other".into()).matches(&img));
    }

    #[test]
    fn test_ancestors_need_not_be_contiguous() {
        let body = element("body", &[]);
        let div = element("div", &[]);
        let span = element("span", &[]);
        let img = element("img", &[]);

        let selector = parse_selector("body div img").unwrap();
        assert!(selector.matches(&img, [&div, &body]));
        assert!(selector.matches(&img, [&span, &div, &span, &body]));
        assert!(!selector.matches(&img, [&body, &div]));
        assert!(!selector.matches(&span, [&div, &body]));
    }

    #[test]
    fn test_single_part_ignores_ancestors() {
        let selector = parse_selector("img").unwrap();
        let img = element("img", &[]);
        assert!(selector.matches(&img, []));
    }
}
