//! CSS Cascading and Style Computation
//!
//! A much reduced take on
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/):
//! there is no specificity and no inheritance. Matching rules apply in the
//! order they were added, so the last declaration of a property wins, except
//! that `!important` declarations beat normal ones.

use serde::Serialize;
use wisp_common::warning::warn_once;
use wisp_dom::{ComputedStyle, DomTree, ElementData, NodeId};

use crate::parser::{Declaration, Stylesheet};
use crate::selector::{ParsedSelector, parse_selector};

/// A style rule whose selectors have been parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledRule {
    /// The selectors from the rule's selector list that parsed.
    pub selectors: Vec<ParsedSelector>,
    /// The rule's declarations, in source order.
    pub declarations: Vec<Declaration>,
}

impl CompiledRule {
    /// A rule matches if any of its selectors does.
    #[must_use]
    pub fn matches<'a>(
        &self,
        element: &ElementData,
        ancestors: impl IntoIterator<Item = &'a ElementData> + Clone,
    ) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches(element, ancestors.clone()))
    }
}

/// Rules collected from every `<style>` block closed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// An empty rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Number of rules collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in the order they were added.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Append the rules of `stylesheet`.
    ///
    /// Selectors outside the supported subset are skipped with a warning. A
    /// rule is only dropped when none of its selectors survive.
    pub fn add_stylesheet(&mut self, stylesheet: &Stylesheet) {
        for rule in &stylesheet.rules {
            let selectors: Vec<ParsedSelector> = rule
                .selectors
                .iter()
                .filter_map(|text| match parse_selector(text) {
                    Ok(selector) => Some(selector),
                    Err(err) => {
                        warn_once("CSS", &format!("skipping selector: {err}"));
                        None
                    }
                })
                .collect();

            if selectors.is_empty() {
                continue;
            }
            self.rules.push(CompiledRule {
                selectors,
                declarations: rule.declarations.clone(),
            });
        }
    }

    /// Rules matching `element`, in the order they were added.
    ///
    /// `ancestors` runs from the nearest ancestor outwards.
    #[must_use]
    pub fn matching_rules<'a, 'r>(
        &'r self,
        element: &ElementData,
        ancestors: impl IntoIterator<Item = &'a ElementData> + Clone,
    ) -> Vec<&'r CompiledRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(element, ancestors.clone()))
            .collect()
    }

    /// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    ///
    /// Merge the declarations of every matching rule into a computed style.
    #[must_use]
    pub fn compute_style<'a>(
        &self,
        element: &ElementData,
        ancestors: impl IntoIterator<Item = &'a ElementData> + Clone,
    ) -> ComputedStyle {
        cascade(&self.matching_rules(element, ancestors))
    }

    /// [`compute_style`](Self::compute_style) for a node already in `tree`.
    /// Non-element nodes get an empty style.
    #[must_use]
    pub fn compute_style_in_tree(&self, tree: &DomTree, node_id: NodeId) -> ComputedStyle {
        let Some(element) = tree.as_element(node_id) else {
            return ComputedStyle::new();
        };
        let ancestors: Vec<&ElementData> = tree
            .ancestors(node_id)
            .filter_map(|id| tree.as_element(id))
            .collect();
        self.compute_style(element, ancestors.iter().copied())
    }
}

fn cascade(matched: &[&CompiledRule]) -> ComputedStyle {
    let mut style = ComputedStyle::new();
    let mut important = ComputedStyle::new();

    for declaration in matched.iter().flat_map(|rule| &rule.declarations) {
        let target = if declaration.important {
            &mut important
        } else {
            &mut style
        };
        let _ = target.insert(declaration.name.clone(), declaration.value.clone());
    }

    style.extend(important);
    style
}
