//! Tree construction from the token stream.
//!
//! Much simpler than [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction):
//! there are no insertion modes, no implied tags and no error recovery. Every
//! end tag must close the element on top of the stack.

use wisp_css::{CssSyntaxParser, RuleSet, StylesheetParser};
use wisp_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::error::HtmlError;
use crate::tokenizer::Token;

/// Name reported for the document root in [`HtmlError::TagMismatch`].
const DOCUMENT_NAME: &str = "#document";

/// Builds a [`DomTree`] from tokens and styles elements as they are created.
///
/// Rules from a `<style>` element take effect when its end tag is processed,
/// so they apply to elements created after that point only.
#[derive(Debug)]
pub struct TreeBuilder<P = CssSyntaxParser> {
    tree: DomTree,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Always starts with the document root, which is never popped.
    stack_of_open_elements: Vec<NodeId>,

    /// Text node receiving character tokens, until the next tag.
    current_text_node: Option<NodeId>,

    rules: RuleSet,
    stylesheet_parser: P,
    compute_styles: bool,

    /// Set on the first fatal error; every later call reports it again.
    failure: Option<HtmlError>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(CssSyntaxParser)
    }
}

impl<P: StylesheetParser> TreeBuilder<P> {
    /// Create a builder that turns `<style>` text into rules with `stylesheet_parser`.
    pub fn new(stylesheet_parser: P) -> Self {
        let tree = DomTree::new();
        let root = tree.root();
        Self {
            tree,
            stack_of_open_elements: vec![root],
            current_text_node: None,
            rules: RuleSet::new(),
            stylesheet_parser,
            compute_styles: true,
            failure: None,
        }
    }

    /// Enable or disable style computation. Rules are collected either way.
    #[must_use]
    pub fn with_style_computation(mut self, enabled: bool) -> Self {
        self.compute_styles = enabled;
        self
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Rules collected so far.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The fatal error that stopped construction, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&HtmlError> {
        self.failure.as_ref()
    }

    /// Open elements from the document root to the current node.
    #[must_use]
    pub fn open_elements(&self) -> &[NodeId] {
        &self.stack_of_open_elements
    }

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or_else(|| self.tree.root())
    }

    /// Process one token.
    ///
    /// # Errors
    ///
    /// [`HtmlError::TagMismatch`] when an end tag does not close the current
    /// node, and [`HtmlError::UnclosedElements`] when end of input arrives
    /// with elements still open. After an error the builder is poisoned and
    /// every further call returns the same error.
    pub fn process_token(&mut self, token: Token) -> Result<(), HtmlError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let result = self.dispatch(token);
        if let Err(error) = &result {
            self.failure = Some(error.clone());
        }
        result
    }

    fn dispatch(&mut self, token: Token) -> Result<(), HtmlError> {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                self.insert_element(ElementData::new(name, attributes), self_closing);
                Ok(())
            }
            Token::EndTag { name } => self.close_element(&name),
            Token::Text(c) => {
                self.insert_character(c);
                Ok(())
            }
            Token::EndOfInput => self.check_all_closed(),
        }
    }

    /// Finish and hand back the tree and rules.
    ///
    /// # Errors
    ///
    /// The builder's fatal error if it failed, otherwise
    /// [`HtmlError::UnclosedElements`] if any element is still open.
    pub fn into_parts(self) -> Result<(DomTree, RuleSet), HtmlError> {
        if let Some(error) = self.failure {
            return Err(error);
        }
        self.check_all_closed()?;
        Ok((self.tree, self.rules))
    }

    fn insert_element(&mut self, mut element: ElementData, self_closing: bool) {
        if self.compute_styles {
            // The open stack is exactly the new element's ancestor chain.
            let ancestors: Vec<&ElementData> = self
                .stack_of_open_elements
                .iter()
                .rev()
                .filter_map(|&id| self.tree.as_element(id))
                .collect();
            element.computed_style = self
                .rules
                .compute_style(&element, ancestors.iter().copied());
        }

        let parent = self.current_node();
        let id = self.tree.alloc(NodeType::Element(element));
        self.tree.append_child(parent, id);
        if !self_closing {
            self.stack_of_open_elements.push(id);
        }
        self.current_text_node = None;
    }

    fn close_element(&mut self, name: &str) -> Result<(), HtmlError> {
        let current = self.current_node();
        let open_name = self.tree.as_element(current).map(|e| e.tag_name.as_str());
        if open_name != Some(name) {
            return Err(HtmlError::TagMismatch {
                expected: open_name.unwrap_or(DOCUMENT_NAME).to_string(),
                found: name.to_string(),
            });
        }

        if name == "style" {
            let css = self.tree.text_content(current);
            if !css.trim().is_empty() {
                let stylesheet = self.stylesheet_parser.parse_stylesheet(&css);
                self.rules.add_stylesheet(&stylesheet);
            }
        }

        let _ = self.stack_of_open_elements.pop();
        self.current_text_node = None;
        Ok(())
    }

    fn insert_character(&mut self, c: char) {
        let text_node = match self.current_text_node {
            Some(id) => id,
            None => {
                let parent = self.current_node();
                let id = self.tree.alloc(NodeType::Text(String::new()));
                self.tree.append_child(parent, id);
                self.current_text_node = Some(id);
                id
            }
        };
        if let Some(text) = self.tree.as_text_mut(text_node) {
            text.push(c);
        }
    }

    fn check_all_closed(&self) -> Result<(), HtmlError> {
        if self.stack_of_open_elements.len() <= 1 {
            return Ok(());
        }
        let open = self
            .stack_of_open_elements
            .iter()
            .filter_map(|&id| self.tree.as_element(id))
            .map(|element| element.tag_name.clone())
            .collect();
        Err(HtmlError::UnclosedElements { open })
    }
}
