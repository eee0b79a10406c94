use serde::Serialize;
use wisp_css::{CssSyntaxParser, RuleSet, StylesheetParser};
use wisp_dom::DomTree;

use super::tree_builder::TreeBuilder;
use crate::error::HtmlError;
use crate::tokenizer::HTMLTokenizer;

/// The result of a complete parse.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// The element tree with computed styles.
    pub tree: DomTree,
    /// Every rule collected from `<style>` elements, in document order.
    pub rules: RuleSet,
}

/// Drives an [`HTMLTokenizer`] and a [`TreeBuilder`] together.
///
/// Text can be fed in pieces; tokens are handed to the builder as soon as
/// each piece has been tokenized.
#[derive(Debug)]
pub struct HTMLParser<P = CssSyntaxParser> {
    tokenizer: HTMLTokenizer,
    builder: TreeBuilder<P>,
}

impl Default for HTMLParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HTMLParser {
    /// A parser using the built-in CSS parser for `<style>` blocks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_builder(TreeBuilder::default())
    }
}

impl<P: StylesheetParser> HTMLParser<P> {
    /// A parser around a configured tree builder.
    pub const fn with_builder(builder: TreeBuilder<P>) -> Self {
        Self {
            tokenizer: HTMLTokenizer::new(),
            builder,
        }
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        self.builder.tree()
    }

    /// Feed the next piece of markup.
    ///
    /// # Errors
    ///
    /// Returns the first tokenizer or tree construction error. Errors are
    /// fatal: once one is returned, every later call returns it again.
    pub fn feed(&mut self, text: &str) -> Result<(), HtmlError> {
        self.check_failure()?;
        self.tokenizer.feed_str(text)?;
        self.drain_tokens()
    }

    /// Signal end of input and return the finished document.
    ///
    /// # Errors
    ///
    /// [`HtmlError::TruncatedInput`] if input stopped inside a tag, and
    /// [`HtmlError::UnclosedElements`] if elements are still open.
    pub fn finish(mut self) -> Result<Document, HtmlError> {
        self.check_failure()?;
        self.tokenizer.end_of_input()?;
        self.drain_tokens()?;
        let (tree, rules) = self.builder.into_parts()?;
        Ok(Document { tree, rules })
    }

    fn check_failure(&self) -> Result<(), HtmlError> {
        match self.builder.failure() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn drain_tokens(&mut self) -> Result<(), HtmlError> {
        for token in self.tokenizer.take_tokens() {
            self.builder.process_token(token)?;
        }
        Ok(())
    }
}

/// Parse a complete document with a fresh parser.
///
/// # Errors
///
/// See [`HTMLParser::feed`] and [`HTMLParser::finish`].
pub fn parse_document(html: &str) -> Result<Document, HtmlError> {
    let mut parser = HTMLParser::new();
    parser.feed(html)?;
    parser.finish()
}
