//! CSS for the wisp tree builder.
//!
//! # Scope
//!
//! - **Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization)),
//!   reduced to the token kinds a rule list needs. Numbers keep their source text.
//! - **Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)): style rules
//!   with comma-separated selector lists and `name: value [!important]` declarations.
//!   At-rules are skipped.
//! - **Selectors**: type, `#id` and `.class` simple selectors joined by the descendant
//!   combinator. Anything else is rejected with a [`SelectorError`].
//! - **Cascade**: [`RuleSet`] collects rules as `<style>` blocks close and computes an
//!   element's style from the rules matching it.
//!
//! # Matching
//!
//! A selector is stored reversed, target first. Matching checks the target against the
//! element, then walks the ancestors innermost-first, advancing to the next selector part
//! whenever an ancestor matches it. The selector matches if every part was consumed.
//!
//! # Not Implemented
//!
//! - Specificity (later rules win, `!important` beats normal declarations)
//! - Compound, attribute, pseudo-class and universal selectors
//! - Child and sibling combinators
//! - Property inheritance

/// Style computation over a growing rule set.
pub mod cascade;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// Selector parsing and the relaxed descendant matcher.
pub mod selector;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

pub use cascade::{CompiledRule, RuleSet};
pub use parser::{
    CSSParser, CssSyntaxParser, Declaration, StyleRule, Stylesheet, StylesheetParser,
};
pub use selector::{ParsedSelector, SelectorError, SimpleSelector, parse_selector};
pub use tokenizer::{CSSToken, CSSTokenizer};
