//! HTML tokenizer module.
//!
//! A reduced version of [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
//! data, tag and attribute states, plus just enough of the markup declaration
//! states to skip comments and DOCTYPEs.

/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// HTML tokenizer state machine implementation.
pub mod html_tokenizer;
/// Token types produced by the tokenizer.
pub mod token;

pub use html_tokenizer::{HTMLTokenizer, TokenizerState};
pub use token::Token;
