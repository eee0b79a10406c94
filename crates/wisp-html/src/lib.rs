//! HTML tokenizer and tree builder for wisp.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, tag and attribute states with reconsume semantics
//!   - Comments and DOCTYPEs, skipped without producing tokens
//!   - Incremental input, one character at a time
//!
//! - **Tree Builder**
//!   - A single open-element stack; every end tag must close the current node
//!   - Adjacent text joined into one text node
//!   - Styles computed for each element as it is created, from the rules of
//!     `<style>` elements closed before it
//!
//! # Not Implemented
//!
//! - RCDATA, RAWTEXT, script data and CDATA states
//! - Character references
//! - Insertion modes, implied end tags and error recovery
//!
//! ```
//! use wisp_html::parse_document;
//!
//! let document = parse_document("<style>p { color: red }</style><p>hi</p>")?;
//! let p = document.tree.elements_by_tag_name("p")[0];
//! let style = &document.tree.as_element(p).unwrap().computed_style;
//! assert_eq!(style.get("color").map(String::as_str), Some("red"));
//! # Ok::<(), wisp_html::HtmlError>(())
//! ```

/// Errors that abort a parse.
pub mod error;
/// Tree construction and the parser driver.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use error::HtmlError;
pub use parser::{Document, HTMLParser, TreeBuilder, parse_document, print_tree, tree_to_string};
pub use tokenizer::{HTMLTokenizer, Token, TokenizerState};
