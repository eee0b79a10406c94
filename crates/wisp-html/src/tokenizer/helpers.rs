//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! - State transitions ("Switch to", "Reconsume in")
//! - Token emission ("Emit the current token")
//! - Attribute bookkeeping and duplicate handling
//! - Error construction and recoverable warnings

use wisp_common::warning::warn_once;
use wisp_dom::Attribute;

use super::html_tokenizer::{HTMLTokenizer, TokenizerState};
use crate::error::HtmlError;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    ///
    /// The next input character is consumed in the new state.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The current input character is dispatched again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    ///
    /// "U+0009 TAB, U+000A LF, U+000C FF, or U+0020 SPACE", plus U+000D CR
    /// because input arrives without newline normalization.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C' | '\r')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current token"
    ///
    /// Any attribute still being built is added to the token first.
    pub(super) fn emit_token(&mut self) {
        self.commit_attribute();
        if let Some(token) = self.current_token.take() {
            self.token_stream.push(token);
        }
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Start a new attribute in the current tag token. Set that attribute name
    /// and value to the empty string."
    pub(super) fn start_new_attribute(&mut self) {
        self.commit_attribute();
        self.current_attribute = Some(Attribute::new(String::new(), String::new()));
    }

    /// "Append the current input character to the current attribute's value."
    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(ref mut attribute) = self.current_attribute {
            attribute.value.push(c);
        }
    }

    /// Move the attribute being built onto the current tag token.
    ///
    /// A repeated name overwrites the earlier value and is reported.
    pub(super) fn commit_attribute(&mut self) {
        let Some(attribute) = self.current_attribute.take() else {
            return;
        };
        let Some(ref mut token) = self.current_token else {
            return;
        };
        let name = attribute.name.clone();
        if token.add_attribute(attribute).is_some() {
            let tag = token.tag_name().unwrap_or_default().to_string();
            self.log_parse_error(&format!("duplicate attribute '{name}' on <{tag}>"));
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// Report a recoverable oddity through the shared warning system.
    pub(super) fn log_parse_error(&self, message: &str) {
        let pos = self.position;
        warn_once("HTML Tokenizer", &format!("{message} at character {pos}"));
    }

    /// End of input outside the data state.
    pub(super) fn truncated(&self) -> HtmlError {
        HtmlError::TruncatedInput {
            state: self.state.to_string(),
        }
    }

    /// A character the current state has no transition for.
    pub(super) fn unexpected(&self, character: char) -> HtmlError {
        HtmlError::UnexpectedCharacter {
            state: self.state.to_string(),
            character,
        }
    }
}
