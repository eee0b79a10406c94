use thiserror::Error;

/// A fatal problem in the markup. The parse stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtmlError {
    /// An end tag did not match the element on top of the open-element stack.
    #[error("tag mismatch: expected </{expected}>, found </{found}>")]
    TagMismatch {
        /// Tag name of the currently open element, `#document` if none.
        expected: String,
        /// Tag name of the end tag that arrived.
        found: String,
    },

    /// End of input arrived in the middle of a tag or markup declaration.
    #[error("input ended in the {state} state")]
    TruncatedInput {
        /// Tokenizer state at end of input.
        state: String,
    },

    /// A character that the tokenizer has no transition for.
    #[error("unexpected {character:?} in the {state} state")]
    UnexpectedCharacter {
        /// Tokenizer state the character arrived in.
        state: String,
        /// The offending character.
        character: char,
    },

    /// End of input arrived with elements still open.
    #[error("input ended with unclosed elements: {}", .open.join(" > "))]
    UnclosedElements {
        /// Tag names of the open elements, outermost first.
        open: Vec<String>,
    },
}
