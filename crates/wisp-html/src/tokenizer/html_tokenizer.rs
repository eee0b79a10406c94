use strum_macros::Display;
use wisp_dom::Attribute;

use super::token::Token;
use crate::error::HtmlError;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. The tokenizer is always in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    ///
    /// Also swallows `<!DOCTYPE ...>`.
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// Seen `<!`. Without lookahead, `--` is recognised one dash at a time.
    MarkupDeclarationOpen,
    /// Seen `<!-`.
    CommentStart,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// Input is pushed one character at a time with [`feed_char`](Self::feed_char)
/// and finished with [`end_of_input`](Self::end_of_input). Tokens accumulate
/// until [`take_tokens`](Self::take_tokens) drains them.
#[derive(Debug)]
pub struct HTMLTokenizer {
    pub(super) state: TokenizerState,
    pub(super) current_input_character: Option<char>,
    pub(super) current_token: Option<Token>,
    pub(super) current_attribute: Option<Attribute>,
    pub(super) token_stream: Vec<Token>,
    // When true, the current character is dispatched again in the new state
    // instead of returning to wait for the next one.
    pub(super) reconsume: bool,
    pub(super) at_eof: bool,
    pub(super) position: usize,
    failure: Option<HtmlError>,
}

impl Default for HTMLTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HTMLTokenizer {
    /// "The initial state is the data state."
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: TokenizerState::Data,
            current_input_character: None,
            current_token: None,
            current_attribute: None,
            token_stream: Vec::new(),
            reconsume: false,
            at_eof: false,
            position: 0,
            failure: None,
        }
    }

    /// Tokenize a complete document in one call.
    ///
    /// # Errors
    ///
    /// Returns the first tokenizer error.
    pub fn tokenize(input: &str) -> Result<Vec<Token>, HtmlError> {
        let mut tokenizer = Self::new();
        tokenizer.feed_str(input)?;
        tokenizer.end_of_input()?;
        Ok(tokenizer.into_tokens())
    }

    /// The state the next character will be consumed in.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Whether the end-of-input token has been emitted.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.at_eof
    }

    /// Tokens emitted so far and not yet taken.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.token_stream
    }

    /// Drain the tokens emitted so far.
    pub fn take_tokens(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.token_stream)
    }

    /// Consume the tokenizer and return the remaining tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Feed every character of `input`.
    ///
    /// # Errors
    ///
    /// See [`feed_char`](Self::feed_char).
    pub fn feed_str(&mut self, input: &str) -> Result<(), HtmlError> {
        input.chars().try_for_each(|c| self.feed_char(c))
    }

    /// Consume one input character.
    ///
    /// Characters fed after end of input are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::UnexpectedCharacter`] for a character the current
    /// state has no transition for. Errors are sticky.
    pub fn feed_char(&mut self, c: char) -> Result<(), HtmlError> {
        if self.at_eof {
            return Ok(());
        }
        self.position += 1;
        self.consume(Some(c))
    }

    /// Signal end of input.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::TruncatedInput`] unless the tokenizer is in the
    /// data state.
    pub fn end_of_input(&mut self) -> Result<(), HtmlError> {
        if self.at_eof {
            return Ok(());
        }
        self.consume(None)
    }

    fn consume(&mut self, input: Option<char>) -> Result<(), HtmlError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.current_input_character = input;
        if let Err(error) = self.run() {
            self.failure = Some(error.clone());
            return Err(error);
        }
        Ok(())
    }

    /// Dispatch the current input character, again for as long as the
    /// handlers ask to reconsume it.
    fn run(&mut self) -> Result<(), HtmlError> {
        loop {
            self.reconsume = false;
            match self.state {
                TokenizerState::Data => self.handle_data_state(),
                TokenizerState::TagOpen => self.handle_tag_open_state()?,
                TokenizerState::EndTagOpen => self.handle_end_tag_open_state()?,
                TokenizerState::TagName => self.handle_tag_name_state()?,
                TokenizerState::BeforeAttributeName => {
                    self.handle_before_attribute_name_state()?;
                }
                TokenizerState::AttributeName => self.handle_attribute_name_state()?,
                TokenizerState::AfterAttributeName => {
                    self.handle_after_attribute_name_state()?;
                }
                TokenizerState::BeforeAttributeValue => {
                    self.handle_before_attribute_value_state()?;
                }
                TokenizerState::AttributeValueDoubleQuoted => {
                    self.handle_attribute_value_quoted_state('"')?;
                }
                TokenizerState::AttributeValueSingleQuoted => {
                    self.handle_attribute_value_quoted_state('\'')?;
                }
                TokenizerState::AttributeValueUnquoted => {
                    self.handle_attribute_value_unquoted_state()?;
                }
                TokenizerState::AfterAttributeValueQuoted => {
                    self.handle_after_attribute_value_quoted_state()?;
                }
                TokenizerState::SelfClosingStartTag => {
                    self.handle_self_closing_start_tag_state()?;
                }
                TokenizerState::MarkupDeclarationOpen => {
                    self.handle_markup_declaration_open_state()?;
                }
                TokenizerState::CommentStart => self.handle_comment_start_state()?,
                TokenizerState::Comment => self.handle_comment_state()?,
                TokenizerState::CommentEndDash => self.handle_comment_end_dash_state()?,
                TokenizerState::CommentEnd => self.handle_comment_end_state()?,
                TokenizerState::BogusComment => self.handle_bogus_comment_state()?,
            }
            if !self.reconsume {
                return Ok(());
            }
        }
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => self.switch_to(TokenizerState::TagOpen),
            // "EOF - Emit an end-of-file token."
            None => {
                self.token_stream.push(Token::EndOfInput);
                self.at_eof = true;
            }
            // "Anything else - Emit the current input character as a character token."
            Some(c) => self.token_stream.push(Token::Text(c)),
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            // "ASCII alpha - Create a new start tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            None => return Err(self.truncated()),
            Some(c) => return Err(self.unexpected(c)),
        }
        Ok(())
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            // "ASCII alpha - Create a new end tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            None => return Err(self.truncated()),
            // `</>` and anything else that is not a name.
            Some(c) => return Err(self.unexpected(c)),
        }
        Ok(())
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+002F SOLIDUS (/) - Switch to the self-closing start tag state."
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('\0') => return Err(self.unexpected('\0')),
            None => return Err(self.truncated()),
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current tag token's tag name."
            // "Anything else - Append the current input character to the current tag
            // token's tag name."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            // "Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF -
            // Reconsume in the after attribute name state."
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "U+003D EQUALS SIGN (=) - This is an unexpected-equals-sign-before-attribute-name
            // parse error."
            Some('=') => return Err(self.unexpected('=')),
            // "Anything else - Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the attribute name state."
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE, U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF -
            // Reconsume in the after attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "U+003D EQUALS SIGN (=) - Switch to the before attribute value state."
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            // "U+0022 QUOTATION MARK (\"), U+0027 APOSTROPHE ('), U+003C LESS-THAN SIGN (<) -
            // This is an unexpected-character-in-attribute-name parse error."
            Some(c @ ('"' | '\'' | '<' | '\0')) => return Err(self.unexpected(c)),
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current attribute's name."
            Some(c) => {
                if let Some(ref mut attribute) = self.current_attribute {
                    attribute.name.push(c.to_ascii_lowercase());
                }
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => return Err(self.truncated()),
            // "Anything else - Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the attribute name state."
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-attribute-value parse error.
            // Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => return Err(self.truncated()),
            // "Anything else - Reconsume in the attribute value (unquoted) state."
            Some(_) => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
        }
        Ok(())
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    ///
    /// Both quote styles accumulate into the current attribute's value.
    fn handle_attribute_value_quoted_state(&mut self, quote: char) -> Result<(), HtmlError> {
        match self.current_input_character {
            // "Switch to the after attribute value (quoted) state."
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            Some('\0') => return Err(self.unexpected('\0')),
            None => return Err(self.truncated()),
            // "Anything else - Append the current input character to the current attribute's value."
            Some(c) => self.append_to_attribute_value(c),
        }
        Ok(())
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // The value ends here; `<img src=a.png/>` is self-closing.
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            // "U+0022 QUOTATION MARK (\"), U+0027 APOSTROPHE ('), U+003C LESS-THAN SIGN (<),
            // U+003D EQUALS SIGN (=), U+0060 GRAVE ACCENT (`) - This is an
            // unexpected-character-in-unquoted-attribute-value parse error."
            Some(c @ ('"' | '\'' | '<' | '=' | '`' | '\0')) => return Err(self.unexpected(c)),
            None => return Err(self.truncated()),
            Some(c) => self.append_to_attribute_value(c),
        }
        Ok(())
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => return Err(self.truncated()),
            // "Anything else - This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.log_parse_error("missing whitespace between attributes");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Set the self-closing flag of the current
            // tag token. Switch to the data state. Emit the current token."
            Some('>') => {
                if let Some(ref mut token) = self.current_token {
                    token.set_self_closing();
                }
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => return Err(self.truncated()),
            Some(c) => return Err(self.unexpected(c)),
        }
        Ok(())
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// A leading `-` may start a comment. Anything else, DOCTYPE included, is
    /// skipped up to the next `>`.
    fn handle_markup_declaration_open_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentStart),
            None => return Err(self.truncated()),
            Some(_) => self.reconsume_in(TokenizerState::BogusComment),
        }
        Ok(())
    }

    /// Seen `<!-`; a second dash opens the comment.
    fn handle_comment_start_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::Comment),
            None => return Err(self.truncated()),
            Some(_) => {
                self.log_parse_error("incorrectly opened comment");
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    fn handle_comment_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            None => return Err(self.truncated()),
            Some(_) => {}
        }
        Ok(())
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    fn handle_comment_end_dash_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => return Err(self.truncated()),
            Some(_) => self.reconsume_in(TokenizerState::Comment),
        }
        Ok(())
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn handle_comment_end_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::Data),
            // `--->`: the extra dash is comment data.
            Some('-') => {}
            None => return Err(self.truncated()),
            Some(_) => self.reconsume_in(TokenizerState::Comment),
        }
        Ok(())
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) -> Result<(), HtmlError> {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::Data),
            None => return Err(self.truncated()),
            Some(_) => {}
        }
        Ok(())
    }
}
