//! CSS Parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "The input to the parsing stage is a stream of tokens from the tokenization stage."
//! This parser keeps only what selector matching and the cascade use: style rules,
//! their selector lists as text, and their declarations as text.

use serde::Serialize;
use wisp_common::warning::warn_once;

use crate::tokenizer::token::tokens_to_css;
use crate::tokenizer::{CSSToken, CSSTokenizer};

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The property name, ASCII-lowercased.
    pub name: String,
    /// The value as CSS text, whitespace collapsed, without `!important`.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
///
/// A CSS style rule (selector list + declarations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRule {
    /// Each comma-separated selector, as text.
    pub selectors: Vec<String>,
    /// The declarations in this rule block.
    pub declarations: Vec<Declaration>,
}

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// A parsed CSS stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stylesheet {
    /// Style rules in source order.
    pub rules: Vec<StyleRule>,
}

/// Turns the text of a `<style>` element into a rule list.
///
/// The tree builder owns one of these and calls it each time a style
/// element closes.
pub trait StylesheetParser {
    /// Parse `css` into its style rules. Unparseable pieces are dropped.
    fn parse_stylesheet(&self, css: &str) -> Stylesheet;
}

/// The default [`StylesheetParser`], backed by [`CSSTokenizer`] and [`CSSParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CssSyntaxParser;

impl StylesheetParser for CssSyntaxParser {
    fn parse_stylesheet(&self, css: &str) -> Stylesheet {
        CSSParser::parse_css(css)
    }
}

/// CSS parser
pub struct CSSParser {
    tokens: Vec<CSSToken>,
    position: usize,
}

impl CSSParser {
    /// Create a new parser from a list of tokens.
    #[must_use]
    pub const fn new(tokens: Vec<CSSToken>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Tokenize and parse `css` in one step.
    #[must_use]
    pub fn parse_css(css: &str) -> Stylesheet {
        let mut tokenizer = CSSTokenizer::new(css);
        tokenizer.run();
        Self::new(tokenizer.into_tokens()).parse_stylesheet()
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        // "Consume a list of rules from input, with the top-level flag set."
        Stylesheet {
            rules: self.consume_list_of_rules(),
        }
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    fn consume_list_of_rules(&mut self) -> Vec<StyleRule> {
        let mut rules = Vec::new();

        loop {
            match self.peek() {
                // "<whitespace-token>", and at the top level "<CDO-token>" or "<CDC-token>":
                // "Do nothing."
                Some(CSSToken::Whitespace | CSSToken::CDO | CSSToken::CDC) => {
                    let _ = self.consume();
                }
                None | Some(CSSToken::EOF) => return rules,
                Some(CSSToken::AtKeyword(name)) => {
                    warn_once("CSS", &format!("skipping unsupported at-rule @{name}"));
                    self.consume_at_rule();
                }
                Some(_) => {
                    if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(rule);
                    }
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    ///
    /// At-rules are not supported; this consumes the prelude and any block and
    /// discards them.
    fn consume_at_rule(&mut self) {
        let _ = self.consume();
        loop {
            match self.peek() {
                Some(CSSToken::Semicolon) => {
                    let _ = self.consume();
                    return;
                }
                None | Some(CSSToken::EOF) => return,
                Some(CSSToken::LeftBrace) => {
                    self.skip_simple_block();
                    return;
                }
                Some(_) => self.skip_component_value(),
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self) -> Option<StyleRule> {
        let mut prelude_tokens = Vec::new();

        loop {
            match self.peek() {
                // "<EOF-token>: This is a parse error. Return nothing."
                None | Some(CSSToken::EOF) => return None,
                Some(CSSToken::LeftBrace) => {
                    let _ = self.consume();
                    let selectors = split_selector_list(&prelude_tokens);
                    let declarations = self.consume_list_of_declarations();
                    if self.peek() == Some(&CSSToken::RightBrace) {
                        let _ = self.consume();
                    }
                    return Some(StyleRule {
                        selectors,
                        declarations,
                    });
                }
                Some(_) => {
                    if let Some(token) = self.consume().cloned() {
                        prelude_tokens.push(token);
                    }
                }
            }
        }
    }

    /// [§ 5.4.7 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    fn skip_simple_block(&mut self) {
        let ending_token = match self.consume() {
            Some(CSSToken::LeftBrace) => CSSToken::RightBrace,
            Some(CSSToken::LeftBracket) => CSSToken::RightBracket,
            Some(CSSToken::LeftParen | CSSToken::Function(_)) => CSSToken::RightParen,
            _ => return,
        };

        loop {
            match self.peek() {
                Some(token) if *token == ending_token => {
                    let _ = self.consume();
                    return;
                }
                None | Some(CSSToken::EOF) => return,
                Some(_) => self.skip_component_value(),
            }
        }
    }

    /// [§ 5.4.8 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    fn skip_component_value(&mut self) {
        match self.peek() {
            Some(
                CSSToken::LeftBrace
                | CSSToken::LeftBracket
                | CSSToken::LeftParen
                | CSSToken::Function(_),
            ) => self.skip_simple_block(),
            Some(_) => {
                let _ = self.consume();
            }
            None => {}
        }
    }

    /// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    fn consume_list_of_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        loop {
            match self.peek() {
                Some(CSSToken::Whitespace | CSSToken::Semicolon) => {
                    let _ = self.consume();
                }
                None | Some(CSSToken::EOF | CSSToken::RightBrace) => return declarations,
                Some(CSSToken::AtKeyword(_)) => self.consume_at_rule(),
                Some(CSSToken::Ident(_)) => {
                    if let Some(decl) = self.consume_declaration() {
                        declarations.push(decl);
                    }
                }
                // "anything else: This is a parse error." Skip to the next declaration.
                Some(_) => {
                    self.skip_component_value();
                    self.skip_declaration_remnants();
                }
            }
        }
    }

    fn skip_declaration_remnants(&mut self) {
        while !matches!(
            self.peek(),
            None | Some(CSSToken::Semicolon | CSSToken::RightBrace | CSSToken::EOF)
        ) {
            self.skip_component_value();
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    fn consume_declaration(&mut self) -> Option<Declaration> {
        let name = match self.consume() {
            Some(CSSToken::Ident(name)) => name.to_ascii_lowercase(),
            _ => return None,
        };

        self.skip_whitespace();

        // "If the next input token is anything other than a <colon-token>, this is a
        // parse error. Return nothing."
        if self.peek() != Some(&CSSToken::Colon) {
            self.skip_declaration_remnants();
            return None;
        }
        let _ = self.consume();
        self.skip_whitespace();

        // Nested blocks are taken whole so a `;` inside `url(...)` or `(...)` does not
        // end the declaration.
        let mut value = Vec::new();
        let mut depth = 0_usize;
        loop {
            match self.peek() {
                None | Some(CSSToken::EOF) => break,
                Some(CSSToken::Semicolon | CSSToken::RightBrace) if depth == 0 => break,
                Some(token) => {
                    match token {
                        CSSToken::LeftParen | CSSToken::LeftBracket | CSSToken::Function(_) => {
                            depth += 1;
                        }
                        CSSToken::RightParen | CSSToken::RightBracket => {
                            depth = depth.saturating_sub(1);
                        }
                        _ => {}
                    }
                    if let Some(token) = self.consume().cloned() {
                        value.push(token);
                    }
                }
            }
        }

        let important = check_important(&value);
        let value = tokens_to_css(&trim_important(value));
        if value.is_empty() {
            return None;
        }

        Some(Declaration {
            name,
            value,
            important,
        })
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(&CSSToken::Whitespace) {
            let _ = self.consume();
        }
    }

    fn consume(&mut self) -> Option<&CSSToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&CSSToken> {
        self.tokens.get(self.position)
    }
}

/// [§ 5.1 Selector Lists](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// "A selector list is a comma-separated list of selectors."
fn split_selector_list(tokens: &[CSSToken]) -> Vec<String> {
    tokens
        .split(|token| matches!(token, CSSToken::Comma))
        .map(tokens_to_css)
        .filter(|text| !text.is_empty())
        .collect()
}

/// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// "A declaration is important if it has a !important annotation, i.e.
/// if the last two (non-whitespace, non-comment) tokens in its value are
/// a <delim-token> with the value "!" followed by an <ident-token> with
/// a value that is an ASCII case-insensitive match for "important"."
fn check_important(value: &[CSSToken]) -> bool {
    let mut significant = value.iter().rev().filter(|token| !token.is_whitespace());
    matches!(significant.next(), Some(CSSToken::Ident(s)) if s.eq_ignore_ascii_case("important"))
        && matches!(significant.next(), Some(CSSToken::Delim('!')))
}

/// Remove trailing whitespace and `!important` from a declaration value.
fn trim_important(mut value: Vec<CSSToken>) -> Vec<CSSToken> {
    let trim_whitespace = |value: &mut Vec<CSSToken>| {
        while value.last().is_some_and(CSSToken::is_whitespace) {
            let _ = value.pop();
        }
    };

    if check_important(&value) {
        trim_whitespace(&mut value);
        let _ = value.pop(); // important
        trim_whitespace(&mut value);
        let _ = value.pop(); // !
    }
    trim_whitespace(&mut value);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_rule() {
        let sheet = CSSParser::parse_css("body div #myid { width: 100px; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, vec!["body div #myid"]);
        assert_eq!(
            sheet.rules[0].declarations,
            vec![Declaration {
                name: "width".into(),
                value: "100px".into(),
                important: false,
            }]
        );
    }

    #[test]
    fn test_selector_list_and_whitespace_collapse() {
        let sheet = CSSParser::parse_css("h1 ,\n  p   .note{color:red}");
        assert_eq!(sheet.rules[0].selectors, vec!["h1", "p .note"]);
    }

    #[test]
    fn test_important_is_stripped() {
        let sheet = CSSParser::parse_css("p { color: red ! important; margin: 0 auto }");
        let decls = &sheet.rules[0].declarations;
        assert_eq!(decls[0].value, "red");
        assert!(decls[0].important);
        assert_eq!(decls[1].value, "0 auto");
        assert!(!decls[1].important);
    }

    #[test]
    fn test_function_values_keep_semicolons_inside() {
        let sheet = CSSParser::parse_css("a { background: url(x;y.png); color: rgb(1, 2, 3) }");
        let decls = &sheet.rules[0].declarations;
        assert_eq!(decls[0].value, "url(x;y.png)");
        assert_eq!(decls[1].value, "rgb(1, 2, 3)");
    }

    #[test]
    fn test_at_rules_are_skipped() {
        let sheet = CSSParser::parse_css(
            "@import 'a.css'; @media screen { p { color: red } } div { color: blue }",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, vec!["div"]);
    }

    #[test]
    fn test_bad_declarations_are_dropped() {
        let sheet = CSSParser::parse_css("p { : x; color red; width: ; Height: 2px }");
        assert_eq!(
            sheet.rules[0].declarations,
            vec![Declaration {
                name: "height".into(),
                value: "2px".into(),
                important: false,
            }]
        );
    }

    #[test]
    fn test_unterminated_rule_is_dropped() {
        assert_eq!(CSSParser::parse_css("p { color: red } div").rules.len(), 1);
    }
}
