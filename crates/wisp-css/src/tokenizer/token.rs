//! CSS token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! Numeric tokens keep the text they were written with instead of a parsed
//! value: declarations are stored as text, so `1.50em` must come back out
//! exactly as written.

use core::fmt;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// The token kinds produced by [`CSSTokenizer`](super::CSSTokenizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CSSToken {
    /// "`<ident-token>`"
    Ident(String),

    /// "`<function-token>`", the name without the opening parenthesis.
    Function(String),

    /// "`<at-keyword-token>`", the name without the `@`.
    AtKeyword(String),

    /// "`<hash-token>`", the value without the `#`.
    Hash(String),

    /// "`<string-token>`", unquoted.
    String(String),

    /// "`<bad-string-token>`"
    BadString,

    /// "`<url-token>`" from an unquoted `url(...)`.
    Url(String),

    /// "`<bad-url-token>`"
    BadUrl,

    /// "`<delim-token>`"
    Delim(char),

    /// "`<number-token>`" with its source representation.
    Number(String),

    /// "`<percentage-token>`" with its source representation, without `%`.
    Percentage(String),

    /// "`<dimension-token>`"
    Dimension {
        /// Source representation of the number.
        value: String,
        /// The unit, e.g. `px`.
        unit: String,
    },

    /// "`<whitespace-token>`"
    Whitespace,

    /// "`<CDO-token>`" (`<!--`)
    CDO,

    /// "`<CDC-token>`" (`-->`)
    CDC,

    /// "`<colon-token>`"
    Colon,

    /// "`<semicolon-token>`"
    Semicolon,

    /// "`<comma-token>`"
    Comma,

    /// `<[-token>`
    LeftBracket,

    /// `<]-token>`
    RightBracket,

    /// `<(-token>`
    LeftParen,

    /// `<)-token>`
    RightParen,

    /// `<{-token>`
    LeftBrace,

    /// `<}-token>`
    RightBrace,

    /// End of file - signals end of input
    EOF,
}

impl CSSToken {
    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// [§ 9 Serialization](https://www.w3.org/TR/css-syntax-3/#serialization)
    ///
    /// Append the token's CSS text to `out`. Whitespace collapses to one space
    /// and strings are re-quoted with double quotes.
    ///
    /// NOTE: This is a simplified serializer; it does not re-escape.
    pub fn write_css(&self, out: &mut String) {
        match self {
            Self::Ident(v) | Self::Number(v) => out.push_str(v),
            Self::Function(name) => {
                out.push_str(name);
                out.push('(');
            }
            Self::AtKeyword(v) => {
                out.push('@');
                out.push_str(v);
            }
            Self::Hash(v) => {
                out.push('#');
                out.push_str(v);
            }
            Self::String(v) => {
                out.push('"');
                out.push_str(v);
                out.push('"');
            }
            Self::Url(v) => {
                out.push_str("url(");
                out.push_str(v);
                out.push(')');
            }
            Self::Delim(c) => out.push(*c),
            Self::Percentage(v) => {
                out.push_str(v);
                out.push('%');
            }
            Self::Dimension { value, unit } => {
                out.push_str(value);
                out.push_str(unit);
            }
            Self::Whitespace => out.push(' '),
            Self::CDO => out.push_str("<!--"),
            Self::CDC => out.push_str("-->"),
            Self::Colon => out.push(':'),
            Self::Semicolon => out.push(';'),
            Self::Comma => out.push(','),
            Self::LeftBracket => out.push('['),
            Self::RightBracket => out.push(']'),
            Self::LeftParen => out.push('('),
            Self::RightParen => out.push(')'),
            Self::LeftBrace => out.push('{'),
            Self::RightBrace => out.push('}'),
            Self::BadString | Self::BadUrl | Self::EOF => {}
        }
    }
}

/// Serialize a token run, trimming the ends.
#[must_use]
pub fn tokens_to_css(tokens: &[CSSToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_css(&mut out);
    }
    out.trim().to_string()
}

impl fmt::Display for CSSToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write!(f, "<ident:{v}>"),
            Self::Function(v) => write!(f, "<function:{v}(>"),
            Self::AtKeyword(v) => write!(f, "<at-keyword:@{v}>"),
            Self::Hash(v) => write!(f, "<hash:#{v}>"),
            Self::String(v) => write!(f, "<string:\"{v}\">"),
            Self::BadString => write!(f, "<bad-string>"),
            Self::Url(v) => write!(f, "<url:{v}>"),
            Self::BadUrl => write!(f, "<bad-url>"),
            Self::Delim(c) => write!(f, "<delim:{c}>"),
            Self::Number(v) => write!(f, "<number:{v}>"),
            Self::Percentage(v) => write!(f, "<percentage:{v}%>"),
            Self::Dimension { value, unit } => write!(f, "<dimension:{value}{unit}>"),
            Self::Whitespace => write!(f, "<whitespace>"),
            Self::CDO => write!(f, "<CDO>"),
            Self::CDC => write!(f, "<CDC>"),
            Self::Colon => write!(f, "<colon>"),
            Self::Semicolon => write!(f, "<semicolon>"),
            Self::Comma => write!(f, "<comma>"),
            Self::LeftBracket => write!(f, "<[>"),
            Self::RightBracket => write!(f, "<]>"),
            Self::LeftParen => write!(f, "<(>"),
            Self::RightParen => write!(f, "<)>"),
            Self::LeftBrace => write!(f, "<{{>"),
            Self::RightBrace => write!(f, "<}}>"),
            Self::EOF => write!(f, "<EOF>"),
        }
    }
}
