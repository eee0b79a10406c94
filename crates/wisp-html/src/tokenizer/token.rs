use core::fmt;

pub use wisp_dom::Attribute;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer emits tokens of these types to the tree builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// "a tag name", ASCII-lowercased.
        name: String,
        /// "a list of attributes", in first-seen order with unique names.
        attributes: Vec<Attribute>,
        /// "a self-closing flag"
        self_closing: bool,
    },

    /// End tag token. Attributes on end tags are dropped.
    EndTag {
        /// "a tag name", ASCII-lowercased.
        name: String,
    },

    /// One character of text. The tree builder joins runs of these into a
    /// single text node.
    Text(char),

    /// Emitted once, when end of input is reached in the data state.
    EndOfInput,
}

impl Token {
    /// "When a start or end tag token is created, its self-closing flag must be
    /// unset (its other state is that it be set), and its attributes list must
    /// be empty."
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    /// Create a new end tag token with an empty name.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub const fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    /// The tag name of a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            Self::Text(_) | Self::EndOfInput => None,
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the current input character to the current tag token's tag name."
    pub fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name } = self {
            name.push(c);
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    ///
    /// "Set the self-closing flag of the current tag token." End tags have no flag.
    pub const fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// Add a finished attribute to a start tag.
    ///
    /// If the name is already present the earlier value is replaced in place
    /// and the old value returned. End tags discard their attributes.
    pub fn add_attribute(&mut self, attribute: Attribute) -> Option<String> {
        let Self::StartTag { attributes, .. } = self else {
            return None;
        };
        if let Some(existing) = attributes.iter_mut().find(|a| a.name == attribute.name) {
            return Some(core::mem::replace(&mut existing.value, attribute.value));
        }
        attributes.push(attribute);
        None
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Text(c) => match c {
                '\n' => write!(f, "Text(\\n)"),
                '\t' => write!(f, "Text(\\t)"),
                ' ' => write!(f, "Text(SPACE)"),
                c => write!(f, "Text({c})"),
            },
            Self::EndOfInput => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_attribute_replaces_in_place() {
        let mut token = Token::new_start_tag();
        assert_eq!(token.add_attribute(Attribute::new("a", "1")), None);
        assert_eq!(token.add_attribute(Attribute::new("b", "2")), None);
        assert_eq!(
            token.add_attribute(Attribute::new("a", "3")),
            Some("1".to_string())
        );
        let Token::StartTag { attributes, .. } = token else {
            panic!("expected a start tag");
        };
        assert_eq!(
            attributes,
            vec![Attribute::new("a", "3"), Attribute::new("b", "2")]
        );
    }

    #[test]
    fn test_display() {
        let mut token = Token::new_start_tag();
        "img".chars().for_each(|c| token.append_to_tag_name(c));
        let _ = token.add_attribute(Attribute::new("id", "x"));
        token.set_self_closing();
        assert_eq!(token.to_string(), "<img id=\"x\" />");
        assert_eq!(Token::EndTag { name: "p".into() }.to_string(), "</p>");
        assert_eq!(Token::Text(' ').to_string(), "Text(SPACE)");
    }
}
