//! Wisp document loading pipeline.
//!
//! This crate ties the parsers together: raw HTTP/1.1 response bytes go
//! through [`ResponseParser`], the decoded body text goes through the HTML
//! tokenizer and tree builder, and the result is a [`LoadedDocument`]
//! holding both the response and the styled DOM tree.
//!
//! # Scope
//!
//! - Incremental delivery: [`ResponseLoader`] accepts the response in
//!   arbitrary slices, as a socket would deliver it
//! - One-shot loading with [`load_document`]
//! - Parsing bare markup without an HTTP envelope with [`parse_html_string`]
//!
//! # Not Yet Implemented
//!
//! - Networking (the caller owns the transport)
//! - Bodies framed by `Content-Length` or compressed transfer codings
//! - External stylesheets

use serde::Serialize;
use thiserror::Error;
use wisp_common::warning::clear_warnings;
use wisp_html::{Document, HTMLParser, HtmlError, TreeBuilder};
use wisp_http::{HttpError, HttpResponse, ResponseParser, ResponseState};

pub use wisp_css as css;
pub use wisp_dom as dom;
pub use wisp_html as html;
pub use wisp_http as http;

/// Why a document could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The response envelope or its body framing was invalid.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    /// The body text was not a well-formed document.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),
}

/// A response together with the document parsed from its body.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedDocument {
    /// Status, headers and decoded body text.
    pub response: HttpResponse,
    /// The DOM tree and the rules collected from its `<style>` elements.
    pub document: Document,
}

/// Loads a document from a response delivered in pieces.
///
/// ```
/// use wisp_browser::ResponseLoader;
///
/// let mut loader = ResponseLoader::new();
/// loader.receive(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n")?;
/// loader.receive(b"9\r\n<p>hi</p>\r\n0\r\n\r\n")?;
/// let loaded = loader.finish()?;
/// assert_eq!(loaded.document.tree.elements_by_tag_name("p").len(), 1);
/// # Ok::<(), wisp_browser::LoadError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResponseLoader {
    parser: ResponseParser,
    compute_styles: bool,
}

impl Default for ResponseLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseLoader {
    /// Start loading a new document.
    ///
    /// Warnings left over from a previous document are forgotten, so each
    /// document reports its own.
    #[must_use]
    pub fn new() -> Self {
        clear_warnings();
        Self {
            parser: ResponseParser::new(),
            compute_styles: true,
        }
    }

    /// Turn computed style on or off for the parsed tree.
    ///
    /// Rules from `<style>` elements are collected either way.
    #[must_use]
    pub fn with_style_computation(mut self, enabled: bool) -> Self {
        self.compute_styles = enabled;
        self
    }

    /// Feed the next slice of response bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Http`] on the first malformed byte; the loader
    /// keeps returning it afterwards.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        self.parser.receive(bytes)?;
        Ok(())
    }

    /// `true` once the whole body has arrived.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.parser.is_finished()
    }

    /// Where the response parser currently is.
    #[must_use]
    pub const fn state(&self) -> ResponseState {
        self.parser.state()
    }

    /// Parse the received body into a document.
    ///
    /// # Errors
    ///
    /// [`LoadError::Http`] if the response is incomplete or its body is not
    /// UTF-8, and [`LoadError::Html`] if the body is not a well-formed
    /// document.
    pub fn finish(self) -> Result<LoadedDocument, LoadError> {
        let response = self.parser.into_response()?;
        let document = parse_markup(&response.body, self.compute_styles)?;
        Ok(LoadedDocument { response, document })
    }
}

/// Load a document from a complete raw response.
///
/// # Errors
///
/// See [`ResponseLoader::receive`] and [`ResponseLoader::finish`].
pub fn load_document(bytes: &[u8]) -> Result<LoadedDocument, LoadError> {
    let mut loader = ResponseLoader::new();
    loader.receive(bytes)?;
    loader.finish()
}

/// Parse markup that did not arrive in an HTTP response.
///
/// # Errors
///
/// Returns the first tokenizer or tree construction error.
pub fn parse_html_string(html: &str) -> Result<Document, HtmlError> {
    clear_warnings();
    parse_markup(html, true)
}

fn parse_markup(html: &str, compute_styles: bool) -> Result<Document, HtmlError> {
    let builder = TreeBuilder::default().with_style_computation(compute_styles);
    let mut parser = HTMLParser::with_builder(builder);
    parser.feed(html)?;
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
        Transfer-Encoding: chunked\r\n\
        \r\n\
        28\r\n<style>p { color: red }</style><p>hi</p>\r\n0\r\n\r\n";

    #[test]
    fn test_load_document() {
        let loaded = load_document(RESPONSE).unwrap();
        assert_eq!(loaded.response.status_code, 200);
        let tree = &loaded.document.tree;
        let p = tree.elements_by_tag_name("p")[0];
        assert_eq!(
            tree.as_element(p).unwrap().computed_style.get("color"),
            Some(&"red".to_string())
        );
    }

    #[test]
    fn test_styles_can_be_disabled() {
        let mut loader = ResponseLoader::new().with_style_computation(false);
        loader.receive(RESPONSE).unwrap();
        let loaded = loader.finish().unwrap();
        let tree = &loaded.document.tree;
        let p = tree.elements_by_tag_name("p")[0];
        assert!(tree.as_element(p).unwrap().computed_style.is_empty());
        assert_eq!(loaded.document.rules.len(), 1);
    }

    #[test]
    fn test_finish_before_body_ends() {
        let mut loader = ResponseLoader::new();
        loader.receive(&RESPONSE[..20]).unwrap();
        assert!(!loader.is_finished());
        assert!(matches!(
            loader.finish(),
            Err(LoadError::Http(HttpError::TruncatedInput { .. }))
        ));
    }
}
