use serde::Serialize;
use strum_macros::Display;
use wisp_common::warning::warn_once;

use crate::chunked::ChunkedBodyDecoder;
use crate::error::HttpError;
use crate::headers::Headers;

/// A fully received response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Three-digit status code, e.g. `200`.
    pub status_code: u16,
    /// Reason phrase following the code, e.g. `OK`.
    pub status_text: String,
    /// Headers in arrival order.
    pub headers: Headers,
    /// Decoded body text.
    pub body: String,
}

impl HttpResponse {
    /// `true` for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Look up a header value, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// States of the response parser, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ResponseState {
    /// Accumulating the status line.
    WaitingStatusLine,
    /// Saw CR at the end of the status line, expecting LF.
    WaitingStatusLineEnd,
    /// Accumulating a header name, or an immediate CR ending the header block.
    WaitingHeaderName,
    /// Saw `:`, skipping the single optional space.
    WaitingHeaderSpace,
    /// Accumulating a header value.
    WaitingHeaderValue,
    /// Saw CR at the end of a header value, expecting LF.
    WaitingHeaderLineEnd,
    /// Saw CR on an empty line, expecting the LF that ends the headers.
    WaitingHeaderBlockEnd,
    /// Forwarding bytes to the body decoder.
    WaitingBody,
}

/// Body decoder selected from the `Transfer-Encoding` header.
#[derive(Debug, Clone)]
pub enum BodyDecoder {
    /// `Transfer-Encoding: chunked`.
    Chunked(ChunkedBodyDecoder),
}

impl BodyDecoder {
    /// Choose a decoder for a `Transfer-Encoding` value.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::UnsupportedTransferEncoding`] for anything but
    /// `chunked`, including a missing header.
    pub fn for_transfer_encoding(encoding: Option<&str>) -> Result<Self, HttpError> {
        match encoding.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("chunked") => {
                Ok(Self::Chunked(ChunkedBodyDecoder::new()))
            }
            Some(value) => Err(HttpError::UnsupportedTransferEncoding {
                encoding: value.to_string(),
            }),
            None => Err(HttpError::UnsupportedTransferEncoding {
                encoding: "(none)".to_string(),
            }),
        }
    }

    /// Feed one body byte.
    ///
    /// # Errors
    ///
    /// Propagates framing errors from the underlying decoder.
    pub fn receive_byte(&mut self, byte: u8) -> Result<(), HttpError> {
        match self {
            Self::Chunked(decoder) => decoder.receive_byte(byte),
        }
    }

    /// `true` once the decoder has seen the end of the body.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        match self {
            Self::Chunked(decoder) => decoder.is_finished(),
        }
    }

    /// Body bytes decoded so far.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        match self {
            Self::Chunked(decoder) => decoder.content(),
        }
    }

    /// Name of the decoder's current state, for error reporting.
    #[must_use]
    pub fn state_name(&self) -> String {
        match self {
            Self::Chunked(decoder) => decoder.state().to_string(),
        }
    }

    fn into_content(self) -> Result<Vec<u8>, HttpError> {
        match self {
            Self::Chunked(decoder) => decoder.finish(),
        }
    }
}

/// Resumable HTTP/1.1 response parser.
///
/// Feed bytes with [`receive`](Self::receive) as they arrive. Parsing is
/// byte-at-a-time and keeps all partial state in the parser, so the split
/// points between calls never affect the result.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    state: ResponseState,
    status_line: Vec<u8>,
    status_code: u16,
    status_text: String,
    headers: Headers,
    header_name: Vec<u8>,
    header_value: Vec<u8>,
    body: Option<BodyDecoder>,
    /// Set on the first fatal error; every later call reports it again.
    failure: Option<HttpError>,
}

impl ResponseParser {
    /// Create a parser waiting for a status line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ResponseState::WaitingStatusLine,
            status_line: Vec::new(),
            status_code: 0,
            status_text: String::new(),
            headers: Headers::new(),
            header_name: Vec::new(),
            header_value: Vec::new(),
            body: None,
            failure: None,
        }
    }

    /// Current state of the parser.
    #[must_use]
    pub const fn state(&self) -> ResponseState {
        self.state
    }

    /// Headers received so far.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// `true` once the body decoder has seen the end of the body.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.failure.is_none() && self.body.as_ref().is_some_and(BodyDecoder::is_finished)
    }

    /// Feed the next slice of response bytes.
    ///
    /// # Errors
    ///
    /// Returns the first fatal parse error. After an error the parser is
    /// poisoned and every further call returns the same error.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        for &byte in bytes {
            if let Err(error) = self.receive_byte(byte) {
                self.failure = Some(error.clone());
                return Err(error);
            }
        }
        Ok(())
    }

    fn receive_byte(&mut self, byte: u8) -> Result<(), HttpError> {
        match self.state {
            ResponseState::WaitingStatusLine => {
                if byte == b'\r' {
                    self.state = ResponseState::WaitingStatusLineEnd;
                } else {
                    self.status_line.push(byte);
                }
            }
            ResponseState::WaitingStatusLineEnd => {
                if byte != b'\n' {
                    return Err(self.malformed_status_line());
                }
                self.parse_status_line()?;
                self.state = ResponseState::WaitingHeaderName;
            }
            ResponseState::WaitingHeaderName => match byte {
                b':' => {
                    if self.header_name.is_empty() {
                        return Err(HttpError::malformed_header("empty header name"));
                    }
                    self.state = ResponseState::WaitingHeaderSpace;
                }
                b'\r' => {
                    if !self.header_name.is_empty() {
                        return Err(HttpError::malformed_header(format!(
                            "header line {:?} has no colon",
                            String::from_utf8_lossy(&self.header_name)
                        )));
                    }
                    self.state = ResponseState::WaitingHeaderBlockEnd;
                }
                _ => self.header_name.push(byte),
            },
            ResponseState::WaitingHeaderSpace => {
                self.state = ResponseState::WaitingHeaderValue;
                if byte != b' ' {
                    // The value started right after the colon.
                    return self.receive_byte(byte);
                }
            }
            ResponseState::WaitingHeaderValue => {
                if byte == b'\r' {
                    self.state = ResponseState::WaitingHeaderLineEnd;
                } else {
                    self.header_value.push(byte);
                }
            }
            ResponseState::WaitingHeaderLineEnd => {
                if byte != b'\n' {
                    return Err(HttpError::malformed_header("CR not followed by LF"));
                }
                self.commit_header()?;
                self.state = ResponseState::WaitingHeaderName;
            }
            ResponseState::WaitingHeaderBlockEnd => {
                if byte != b'\n' {
                    return Err(HttpError::malformed_header(
                        "CR not followed by LF at end of headers",
                    ));
                }
                let decoder =
                    BodyDecoder::for_transfer_encoding(self.headers.get("Transfer-Encoding"))?;
                self.body = Some(decoder);
                self.state = ResponseState::WaitingBody;
            }
            ResponseState::WaitingBody => {
                if let Some(body) = self.body.as_mut() {
                    body.receive_byte(byte)?;
                }
            }
        }
        Ok(())
    }

    fn malformed_status_line(&self) -> HttpError {
        HttpError::MalformedStatusLine {
            line: String::from_utf8_lossy(&self.status_line).into_owned(),
        }
    }

    /// Validate `HTTP/1.1 <code> <reason>` and store the code and reason.
    fn parse_status_line(&mut self) -> Result<(), HttpError> {
        let line = std::str::from_utf8(&self.status_line).map_err(|_| self.malformed_status_line())?;
        let (code, text) = line
            .strip_prefix("HTTP/1.1 ")
            .and_then(|rest| rest.split_once(' '))
            .ok_or_else(|| self.malformed_status_line())?;
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) || text.is_empty() {
            return Err(self.malformed_status_line());
        }
        self.status_code = code.parse().map_err(|_| self.malformed_status_line())?;
        self.status_text = text.to_string();
        Ok(())
    }

    fn commit_header(&mut self) -> Result<(), HttpError> {
        let name = String::from_utf8(std::mem::take(&mut self.header_name))
            .map_err(|_| HttpError::malformed_header("header name is not valid UTF-8"))?;
        let value = String::from_utf8(std::mem::take(&mut self.header_value))
            .map_err(|_| HttpError::malformed_header(format!("value of {name} is not valid UTF-8")))?;
        if self.headers.insert(name.as_str(), value).is_some() {
            warn_once(
                "HTTP",
                &format!("header '{name}' repeated; keeping the last value"),
            );
        }
        Ok(())
    }

    fn truncated(&self) -> HttpError {
        let state = match (&self.state, &self.body) {
            (ResponseState::WaitingBody, Some(body)) => {
                format!("{}/{}", self.state, body.state_name())
            }
            _ => self.state.to_string(),
        };
        HttpError::TruncatedInput { state }
    }

    /// The parsed response, available once [`is_finished`](Self::is_finished).
    ///
    /// # Errors
    ///
    /// Returns the parser's fatal error if it failed,
    /// [`HttpError::TruncatedInput`] if the body has not finished, or
    /// [`HttpError::BodyNotUtf8`] if the body is not UTF-8.
    pub fn response(&self) -> Result<HttpResponse, HttpError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let body = match &self.body {
            Some(body) if body.is_finished() => body.content().to_vec(),
            _ => return Err(self.truncated()),
        };
        Ok(HttpResponse {
            status_code: self.status_code,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: String::from_utf8(body).map_err(|_| HttpError::BodyNotUtf8)?,
        })
    }

    /// Consume the parser and return the response without copying the body.
    ///
    /// # Errors
    ///
    /// Same conditions as [`response`](Self::response).
    pub fn into_response(self) -> Result<HttpResponse, HttpError> {
        if let Some(error) = self.failure {
            return Err(error);
        }
        if !self.is_finished() {
            return Err(self.truncated());
        }
        let Self {
            status_code,
            status_text,
            headers,
            body,
            ..
        } = self;
        let content = match body {
            Some(decoder) => decoder.into_content()?,
            None => Vec::new(),
        };
        Ok(HttpResponse {
            status_code,
            status_text,
            headers,
            body: String::from_utf8(content).map_err(|_| HttpError::BodyNotUtf8)?,
        })
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\n\r\n";

    fn parse(bytes: &[u8]) -> Result<HttpResponse, HttpError> {
        let mut parser = ResponseParser::new();
        parser.receive(bytes)?;
        parser.into_response()
    }

    #[test]
    fn parses_status_headers_and_body() {
        let mut bytes = HEAD.to_vec();
        bytes.extend_from_slice(b"b\r\nhello world\r\n0\r\n\r\n");
        let response = parse(&bytes).unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.status_text, "OK");
        assert!(response.is_success());
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.body, "hello world");
    }

    #[test]
    fn tracks_states_through_the_head() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.state(), ResponseState::WaitingStatusLine);
        parser.receive(b"HTTP/1.1 404 Not Found\r").unwrap();
        assert_eq!(parser.state(), ResponseState::WaitingStatusLineEnd);
        parser.receive(b"\nA:").unwrap();
        assert_eq!(parser.state(), ResponseState::WaitingHeaderSpace);
        parser.receive(b" b\r").unwrap();
        assert_eq!(parser.state(), ResponseState::WaitingHeaderLineEnd);
        parser.receive(b"\n\r").unwrap();
        assert_eq!(parser.state(), ResponseState::WaitingHeaderBlockEnd);
        assert_eq!(parser.headers().get("a"), Some("b"));
    }

    #[test]
    fn reason_phrase_may_contain_spaces() {
        let mut parser = ResponseParser::new();
        parser.receive(b"HTTP/1.1 404 Not Found\r\n").unwrap();
        assert_eq!(parser.status_text, "Not Found");
        assert_eq!(parser.status_code, 404);
    }

    #[test]
    fn value_may_follow_colon_directly() {
        let mut parser = ResponseParser::new();
        parser
            .receive(b"HTTP/1.1 200 OK\r\nTransfer-Encoding:chunked\r\nX:  two\r\n\r\n0\r\n\r\n")
            .unwrap();
        let response = parser.response().unwrap();
        assert_eq!(response.header("transfer-encoding"), Some("chunked"));
        assert_eq!(response.header("x"), Some(" two"));
    }

    #[test]
    fn rejects_bad_status_lines() {
        for line in [
            &b"HTTP/1.0 200 OK\r\n"[..],
            b"HTTP/1.1 20 OK\r\n",
            b"HTTP/1.1 abc OK\r\n",
            b"HTTP/1.1 200\r\n",
            b"garbage\r\n",
            b"HTTP/1.1 200 OK\rX",
        ] {
            let mut parser = ResponseParser::new();
            let err = parser.receive(line).unwrap_err();
            assert!(
                matches!(err, HttpError::MalformedStatusLine { .. }),
                "{line:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_header_without_colon() {
        let err = parse(b"HTTP/1.1 200 OK\r\nNoColon\r\n").unwrap_err();
        assert!(matches!(err, HttpError::MalformedHeader { .. }));
    }

    #[test]
    fn rejects_missing_transfer_encoding() {
        let err = parse(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello").unwrap_err();
        assert_eq!(
            err,
            HttpError::UnsupportedTransferEncoding {
                encoding: "(none)".to_string()
            }
        );
    }

    #[test]
    fn rejects_other_transfer_encodings() {
        let err = parse(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: gzip\r\n\r\n").unwrap_err();
        assert_eq!(
            err,
            HttpError::UnsupportedTransferEncoding {
                encoding: "gzip".to_string()
            }
        );
    }

    #[test]
    fn response_before_finish_is_truncated() {
        let mut parser = ResponseParser::new();
        parser.receive(HEAD).unwrap();
        parser.receive(b"b\r\nhello").unwrap();
        assert!(!parser.is_finished());
        assert_eq!(
            parser.response().unwrap_err(),
            HttpError::TruncatedInput {
                state: "WaitingBody/ReadingChunk".to_string()
            }
        );
    }

    #[test]
    fn errors_are_sticky() {
        let mut parser = ResponseParser::new();
        let first = parser.receive(b"bogus\r\n").unwrap_err();
        let second = parser.receive(b"HTTP/1.1 200 OK\r\n").unwrap_err();
        assert_eq!(first, second);
        assert_eq!(parser.response().unwrap_err(), first);
    }

    #[test]
    fn body_must_be_utf8() {
        let mut bytes = HEAD.to_vec();
        bytes.extend_from_slice(b"2\r\n\xff\xfe\r\n0\r\n\r\n");
        assert_eq!(parse(&bytes).unwrap_err(), HttpError::BodyNotUtf8);
    }

    #[test]
    fn repeated_header_keeps_last_value() {
        let mut parser = ResponseParser::new();
        parser
            .receive(b"HTTP/1.1 200 OK\r\nX-A: one\r\nx-a: two\r\n")
            .unwrap();
        assert_eq!(parser.headers().get("X-A"), Some("two"));
        assert_eq!(parser.headers().len(), 1);
    }
}
