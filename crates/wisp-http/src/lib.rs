//! Streaming HTTP/1.1 response parsing.
//!
//! [`ResponseParser`] consumes raw response bytes in whatever slices the
//! transport delivers them, walking a byte-driven state machine through the
//! status line and header block. Once the headers end, the body is handed to
//! a [`BodyDecoder`] chosen from `Transfer-Encoding`; only `chunked` is
//! supported, decoded by [`ChunkedBodyDecoder`].
//!
//! ```
//! use wisp_http::ResponseParser;
//!
//! let mut parser = ResponseParser::new();
//! parser.receive(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n")?;
//! parser.receive(b"b\r\nhello world\r\n0\r\n\r\n")?;
//! assert!(parser.is_finished());
//! assert_eq!(parser.response()?.body, "hello world");
//! # Ok::<(), wisp_http::HttpError>(())
//! ```

/// Chunked transfer-coding decoder.
pub mod chunked;
/// Error type shared by the response parser and body decoders.
pub mod error;
/// Ordered, case-insensitive header map.
pub mod headers;
/// Response state machine and the finished response record.
pub mod response;

pub use chunked::{ChunkedBodyDecoder, ChunkedState};
pub use error::HttpError;
pub use headers::{Header, Headers};
pub use response::{BodyDecoder, HttpResponse, ResponseParser, ResponseState};
