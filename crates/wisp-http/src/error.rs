use thiserror::Error;

/// Everything that can go wrong while parsing a response.
///
/// Errors are fatal: once a parser has returned one, it keeps returning it
/// and never produces a partial response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The first line was not `HTTP/1.1 <code> <reason>`.
    #[error("malformed status line {line:?}")]
    MalformedStatusLine {
        /// The status line as received, lossily decoded.
        line: String,
    },

    /// A header line could not be split into name and value.
    #[error("malformed header: {reason}")]
    MalformedHeader {
        /// What was wrong with the line.
        reason: String,
    },

    /// The header block named an encoding other than `chunked`, or none.
    #[error("unsupported transfer encoding: {encoding}")]
    UnsupportedTransferEncoding {
        /// The `Transfer-Encoding` value, or `(none)` if the header was absent.
        encoding: String,
    },

    /// Chunk framing was invalid: a bad hex digit, an oversized length, or
    /// a missing CRLF.
    #[error("malformed chunk encoding: {reason}")]
    MalformedChunkEncoding {
        /// What was wrong with the framing.
        reason: String,
    },

    /// The response was requested before the body finished.
    #[error("input ended in the {state} state")]
    TruncatedInput {
        /// Name of the parser state at the point input stopped.
        state: String,
    },

    /// The decoded body bytes are not valid UTF-8.
    #[error("response body is not valid UTF-8")]
    BodyNotUtf8,
}

impl HttpError {
    pub(crate) fn malformed_header(reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_chunk(reason: impl Into<String>) -> Self {
        Self::MalformedChunkEncoding {
            reason: reason.into(),
        }
    }
}
