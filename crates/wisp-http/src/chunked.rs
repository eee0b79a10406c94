use strum_macros::Display;

use crate::error::HttpError;

/// States of the chunked-body decoder.
///
/// A chunk on the wire is `<hex-length>[;ext]\r\n<bytes>\r\n`, and the body
/// ends with a zero-length chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChunkedState {
    /// Accumulating hex digits of the next chunk length.
    WaitingLength,
    /// Saw the CR after a non-zero length, expecting LF.
    WaitingLengthLineEnd,
    /// Copying chunk bytes until the length runs out.
    ReadingChunk,
    /// Expecting the CR that closes a chunk's data.
    WaitingChunkLineEndCr,
    /// Expecting the LF that closes a chunk's data.
    WaitingChunkLineEndLf,
}

/// Decodes a `Transfer-Encoding: chunked` body one byte at a time.
///
/// The decoder is resumable: bytes may arrive in any grouping, and the
/// decoded content is the same regardless of where the input was split.
#[derive(Debug, Clone)]
pub struct ChunkedBodyDecoder {
    state: ChunkedState,
    /// Bytes still to read in the current chunk, or the length parsed so far.
    length: usize,
    saw_length_digit: bool,
    in_extension: bool,
    content: Vec<u8>,
    finished: bool,
    /// Set on the first framing error; every later call reports it again.
    failure: Option<HttpError>,
}

impl ChunkedBodyDecoder {
    /// Create a decoder waiting for the first chunk length.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ChunkedState::WaitingLength,
            length: 0,
            saw_length_digit: false,
            in_extension: false,
            content: Vec::new(),
            finished: false,
            failure: None,
        }
    }

    /// Current state of the decoder.
    #[must_use]
    pub const fn state(&self) -> ChunkedState {
        self.state
    }

    /// `true` once the terminating zero-length chunk has been read.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Body bytes decoded so far.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Feed a slice of bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MalformedChunkEncoding`] on the first byte that
    /// breaks the chunk framing.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        for &byte in bytes {
            self.receive_byte(byte)?;
        }
        Ok(())
    }

    /// Feed a single byte. Bytes after the final chunk are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MalformedChunkEncoding`] if `byte` is not valid
    /// in the current state. After an error the decoder is poisoned and
    /// every further call returns the same error.
    pub fn receive_byte(&mut self, byte: u8) -> Result<(), HttpError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if self.finished {
            return Ok(());
        }
        let result = self.decode_byte(byte);
        if let Err(error) = &result {
            self.failure = Some(error.clone());
        }
        result
    }

    fn decode_byte(&mut self, byte: u8) -> Result<(), HttpError> {

        match self.state {
            ChunkedState::WaitingLength => self.handle_length_byte(byte)?,
            ChunkedState::WaitingLengthLineEnd => {
                if byte != b'\n' {
                    return Err(HttpError::malformed_chunk(format!(
                        "expected LF after chunk length, found {:?}",
                        char::from(byte)
                    )));
                }
                self.state = ChunkedState::ReadingChunk;
            }
            ChunkedState::ReadingChunk => {
                self.content.push(byte);
                self.length -= 1;
                if self.length == 0 {
                    self.state = ChunkedState::WaitingChunkLineEndCr;
                }
            }
            ChunkedState::WaitingChunkLineEndCr => {
                if byte != b'\r' {
                    return Err(HttpError::malformed_chunk(format!(
                        "chunk data longer than its declared length, found {:?}",
                        char::from(byte)
                    )));
                }
                self.state = ChunkedState::WaitingChunkLineEndLf;
            }
            ChunkedState::WaitingChunkLineEndLf => {
                if byte != b'\n' {
                    return Err(HttpError::malformed_chunk(format!(
                        "expected LF after chunk data, found {:?}",
                        char::from(byte)
                    )));
                }
                self.length = 0;
                self.saw_length_digit = false;
                self.in_extension = false;
                self.state = ChunkedState::WaitingLength;
            }
        }
        Ok(())
    }

    fn handle_length_byte(&mut self, byte: u8) -> Result<(), HttpError> {
        match byte {
            b'\r' => {
                if !self.saw_length_digit {
                    return Err(HttpError::malformed_chunk("missing chunk length"));
                }
                // A zero length marks the last chunk; the trailing CRLFs are not needed.
                if self.length == 0 {
                    self.finished = true;
                } else {
                    self.state = ChunkedState::WaitingLengthLineEnd;
                }
            }
            _ if self.in_extension => {}
            b';' if self.saw_length_digit => self.in_extension = true,
            _ => {
                let digit = hex_value(byte).ok_or_else(|| {
                    HttpError::malformed_chunk(format!(
                        "invalid hex digit {:?} in chunk length",
                        char::from(byte)
                    ))
                })?;
                self.length = self
                    .length
                    .checked_mul(16)
                    .and_then(|length| length.checked_add(usize::from(digit)))
                    .ok_or_else(|| HttpError::malformed_chunk("chunk length overflows"))?;
                self.saw_length_digit = true;
            }
        }
        Ok(())
    }

    /// Take the decoded body, requiring the final chunk to have been read.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MalformedChunkEncoding`] naming the current state
    /// if the stream stopped before the terminating chunk, or the decoder's
    /// earlier framing error.
    pub fn finish(self) -> Result<Vec<u8>, HttpError> {
        if let Some(error) = self.failure {
            return Err(error);
        }
        if self.finished {
            Ok(self.content)
        } else {
            Err(HttpError::malformed_chunk(format!(
                "stream ended in the {} state",
                self.state
            )))
        }
    }
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

impl Default for ChunkedBodyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> Result<Vec<u8>, HttpError> {
        let mut decoder = ChunkedBodyDecoder::new();
        decoder.receive(input)?;
        decoder.finish()
    }

    #[test]
    fn decodes_single_chunk() {
        assert_eq!(
            decode(b"b\r\nhello world\r\n0\r\n\r\n").unwrap(),
            b"hello world"
        );
    }

    #[test]
    fn decodes_multiple_chunks_with_uppercase_hex() {
        let body = decode(b"5\r\nhello\r\n1\r\n \r\nA\r\n0123456789\r\n0\r\n\r\n").unwrap();
        assert_eq!(body, b"hello 0123456789");
    }

    #[test]
    fn finishes_on_cr_of_zero_chunk() {
        let mut decoder = ChunkedBodyDecoder::new();
        decoder.receive(b"0\r").unwrap();
        assert!(decoder.is_finished());
        decoder.receive(b"\n\r\ngarbage").unwrap();
        assert!(decoder.content().is_empty());
    }

    #[test]
    fn skips_chunk_extensions() {
        assert_eq!(
            decode(b"3;name=value\r\nabc\r\n0;last\r\n\r\n").unwrap(),
            b"abc"
        );
    }

    #[test]
    fn rejects_bad_hex_digit() {
        let err = decode(b"g\r\n").unwrap_err();
        assert!(matches!(err, HttpError::MalformedChunkEncoding { .. }));
    }

    #[test]
    fn framing_error_is_sticky() {
        let mut decoder = ChunkedBodyDecoder::new();
        let err = decoder.receive(b"2\r\nabc").unwrap_err();
        assert!(matches!(err, HttpError::MalformedChunkEncoding { .. }));
        assert_eq!(decoder.receive(b"\r\n0\r\n\r\n"), Err(err.clone()));
        assert!(!decoder.is_finished());
        assert_eq!(decoder.finish(), Err(err));
    }

    #[test]
    fn rejects_missing_length() {
        let err = decode(b"\r\n").unwrap_err();
        assert!(matches!(err, HttpError::MalformedChunkEncoding { .. }));
    }

    #[test]
    fn rejects_overlong_chunk_data() {
        let err = decode(b"2\r\nabc\r\n0\r\n\r\n").unwrap_err();
        assert!(matches!(err, HttpError::MalformedChunkEncoding { .. }));
    }

    #[test]
    fn rejects_truncated_stream() {
        let err = decode(b"b\r\nhello").unwrap_err();
        assert_eq!(
            err,
            HttpError::MalformedChunkEncoding {
                reason: "stream ended in the ReadingChunk state".to_string()
            }
        );
    }

    #[test]
    fn rejects_length_overflow() {
        let err = decode(b"fffffffffffffffffffff\r\n").unwrap_err();
        assert!(matches!(err, HttpError::MalformedChunkEncoding { .. }));
    }
}
