use binunit_tokenizer::TokenizerError;

/// Failure of a streaming unit read.
///
/// `E` is the unit's own decode error. The two other variants are I/O
/// level and never come out of a decoder.
#[derive(Debug, thiserror::Error)]
pub enum ReadError<E> {
    /// The source delivered fewer bytes than the unit needs. Outer parsers
    /// usually treat this as "stop parsing here".
    #[error("end of stream: unit needs {expected} bytes, got {actual}")]
    EndOfStream { expected: usize, actual: usize },

    /// The bytes arrived but the unit rejected them.
    #[error("decode failed: {0}")]
    Decode(E),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

impl<E> ReadError<E> {
    /// True for a short read, whether detected by size or reported by the
    /// tokenizer.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(
            self,
            Self::EndOfStream { .. } | Self::Tokenizer(TokenizerError::EndOfStream { .. })
        )
    }

    /// The decode error, if that is what this is.
    pub fn into_decode(self) -> Option<E> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}
