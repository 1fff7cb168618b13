/// Errors raised by a [`Tokenizer`](crate::Tokenizer).
///
/// These are I/O-level failures: the source could not deliver the bytes
/// asked for, or the request itself was malformed. They never describe the
/// meaning of the bytes, which is the business of a unit's decoder.
///
/// ```text
///   TokenizerError
///   ├── EndOfStream    ← fewer bytes than requested and may_be_less unset
///   ├── BackwardSeek   ← target position lies before the cursor
///   ├── InvalidRange   ← offset + length does not fit the destination
///   ├── Closed         ← tokenizer used after close()
///   └── Io             ← from the underlying reader
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    /// The source ran out before the requested range was transferred.
    #[error("end of stream at position {position}")]
    EndOfStream { position: u64 },

    /// A read or peek named a position before the current one. Tokenizers
    /// only move forward.
    #[error("cannot seek backward from position {current} to {requested}")]
    BackwardSeek { requested: u64, current: u64 },

    /// The destination slice cannot hold `length` bytes at `offset`.
    #[error("destination range {offset}+{length} exceeds buffer of {capacity} bytes")]
    InvalidRange {
        offset: usize,
        length: usize,
        capacity: usize,
    },

    #[error("tokenizer is closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
