/// Errors returned by the primitive units of this crate.
///
/// A `UnitError` means "the bytes are present but do not describe a valid
/// value". It is a value, never a panic: combinators inspect it to
/// short-circuit, and [`recover`](crate::combinator::recover) may replace it
/// with a substitute. Only the reader crate turns it into a failed read.
///
/// ```text
///   UnitError
///   ├── OutOfBounds          ← offset + size runs past the buffer
///   ├── OddLength            ← Pascal string framing length is odd
///   ├── LengthMismatch       ← Pascal string count disagrees with framing
///   ├── BadMagic             ← constant bytes did not match
///   ├── InvalidDiscriminant  ← enumerated field holds an undefined value
///   └── Invalid              ← free-form validation failure
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// The unit needs `size` bytes at `offset` but the buffer holds only
    /// `available` bytes in total.
    #[error("unit of {size} bytes at offset {offset} exceeds buffer of {available} bytes")]
    OutOfBounds {
        offset: usize,
        size: usize,
        available: usize,
    },

    /// A length-prefixed string was declared with an odd total length.
    #[error("pascal string framing length {length} is odd")]
    OddLength { length: usize },

    /// A length prefix does not fit the framing it was declared in.
    #[error("length prefix {declared} does not fit {available} available bytes")]
    LengthMismatch { declared: usize, available: usize },

    /// Constant bytes (a chunk ID, a signature) did not match.
    #[error("bad magic: expected {expected:02X?}, found {found:02X?}")]
    BadMagic { expected: Vec<u8>, found: Vec<u8> },

    /// An enumerated field carried a value with no defined meaning.
    #[error("invalid {name} value: {value:#X}")]
    InvalidDiscriminant { name: &'static str, value: u64 },

    /// Post-decode validation rejected the value.
    #[error("invalid value: {0}")]
    Invalid(String),
}

impl UnitError {
    /// Shorthand for [`UnitError::Invalid`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}
