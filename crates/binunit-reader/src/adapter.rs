//! Reading units off a tokenizer.
//!
//! This is the one place bytes are awaited. Each call allocates a scratch
//! buffer of exactly `unit.size()` bytes, asks the tokenizer for that many
//! with `may_be_less` set, and only then hands the buffer to the unit:
//!
//! ```text
//!   tokenizer ──read/peek (may_be_less)──► scratch[size] ──decode(·, 0)──► Output
//!        │                                      │                    │
//!        └── TokenizerError ──► Tokenizer       └── short ──► EndOfStream
//!                                                                    └── Err(e) ──► Decode(e)
//! ```
//!
//! A short read is reported before the unit sees any bytes, so decoders
//! never observe a partial window.

use async_trait::async_trait;
use binunit_core::Unit;
use binunit_tokenizer::{ReadOptions, Tokenizer};
use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::ReadError;

/// Read and decode one unit, advancing the tokenizer.
///
/// On a short read the tokenizer has still advanced past the bytes that
/// did arrive.
///
/// # Errors
///
/// - [`ReadError::EndOfStream`] if fewer than `unit.size()` bytes remain.
/// - [`ReadError::Decode`] if the unit rejects the bytes. The bytes are
///   consumed regardless.
/// - [`ReadError::Tokenizer`] on seek misuse, I/O failure, or a closed
///   tokenizer.
pub async fn read_unit_from_tokenizer<T, U>(
    tokenizer: &mut T,
    unit: &U,
) -> Result<U::Output, ReadError<U::Error>>
where
    T: Tokenizer + ?Sized,
    U: Unit + ?Sized,
{
    let expected = unit.size();
    let position = tokenizer.position();
    trace!(position, size = expected, "reading unit");

    let mut scratch = vec![0u8; expected];
    let actual = tokenizer
        .read_buffer(&mut scratch, ReadOptions::new().with_may_be_less(true))
        .await?;
    finish(unit, scratch, position, actual)
}

/// Decode one unit at the tokenizer's position without advancing it.
///
/// Peeking the same unit twice yields the same value.
///
/// # Errors
///
/// Same as [`read_unit_from_tokenizer`].
pub async fn peek_unit_from_tokenizer<T, U>(
    tokenizer: &mut T,
    unit: &U,
) -> Result<U::Output, ReadError<U::Error>>
where
    T: Tokenizer + ?Sized,
    U: Unit + ?Sized,
{
    let expected = unit.size();
    let position = tokenizer.position();
    trace!(position, size = expected, "peeking unit");

    let mut scratch = vec![0u8; expected];
    let actual = tokenizer
        .peek_buffer(&mut scratch, ReadOptions::new().with_may_be_less(true))
        .await?;
    finish(unit, scratch, position, actual)
}

/// Decode one unit from bytes already in memory.
///
/// # Errors
///
/// - [`ReadError::EndOfStream`] if `buf` holds fewer than `unit.size()`
///   bytes past `offset`.
/// - [`ReadError::Decode`] if the unit rejects the bytes.
pub fn read_unit_from_buffer<U>(
    unit: &U,
    buf: &Bytes,
    offset: usize,
) -> Result<U::Output, ReadError<U::Error>>
where
    U: Unit + ?Sized,
{
    let expected = unit.size();
    let actual = buf.len().saturating_sub(offset).min(expected);
    if actual < expected {
        return Err(ReadError::EndOfStream { expected, actual });
    }
    unit.decode(buf, offset).map_err(ReadError::Decode)
}

fn finish<U>(
    unit: &U,
    scratch: Vec<u8>,
    position: u64,
    actual: usize,
) -> Result<U::Output, ReadError<U::Error>>
where
    U: Unit + ?Sized,
{
    let expected = scratch.len();
    if actual < expected {
        debug!(position, expected, actual, "short read ends unit");
        return Err(ReadError::EndOfStream { expected, actual });
    }
    unit.decode(&Bytes::from(scratch), 0).map_err(ReadError::Decode)
}

/// Unit reads as methods on any [`Tokenizer`], including `dyn Tokenizer`.
///
/// ```rust
/// use binunit_core::U16_BE;
/// use binunit_reader::UnitReader;
/// use binunit_tokenizer::BufferTokenizer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut tok = BufferTokenizer::new(vec![0xAC, 0x44]);
/// assert_eq!(tok.peek_unit(&U16_BE).await.unwrap(), 44100);
/// assert_eq!(tok.read_unit(&U16_BE).await.unwrap(), 44100);
/// assert!(tok.read_unit(&U16_BE).await.unwrap_err().is_end_of_stream());
/// # }
/// ```
#[async_trait]
pub trait UnitReader: Tokenizer {
    /// See [`read_unit_from_tokenizer`].
    async fn read_unit<U>(&mut self, unit: &U) -> Result<U::Output, ReadError<U::Error>>
    where
        U: Unit + Sync + ?Sized;

    /// See [`peek_unit_from_tokenizer`].
    async fn peek_unit<U>(&mut self, unit: &U) -> Result<U::Output, ReadError<U::Error>>
    where
        U: Unit + Sync + ?Sized;
}

#[async_trait]
impl<T: Tokenizer + ?Sized> UnitReader for T {
    async fn read_unit<U>(&mut self, unit: &U) -> Result<U::Output, ReadError<U::Error>>
    where
        U: Unit + Sync + ?Sized,
    {
        read_unit_from_tokenizer(self, unit).await
    }

    async fn peek_unit<U>(&mut self, unit: &U) -> Result<U::Output, ReadError<U::Error>>
    where
        U: Unit + Sync + ?Sized,
    {
        peek_unit_from_tokenizer(self, unit).await
    }
}
