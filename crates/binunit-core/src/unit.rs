use std::marker::PhantomData;

use bytes::Bytes;

use crate::error::UnitError;

/// A reusable, pure description of a fixed-size binary structure.
///
/// A unit reports how many bytes it occupies and decodes exactly that many
/// bytes starting at `offset`. Decoding never mutates the input and never
/// panics: failures come back as `Err(Self::Error)`.
///
/// ```text
///   buf:  ... │ offset │ ─── size() bytes ─── │ ...
///                 └── decode(buf, offset) → Result<Output, Error>
/// ```
///
/// Units are built once (as constants or by factory functions such as
/// [`bytes`](crate::string::bytes)) and reused across many decodes. The
/// input is a [`Bytes`] so that byte-slice units can hand out zero-copy
/// sub-slices.
pub trait Unit {
    /// The decoded value.
    type Output;

    /// The value-level error, returned when the bytes are invalid.
    type Error;

    /// Number of bytes this unit consumes.
    fn size(&self) -> usize;

    /// Decode `size()` bytes of `buf` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the bytes do not describe a valid value,
    /// including when `buf` is too short to hold the unit.
    fn decode(&self, buf: &Bytes, offset: usize) -> Result<Self::Output, Self::Error>;
}

impl<U: Unit + ?Sized> Unit for &U {
    type Output = U::Output;
    type Error = U::Error;

    fn size(&self) -> usize {
        (**self).size()
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<Self::Output, Self::Error> {
        (**self).decode(buf, offset)
    }
}

impl<U: Unit + ?Sized> Unit for Box<U> {
    type Output = U::Output;
    type Error = U::Error;

    fn size(&self) -> usize {
        (**self).size()
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<Self::Output, Self::Error> {
        (**self).decode(buf, offset)
    }
}

/// Borrow `size` bytes of `buf` starting at `offset`.
///
/// # Errors
///
/// [`UnitError::OutOfBounds`] if the range runs past the end of `buf`.
pub fn window(buf: &[u8], offset: usize, size: usize) -> Result<&[u8], UnitError> {
    offset
        .checked_add(size)
        .and_then(|end| buf.get(offset..end))
        .ok_or(UnitError::OutOfBounds {
            offset,
            size,
            available: buf.len(),
        })
}

/// Copy `N` bytes at `offset` into a fixed array.
pub(crate) fn array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], UnitError> {
    let mut out = [0u8; N];
    out.copy_from_slice(window(buf, offset, N)?);
    Ok(out)
}

/// Reserved bytes: advances `size` bytes and decodes to `()`.
///
/// The bytes are never inspected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Skip {
    size: usize,
}

/// Skip `size` bytes.
#[must_use]
pub const fn skip(size: usize) -> Skip {
    Skip { size }
}

impl Unit for Skip {
    type Output = ();
    type Error = UnitError;

    fn size(&self) -> usize {
        self.size
    }

    fn decode(&self, _buf: &Bytes, _offset: usize) -> Result<(), UnitError> {
        Ok(())
    }
}

/// Keeps the inner unit's decoder but reports a different size.
///
/// Used when a value is followed by alignment or reserved bytes that
/// belong to the same structure: `pad(U16_BE, 4)` reads a `u16` and
/// accounts for four bytes.
#[derive(Clone, Copy, Debug)]
pub struct Pad<U> {
    inner: U,
    size: usize,
}

/// Wrap `unit` so that it reports `size` bytes.
pub const fn pad<U: Unit>(unit: U, size: usize) -> Pad<U> {
    Pad { inner: unit, size }
}

impl<U: Unit> Unit for Pad<U> {
    type Output = U::Output;
    type Error = U::Error;

    fn size(&self) -> usize {
        self.size
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<U::Output, U::Error> {
        self.inner.decode(buf, offset)
    }
}

/// A zero-size constant.
///
/// Decodes to a clone of the stored value without touching the input,
/// which lets a composite stub out a field it does not parse yet while
/// keeping its size bookkeeping intact.
pub struct Val<T, E = UnitError> {
    value: T,
    _error: PhantomData<fn() -> E>,
}

impl<T, E> Val<T, E> {
    /// A constant with an explicit error type, for composing with units
    /// that do not use [`UnitError`].
    pub const fn new(value: T) -> Self {
        Self {
            value,
            _error: PhantomData,
        }
    }
}

impl<T: Clone, E> Clone for Val<T, E> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: std::fmt::Debug, E> std::fmt::Debug for Val<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Val").field(&self.value).finish()
    }
}

/// A zero-size unit that always decodes to `value`.
pub const fn val<T: Clone>(value: T) -> Val<T> {
    Val::new(value)
}

impl<T: Clone, E> Unit for Val<T, E> {
    type Output = T;
    type Error = E;

    fn size(&self) -> usize {
        0
    }

    fn decode(&self, _buf: &Bytes, _offset: usize) -> Result<T, E> {
        Ok(self.value.clone())
    }
}

/// Constant bytes that must appear verbatim, such as a chunk ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Magic {
    expected: &'static [u8],
}

/// Match `expected` exactly, decoding to `()`.
#[must_use]
pub const fn magic(expected: &'static [u8]) -> Magic {
    Magic { expected }
}

impl Unit for Magic {
    type Output = ();
    type Error = UnitError;

    fn size(&self) -> usize {
        self.expected.len()
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<(), UnitError> {
        let found = window(buf, offset, self.expected.len())?;
        if found == self.expected {
            Ok(())
        } else {
            Err(UnitError::BadMagic {
                expected: self.expected.to_vec(),
                found: found.to_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int::{U16_BE, U8};

    #[test]
    fn window_rejects_overrun() {
        let buf = [1u8, 2, 3];
        assert_eq!(window(&buf, 1, 2).unwrap(), &[2, 3]);
        assert_eq!(
            window(&buf, 2, 2),
            Err(UnitError::OutOfBounds {
                offset: 2,
                size: 2,
                available: 3
            })
        );
    }

    #[test]
    fn window_rejects_offset_overflow() {
        let buf = [0u8; 4];
        assert!(matches!(
            window(&buf, usize::MAX, 2),
            Err(UnitError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn zero_length_window_at_end() {
        let buf = [0u8; 2];
        assert_eq!(window(&buf, 2, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn skip_reports_size_and_decodes_unit() {
        let unit = skip(7);
        assert_eq!(unit.size(), 7);
        assert_eq!(unit.decode(&Bytes::new(), 0), Ok(()));
    }

    #[test]
    fn pad_overrides_size_only() {
        let unit = pad(U16_BE, 4);
        assert_eq!(unit.size(), 4);
        let buf = Bytes::from_static(&[0x01, 0x02, 0xFF, 0xFF]);
        assert_eq!(unit.decode(&buf, 0), Ok(0x0102));
    }

    #[test]
    fn val_is_zero_size_constant() {
        let unit = val("stub");
        assert_eq!(unit.size(), 0);
        assert_eq!(unit.decode(&Bytes::new(), 0), Ok("stub"));
        assert_eq!(unit.decode(&Bytes::new(), 100), Ok("stub"));
    }

    #[test]
    fn magic_accepts_and_rejects() {
        let unit = magic(b"FORM");
        assert_eq!(unit.size(), 4);
        assert_eq!(unit.decode(&Bytes::from_static(b"FORM"), 0), Ok(()));
        assert_eq!(
            unit.decode(&Bytes::from_static(b"RIFF"), 0),
            Err(UnitError::BadMagic {
                expected: b"FORM".to_vec(),
                found: b"RIFF".to_vec(),
            })
        );
    }

    #[test]
    fn references_and_boxes_are_units() {
        let buf = Bytes::from_static(&[0x2A]);
        let by_ref = &U8;
        assert_eq!(by_ref.decode(&buf, 0), Ok(0x2A));
        let boxed: Box<dyn Unit<Output = u8, Error = UnitError>> = Box::new(U8);
        assert_eq!(boxed.size(), 1);
        assert_eq!(boxed.decode(&buf, 0), Ok(0x2A));
    }
}
