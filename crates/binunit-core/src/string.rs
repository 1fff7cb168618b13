//! Byte slices and fixed-length strings.
//!
//! Text decoding is lossy: invalid sequences become U+FFFD rather than
//! failing the unit, since tag text in the wild is routinely malformed.

use ::bytes::Bytes;

use crate::error::UnitError;
use crate::unit::{Unit, window};

/// Zero-copy fixed-length byte slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteSlice {
    len: usize,
}

/// `len` raw bytes, returned as a sub-slice of the input buffer.
#[must_use]
pub const fn bytes(len: usize) -> ByteSlice {
    ByteSlice { len }
}

impl Unit for ByteSlice {
    type Output = Bytes;
    type Error = UnitError;

    fn size(&self) -> usize {
        self.len
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<Bytes, UnitError> {
        window(buf, offset, self.len)?;
        Ok(buf.slice(offset..offset + self.len))
    }
}

/// Character encodings understood by [`FixedString`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
    /// Windows code page 1252 (latin1 with printable 0x80-0x9F).
    Windows1252,
    Utf8,
    Utf16Le,
    Utf16Be,
    /// UTF-16 with the byte order taken from a leading byte order mark,
    /// big-endian when there is none.
    Utf16Bom,
}

/// A string occupying exactly `len` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedString {
    len: usize,
    encoding: Encoding,
}

/// A `len`-byte string in the given encoding.
#[must_use]
pub const fn string(len: usize, encoding: Encoding) -> FixedString {
    FixedString { len, encoding }
}

#[must_use]
pub const fn latin1(len: usize) -> FixedString {
    string(len, Encoding::Latin1)
}

#[must_use]
pub const fn windows1252(len: usize) -> FixedString {
    string(len, Encoding::Windows1252)
}

#[must_use]
pub const fn utf8(len: usize) -> FixedString {
    string(len, Encoding::Utf8)
}

#[must_use]
pub const fn utf16le(len: usize) -> FixedString {
    string(len, Encoding::Utf16Le)
}

#[must_use]
pub const fn utf16be(len: usize) -> FixedString {
    string(len, Encoding::Utf16Be)
}

/// UTF-16 with byte order mark detection.
#[must_use]
pub const fn utf16(len: usize) -> FixedString {
    string(len, Encoding::Utf16Bom)
}

impl Unit for FixedString {
    type Output = String;
    type Error = UnitError;

    fn size(&self) -> usize {
        self.len
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<String, UnitError> {
        let raw = window(buf, offset, self.len)?;
        Ok(decode_text(raw, self.encoding))
    }
}

/// Decode `raw` as text in `encoding`.
#[must_use]
pub fn decode_text(raw: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Latin1 => raw.iter().map(|&b| char::from(b)).collect(),
        Encoding::Windows1252 => raw.iter().map(|&b| windows1252_char(b)).collect(),
        Encoding::Utf8 => String::from_utf8_lossy(raw).into_owned(),
        Encoding::Utf16Le => utf16_units(raw, u16::from_le_bytes),
        Encoding::Utf16Be => utf16_units(raw, u16::from_be_bytes),
        Encoding::Utf16Bom => utf16_sniffed(raw),
    }
}

fn utf16_units(raw: &[u8], read: fn([u8; 2]) -> u16) -> String {
    let units = raw.chunks_exact(2).map(|pair| read([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Consume byte order marks until the first character, then decode the
/// remainder in the last order seen.
fn utf16_sniffed(raw: &[u8]) -> String {
    let mut read: fn([u8; 2]) -> u16 = u16::from_be_bytes;
    let mut start = 0;

    for pair in raw.chunks_exact(2) {
        match pair {
            [0xFF, 0xFE] => read = u16::from_le_bytes,
            [0xFE, 0xFF] => read = u16::from_be_bytes,
            _ => break,
        }
        start += 2;
    }

    utf16_units(&raw[start..], read)
}

/// Code points for 0x80-0x9F; unmapped positions pass through as C1
/// controls.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn windows1252_char(b: u8) -> char {
    match b {
        0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(b - 0x80)],
        _ => char::from(b),
    }
}

/// Length-prefixed string inside an even-sized frame.
///
/// ```text
///   │ count (u8) │ count chars │ [0x00 pad] │
///   └──────────── size bytes, even ─────────┘
/// ```
///
/// The count must be `size - 1`, or `size - 2` followed by a zero pad
/// byte. Characters are latin1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PascalString {
    size: usize,
}

/// A Pascal string framed in exactly `size` bytes.
#[must_use]
pub const fn pascal_string(size: usize) -> PascalString {
    PascalString { size }
}

impl Unit for PascalString {
    type Output = String;
    type Error = UnitError;

    fn size(&self) -> usize {
        self.size
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<String, UnitError> {
        if self.size % 2 != 0 {
            return Err(UnitError::OddLength { length: self.size });
        }
        let raw = window(buf, offset, self.size)?;
        let Some((&count, rest)) = raw.split_first() else {
            return Err(UnitError::LengthMismatch {
                declared: 0,
                available: 0,
            });
        };

        let count = usize::from(count);
        let text = match rest.len().checked_sub(count) {
            Some(0) => rest,
            Some(1) if rest[count] == 0 => &rest[..count],
            _ => {
                return Err(UnitError::LengthMismatch {
                    declared: count,
                    available: rest.len(),
                });
            }
        };
        Ok(decode_text(text, Encoding::Latin1))
    }
}
