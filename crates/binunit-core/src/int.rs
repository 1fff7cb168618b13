//! Fixed-size integer units in both byte orders.
//!
//! Each unit is a zero-sized type with a matching constant, so
//! `U32_BE.decode(&buf, 0)` and `sequence((U8, U32_BE))` read naturally.
//! 24-bit values widen to `u32`/`i32`; the signed variant is
//! sign-extended from bit 23.

use bytes::Bytes;

use crate::error::UnitError;
use crate::unit::{Unit, array};

macro_rules! int_unit {
    ($(#[$doc:meta])* $name:ident, $konst:ident, $ty:ty, $size:literal, $read:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        $(#[$doc])*
        pub const $konst: $name = $name;

        impl Unit for $name {
            type Output = $ty;
            type Error = UnitError;

            fn size(&self) -> usize {
                $size
            }

            fn decode(&self, buf: &Bytes, offset: usize) -> Result<$ty, UnitError> {
                let raw = array::<$size>(buf, offset)?;
                Ok($read(raw))
            }
        }
    };
}

int_unit!(/// Unsigned 8-bit integer.
    UInt8, U8, u8, 1, |b: [u8; 1]| b[0]);
int_unit!(/// Unsigned 16-bit integer, big-endian.
    UInt16Be, U16_BE, u16, 2, u16::from_be_bytes);
int_unit!(/// Unsigned 16-bit integer, little-endian.
    UInt16Le, U16_LE, u16, 2, u16::from_le_bytes);
int_unit!(/// Unsigned 24-bit integer, big-endian.
    UInt24Be, U24_BE, u32, 3, |b: [u8; 3]| u32::from_be_bytes([0, b[0], b[1], b[2]]));
int_unit!(/// Unsigned 24-bit integer, little-endian.
    UInt24Le, U24_LE, u32, 3, |b: [u8; 3]| u32::from_le_bytes([b[0], b[1], b[2], 0]));
int_unit!(/// Unsigned 32-bit integer, big-endian.
    UInt32Be, U32_BE, u32, 4, u32::from_be_bytes);
int_unit!(/// Unsigned 32-bit integer, little-endian.
    UInt32Le, U32_LE, u32, 4, u32::from_le_bytes);
int_unit!(/// Unsigned 64-bit integer, big-endian.
    UInt64Be, U64_BE, u64, 8, u64::from_be_bytes);
int_unit!(/// Unsigned 64-bit integer, little-endian.
    UInt64Le, U64_LE, u64, 8, u64::from_le_bytes);

int_unit!(/// Signed 8-bit integer.
    Int8, I8, i8, 1, i8::from_be_bytes);
int_unit!(/// Signed 16-bit integer, big-endian.
    Int16Be, I16_BE, i16, 2, i16::from_be_bytes);
int_unit!(/// Signed 16-bit integer, little-endian.
    Int16Le, I16_LE, i16, 2, i16::from_le_bytes);
int_unit!(/// Signed 24-bit integer, big-endian.
    Int24Be, I24_BE, i32, 3, |b: [u8; 3]| i32::from_be_bytes([b[0], b[1], b[2], 0]) >> 8);
int_unit!(/// Signed 24-bit integer, little-endian.
    Int24Le, I24_LE, i32, 3, |b: [u8; 3]| i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8);
int_unit!(/// Signed 32-bit integer, big-endian.
    Int32Be, I32_BE, i32, 4, i32::from_be_bytes);
int_unit!(/// Signed 32-bit integer, little-endian.
    Int32Le, I32_LE, i32, 4, i32::from_le_bytes);
int_unit!(/// Signed 64-bit integer, big-endian.
    Int64Be, I64_BE, i64, 8, i64::from_be_bytes);
int_unit!(/// Signed 64-bit integer, little-endian.
    Int64Le, I64_LE, i64, 8, i64::from_le_bytes);

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(bytes: &'static [u8]) -> Bytes {
        Bytes::from_static(bytes)
    }

    #[test]
    fn sizes_match_widths() {
        assert_eq!(U8.size(), 1);
        assert_eq!(U16_LE.size(), 2);
        assert_eq!(U24_BE.size(), 3);
        assert_eq!(I32_LE.size(), 4);
        assert_eq!(U64_BE.size(), 8);
    }

    #[test]
    fn unsigned_byte_orders() {
        let b = buf(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(U8.decode(&b, 1), Ok(0x02));
        assert_eq!(U16_BE.decode(&b, 0), Ok(0x0102));
        assert_eq!(U16_LE.decode(&b, 0), Ok(0x0201));
        assert_eq!(U24_BE.decode(&b, 0), Ok(0x01_0203));
        assert_eq!(U24_LE.decode(&b, 0), Ok(0x03_0201));
        assert_eq!(U32_BE.decode(&b, 4), Ok(0x0506_0708));
        assert_eq!(U32_LE.decode(&b, 4), Ok(0x0807_0605));
        assert_eq!(U64_BE.decode(&b, 0), Ok(0x0102_0304_0506_0708));
        assert_eq!(U64_LE.decode(&b, 0), Ok(0x0807_0605_0403_0201));
    }

    #[test]
    fn u64_holds_full_range() {
        let b = buf(&[0xFF; 8]);
        assert_eq!(U64_BE.decode(&b, 0), Ok(u64::MAX));
        assert_eq!(I64_LE.decode(&b, 0), Ok(-1));
    }

    #[test]
    fn signed_values() {
        assert_eq!(I8.decode(&buf(&[0x80]), 0), Ok(-128));
        assert_eq!(I16_BE.decode(&buf(&[0xFF, 0xFE]), 0), Ok(-2));
        assert_eq!(I16_LE.decode(&buf(&[0xFE, 0xFF]), 0), Ok(-2));
        assert_eq!(I32_BE.decode(&buf(&[0x80, 0, 0, 0]), 0), Ok(i32::MIN));
        assert_eq!(
            I64_BE.decode(&buf(&[0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]), 0),
            Ok(i64::MAX)
        );
    }

    #[test]
    fn int24_sign_extension() {
        assert_eq!(I24_BE.decode(&buf(&[0xFF, 0xFF, 0xFF]), 0), Ok(-1));
        assert_eq!(I24_BE.decode(&buf(&[0x80, 0x00, 0x00]), 0), Ok(-8_388_608));
        assert_eq!(I24_BE.decode(&buf(&[0x7F, 0xFF, 0xFF]), 0), Ok(8_388_607));
        assert_eq!(I24_LE.decode(&buf(&[0x00, 0x00, 0x80]), 0), Ok(-8_388_608));
        assert_eq!(I24_LE.decode(&buf(&[0x01, 0x00, 0x00]), 0), Ok(1));
    }

    #[test]
    fn short_buffer_is_out_of_bounds() {
        let result = U32_BE.decode(&buf(&[0x00, 0x01, 0x02]), 0);
        assert_eq!(
            result,
            Err(UnitError::OutOfBounds {
                offset: 0,
                size: 4,
                available: 3
            })
        );
    }
}
