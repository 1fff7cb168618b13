//! IEEE-754 floating point units.
//!
//! Half precision decodes to `f32`. The 80-bit extended format (AIFF
//! sample rates) decodes to `f64` and comes in two flavours:
//!
//! | Unit           | Method                                         |
//! |----------------|------------------------------------------------|
//! | `F80_BE`       | exact sign / exponent / mantissa decomposition |
//! | `F80_BE_SHIFT` | top 16 mantissa bits shifted by the exponent   |
//!
//! `F80_BE` is authoritative. `F80_BE_SHIFT` reproduces the shortcut
//! older readers used for integral sample rates; it keeps 16 significant
//! bits, ignores the sign and truncates fractions.

use bytes::Bytes;

use crate::error::UnitError;
use crate::unit::{Unit, array};

/// Exponent bias of the 80-bit extended format.
const EXTENDED_BIAS: i32 = 16383;

macro_rules! float_unit {
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

float_unit!(/// IEEE binary16, big-endian.
    Float16Be, F16_BE, f32, 2, |b| half_to_f32(u16::from_be_bytes(b)));
float_unit!(/// IEEE binary16, little-endian.
    Float16Le, F16_LE, f32, 2, |b| half_to_f32(u16::from_le_bytes(b)));
float_unit!(/// IEEE binary32, big-endian.
    Float32Be, F32_BE, f32, 4, f32::from_be_bytes);
float_unit!(/// IEEE binary32, little-endian.
    Float32Le, F32_LE, f32, 4, f32::from_le_bytes);
float_unit!(/// IEEE binary64, big-endian.
    Float64Be, F64_BE, f64, 8, f64::from_be_bytes);
float_unit!(/// IEEE binary64, little-endian.
    Float64Le, F64_LE, f64, 8, f64::from_le_bytes);
float_unit!(/// 80-bit extended precision, big-endian, exact.
    Float80Be, F80_BE, f64, 10, extended_to_f64);
float_unit!(/// 80-bit extended precision, big-endian, bit-shift approximation.
    Float80BeShift, F80_BE_SHIFT, f64, 10, extended_shift_to_f64);

/// Widen a binary16 bit pattern.
fn half_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 == 0 { 1.0 } else { -1.0 };
    let exponent = (bits >> 10) & 0x1F;
    let fraction = f32::from(bits & 0x03FF);

    match exponent {
        0 => sign * fraction * 2f32.powi(-24),
        0x1F if fraction == 0.0 => sign * f32::INFINITY,
        0x1F => f32::NAN,
        e => sign * (1.0 + fraction / 1024.0) * 2f32.powi(i32::from(e) - 15),
    }
}

/// Multiply by `2^exp` in two halves so that neither factor under- or
/// overflows while the product is still representable.
fn scale(value: f64, exp: i32) -> f64 {
    let half = exp / 2;
    value * 2f64.powi(half) * 2f64.powi(exp - half)
}

/// Decode 80-bit extended precision.
///
/// ```text
///   bit 79      sign
///   bits 78-64  biased exponent (bias 16383)
///   bit 63      explicit integer bit
///   bits 62-0   fraction
/// ```
#[allow(clippy::cast_precision_loss)]
fn extended_to_f64(raw: [u8; 10]) -> f64 {
    let sign_exp = u16::from_be_bytes([raw[0], raw[1]]);
    let mantissa = u64::from_be_bytes([
        raw[2], raw[3], raw[4], raw[5], raw[6], raw[7], raw[8], raw[9],
    ]);
    let sign = if sign_exp & 0x8000 == 0 { 1.0 } else { -1.0 };
    let exponent = i32::from(sign_exp & 0x7FFF);

    if exponent == 0x7FFF {
        // Integer bit is not part of the infinity/NaN distinction
        return if mantissa & 0x7FFF_FFFF_FFFF_FFFF == 0 {
            sign * f64::INFINITY
        } else {
            f64::NAN
        };
    }
    if mantissa == 0 {
        return sign * 0.0;
    }

    // Subnormals share the minimum exponent
    let unbiased = if exponent == 0 {
        1 - EXTENDED_BIAS
    } else {
        exponent - EXTENDED_BIAS
    };
    sign * scale(mantissa as f64, unbiased - 63)
}

/// Legacy 80-bit decode: `mantissa[0..16] << (exponent - 16398)`.
fn extended_shift_to_f64(raw: [u8; 10]) -> f64 {
    let biased = u16::from_be_bytes([raw[0], raw[1]]) & 0x7FFF;
    let exponent = i32::from(biased) - (EXTENDED_BIAS + 15);
    let top = u32::from(u16::from_be_bytes([raw[2], raw[3]]));

    if exponent < 0 {
        let shift = exponent.unsigned_abs().min(31);
        f64::from(top >> shift)
    } else {
        scale(f64::from(top), exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a positive integer as 80-bit extended, big-endian.
    fn extended(value: u32) -> Bytes {
        let bits = 32 - value.leading_zeros();
        let exponent = u16::try_from(EXTENDED_BIAS + i32::try_from(bits).unwrap() - 1).unwrap();
        let mantissa = u64::from(value) << (64 - bits);
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&exponent.to_be_bytes());
        out.extend_from_slice(&mantissa.to_be_bytes());
        Bytes::from(out)
    }

    fn decode80(raw: [u8; 10]) -> f64 {
        F80_BE.decode(&Bytes::copy_from_slice(&raw), 0).unwrap()
    }

    #[test]
    fn extended_decoders_agree_on_sample_rates() {
        for rate in [8000u32, 44100, 48000, 88200, 96000, 192_000] {
            let raw = extended(rate);
            let exact = F80_BE.decode(&raw, 0).unwrap();
            let shifted = F80_BE_SHIFT.decode(&raw, 0).unwrap();
            assert_eq!(exact, f64::from(rate), "exact decode of {rate}");
            assert_eq!(shifted, exact, "decoders disagree on {rate}");
        }
    }

    #[test]
    fn extended_known_aiff_encoding() {
        // 44100 Hz as written in an AIFF COMM chunk
        let raw = [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode80(raw), 44100.0);
    }

    #[test]
    fn extended_special_values() {
        assert_eq!(decode80([0; 10]).to_bits(), 0.0f64.to_bits());
        assert_eq!(decode80([0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0]).to_bits(), (-0.0f64).to_bits());

        let inf = [0x7F, 0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode80(inf), f64::INFINITY);
        let neg_inf = [0xFF, 0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode80(neg_inf), f64::NEG_INFINITY);
        let nan = [0x7F, 0xFF, 0xC0, 0, 0, 0, 0, 0, 0, 0];
        assert!(decode80(nan).is_nan());
    }

    #[test]
    fn extended_fraction_and_sign() {
        // 1.5 = 0x3FFF, mantissa 0xC000...
        assert_eq!(decode80([0x3F, 0xFF, 0xC0, 0, 0, 0, 0, 0, 0, 0]), 1.5);
        assert_eq!(decode80([0xBF, 0xFF, 0xC0, 0, 0, 0, 0, 0, 0, 0]), -1.5);
    }

    #[test]
    fn shift_decode_drops_the_sign_bit() {
        let raw = [0xC0, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode80(raw), -44_100.0);
        let shifted = F80_BE_SHIFT.decode(&Bytes::copy_from_slice(&raw), 0).unwrap();
        assert_eq!(shifted, 44_100.0);
    }

    #[test]
    fn extended_subnormal_underflows_to_zero() {
        let value = decode80([0x00, 0x00, 0x40, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn half_precision_values() {
        let cases: [(u16, f32); 6] = [
            (0x3C00, 1.0),
            (0xC000, -2.0),
            (0x3555, 0.333_251_95),
            (0x7BFF, 65504.0),
            (0x0001, 5.960_464_5e-8),
            (0x0000, 0.0),
        ];
        for (bits, expected) in cases {
            let buf = Bytes::copy_from_slice(&bits.to_be_bytes());
            assert_eq!(F16_BE.decode(&buf, 0).unwrap(), expected, "bits {bits:#06X}");
            let buf = Bytes::copy_from_slice(&bits.to_le_bytes());
            assert_eq!(F16_LE.decode(&buf, 0).unwrap(), expected, "bits {bits:#06X}");
        }
    }

    #[test]
    fn half_precision_special_values() {
        let neg_zero = F16_BE.decode(&Bytes::from_static(&[0x80, 0x00]), 0).unwrap();
        assert_eq!(neg_zero.to_bits(), (-0.0f32).to_bits());
        assert_eq!(F16_BE.decode(&Bytes::from_static(&[0x7C, 0x00]), 0), Ok(f32::INFINITY));
        assert_eq!(
            F16_BE.decode(&Bytes::from_static(&[0xFC, 0x00]), 0),
            Ok(f32::NEG_INFINITY)
        );
        assert!(F16_BE.decode(&Bytes::from_static(&[0x7E, 0x00]), 0).unwrap().is_nan());
    }

    #[test]
    fn single_and_double_special_values() {
        for value in [0.0f32, -0.0, f32::INFINITY, f32::NEG_INFINITY, 1.25] {
            let be = Bytes::copy_from_slice(&value.to_be_bytes());
            let le = Bytes::copy_from_slice(&value.to_le_bytes());
            assert_eq!(F32_BE.decode(&be, 0).unwrap().to_bits(), value.to_bits());
            assert_eq!(F32_LE.decode(&le, 0).unwrap().to_bits(), value.to_bits());
        }
        for value in [0.0f64, -0.0, f64::INFINITY, f64::NEG_INFINITY, -3.5] {
            let be = Bytes::copy_from_slice(&value.to_be_bytes());
            let le = Bytes::copy_from_slice(&value.to_le_bytes());
            assert_eq!(F64_BE.decode(&be, 0).unwrap().to_bits(), value.to_bits());
            assert_eq!(F64_LE.decode(&le, 0).unwrap().to_bits(), value.to_bits());
        }
        let nan = Bytes::copy_from_slice(&f64::NAN.to_be_bytes());
        assert!(F64_BE.decode(&nan, 0).unwrap().is_nan());
        let nan = Bytes::copy_from_slice(&f32::NAN.to_le_bytes());
        assert!(F32_LE.decode(&nan, 0).unwrap().is_nan());
    }
}
