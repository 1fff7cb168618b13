#![no_main]

use binunit_core::{
    F16_BE, F16_LE, F32_BE, F64_LE, F80_BE, F80_BE_SHIFT, I16_LE, I24_BE, I24_LE, I64_BE, U8,
    U16_BE, U24_BE, U32_LE, U64_LE, Unit,
};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

// Fuzz target: every fixed-width numeric unit at an arbitrary offset.
//
// Catches bugs in:
// - Bounds checks (offset + size overflow, short buffers)
// - 24-bit sign extension
// - Half and extended float special cases (NaN, inf, subnormals)
fuzz_target!(|input: (u16, &[u8])| {
    let (offset, data) = input;
    let buf = Bytes::copy_from_slice(data);
    let offset = usize::from(offset);

    macro_rules! check {
        ($($unit:expr),+) => {
            $(
                let result = $unit.decode(&buf, offset);
                assert_eq!(result.is_ok(), offset + $unit.size() <= buf.len());
            )+
        };
    }

    check!(
        U8, U16_BE, U24_BE, U32_LE, U64_LE, I16_LE, I24_BE, I24_LE, I64_BE, F16_BE, F16_LE,
        F32_BE, F64_LE, F80_BE, F80_BE_SHIFT
    );
});
