#![no_main]

use binunit_core::{Encoding, Unit, pascal_string, string};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

// Fuzz target: text units with arbitrary lengths and encodings.
//
// Catches bugs in:
// - BOM sniffing on short or odd-length input
// - windows-1252 table lookups
// - Pascal string count / pad validation
fuzz_target!(|input: (u8, u8, &[u8])| {
    let (len, which, data) = input;
    let buf = Bytes::copy_from_slice(data);
    let len = usize::from(len);

    let encoding = match which % 6 {
        0 => Encoding::Latin1,
        1 => Encoding::Windows1252,
        2 => Encoding::Utf8,
        3 => Encoding::Utf16Le,
        4 => Encoding::Utf16Be,
        _ => Encoding::Utf16Bom,
    };
    let unit = string(len, encoding);
    assert_eq!(unit.decode(&buf, 0).is_ok(), len <= buf.len());

    if let Ok(text) = pascal_string(len).decode(&buf, 0) {
        assert!(text.chars().count() < len);
    }
});
