#![no_main]

use binunit_core::{
    F80_BE, I16_BE, U8, U16_BE, U32_BE, Unit, UnitError, UnitExt, latin1, magic, pascal_string,
    sequence, sequence_map, sequence_to_struct,
};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Marker {
    id: u16,
    position: u32,
    name: String,
}

// Fuzz target: composite units built from sequences and struct builders.
//
// Catches bugs in:
// - Cursor arithmetic across children
// - Short-circuiting on the first failing child
// - Error propagation out of `map` and `recover`
fuzz_target!(|data: &[u8]| {
    let buf = Bytes::copy_from_slice(data);

    let comm = sequence((I16_BE, U32_BE, I16_BE, F80_BE));
    let _ = comm.decode(&buf, 0);

    let header = sequence_map((magic(b"ID3"), U8, U8, U8, U32_BE), |((), major, _, _, size)| {
        if major > 4 {
            return Err(UnitError::invalid("version"));
        }
        Ok(size)
    });
    let _ = header.decode(&buf, 0);

    let marker = sequence_to_struct::<Marker>()
        .field(U16_BE, |m, v| m.id = v)
        .field(U32_BE, |m, v| m.position = v)
        .field(pascal_string(8).recover(|_| Ok(String::new())), |m, v| m.name = v)
        .build();
    if let Ok(m) = marker.decode(&buf, 0) {
        assert!(m.name.len() <= 7 * 2);
        let _ = (m.id, m.position);
    }

    let chunks = sequence((latin1(4), U32_BE)).repeat(4);
    if let Ok(list) = chunks.decode(&buf, 0) {
        assert_eq!(list.len(), 4);
    }
});
