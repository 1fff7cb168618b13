#![warn(clippy::pedantic)]

pub mod combinator;
pub mod error;
pub mod float;
pub mod int;
pub mod record;
pub mod string;
pub mod unit;

pub use combinator::{
    Map, MapErr, Recover, Repeat, Sequence, UnitExt, map, map_err, recover, repeat, sequence,
    sequence_map,
};
pub use error::UnitError;
pub use float::{F16_BE, F16_LE, F32_BE, F32_LE, F64_BE, F64_LE, F80_BE, F80_BE_SHIFT};
pub use int::{
    I8, I16_BE, I16_LE, I24_BE, I24_LE, I32_BE, I32_LE, I64_BE, I64_LE, U8, U16_BE, U16_LE,
    U24_BE, U24_LE, U32_BE, U32_LE, U64_BE, U64_LE,
};
pub use record::{StructBuilder, StructUnit, sequence_to_struct};
pub use string::{
    ByteSlice, Encoding, FixedString, PascalString, bytes, latin1, pascal_string, string, utf8,
    utf16, utf16be, utf16le, windows1252,
};
pub use unit::{Magic, Pad, Skip, Unit, Val, magic, pad, skip, val, window};
