#![warn(clippy::pedantic)]

pub mod adapter;
pub mod error;

pub use adapter::{
    UnitReader, peek_unit_from_tokenizer, read_unit_from_buffer, read_unit_from_tokenizer,
};
pub use error::ReadError;
