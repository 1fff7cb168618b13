#![warn(clippy::pedantic)]

pub mod buffer;
pub mod error;
pub mod options;
pub mod stream;
pub mod tokenizer;

pub use buffer::BufferTokenizer;
pub use error::TokenizerError;
pub use options::{FileInfo, ReadOptions, Request};
pub use stream::StreamTokenizer;
pub use tokenizer::Tokenizer;
