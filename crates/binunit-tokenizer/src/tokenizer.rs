use async_trait::async_trait;

use crate::error::TokenizerError;
use crate::options::{FileInfo, ReadOptions};

/// A position-tracked, forward-only cursor over a byte source.
///
/// ```text
///   source:  │ consumed │ position ─► ...                │ size? │
///                          ├─ peek_buffer: copy, stay ─┤
///                          ├─ read_buffer: copy, advance ─┤
/// ```
///
/// Two operations transfer bytes into a caller-provided slice:
///
/// - [`peek_buffer`](Self::peek_buffer) copies without moving the cursor.
///   Repeated peeks at one position return identical bytes.
/// - [`read_buffer`](Self::read_buffer) copies and advances the cursor by
///   the number of bytes transferred (plus any gap skipped to reach
///   `options.position`).
///
/// Both return the number of bytes actually transferred. Unless
/// `options.may_be_less` is set, a short transfer is reported as
/// [`TokenizerError::EndOfStream`].
///
/// Every I/O method takes `&mut self`: one tokenizer has exactly one
/// logical reader. Independent tokenizers can be driven concurrently.
#[async_trait]
pub trait Tokenizer: Send {
    /// Current absolute position.
    fn position(&self) -> u64;

    /// What is known about the source, including its total size.
    fn file_info(&self) -> &FileInfo;

    /// Copy bytes into `dst` and advance.
    ///
    /// # Errors
    ///
    /// - [`TokenizerError::EndOfStream`] on a short transfer without
    ///   `may_be_less`. Any gap before `options.position` is consumed
    ///   (up to the end of the source); the requested window is not.
    /// - [`TokenizerError::BackwardSeek`] if `options.position` is behind.
    /// - [`TokenizerError::InvalidRange`] if the range does not fit `dst`.
    /// - [`TokenizerError::Closed`] after [`close`](Self::close).
    /// - [`TokenizerError::Io`] from the underlying source.
    async fn read_buffer(
        &mut self,
        dst: &mut [u8],
        options: ReadOptions,
    ) -> Result<usize, TokenizerError>;

    /// Copy bytes into `dst` without advancing.
    ///
    /// # Errors
    ///
    /// Same as [`read_buffer`](Self::read_buffer).
    async fn peek_buffer(
        &mut self,
        dst: &mut [u8],
        options: ReadOptions,
    ) -> Result<usize, TokenizerError>;

    /// Advance up to `length` bytes without copying them out. Stops early
    /// at the end of the source.
    ///
    /// Returns the number of bytes skipped.
    ///
    /// # Errors
    ///
    /// [`TokenizerError::Closed`] or [`TokenizerError::Io`].
    async fn ignore(&mut self, length: u64) -> Result<u64, TokenizerError>;

    /// Release the source. Later calls fail with
    /// [`TokenizerError::Closed`].
    ///
    /// # Errors
    ///
    /// Implementations may surface I/O errors raised while closing.
    async fn close(&mut self) -> Result<(), TokenizerError>;
}
