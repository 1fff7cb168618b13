use std::path::PathBuf;

use crate::error::TokenizerError;

/// Per-call options for [`read_buffer`](crate::Tokenizer::read_buffer) and
/// [`peek_buffer`](crate::Tokenizer::peek_buffer).
///
/// ```text
/// ┌─────────────┬─────────────────────┬──────────────────────────────────────┐
/// │ Field       │ Default             │ Meaning                              │
/// ├─────────────┼─────────────────────┼──────────────────────────────────────┤
/// │ position    │ current position    │ absolute source position to start at │
/// │ length      │ dst.len() - offset  │ bytes requested                      │
/// │ offset      │ 0                   │ write offset into dst                │
/// │ may_be_less │ false               │ accept a short transfer              │
/// └─────────────┴─────────────────────┴──────────────────────────────────────┘
/// ```
///
/// `position` may only point at or beyond the current position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Absolute position in the source. `None` means "here".
    pub position: Option<u64>,

    /// Number of bytes to transfer. `None` fills the rest of `dst`.
    pub length: Option<usize>,

    /// Offset in `dst` at which bytes are written.
    pub offset: usize,

    /// When set, transferring fewer than `length` bytes is not an error and
    /// the caller must inspect the returned count.
    pub may_be_less: bool,
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_position(mut self, position: u64) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_may_be_less(mut self, may_be_less: bool) -> Self {
        self.may_be_less = may_be_less;
        self
    }

    /// Validate these options against a destination of `capacity` bytes
    /// and a tokenizer at `current`.
    ///
    /// # Errors
    ///
    /// - [`TokenizerError::BackwardSeek`] if `position < current`.
    /// - [`TokenizerError::InvalidRange`] if `offset + length > capacity`.
    pub fn resolve(&self, capacity: usize, current: u64) -> Result<Request, TokenizerError> {
        let position = self.position.unwrap_or(current);
        if position < current {
            return Err(TokenizerError::BackwardSeek {
                requested: position,
                current,
            });
        }

        let length = self
            .length
            .unwrap_or_else(|| capacity.saturating_sub(self.offset));
        let fits = self
            .offset
            .checked_add(length)
            .is_some_and(|end| end <= capacity);
        if !fits {
            return Err(TokenizerError::InvalidRange {
                offset: self.offset,
                length,
                capacity,
            });
        }

        Ok(Request {
            position,
            offset: self.offset,
            length,
            may_be_less: self.may_be_less,
        })
    }
}

/// [`ReadOptions`] after validation, with every default filled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub position: u64,
    pub offset: usize,
    pub length: usize,
    pub may_be_less: bool,
}

impl Request {
    /// The destination range this request writes.
    #[must_use]
    pub fn range(&self, transferred: usize) -> std::ops::Range<usize> {
        self.offset..self.offset + transferred
    }
}

/// What is known about a tokenizer's source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// Total size in bytes, when known.
    pub size: Option<u64>,

    /// MIME type reported by whoever opened the source.
    pub mime_type: Option<String>,

    /// File path, for sources backed by a file.
    pub path: Option<PathBuf>,
}

impl FileInfo {
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}
