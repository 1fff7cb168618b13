use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TokenizerError;
use crate::options::{FileInfo, ReadOptions, Request};
use crate::tokenizer::Tokenizer;

/// Tokenizer over bytes already in memory.
///
/// Typically created ad hoc over a sub-region that the outer parser has
/// already extracted, such as one tag's value, so the same units decode
/// both live streams and in-memory slices. Never suspends.
#[derive(Clone, Debug)]
pub struct BufferTokenizer {
    data: Bytes,
    position: u64,
    file_info: FileInfo,
    closed: bool,
}

impl BufferTokenizer {
    /// Tokenize `data`. The reported size is `data.len()`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_file_info(data, FileInfo::default())
    }

    /// Tokenize `data` with caller-supplied source details. A missing
    /// `size` defaults to `data.len()`.
    pub fn with_file_info(data: impl Into<Bytes>, mut file_info: FileInfo) -> Self {
        let data = data.into();
        if file_info.size.is_none() {
            file_info.size = Some(data.len() as u64);
        }
        Self {
            data,
            position: 0,
            file_info,
            closed: false,
        }
    }

    /// Bytes between the cursor and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.index(self.position))
    }

    fn index(&self, position: u64) -> usize {
        usize::try_from(position).unwrap_or(usize::MAX)
    }

    fn ensure_open(&self) -> Result<(), TokenizerError> {
        if self.closed {
            Err(TokenizerError::Closed)
        } else {
            Ok(())
        }
    }

    /// Where a request starts in `data`, clamped to its end.
    fn start(&self, request: &Request) -> usize {
        self.index(request.position).min(self.data.len())
    }

    /// Copy without moving; shared by peek and read.
    fn copy_out(&self, dst: &mut [u8], request: &Request) -> Result<usize, TokenizerError> {
        let start = self.start(request);
        let available = self.data.len().saturating_sub(start).min(request.length);
        if available < request.length && !request.may_be_less {
            return Err(TokenizerError::EndOfStream {
                position: request.position,
            });
        }

        dst[request.range(available)].copy_from_slice(&self.data[start..start + available]);
        Ok(available)
    }
}

#[async_trait]
impl Tokenizer for BufferTokenizer {
    fn position(&self) -> u64 {
        self.position
    }

    fn file_info(&self) -> &FileInfo {
        &self.file_info
    }

    async fn read_buffer(
        &mut self,
        dst: &mut [u8],
        options: ReadOptions,
    ) -> Result<usize, TokenizerError> {
        self.ensure_open()?;
        let request = options.resolve(dst.len(), self.position)?;
        // The gap is consumed even if the window then comes up short.
        self.position = self.start(&request) as u64;
        let transferred = self.copy_out(dst, &request)?;
        self.position += transferred as u64;
        Ok(transferred)
    }

    async fn peek_buffer(
        &mut self,
        dst: &mut [u8],
        options: ReadOptions,
    ) -> Result<usize, TokenizerError> {
        self.ensure_open()?;
        let request = options.resolve(dst.len(), self.position)?;
        self.copy_out(dst, &request)
    }

    async fn ignore(&mut self, length: u64) -> Result<u64, TokenizerError> {
        self.ensure_open()?;
        let skipped = length.min(self.remaining() as u64);
        self.position += skipped;
        Ok(skipped)
    }

    async fn close(&mut self) -> Result<(), TokenizerError> {
        self.closed = true;
        Ok(())
    }
}
