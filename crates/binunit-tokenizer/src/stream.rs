use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::error::TokenizerError;
use crate::options::{FileInfo, ReadOptions, Request};
use crate::tokenizer::Tokenizer;

/// Largest single reservation made while filling the peek buffer.
const FILL_CHUNK: usize = 64 * 1024;

/// Tokenizer over a live, non-seekable byte stream.
///
/// Peeking on a stream has to pull bytes out of the reader, so the
/// tokenizer keeps them in an internal buffer and serves later reads and
/// peeks from it before touching the reader again:
///
/// ```text
///   reader ──read_buf──► peeked: │ b0 b1 b2 ... │ ──read_buffer──► dst
///                                 ▲
///                                 position
/// ```
///
/// The buffer holds only what has been pulled ahead of the cursor. A peek
/// at a later `position` has to buffer the gap; a read at a later
/// `position` drains the gap straight into a sink and buffers only the
/// requested window. A failed strict read therefore consumes the gap but
/// not the window. When `file_info.size` is known, peeks past it never
/// touch the reader and reads drain no further than it.
///
/// # Example
///
/// ```rust,no_run
/// use binunit_tokenizer::{ReadOptions, StreamTokenizer, Tokenizer};
///
/// async fn sniff(file: tokio::fs::File) -> Result<bool, binunit_tokenizer::TokenizerError> {
///     let mut tok = StreamTokenizer::new(file);
///     let mut magic = [0u8; 4];
///     tok.peek_buffer(&mut magic, ReadOptions::default()).await?;
///     Ok(&magic == b"FORM")
/// }
/// ```
pub struct StreamTokenizer<R> {
    /// `None` once closed.
    reader: Option<R>,
    /// Bytes pulled from the reader but not yet consumed. `peeked[0]` is the
    /// byte at `position`.
    peeked: BytesMut,
    position: u64,
    file_info: FileInfo,
    /// The reader has returned 0 bytes.
    eof: bool,
}

impl<R: AsyncRead + Unpin + Send> StreamTokenizer<R> {
    /// Tokenize `reader`. The total size is unknown.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_file_info(reader, FileInfo::default())
    }

    /// Tokenize `reader` with caller-supplied source details, e.g. a
    /// `Content-Length`.
    #[must_use]
    pub fn with_file_info(reader: R, file_info: FileInfo) -> Self {
        Self {
            reader: Some(reader),
            peeked: BytesMut::new(),
            position: 0,
            file_info,
            eof: false,
        }
    }

    /// Give back the reader. Bytes still held in the peek buffer are lost.
    pub fn into_inner(self) -> Option<R> {
        self.reader
    }

    /// Bytes the source can still hold past the cursor, if its size is known.
    fn remaining(&self) -> Option<u64> {
        self.file_info
            .size
            .map(|size| size.saturating_sub(self.position))
    }

    /// Pull from the reader until `want` bytes are buffered or the stream
    /// ends. Grows the buffer at most [`FILL_CHUNK`] bytes at a time.
    async fn fill(&mut self, want: usize) -> Result<(), TokenizerError> {
        let want = match self.remaining() {
            Some(rest) => want.min(usize::try_from(rest).unwrap_or(usize::MAX)),
            None => want,
        };
        let reader = self.reader.as_mut().ok_or(TokenizerError::Closed)?;

        while self.peeked.len() < want && !self.eof {
            self.peeked.reserve((want - self.peeked.len()).min(FILL_CHUNK));
            let n = reader.read_buf(&mut self.peeked).await?;
            if n == 0 {
                self.eof = true;
                debug!(
                    position = self.position,
                    buffered = self.peeked.len(),
                    "stream ended while filling"
                );
            } else {
                trace!(read = n, buffered = self.peeked.len(), "filled peek buffer");
            }
        }
        Ok(())
    }

    /// Advance up to `length` bytes: buffered bytes first, then straight off
    /// the reader into a sink.
    async fn discard(&mut self, length: u64) -> Result<u64, TokenizerError> {
        let length = self.remaining().map_or(length, |rest| length.min(rest));
        let reader = self.reader.as_mut().ok_or(TokenizerError::Closed)?;

        let from_buffer = usize::try_from(length)
            .unwrap_or(usize::MAX)
            .min(self.peeked.len());
        self.peeked.advance(from_buffer);
        let mut skipped = from_buffer as u64;

        if skipped < length && !self.eof {
            let wanted = length - skipped;
            let drained = tokio::io::copy(&mut reader.take(wanted), &mut tokio::io::sink()).await?;
            if drained < wanted {
                self.eof = true;
            }
            skipped += drained;
        }

        self.position += skipped;
        trace!(skipped, position = self.position, "discarded bytes");
        Ok(skipped)
    }

    /// Distance from the cursor to an absolute position, as a buffer index.
    fn gap(&self, position: u64) -> Result<usize, TokenizerError> {
        usize::try_from(position - self.position)
            .map_err(|_| TokenizerError::EndOfStream { position })
    }
}

/// Fail a strict request that came up short.
fn check_short(request: &Request, available: usize, what: &str) -> Result<(), TokenizerError> {
    if available < request.length && !request.may_be_less {
        debug!(
            position = request.position,
            requested = request.length,
            available,
            "short {what}"
        );
        return Err(TokenizerError::EndOfStream {
            position: request.position,
        });
    }
    Ok(())
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> Tokenizer for StreamTokenizer<R> {
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
        if self.reader.is_none() {
            return Err(TokenizerError::Closed);
        }
        let request = options.resolve(dst.len(), self.position)?;

        let distance = request.position - self.position;
        if distance > 0 && self.discard(distance).await? < distance {
            // The source ended inside the gap.
            check_short(&request, 0, "read")?;
            return Ok(0);
        }

        self.fill(request.length).await?;
        let available = self.peeked.len().min(request.length);
        check_short(&request, available, "read")?;

        dst[request.range(available)].copy_from_slice(&self.peeked[..available]);
        self.peeked.advance(available);
        self.position += available as u64;
        Ok(available)
    }

    async fn peek_buffer(
        &mut self,
        dst: &mut [u8],
        options: ReadOptions,
    ) -> Result<usize, TokenizerError> {
        if self.reader.is_none() {
            return Err(TokenizerError::Closed);
        }
        let request = options.resolve(dst.len(), self.position)?;

        let distance = request.position - self.position;
        if self.remaining().is_some_and(|rest| distance >= rest) {
            check_short(&request, 0, "peek")?;
            return Ok(0);
        }

        let skip = self.gap(request.position)?;
        self.fill(skip.saturating_add(request.length)).await?;

        let start = skip.min(self.peeked.len());
        let available = (self.peeked.len() - start).min(request.length);
        check_short(&request, available, "peek")?;

        dst[request.range(available)].copy_from_slice(&self.peeked[start..start + available]);
        Ok(available)
    }

    async fn ignore(&mut self, length: u64) -> Result<u64, TokenizerError> {
        self.discard(length).await
    }

    async fn close(&mut self) -> Result<(), TokenizerError> {
        self.reader = None;
        self.peeked.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;

    /// Hands out at most `chunk` bytes per poll, to exercise the refill loop.
    struct Trickle {
        data: &'static [u8],
        chunk: usize,
    }

    impl AsyncRead for Trickle {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let data = self.data;
            let n = self.chunk.min(data.len()).min(buf.remaining());
            let (head, tail) = data.split_at(n);
            buf.put_slice(head);
            self.data = tail;
            Poll::Ready(Ok(()))
        }
    }

    fn chunked(data: &'static [u8], chunk: usize) -> Trickle {
        Trickle { data, chunk }
    }

    const DATA: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

    #[tokio::test]
    async fn peek_is_idempotent_and_read_consumes() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 3));
        let mut a = [0u8; 5];
        let mut b = [0u8; 5];

        tok.peek_buffer(&mut a, ReadOptions::default()).await.unwrap();
        tok.peek_buffer(&mut b, ReadOptions::default()).await.unwrap();
        assert_eq!(a, [0, 1, 2, 3, 4]);
        assert_eq!(a, b);
        assert_eq!(tok.position(), 0);

        tok.read_buffer(&mut b, ReadOptions::default()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(tok.position(), 5);

        tok.read_buffer(&mut b, ReadOptions::default()).await.unwrap();
        assert_eq!(b, [5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn read_spans_buffered_and_fresh_bytes() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 2));
        let mut small = [0u8; 2];
        tok.peek_buffer(&mut small, ReadOptions::default()).await.unwrap();

        let mut large = [0u8; 6];
        tok.read_buffer(&mut large, ReadOptions::default()).await.unwrap();
        assert_eq!(large, [0, 1, 2, 3, 4, 5]);
        assert_eq!(tok.position(), 6);
    }

    #[tokio::test]
    async fn peek_ahead_keeps_position() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 4));
        let mut buf = [0u8; 2];
        let options = ReadOptions::new().with_position(7);

        assert_eq!(tok.peek_buffer(&mut buf, options).await.unwrap(), 2);
        assert_eq!(buf, [7, 8]);
        assert_eq!(tok.position(), 0);

        // Skipped-over bytes are still readable.
        tok.read_buffer(&mut buf, ReadOptions::default()).await.unwrap();
        assert_eq!(buf, [0, 1]);
    }

    #[tokio::test]
    async fn read_with_position_skips_gap() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 4));
        let mut buf = [0u8; 3];
        tok.read_buffer(&mut buf, ReadOptions::new().with_position(4)).await.unwrap();
        assert_eq!(buf, [4, 5, 6]);
        assert_eq!(tok.position(), 7);
    }

    #[tokio::test]
    async fn failed_strict_read_consumes_gap_but_not_window() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 4));
        let mut buf = [0u8; 4];
        let err = tok
            .read_buffer(&mut buf, ReadOptions::new().with_position(8))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenizerError::EndOfStream { position: 8 }));
        assert_eq!(tok.position(), 8);

        let n = tok
            .read_buffer(&mut buf, ReadOptions::new().with_may_be_less(true))
            .await
            .unwrap();
        assert_eq!(&buf[..n], [8, 9]);
    }

    #[tokio::test]
    async fn far_ahead_position_is_a_short_transfer() {
        let far = 1 << 62;
        let tolerant = ReadOptions::new().with_position(far).with_may_be_less(true);
        let mut buf = [0u8; 4];

        let mut tok = StreamTokenizer::new(std::io::Cursor::new(vec![0u8; 10]));
        assert_eq!(tok.peek_buffer(&mut buf, tolerant).await.unwrap(), 0);
        assert_eq!(tok.position(), 0);
        assert!(matches!(
            tok.peek_buffer(&mut buf, ReadOptions::new().with_position(far)).await,
            Err(TokenizerError::EndOfStream { position }) if position == far
        ));

        assert_eq!(tok.read_buffer(&mut buf, tolerant).await.unwrap(), 0);
        assert_eq!(tok.position(), 10);
    }

    /// Endless zeros, counting every byte handed out.
    struct Counting {
        total: u64,
        handed_out: Arc<AtomicU64>,
    }

    impl AsyncRead for Counting {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let sent = self.handed_out.load(Ordering::Relaxed);
            let left = usize::try_from(self.total - sent).unwrap_or(usize::MAX);
            let n = left.min(buf.remaining());
            buf.put_slice(&vec![0u8; n]);
            self.handed_out.fetch_add(n as u64, Ordering::Relaxed);
            Poll::Ready(Ok(()))
        }
    }

    fn counting(total: u64) -> (Counting, Arc<AtomicU64>) {
        let handed_out = Arc::new(AtomicU64::new(0));
        let reader = Counting {
            total,
            handed_out: Arc::clone(&handed_out),
        };
        (reader, handed_out)
    }

    #[tokio::test]
    async fn positioned_read_drains_gap_without_buffering_it() {
        const TOTAL: u64 = 4 * 1024 * 1024;
        let (reader, handed_out) = counting(TOTAL);
        let mut tok = StreamTokenizer::new(reader);
        let mut buf = [0xFFu8; 128];

        let n = tok
            .read_buffer(&mut buf, ReadOptions::new().with_position(TOTAL - 128))
            .await
            .unwrap();
        assert_eq!(n, 128);
        assert_eq!(buf, [0u8; 128]);
        assert_eq!(tok.position(), TOTAL);
        assert_eq!(handed_out.load(Ordering::Relaxed), TOTAL);
        assert!(tok.peeked.capacity() < FILL_CHUNK);
    }

    #[tokio::test]
    async fn peek_past_known_size_leaves_reader_alone() {
        let (reader, handed_out) = counting(1024);
        let mut tok = StreamTokenizer::with_file_info(reader, FileInfo::default().with_size(16));
        let mut buf = [0u8; 4];

        let options = ReadOptions::new().with_position(1 << 40).with_may_be_less(true);
        assert_eq!(tok.peek_buffer(&mut buf, options).await.unwrap(), 0);
        assert_eq!(handed_out.load(Ordering::Relaxed), 0);

        // Reads stop draining at the known size.
        assert_eq!(tok.read_buffer(&mut buf, options).await.unwrap(), 0);
        assert_eq!(tok.position(), 16);
        assert_eq!(handed_out.load(Ordering::Relaxed), 16);
    }

    #[tokio::test]
    async fn backward_seek_fails_fast() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 4));
        tok.ignore(5).await.unwrap();
        let mut buf = [0u8; 1];
        let err = tok
            .peek_buffer(&mut buf, ReadOptions::new().with_position(3))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenizerError::BackwardSeek { requested: 3, current: 5 }));
    }

    #[tokio::test]
    async fn short_read_without_may_be_less() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 4));
        let mut buf = [0u8; 16];
        let err = tok.read_buffer(&mut buf, ReadOptions::default()).await.unwrap_err();
        assert!(matches!(err, TokenizerError::EndOfStream { position: 0 }));

        // Nothing was consumed; the tolerant read still sees every byte.
        let n = tok
            .read_buffer(&mut buf, ReadOptions::new().with_may_be_less(true))
            .await
            .unwrap();
        assert_eq!(n, 10);
        assert_eq!(&buf[..10], DATA);
        assert_eq!(tok.position(), 10);
    }

    #[tokio::test]
    async fn ignore_uses_buffer_then_reader() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 3));
        let mut buf = [0u8; 3];
        tok.peek_buffer(&mut buf, ReadOptions::default()).await.unwrap();

        assert_eq!(tok.ignore(5).await.unwrap(), 5);
        assert_eq!(tok.position(), 5);
        tok.read_buffer(&mut buf, ReadOptions::default()).await.unwrap();
        assert_eq!(buf, [5, 6, 7]);

        assert_eq!(tok.ignore(10).await.unwrap(), 2);
        assert_eq!(tok.position(), 10);
    }

    #[tokio::test]
    async fn closed_stream_rejects_io() {
        let mut tok = StreamTokenizer::new(chunked(DATA, 3));
        tok.close().await.unwrap();
        let mut buf = [0u8; 1];
        assert!(matches!(
            tok.read_buffer(&mut buf, ReadOptions::default()).await,
            Err(TokenizerError::Closed)
        ));
        assert!(tok.into_inner().is_none());
    }

    #[tokio::test]
    async fn file_info_is_caller_supplied() {
        let tok = StreamTokenizer::with_file_info(
            chunked(DATA, 3),
            FileInfo::default().with_size(10).with_mime_type("audio/mpeg"),
        );
        assert_eq!(tok.file_info().size, Some(10));
        assert_eq!(tok.file_info().mime_type.as_deref(), Some("audio/mpeg"));
    }
}
