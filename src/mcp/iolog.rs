//! Protocol transcript logging for the stdio transport.
//!
//! Wraps the stdin/stdout pair so every chunk that crosses the wire is
//! mirrored to the tracing log at debug level. Enabled with
//! `--enable-command-logging`; off by default because the transcript
//! can contain repository contents.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::debug;

/// Reader that logs everything the client sends before passing it on.
pub struct TranscriptReader<R> {
    inner: R,
}

impl<R> TranscriptReader<R> {
    /// Wrap a reader.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for TranscriptReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            let chunk = &buf.filled()[before..];
            if !chunk.is_empty() {
                debug!(direction = "in", body = %String::from_utf8_lossy(chunk), "stdio message");
            }
        }
        poll
    }
}

/// Writer that logs everything the server emits before passing it on.
pub struct TranscriptWriter<W> {
    inner: W,
}

impl<W> TranscriptWriter<W> {
    /// Wrap a writer.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for TranscriptWriter<W> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let poll = Pin::new(&mut self.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = &poll {
            if *written > 0 {
                debug!(
                    direction = "out",
                    body = %String::from_utf8_lossy(&buf[..*written]),
                    "stdio message"
                );
            }
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
