//! Streaming response primitives.
//!
//! [`ByteStream`] is the transport-facing body stream: raw chunks off one
//! connection, with an optional per-chunk read timeout and the pool permit
//! that is released when the stream ends or is dropped. [`LineStream`]
//! decodes newline-delimited JSON records from it lazily; both are
//! pull-based, so a slow consumer never buffers more than the current
//! partial record.

use crate::error::{Error, Result, TransportError};
use bytes::{Bytes, BytesMut};
use futures::Stream;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::Sleep;

/// Raw response bytes from one daemon connection.
///
/// Forward-only and non-restartable. The stream owns its connection's pool
/// slot; the slot is released when the stream terminates (end, error,
/// timeout) or when the handle is dropped mid-consumption.
pub struct ByteStream {
    inner: Pin<Box<dyn Stream<Item = std::result::Result<Bytes, TransportError>> + Send>>,
    read_timeout: Option<Duration>,
    deadline: Option<Pin<Box<Sleep>>>,
    permit: Option<OwnedSemaphorePermit>,
    done: bool,
}

impl ByteStream {
    pub(crate) fn from_stream<S>(
        stream: S,
        read_timeout: Option<Duration>,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
            read_timeout,
            deadline: None,
            permit,
            done: false,
        }
    }

    pub(crate) fn from_incoming(
        body: Incoming,
        read_timeout: Option<Duration>,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        let stream = futures::TryStreamExt::map_err(body.into_data_stream(), |e| {
            TransportError::Read(e.to_string())
        });
        Self::from_stream(stream, read_timeout, Some(permit))
    }

    fn finish(&mut self) {
        self.done = true;
        self.deadline = None;
        // Release the pool slot as soon as the stream is terminal instead
        // of waiting for the handle to be dropped.
        self.permit = None;
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("read_timeout", &self.read_timeout)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                // Chunk arrived; the read timer restarts on the next pull.
                this.deadline = None;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finish();
                Poll::Ready(Some(Err(e.into())))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => {
                if let Some(limit) = this.read_timeout {
                    let deadline = this
                        .deadline
                        .get_or_insert_with(|| Box::pin(tokio::time::sleep(limit)));
                    if deadline.as_mut().poll(cx).is_ready() {
                        this.finish();
                        return Poll::Ready(Some(Err(TransportError::ReadTimeout.into())));
                    }
                }
                Poll::Pending
            }
        }
    }
}

/// Lazy sequence of JSON records, one per newline-terminated chunk of the
/// response (pull progress, build output, events).
///
/// Record order is wire order. The sequence terminates on the first decode
/// or transport error; a non-whitespace partial line at end of stream is a
/// decode error.
pub struct LineStream<T> {
    inner: ByteStream,
    buf: BytesMut,
    done: bool,
    _target: PhantomData<fn() -> T>,
}

impl<T> LineStream<T> {
    pub(crate) fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            done: false,
            _target: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for LineStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineStream")
            .field("buffered", &self.buf.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> LineStream<T> {
    fn decode_line(&mut self, line: &[u8]) -> Result<T> {
        serde_json::from_slice(line).map_err(|e| {
            self.done = true;
            Error::Decode {
                target: std::any::type_name::<T>(),
                body: Bytes::copy_from_slice(line),
                message: e.to_string(),
            }
        })
    }
}

impl<T: DeserializeOwned> Stream for LineStream<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            // Drain complete lines already buffered before pulling more.
            while let Some(pos) = this.buf.iter().position(|&b| b == b'\n') {
                let line = this.buf.split_to(pos + 1);
                let trimmed = line[..pos].trim_ascii();
                if trimmed.is_empty() {
                    continue;
                }
                return Poll::Ready(Some(this.decode_line(trimmed)));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.buf.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    let tail = this.buf.trim_ascii();
                    if tail.is_empty() {
                        return Poll::Ready(None);
                    }
                    return Poll::Ready(Some(Err(Error::Decode {
                        target: std::any::type_name::<T>(),
                        body: Bytes::copy_from_slice(tail),
                        message: "stream ended with an unterminated line".to_string(),
                    })));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
