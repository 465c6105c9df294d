//! Demultiplexer for the daemon's attach/logs wire format.
//!
//! Non-TTY container output interleaves stdout and stderr on one
//! connection. Each frame is an 8-byte header followed by its payload:
//!
//! ```text
//! +-----------+----------------+------------------+------------------+
//! | stream:1B | reserved: 3B   | length: 4B (BE)  | payload: length  |
//! +-----------+----------------+------------------+------------------+
//! ```
//!
//! TTY-attached containers get no framing at all; the daemon sends raw
//! bytes and there is no in-band signal distinguishing the two, so the
//! endpoint descriptor declares which applies ([`DemuxedStream`]).

use crate::error::{Error, Result};
use crate::stream::ByteStream;
use bytes::{Buf, Bytes, BytesMut};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Frame header size on the wire.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Which standard stream a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Stream id 0. Written by the daemon for stdin echo; unused in
    /// practice.
    Stdin,
    /// Stream id 1.
    Stdout,
    /// Stream id 2.
    Stderr,
}

impl StreamKind {
    const fn from_wire(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Stdin),
            1 => Some(Self::Stdout),
            2 => Some(Self::Stderr),
            _ => None,
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stdin => "stdin",
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        })
    }
}

/// One unit of the multiplexed wire format.
///
/// Constructed as bytes arrive and handed to the consumer immediately;
/// never persisted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Standard stream the payload belongs to.
    pub stream: StreamKind,
    /// Payload bytes, exactly as long as the header declared.
    pub payload: Bytes,
}

impl Frame {
    /// Whether this frame carries stdout bytes.
    #[must_use]
    pub fn is_stdout(&self) -> bool {
        self.stream == StreamKind::Stdout
    }

    /// Whether this frame carries stderr bytes.
    #[must_use]
    pub fn is_stderr(&self) -> bool {
        self.stream == StreamKind::Stderr
    }
}

/// Header parsed off the wire, waiting for its payload.
#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    stream: StreamKind,
    remaining: usize,
}

/// Lazy, forward-only sequence of [`Frame`]s from a raw byte stream.
///
/// Terminates cleanly when the connection closes with fewer than a full
/// header buffered; closing mid-payload is a protocol error, not a
/// truncated frame. The first error ends the sequence, and the underlying
/// connection is released either way.
pub struct FrameStream {
    inner: ByteStream,
    buf: BytesMut,
    pending: Option<PendingFrame>,
    done: bool,
}

impl FrameStream {
    pub(crate) fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            pending: None,
            done: false,
        }
    }

    /// Parses buffered bytes into at most one frame.
    fn take_frame(&mut self) -> Result<Option<Frame>> {
        if self.pending.is_none() && self.buf.len() >= FRAME_HEADER_SIZE {
            let mut header = self.buf.split_to(FRAME_HEADER_SIZE);
            let id = header.get_u8();
            header.advance(3);
            let length = header.get_u32() as usize;
            let stream = StreamKind::from_wire(id)
                .ok_or_else(|| Error::Protocol(format!("unknown stream id {id} in frame header")))?;
            self.pending = Some(PendingFrame {
                stream,
                remaining: length,
            });
        }

        if let Some(pending) = self.pending {
            if self.buf.len() >= pending.remaining {
                let payload = self.buf.split_to(pending.remaining).freeze();
                self.pending = None;
                return Ok(Some(Frame {
                    stream: pending.stream,
                    payload,
                }));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("buffered", &self.buf.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Stream for FrameStream {
    type Item = Result<Frame>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            match this.take_frame() {
                Ok(Some(frame)) => return Poll::Ready(Some(Ok(frame))),
                Ok(None) => {}
                Err(e) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.buf.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    if let Some(pending) = this.pending {
                        return Poll::Ready(Some(Err(Error::Protocol(format!(
                            "stream ended mid-frame: header declared {} more payload bytes, got {}",
                            pending.remaining,
                            this.buf.len()
                        )))));
                    }
                    // Anything shorter than a header at end of stream is the
                    // expected termination, not an error.
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Container output as produced by attach/logs/exec endpoints.
///
/// The daemon only applies the frame format to non-TTY streams, and the
/// choice is visible nowhere on the wire; the caller's descriptor decides
/// which variant is returned.
#[derive(Debug)]
pub enum DemuxedStream {
    /// Frame-multiplexed stdout/stderr (non-TTY).
    Multiplexed(FrameStream),
    /// Undifferentiated raw bytes (TTY).
    Raw(ByteStream),
}

impl DemuxedStream {
    /// Whether this is the raw TTY variant.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Returns the frame sequence for non-TTY output.
    #[must_use]
    pub fn into_frames(self) -> Option<FrameStream> {
        match self {
            Self::Multiplexed(frames) => Some(frames),
            Self::Raw(_) => None,
        }
    }

    /// Returns the raw byte sequence for TTY output.
    #[must_use]
    pub fn into_raw(self) -> Option<ByteStream> {
        match self {
            Self::Multiplexed(_) => None,
            Self::Raw(bytes) => Some(bytes),
        }
    }
}
