//! Declarative endpoint descriptors.
//!
//! An [`Endpoint`] fully specifies one API call: HTTP method, path relative
//! to the API-version prefix, optional extra headers, optional request body,
//! and the expected [`ResponseShape`]. The dispatcher in
//! [`crate::client`] consumes the descriptor and branches on the shape tag;
//! descriptors carry no behavior of their own.

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::Stream;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

/// Streaming request-body source for uploads (build contexts, archives).
pub type BodySource = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// How the daemon's response to an endpoint must be interpreted.
///
/// There is no in-band signal distinguishing the streaming formats from one
/// another or from plain JSON; the descriptor declares the shape up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A single JSON document, buffered and decoded as one value.
    Object,
    /// Newline-delimited JSON records, decoded lazily as they arrive.
    LineSequence,
    /// The daemon's stdout/stderr frame format. `tty` declares that the
    /// endpoint was invoked against a TTY-attached container, in which case
    /// the daemon applies no framing and bytes pass through raw.
    FramedStream {
        /// Raw passthrough instead of 8-byte-header demultiplexing.
        tty: bool,
    },
    /// The request body is streamed out incrementally; the response is a
    /// line sequence of progress records.
    UploadStream,
}

impl ResponseShape {
    /// Short tag used in dispatch logging.
    pub(crate) const fn tag(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::LineSequence => "lines",
            Self::FramedStream { tty: false } => "framed",
            Self::FramedStream { tty: true } => "raw",
            Self::UploadStream => "upload",
        }
    }
}

/// Request body attached to an endpoint.
///
/// JSON bodies are encoded when the descriptor is built, so an encode
/// failure surfaces as [`Error::Serialization`] before any connection is
/// dialed.
pub(crate) enum RequestBody {
    /// Fully buffered payload.
    Buffered(Bytes),
    /// Incrementally streamed payload.
    Stream(BodySource),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(data) => f.debug_tuple("Buffered").field(&data.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A value object describing one API call.
///
/// Built by the endpoint families in [`crate::api`], or directly by callers
/// that need an operation the shipped families don't cover. Immutable once
/// constructed; the builder methods consume `self`.
#[derive(Debug)]
pub struct Endpoint {
    method: Method,
    path: String,
    headers: Option<HeaderMap>,
    body: Option<RequestBody>,
    shape: ResponseShape,
    read_timeout: Option<Duration>,
}

impl Endpoint {
    /// Creates a descriptor for `method` on `path`.
    ///
    /// `path` is relative to the API-version prefix and may carry a query
    /// string (`containers/json?all=1`).
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, shape: ResponseShape) -> Self {
        Self {
            method,
            path: path.into(),
            headers: None,
            body: None,
            shape,
            read_timeout: None,
        }
    }

    /// Attaches a JSON request body, encoding it immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the value cannot be encoded. No
    /// network activity has taken place at that point.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(body).map_err(Error::Serialization)?;
        self.body = Some(RequestBody::Buffered(Bytes::from(encoded)));
        Ok(self)
    }

    /// Attaches a pre-encoded request body.
    #[must_use]
    pub fn bytes_body(mut self, data: Bytes) -> Self {
        self.body = Some(RequestBody::Buffered(data));
        self
    }

    /// Attaches a streaming request body.
    ///
    /// The transport forwards chunks as they are produced instead of
    /// buffering the whole payload, which bounds peak memory for large
    /// uploads such as build contexts.
    #[must_use]
    pub fn stream_body<S>(mut self, source: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        self.body = Some(RequestBody::Stream(Box::pin(source)));
        self
    }

    /// Appends an extra request header.
    ///
    /// Extra headers are appended to the fixed header set, never replacing
    /// it.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .append(name, value);
        self
    }

    /// Overrides the per-call read timeout.
    ///
    /// For streaming shapes the timeout applies per chunk pulled, not to
    /// the whole (possibly unbounded) response.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// HTTP method of the call.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API-version prefix.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared response shape.
    #[must_use]
    pub const fn shape(&self) -> ResponseShape {
        self.shape
    }

    pub(crate) const fn extra_headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    pub(crate) const fn read_timeout_override(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub(crate) fn take_body(&mut self) -> Option<RequestBody> {
        self.body.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn json_body_encodes_at_construction() {
        let endpoint = Endpoint::new(Method::POST, "containers/create", ResponseShape::Object)
            .json_body(&serde_json::json!({"Image": "alpine"}))
            .unwrap();
        let Some(RequestBody::Buffered(data)) = endpoint.body else {
            panic!("expected buffered body");
        };
        assert_eq!(&data[..], br#"{"Image":"alpine"}"#);
    }

    #[test]
    fn json_body_encode_failure_is_serialization_error() {
        // Maps with non-string keys cannot be represented in JSON.
        let mut bad = HashMap::new();
        bad.insert((1u8, 2u8), "x");
        let result =
            Endpoint::new(Method::POST, "containers/create", ResponseShape::Object).json_body(&bad);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn extra_headers_accumulate() {
        let endpoint = Endpoint::new(Method::GET, "info", ResponseShape::Object)
            .header(
                hyper::header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-tar"),
            )
            .header(
                HeaderName::from_static("x-registry-auth"),
                HeaderValue::from_static("dGVzdA=="),
            );
        let headers = endpoint.extra_headers().unwrap();
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn shape_tags_are_distinct() {
        assert_eq!(ResponseShape::Object.tag(), "object");
        assert_eq!(ResponseShape::FramedStream { tty: true }.tag(), "raw");
        assert_eq!(ResponseShape::FramedStream { tty: false }.tag(), "framed");
    }
}
