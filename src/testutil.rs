//! In-process daemon stand-in for tests.
//!
//! Serves hyper HTTP/1.1 over `tokio::io::duplex` pipes, so dispatcher and
//! pool behavior can be exercised without a socket or a running daemon.

use crate::client::{ClientConfig, DockerClient};
use crate::transport::{Connector, Io};
use async_trait::async_trait;
use bytes::{BufMut, Bytes};
use futures::channel::mpsc;
use futures::StreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) type TestBody = UnsyncBoxBody<Bytes, std::io::Error>;

type BoxedResponse = Pin<Box<dyn Future<Output = Response<TestBody>> + Send>>;
type Handler = dyn Fn(Request<Incoming>) -> BoxedResponse + Send + Sync;

/// A fake daemon: every dialed connection is served by `handler`.
pub(crate) struct TestDaemon {
    handler: Arc<Handler>,
    pub(crate) dials: Arc<AtomicUsize>,
}

impl TestDaemon {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(Request<Incoming>) -> BoxedResponse + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            dials: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A client wired to this daemon through in-memory pipes.
    pub(crate) fn client(&self) -> DockerClient {
        let connector = PipeConnector {
            handler: Arc::clone(&self.handler),
            dials: Arc::clone(&self.dials),
        };
        DockerClient::with_connector(ClientConfig::default(), Box::new(connector))
    }
}

struct PipeConnector {
    handler: Arc<Handler>,
    dials: Arc<AtomicUsize>,
}

#[async_trait]
impl Connector for PipeConnector {
    async fn connect(&self) -> std::io::Result<Box<dyn Io>> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        let (client_side, server_side) = tokio::io::duplex(16 * 1024);
        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            let service = hyper::service::service_fn(move |req| {
                let handler = Arc::clone(&handler);
                async move { Ok::<_, std::convert::Infallible>(handler(req).await) }
            });
            let _ = hyper::server::conn::http1::Builder::new()
                .serve_connection(TokioIo::new(server_side), service)
                .await;
        });
        Ok(Box::new(client_side))
    }
}

/// Fully buffered body.
pub(crate) fn full(data: impl Into<Bytes>) -> TestBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Chunked body delivered piece by piece.
pub(crate) fn chunked(chunks: Vec<Bytes>) -> TestBody {
    let stream = futures::stream::iter(
        chunks
            .into_iter()
            .map(|c| Ok::<_, std::io::Error>(hyper::body::Frame::data(c))),
    );
    StreamBody::new(stream).boxed_unsync()
}

/// Chunked body fed from a channel; keep the sender to hold the response
/// open.
pub(crate) fn channel_body() -> (mpsc::UnboundedSender<Bytes>, TestBody) {
    let (tx, rx) = mpsc::unbounded::<Bytes>();
    let body = StreamBody::new(
        rx.map(|c| Ok::<_, std::io::Error>(hyper::body::Frame::data(c))),
    )
    .boxed_unsync();
    (tx, body)
}

pub(crate) fn respond(status: u16, body: TestBody) -> Response<TestBody> {
    Response::builder()
        .status(StatusCode::from_u16(status).unwrap())
        .body(body)
        .unwrap()
}

pub(crate) fn json_response(status: u16, body: &str) -> Response<TestBody> {
    Response::builder()
        .status(StatusCode::from_u16(status).unwrap())
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(full(body.to_string()))
        .unwrap()
}

pub(crate) fn text_response(status: u16, body: &str) -> Response<TestBody> {
    respond(status, full(body.to_string()))
}

/// Encodes one multiplexed frame in the daemon's wire format.
pub(crate) fn encode_frame(stream_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut wire = Vec::with_capacity(8 + payload.len());
    wire.put_u8(stream_id);
    wire.put_bytes(0, 3);
    wire.put_u32(payload.len() as u32);
    wire.extend_from_slice(payload);
    wire
}
