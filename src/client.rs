//! The Docker client and its request dispatcher.
//!
//! [`DockerClient`] turns [`Endpoint`] descriptors into HTTP exchanges. One
//! dispatcher branches on the descriptor's [`ResponseShape`] tag to pick the
//! buffered or streaming transport path, maps non-2xx statuses to
//! [`Error::Status`] with the raw body attached, and hands payloads to the
//! matching decoder. No retries happen here; retry policy belongs to
//! callers.

use crate::api::{Containers, Exec, Images, Swarm, System};
use crate::decode;
use crate::endpoint::{Endpoint, ResponseShape};
use crate::error::{Error, Result};
use crate::frame::{DemuxedStream, FrameStream};
use crate::stream::{ByteStream, LineStream};
use crate::transport::{connector_for, Connector, DaemonUri, Transport};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// API version prefix spoken by default.
pub const DEFAULT_API_VERSION: &str = "v1.41";

/// Upper bound on how much of a failed response body is buffered for
/// diagnostics.
const ERROR_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Address of the daemon's API listener.
    pub daemon: DaemonUri,
    /// API version path prefix, e.g. `v1.41`.
    pub api_version: String,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Default read timeout. Applies to the whole body for buffered calls
    /// and per pulled chunk for streaming calls; `None` means wait
    /// indefinitely, which long-lived streams (events, followed logs)
    /// usually want. Overridable per endpoint.
    pub read_timeout: Option<Duration>,
    /// Maximum concurrent connections to the daemon.
    pub pool_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            daemon: DaemonUri::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: None,
            pool_size: 8,
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the standard environment variables.
    ///
    /// `DOCKER_HOST` overrides the daemon address, `DOCKER_API_VERSION`
    /// the version prefix (with or without the leading `v`).
    ///
    /// # Errors
    ///
    /// Returns an error if `DOCKER_HOST` is set but unparseable.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("DOCKER_HOST") {
            if !host.is_empty() {
                config.daemon = DaemonUri::parse(&host)?;
            }
        }
        if let Ok(version) = std::env::var("DOCKER_API_VERSION") {
            if !version.is_empty() {
                config.api_version = if version.starts_with('v') {
                    version
                } else {
                    format!("v{version}")
                };
            }
        }
        Ok(config)
    }
}

struct Inner {
    transport: Transport,
    daemon: DaemonUri,
    api_version: String,
    read_timeout: Option<Duration>,
}

/// Typed client for the daemon's HTTP API.
///
/// Cheap to clone; clones share the connection pool. Calls are independent
/// futures on the caller's runtime; concurrency is bounded by the pool,
/// not by client instances.
#[derive(Clone)]
pub struct DockerClient {
    inner: Arc<Inner>,
}

/// Payload returned by the dispatcher, matching the descriptor's shape.
enum Dispatched {
    Buffered(Bytes),
    Streaming(ByteStream),
}

impl DockerClient {
    /// Creates a client for the given configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let connector = connector_for(&config.daemon);
        Self::with_connector(config, connector)
    }

    /// Creates a client for the default daemon socket.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ClientConfig::default())
    }

    pub(crate) fn with_connector(config: ClientConfig, connector: Box<dyn Connector>) -> Self {
        let transport = Transport::new(connector, config.pool_size, config.connect_timeout);
        Self {
            inner: Arc::new(Inner {
                transport,
                daemon: config.daemon,
                api_version: config.api_version,
                read_timeout: config.read_timeout,
            }),
        }
    }

    /// Address this client talks to.
    #[must_use]
    pub fn daemon(&self) -> &DaemonUri {
        &self.inner.daemon
    }

    /// API version prefix in use.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    /// Connections currently checked out of the pool.
    ///
    /// Returns to baseline once in-flight calls finish and stream handles
    /// are dropped.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.inner.transport.active_connections()
    }

    /// Container operations.
    #[must_use]
    pub const fn containers(&self) -> Containers<'_> {
        Containers::new(self)
    }

    /// Image operations.
    #[must_use]
    pub const fn images(&self) -> Images<'_> {
        Images::new(self)
    }

    /// Exec operations.
    #[must_use]
    pub const fn exec(&self) -> Exec<'_> {
        Exec::new(self)
    }

    /// System-level operations.
    #[must_use]
    pub const fn system(&self) -> System<'_> {
        System::new(self)
    }

    /// Swarm operations.
    #[must_use]
    pub const fn swarm(&self) -> Swarm<'_> {
        Swarm::new(self)
    }

    /// Runs an [`ResponseShape::Object`] endpoint and decodes the response.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures, each carrying its raw
    /// context.
    pub async fn run<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        self.require_shape(&endpoint, ResponseShape::Object)?;
        match self.dispatch(endpoint).await? {
            Dispatched::Buffered(body) => decode::decode_json(&body),
            Dispatched::Streaming(_) => Err(Error::Protocol(
                "dispatcher returned a stream for an object endpoint".to_string(),
            )),
        }
    }

    /// Runs an [`ResponseShape::Object`] endpoint whose response body is
    /// empty or meaningless (start/stop/remove, ping).
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn run_unit(&self, endpoint: Endpoint) -> Result<()> {
        self.require_shape(&endpoint, ResponseShape::Object)?;
        self.dispatch(endpoint).await.map(|_| ())
    }

    /// Runs a [`ResponseShape::LineSequence`] endpoint, returning the lazy
    /// record sequence as soon as response headers arrive.
    ///
    /// # Errors
    ///
    /// Transport and status failures; decode failures surface per record.
    pub async fn run_stream<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<LineStream<T>> {
        self.require_shape(&endpoint, ResponseShape::LineSequence)?;
        match self.dispatch(endpoint).await? {
            Dispatched::Streaming(stream) => Ok(LineStream::new(stream)),
            Dispatched::Buffered(_) => Err(Error::Protocol(
                "dispatcher buffered a line-sequence endpoint".to_string(),
            )),
        }
    }

    /// Runs a [`ResponseShape::FramedStream`] endpoint.
    ///
    /// The descriptor's `tty` flag decides between frame demultiplexing and
    /// raw passthrough; the wire carries no signal.
    ///
    /// # Errors
    ///
    /// Transport and status failures; protocol violations surface per
    /// frame.
    pub async fn run_framed(&self, endpoint: Endpoint) -> Result<DemuxedStream> {
        let ResponseShape::FramedStream { tty } = endpoint.shape() else {
            return Err(self.shape_mismatch(&endpoint, "framed-stream"));
        };
        match self.dispatch(endpoint).await? {
            Dispatched::Streaming(stream) if tty => Ok(DemuxedStream::Raw(stream)),
            Dispatched::Streaming(stream) => {
                Ok(DemuxedStream::Multiplexed(FrameStream::new(stream)))
            }
            Dispatched::Buffered(_) => Err(Error::Protocol(
                "dispatcher buffered a framed-stream endpoint".to_string(),
            )),
        }
    }

    /// Runs an [`ResponseShape::UploadStream`] endpoint, streaming the
    /// request body out incrementally and decoding the daemon's progress
    /// lines.
    ///
    /// # Errors
    ///
    /// Transport and status failures; decode failures surface per record.
    pub async fn run_upload<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<LineStream<T>> {
        self.require_shape(&endpoint, ResponseShape::UploadStream)?;
        match self.dispatch(endpoint).await? {
            Dispatched::Streaming(stream) => Ok(LineStream::new(stream)),
            Dispatched::Buffered(_) => Err(Error::Protocol(
                "dispatcher buffered an upload endpoint".to_string(),
            )),
        }
    }

    fn require_shape(&self, endpoint: &Endpoint, expected: ResponseShape) -> Result<()> {
        if endpoint.shape() == expected {
            Ok(())
        } else {
            Err(self.shape_mismatch(endpoint, expected.tag()))
        }
    }

    fn shape_mismatch(&self, endpoint: &Endpoint, expected: &str) -> Error {
        Error::Protocol(format!(
            "endpoint {} declares {} response, expected {expected}",
            endpoint.path(),
            endpoint.shape().tag()
        ))
    }

    /// The dispatcher: one exchange per descriptor, routed by shape tag.
    async fn dispatch(&self, mut endpoint: Endpoint) -> Result<Dispatched> {
        tracing::debug!(
            method = %endpoint.method(),
            path = %endpoint.path(),
            shape = endpoint.shape().tag(),
            "dispatching endpoint"
        );

        let path_and_query = format!("/{}/{}", self.inner.api_version, endpoint.path());
        let read_timeout = endpoint.read_timeout_override().or(self.inner.read_timeout);
        let body = endpoint.take_body();

        match endpoint.shape() {
            ResponseShape::Object => {
                let response = self
                    .inner
                    .transport
                    .execute(
                        endpoint.method().clone(),
                        &path_and_query,
                        endpoint.extra_headers(),
                        body,
                        read_timeout,
                    )
                    .await?;
                tracing::debug!(
                    status = %response.status,
                    bytes = response.body.len(),
                    path = %endpoint.path(),
                    "endpoint completed"
                );
                if !response.status.is_success() {
                    return Err(Error::Status {
                        status: response.status,
                        body: response.body,
                    });
                }
                Ok(Dispatched::Buffered(response.body))
            }
            ResponseShape::LineSequence
            | ResponseShape::FramedStream { .. }
            | ResponseShape::UploadStream => {
                let response = self
                    .inner
                    .transport
                    .execute_stream(
                        endpoint.method().clone(),
                        &path_and_query,
                        endpoint.extra_headers(),
                        body,
                        read_timeout,
                    )
                    .await?;
                if !response.status.is_success() {
                    let body = collect_error_body(response.stream).await;
                    return Err(Error::Status {
                        status: response.status,
                        body,
                    });
                }
                tracing::debug!(
                    status = %response.status,
                    path = %endpoint.path(),
                    "endpoint streaming"
                );
                Ok(Dispatched::Streaming(response.stream))
            }
        }
    }
}

impl std::fmt::Debug for DockerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerClient")
            .field("daemon", &self.inner.daemon)
            .field("api_version", &self.inner.api_version)
            .finish_non_exhaustive()
    }
}

/// Buffers the body of a failed streaming response for diagnostics.
async fn collect_error_body(mut stream: ByteStream) -> Bytes {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        let room = ERROR_BODY_LIMIT_BYTES.saturating_sub(buf.len());
        if room == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    buf.freeze()
}
