//! Daemon transport: addresses, connectors, and the HTTP/1.1 exchange.
//!
//! The daemon speaks HTTP/1.1 over a Unix domain socket (the default) or
//! TCP. A [`Connector`] yields a duplex byte channel; the [`Transport`]
//! drives hyper over it, either buffering a full response or handing back a
//! live [`ByteStream`]. Connections are owned and reused by the pool in
//! [`crate::pool`], never by individual calls.

use crate::endpoint::RequestBody;
use crate::error::TransportError;
use crate::pool::Pool;
use crate::stream::ByteStream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::header::{HeaderValue, ACCEPT, CONTENT_TYPE, HOST};
use hyper::{HeaderMap, Method, Request, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

/// Request body type sent over pooled connections.
pub(crate) type OutboundBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Default daemon socket path.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";

const DEFAULT_TCP_PORT: u16 = 2375;

/// Address of the daemon's API listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonUri {
    /// Unix domain socket.
    Unix(PathBuf),
    /// Plain TCP.
    Tcp {
        /// Host name or address.
        host: String,
        /// API port.
        port: u16,
    },
}

impl DaemonUri {
    /// Parses a daemon address.
    ///
    /// Accepted schemes: `unix://` (socket path), `tcp://` and `http://`
    /// (host with optional port, default 2375). TLS schemes are rejected;
    /// this client does not carry TLS configuration plumbing.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidAddress`] for unparseable input or
    /// unsupported schemes.
    pub fn parse(address: &str) -> Result<Self, TransportError> {
        let parsed = url::Url::parse(address)
            .map_err(|e| TransportError::InvalidAddress(format!("{address}: {e}")))?;
        match parsed.scheme() {
            "unix" => {
                let path = parsed.path();
                if path.is_empty() {
                    return Err(TransportError::InvalidAddress(format!(
                        "{address}: missing socket path"
                    )));
                }
                Ok(Self::Unix(PathBuf::from(path)))
            }
            "tcp" | "http" => {
                let host = parsed.host_str().ok_or_else(|| {
                    TransportError::InvalidAddress(format!("{address}: missing host"))
                })?;
                Ok(Self::Tcp {
                    host: host.to_string(),
                    port: parsed.port().unwrap_or(DEFAULT_TCP_PORT),
                })
            }
            "https" | "tls" => Err(TransportError::InvalidAddress(format!(
                "{address}: TLS transport is not supported"
            ))),
            other => Err(TransportError::InvalidAddress(format!(
                "{address}: unsupported scheme {other}"
            ))),
        }
    }
}

impl Default for DaemonUri {
    fn default() -> Self {
        Self::Unix(PathBuf::from(DEFAULT_SOCKET_PATH))
    }
}

impl std::fmt::Display for DaemonUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
            Self::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
        }
    }
}

/// Duplex byte channel to the daemon.
pub(crate) trait Io: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Io for T {}

/// Opens connections to the daemon.
///
/// The seam between the pool and the operating system; tests substitute
/// in-memory pipes here.
#[async_trait]
pub(crate) trait Connector: Send + Sync {
    async fn connect(&self) -> std::io::Result<Box<dyn Io>>;
}

struct UnixConnector {
    path: PathBuf,
}

#[async_trait]
impl Connector for UnixConnector {
    async fn connect(&self) -> std::io::Result<Box<dyn Io>> {
        let stream = UnixStream::connect(&self.path).await?;
        Ok(Box::new(stream))
    }
}

struct TcpConnector {
    host: String,
    port: u16,
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> std::io::Result<Box<dyn Io>> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

/// Builds the connector for a daemon address.
pub(crate) fn connector_for(uri: &DaemonUri) -> Box<dyn Connector> {
    match uri {
        DaemonUri::Unix(path) => Box::new(UnixConnector { path: path.clone() }),
        DaemonUri::Tcp { host, port } => Box::new(TcpConnector {
            host: host.clone(),
            port: *port,
        }),
    }
}

/// A fully buffered daemon response.
#[derive(Debug)]
pub(crate) struct CompleteResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// A daemon response whose body is still arriving.
pub(crate) struct StreamResponse {
    pub status: StatusCode,
    pub stream: ByteStream,
}

/// Fixed header set added to every request.
///
/// The `Host` header is required by the daemon even over Unix sockets.
/// Callers' extra headers are appended after these, never replacing them.
fn apply_headers(headers: &mut HeaderMap, extra: Option<&HeaderMap>) {
    headers.insert(HOST, HeaderValue::from_static("localhost"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json;charset=utf-8"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(extra) = extra {
        for (name, value) in extra {
            headers.append(name, value.clone());
        }
    }
}

/// Builds the outbound request for one exchange.
pub(crate) fn build_request(
    method: Method,
    path_and_query: &str,
    extra_headers: Option<&HeaderMap>,
    body: Option<RequestBody>,
) -> Result<Request<OutboundBody>, TransportError> {
    let outbound = match body {
        None => Empty::<Bytes>::new()
            .map_err(|never| match never {})
            .boxed_unsync(),
        Some(RequestBody::Buffered(data)) => Full::new(data)
            .map_err(|never| match never {})
            .boxed_unsync(),
        Some(RequestBody::Stream(source)) => {
            StreamBody::new(source.map(|chunk| chunk.map(hyper::body::Frame::data))).boxed_unsync()
        }
    };

    let mut request = Request::builder()
        .method(method)
        .uri(path_and_query)
        .body(outbound)
        .map_err(|e| TransportError::Http(e.to_string()))?;
    apply_headers(request.headers_mut(), extra_headers);
    Ok(request)
}

/// HTTP exchange layer over the connection pool.
pub(crate) struct Transport {
    pool: Pool,
}

impl Transport {
    pub(crate) fn new(
        connector: Box<dyn Connector>,
        pool_size: usize,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            pool: Pool::new(connector, pool_size, connect_timeout),
        }
    }

    /// Connections currently checked out of the pool.
    pub(crate) fn active_connections(&self) -> usize {
        self.pool.active()
    }

    /// Executes a request and buffers the complete response.
    ///
    /// The read timeout, when set, bounds the whole header-and-body read.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path_and_query: &str,
        extra_headers: Option<&HeaderMap>,
        body: Option<RequestBody>,
        read_timeout: Option<Duration>,
    ) -> Result<CompleteResponse, TransportError> {
        let request = build_request(method, path_and_query, extra_headers, body)?;
        let mut conn = self.pool.acquire().await?;

        let response = with_read_timeout(read_timeout, conn.send(request))
            .await?
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let (parts, body) = response.into_parts();

        let collected = with_read_timeout(read_timeout, body.collect())
            .await?
            .map_err(|e| TransportError::Read(e.to_string()))?;

        // The body was drained to the end, so the connection can go back
        // into the idle set.
        conn.recycle();

        Ok(CompleteResponse {
            status: parts.status,
            body: collected.to_bytes(),
        })
    }

    /// Executes a request and returns as soon as response headers arrive.
    ///
    /// The returned [`ByteStream`] owns the connection's pool slot; dropping
    /// it before exhaustion closes the connection and releases the slot.
    /// The read timeout, when set, applies per chunk pulled.
    pub(crate) async fn execute_stream(
        &self,
        method: Method,
        path_and_query: &str,
        extra_headers: Option<&HeaderMap>,
        body: Option<RequestBody>,
        read_timeout: Option<Duration>,
    ) -> Result<StreamResponse, TransportError> {
        let request = build_request(method, path_and_query, extra_headers, body)?;
        let mut conn = self.pool.acquire().await?;

        let response = with_read_timeout(read_timeout, conn.send(request))
            .await?
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let (parts, body) = response.into_parts();

        let stream = ByteStream::from_incoming(body, read_timeout, conn.into_permit());
        Ok(StreamResponse {
            status: parts.status,
            stream,
        })
    }
}

async fn with_read_timeout<F, T>(timeout: Option<Duration>, fut: F) -> Result<T, TransportError>
where
    F: std::future::Future<Output = T>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| TransportError::ReadTimeout),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unix_address() {
        let uri = DaemonUri::parse("unix:///var/run/docker.sock").unwrap();
        assert_eq!(uri, DaemonUri::Unix(PathBuf::from("/var/run/docker.sock")));
        assert_eq!(uri.to_string(), "unix:///var/run/docker.sock");
    }

    #[test]
    fn parse_tcp_address_with_port() {
        let uri = DaemonUri::parse("tcp://10.0.0.5:2376").unwrap();
        assert_eq!(
            uri,
            DaemonUri::Tcp {
                host: "10.0.0.5".to_string(),
                port: 2376
            }
        );
    }

    #[test]
    fn parse_http_address_defaults_port() {
        let uri = DaemonUri::parse("http://localhost").unwrap();
        assert_eq!(
            uri,
            DaemonUri::Tcp {
                host: "localhost".to_string(),
                port: DEFAULT_TCP_PORT
            }
        );
    }

    #[test]
    fn parse_rejects_tls_schemes() {
        for address in ["https://daemon:2376", "tls://daemon:2376"] {
            let err = DaemonUri::parse(address).unwrap_err();
            assert!(matches!(err, TransportError::InvalidAddress(_)), "{address}");
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(DaemonUri::parse("not an address").is_err());
        assert!(DaemonUri::parse("ftp://daemon").is_err());
    }

    #[test]
    fn default_address_is_the_standard_socket() {
        assert_eq!(
            DaemonUri::default(),
            DaemonUri::Unix(PathBuf::from(DEFAULT_SOCKET_PATH))
        );
    }

    #[test]
    fn fixed_headers_are_always_present() {
        let request = build_request(Method::GET, "/v1.41/info", None, None).unwrap();
        assert_eq!(request.headers().get(HOST).unwrap(), "localhost");
        assert_eq!(
            request.headers().get(ACCEPT).unwrap(),
            "application/json;charset=utf-8"
        );
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn extra_headers_append_without_overriding() {
        let mut extra = HeaderMap::new();
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-tar"));
        let request =
            build_request(Method::POST, "/v1.41/build", Some(&extra), None).unwrap();

        let values: Vec<_> = request.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], "application/json");
        assert_eq!(values[1], "application/x-tar");
    }
}
