//! Exec operations.

use crate::api::query;
use crate::client::DockerClient;
use crate::endpoint::{Endpoint, ResponseShape};
use crate::error::Result;
use crate::frame::DemuxedStream;
use crate::types::{ExecCreateRequest, ExecCreateResponse, ExecInspectResponse, ExecStartRequest};
use hyper::Method;

/// Exec operations, obtained from [`DockerClient::exec`].
#[derive(Debug, Clone, Copy)]
pub struct Exec<'a> {
    client: &'a DockerClient,
}

impl<'a> Exec<'a> {
    pub(crate) const fn new(client: &'a DockerClient) -> Self {
        Self { client }
    }

    /// Creates an exec instance in a running container.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Serialization`] if the request cannot be encoded,
    /// plus transport, status, and decode failures.
    pub async fn create(
        &self,
        container_id: &str,
        request: &ExecCreateRequest,
    ) -> Result<ExecCreateResponse> {
        let endpoint = Endpoint::new(
            Method::POST,
            format!("containers/{container_id}/exec"),
            ResponseShape::Object,
        )
        .json_body(request)?;
        self.client.run(endpoint).await
    }

    /// Starts an exec instance and streams its output.
    ///
    /// Output uses the same frame format as logs/attach; `request.tty`
    /// must match the exec instance's TTY setting, since raw and framed
    /// streams are indistinguishable on the wire.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Serialization`] if the request cannot be encoded,
    /// plus transport and status failures; framing violations surface per
    /// frame.
    pub async fn start(
        &self,
        exec_id: &str,
        request: &ExecStartRequest,
    ) -> Result<DemuxedStream> {
        let tty = request.tty.unwrap_or(false);
        let endpoint = Endpoint::new(
            Method::POST,
            format!("exec/{exec_id}/start"),
            ResponseShape::FramedStream { tty },
        )
        .json_body(request)?;
        self.client.run_framed(endpoint).await
    }

    /// Resizes the TTY of an exec instance.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn resize(&self, exec_id: &str, width: u32, height: u32) -> Result<()> {
        let pairs = [("w", width.to_string()), ("h", height.to_string())];
        self.client
            .run_unit(Endpoint::new(
                Method::POST,
                format!("exec/{exec_id}/resize{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Inspects an exec instance.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn inspect(&self, exec_id: &str) -> Result<ExecInspectResponse> {
        self.client
            .run(Endpoint::new(
                Method::GET,
                format!("exec/{exec_id}/json"),
                ResponseShape::Object,
            ))
            .await
    }
}
