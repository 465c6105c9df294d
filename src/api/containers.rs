//! Container operations.

use crate::api::{filters_param, query};
use crate::client::DockerClient;
use crate::endpoint::{Endpoint, ResponseShape};
use crate::error::Result;
use crate::frame::DemuxedStream;
use crate::types::{
    ContainerCreateRequest, ContainerCreateResponse, ContainerInspectResponse,
    ContainerPruneResponse, ContainerSummary, WaitResponse,
};
use hyper::Method;
use std::collections::HashMap;

/// Query options for [`Containers::list`].
#[derive(Debug, Default)]
pub struct ListContainersOptions {
    /// Include stopped containers.
    pub all: bool,
    /// Return at most this many containers.
    pub limit: Option<i64>,
    /// Include size information.
    pub size: bool,
    /// Daemon-side filters (`status`, `label`, `name`, ...).
    pub filters: HashMap<String, Vec<String>>,
}

/// Query options for [`Containers::logs`].
#[derive(Debug)]
pub struct LogsOptions {
    /// Keep the connection open and stream new output as it is produced.
    pub follow: bool,
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Only logs since this Unix timestamp.
    pub since: Option<i64>,
    /// Only logs until this Unix timestamp.
    pub until: Option<i64>,
    /// Prefix each line with its timestamp.
    pub timestamps: bool,
    /// Only the last `n` lines (`"all"` for everything).
    pub tail: Option<String>,
    /// The container was created with a TTY, so the daemon sends raw bytes
    /// instead of multiplexed frames. Must match the container; there is no
    /// in-band signal.
    pub tty: bool,
}

impl Default for LogsOptions {
    fn default() -> Self {
        Self {
            follow: false,
            stdout: true,
            stderr: true,
            since: None,
            until: None,
            timestamps: false,
            tail: None,
            tty: false,
        }
    }
}

/// Query options for [`Containers::attach`].
#[derive(Debug)]
pub struct AttachOptions {
    /// Stream new output.
    pub stream: bool,
    /// Replay buffered output first.
    pub logs: bool,
    /// Attach to stdout.
    pub stdout: bool,
    /// Attach to stderr.
    pub stderr: bool,
    /// The container was created with a TTY; see [`LogsOptions::tty`].
    pub tty: bool,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            stream: true,
            logs: false,
            stdout: true,
            stderr: true,
            tty: false,
        }
    }
}

/// Query options for [`Containers::remove`].
#[derive(Debug, Default)]
pub struct RemoveContainerOptions {
    /// Kill the container first if it is running.
    pub force: bool,
    /// Remove anonymous volumes with it.
    pub volumes: bool,
    /// Remove the named link instead of the container.
    pub link: bool,
}

/// Container operations, obtained from [`DockerClient::containers`].
#[derive(Debug, Clone, Copy)]
pub struct Containers<'a> {
    client: &'a DockerClient,
}

impl<'a> Containers<'a> {
    pub(crate) const fn new(client: &'a DockerClient) -> Self {
        Self { client }
    }

    /// Lists containers.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn list(&self, options: &ListContainersOptions) -> Result<Vec<ContainerSummary>> {
        let mut pairs = Vec::new();
        if options.all {
            pairs.push(("all", "true".to_string()));
        }
        if let Some(limit) = options.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if options.size {
            pairs.push(("size", "true".to_string()));
        }
        if let Some(filters) = filters_param(&options.filters)? {
            pairs.push(("filters", filters));
        }
        let path = format!("containers/json{}", query(&pairs));
        self.client
            .run(Endpoint::new(Method::GET, path, ResponseShape::Object))
            .await
    }

    /// Creates a container.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Serialization`] if the request cannot be encoded
    /// (before any network activity), plus transport, status, and decode
    /// failures.
    pub async fn create(
        &self,
        name: Option<&str>,
        request: &ContainerCreateRequest,
    ) -> Result<ContainerCreateResponse> {
        let mut pairs = Vec::new();
        if let Some(name) = name {
            pairs.push(("name", name.to_string()));
        }
        let path = format!("containers/create{}", query(&pairs));
        let endpoint =
            Endpoint::new(Method::POST, path, ResponseShape::Object).json_body(request)?;
        self.client.run(endpoint).await
    }

    /// Inspects a container.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn inspect(&self, id: &str) -> Result<ContainerInspectResponse> {
        self.client
            .run(Endpoint::new(
                Method::GET,
                format!("containers/{id}/json"),
                ResponseShape::Object,
            ))
            .await
    }

    /// Starts a container.
    ///
    /// # Errors
    ///
    /// Transport and status failures; the daemon answers 304 if the
    /// container is already running.
    pub async fn start(&self, id: &str) -> Result<()> {
        self.client
            .run_unit(Endpoint::new(
                Method::POST,
                format!("containers/{id}/start"),
                ResponseShape::Object,
            ))
            .await
    }

    /// Stops a container, optionally waiting `timeout_secs` before killing
    /// it.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn stop(&self, id: &str, timeout_secs: Option<u32>) -> Result<()> {
        let mut pairs = Vec::new();
        if let Some(t) = timeout_secs {
            pairs.push(("t", t.to_string()));
        }
        self.client
            .run_unit(Endpoint::new(
                Method::POST,
                format!("containers/{id}/stop{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Restarts a container.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn restart(&self, id: &str, timeout_secs: Option<u32>) -> Result<()> {
        let mut pairs = Vec::new();
        if let Some(t) = timeout_secs {
            pairs.push(("t", t.to_string()));
        }
        self.client
            .run_unit(Endpoint::new(
                Method::POST,
                format!("containers/{id}/restart{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Sends a signal to a container.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn kill(&self, id: &str, signal: Option<&str>) -> Result<()> {
        let mut pairs = Vec::new();
        if let Some(signal) = signal {
            pairs.push(("signal", signal.to_string()));
        }
        self.client
            .run_unit(Endpoint::new(
                Method::POST,
                format!("containers/{id}/kill{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Removes a container.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn remove(&self, id: &str, options: &RemoveContainerOptions) -> Result<()> {
        let mut pairs = Vec::new();
        if options.force {
            pairs.push(("force", "true".to_string()));
        }
        if options.volumes {
            pairs.push(("v", "true".to_string()));
        }
        if options.link {
            pairs.push(("link", "true".to_string()));
        }
        self.client
            .run_unit(Endpoint::new(
                Method::DELETE,
                format!("containers/{id}{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Blocks until a container stops, returning its exit code.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn wait(&self, id: &str) -> Result<WaitResponse> {
        self.client
            .run(Endpoint::new(
                Method::POST,
                format!("containers/{id}/wait"),
                ResponseShape::Object,
            ))
            .await
    }

    /// Deletes stopped containers.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn prune(&self) -> Result<ContainerPruneResponse> {
        self.client
            .run(Endpoint::new(
                Method::POST,
                "containers/prune",
                ResponseShape::Object,
            ))
            .await
    }

    /// Streams container output.
    ///
    /// Returns as soon as response headers arrive; frames (or raw bytes,
    /// for TTY containers) are pulled lazily. Dropping the stream closes
    /// the connection.
    ///
    /// # Errors
    ///
    /// Transport and status failures; framing violations surface per
    /// frame.
    pub async fn logs(&self, id: &str, options: &LogsOptions) -> Result<DemuxedStream> {
        let mut pairs = Vec::new();
        if options.follow {
            pairs.push(("follow", "true".to_string()));
        }
        if options.stdout {
            pairs.push(("stdout", "true".to_string()));
        }
        if options.stderr {
            pairs.push(("stderr", "true".to_string()));
        }
        if let Some(since) = options.since {
            pairs.push(("since", since.to_string()));
        }
        if let Some(until) = options.until {
            pairs.push(("until", until.to_string()));
        }
        if options.timestamps {
            pairs.push(("timestamps", "true".to_string()));
        }
        if let Some(tail) = &options.tail {
            pairs.push(("tail", tail.clone()));
        }
        self.client
            .run_framed(Endpoint::new(
                Method::GET,
                format!("containers/{id}/logs{}", query(&pairs)),
                ResponseShape::FramedStream { tty: options.tty },
            ))
            .await
    }

    /// Attaches to a container's output.
    ///
    /// # Errors
    ///
    /// Transport and status failures; framing violations surface per
    /// frame.
    pub async fn attach(&self, id: &str, options: &AttachOptions) -> Result<DemuxedStream> {
        let mut pairs = Vec::new();
        if options.stream {
            pairs.push(("stream", "true".to_string()));
        }
        if options.logs {
            pairs.push(("logs", "true".to_string()));
        }
        if options.stdout {
            pairs.push(("stdout", "true".to_string()));
        }
        if options.stderr {
            pairs.push(("stderr", "true".to_string()));
        }
        self.client
            .run_framed(Endpoint::new(
                Method::POST,
                format!("containers/{id}/attach{}", query(&pairs)),
                ResponseShape::FramedStream { tty: options.tty },
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{json_response, text_response, TestDaemon};

    #[tokio::test]
    async fn list_builds_the_expected_query() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.uri().path(), "/v1.41/containers/json");
            assert_eq!(req.uri().query(), Some("all=true&limit=5"));
            Box::pin(async { json_response(200, "[]") })
        });
        let client = daemon.client();

        let listed = client
            .containers()
            .list(&ListContainersOptions {
                all: true,
                limit: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn create_posts_the_request_body() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.method(), Method::POST);
            assert_eq!(req.uri().path(), "/v1.41/containers/create");
            assert_eq!(req.uri().query(), Some("name=web"));
            Box::pin(async move {
                use http_body_util::BodyExt;
                let body = req.into_body().collect().await.unwrap().to_bytes();
                let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
                assert_eq!(value["Image"], "alpine:3.19");
                json_response(201, r#"{"Id":"abc123","Warnings":[]}"#)
            })
        });
        let client = daemon.client();

        let created = client
            .containers()
            .create(
                Some("web"),
                &ContainerCreateRequest {
                    image: "alpine:3.19".to_string(),
                    cmd: Some(vec!["sleep".to_string(), "30".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, "abc123");
    }

    #[tokio::test]
    async fn lifecycle_calls_hit_the_expected_paths() {
        let daemon = TestDaemon::new(|req| {
            let path = req.uri().path().to_string();
            Box::pin(async move {
                match path.as_str() {
                    "/v1.41/containers/abc/start"
                    | "/v1.41/containers/abc/stop"
                    | "/v1.41/containers/abc/kill"
                    | "/v1.41/containers/abc" => text_response(204, ""),
                    other => panic!("unexpected path {other}"),
                }
            })
        });
        let client = daemon.client();
        let containers = client.containers();

        containers.start("abc").await.unwrap();
        containers.stop("abc", Some(5)).await.unwrap();
        containers.kill("abc", Some("SIGTERM")).await.unwrap();
        containers
            .remove("abc", &RemoveContainerOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wait_decodes_the_exit_code() {
        let daemon = TestDaemon::new(|_req| {
            Box::pin(async { json_response(200, r#"{"StatusCode":137}"#) })
        });
        let client = daemon.client();

        let status = client.containers().wait("abc").await.unwrap();
        assert_eq!(status.status_code, 137);
        assert!(status.error.is_none());
    }
}
