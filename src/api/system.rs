//! System-level operations.

use crate::api::{filters_param, query};
use crate::client::DockerClient;
use crate::endpoint::{Endpoint, ResponseShape};
use crate::error::Result;
use crate::stream::LineStream;
use crate::types::{EventMessage, SystemInfoResponse, VersionResponse};
use hyper::Method;
use std::collections::HashMap;

/// Query options for [`System::events`].
#[derive(Debug, Default)]
pub struct EventsOptions {
    /// Only events since this timestamp (Unix seconds or RFC 3339).
    pub since: Option<String>,
    /// Only events until this timestamp.
    pub until: Option<String>,
    /// Daemon-side filters (`type`, `container`, `label`, ...).
    pub filters: HashMap<String, Vec<String>>,
}

/// System-level operations, obtained from [`DockerClient::system`].
#[derive(Debug, Clone, Copy)]
pub struct System<'a> {
    client: &'a DockerClient,
}

impl<'a> System<'a> {
    pub(crate) const fn new(client: &'a DockerClient) -> Self {
        Self { client }
    }

    /// Returns daemon version information.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn version(&self) -> Result<VersionResponse> {
        self.client
            .run(Endpoint::new(Method::GET, "version", ResponseShape::Object))
            .await
    }

    /// Returns system-wide information.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn info(&self) -> Result<SystemInfoResponse> {
        self.client
            .run(Endpoint::new(Method::GET, "info", ResponseShape::Object))
            .await
    }

    /// Checks that the daemon is responsive.
    ///
    /// The daemon answers with a plain-text body, so only the status is
    /// inspected.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .run_unit(Endpoint::new(Method::GET, "_ping", ResponseShape::Object))
            .await
    }

    /// Streams daemon events as they happen.
    ///
    /// Without an `until` bound the sequence never ends on its own; drop
    /// the stream to stop, which closes the connection.
    ///
    /// # Errors
    ///
    /// Transport and status failures; malformed event records surface per
    /// record.
    pub async fn events(&self, options: &EventsOptions) -> Result<LineStream<EventMessage>> {
        let mut pairs = Vec::new();
        if let Some(since) = &options.since {
            pairs.push(("since", since.clone()));
        }
        if let Some(until) = &options.until {
            pairs.push(("until", until.clone()));
        }
        if let Some(filters) = filters_param(&options.filters)? {
            pairs.push(("filters", filters));
        }
        self.client
            .run_stream(Endpoint::new(
                Method::GET,
                format!("events{}", query(&pairs)),
                ResponseShape::LineSequence,
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{json_response, text_response, TestDaemon};
    use bytes::Bytes;
    use futures::StreamExt;
    use std::sync::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn version_decodes() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.uri().path(), "/v1.41/version");
            Box::pin(async {
                json_response(
                    200,
                    r#"{"Version":"26.0.0","ApiVersion":"1.45","MinAPIVersion":"1.24","GitCommit":"8b79278","GoVersion":"go1.21.8","Os":"linux","Arch":"amd64","KernelVersion":"6.6.22"}"#,
                )
            })
        });
        let client = daemon.client();

        let version = client.system().version().await.unwrap();
        assert_eq!(version.version, "26.0.0");
        assert_eq!(version.min_api_version, "1.24");
        assert!(version.build_time.is_none());
    }

    #[tokio::test]
    async fn ping_checks_status_only() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.uri().path(), "/v1.41/_ping");
            Box::pin(async { text_response(200, "OK") })
        });
        let client = daemon.client();
        client.system().ping().await.unwrap();
    }

    #[tokio::test]
    async fn events_stream_stays_open_until_dropped() {
        let held = Arc::new(Mutex::new(Vec::new()));
        let held_in_handler = Arc::clone(&held);
        let daemon = TestDaemon::new(move |req| {
            assert_eq!(req.uri().path(), "/v1.41/events");
            let held = Arc::clone(&held_in_handler);
            Box::pin(async move {
                let (tx, body) = crate::testutil::channel_body();
                tx.unbounded_send(Bytes::from_static(
                    b"{\"Type\":\"container\",\"Action\":\"start\",\"Actor\":{\"ID\":\"abc\",\"Attributes\":{}},\"scope\":\"local\",\"time\":1,\"timeNano\":2}\n",
                ))
                .unwrap();
                held.lock().unwrap().push(tx);
                crate::testutil::respond(200, body)
            })
        });
        let client = daemon.client();

        let mut events = client
            .system()
            .events(&EventsOptions::default())
            .await
            .unwrap();
        let event = events.next().await.unwrap().unwrap();
        assert_eq!(event.action, "start");

        assert_eq!(client.active_connections(), 1);
        drop(events);
        assert_eq!(client.active_connections(), 0);
    }
}
