//! Swarm operations.

use crate::client::DockerClient;
use crate::endpoint::{Endpoint, ResponseShape};
use crate::error::Result;
use crate::types::SwarmInspectResponse;
use hyper::Method;

/// Swarm operations, obtained from [`DockerClient::swarm`].
#[derive(Debug, Clone, Copy)]
pub struct Swarm<'a> {
    client: &'a DockerClient,
}

impl<'a> Swarm<'a> {
    pub(crate) const fn new(client: &'a DockerClient) -> Self {
        Self { client }
    }

    /// Inspects the swarm this daemon belongs to.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures; daemons outside a swarm
    /// answer 503.
    pub async fn inspect(&self) -> Result<SwarmInspectResponse> {
        self.client
            .run(Endpoint::new(Method::GET, "swarm", ResponseShape::Object))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{json_response, TestDaemon};

    #[tokio::test]
    async fn inspect_decodes_the_swarm() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.uri().path(), "/v1.41/swarm");
            Box::pin(async {
                json_response(
                    200,
                    r#"{"ID":"abajmipo7b4xz5ip2nrla6b11","CreatedAt":"2016-08-18T10:44:24.496525531Z","UpdatedAt":"2017-08-09T07:09:37.632105588Z","JoinTokens":{"Manager":"SWMTKN-1-m","Worker":"SWMTKN-1-w"},"RootRotationInProgress":false,"Spec":{"Name":"default","Labels":{}},"SubnetSize":24,"Version":{"Index":373531}}"#,
                )
            })
        });
        let client = daemon.client();

        let swarm = client.swarm().inspect().await.unwrap();
        assert_eq!(swarm.spec.name, "default");
        assert_eq!(swarm.join_tokens.worker, "SWMTKN-1-w");
    }

    #[tokio::test]
    async fn not_in_swarm_surfaces_the_daemon_message() {
        let daemon = TestDaemon::new(|_req| {
            Box::pin(async {
                json_response(
                    503,
                    r#"{"message":"This node is not a swarm manager"}"#,
                )
            })
        });
        let client = daemon.client();

        let err = client.swarm().inspect().await.unwrap_err();
        assert_eq!(
            err.daemon_message().as_deref(),
            Some("This node is not a swarm manager")
        );
    }
}
