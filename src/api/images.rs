//! Image operations.

use crate::api::{filters_param, query};
use crate::client::DockerClient;
use crate::endpoint::{Endpoint, ResponseShape};
use crate::error::Result;
use crate::stream::LineStream;
use crate::types::{
    BuildInfo, ImageDeleteResponse, ImageInspectResponse, ImagePruneResponse, ImageSummary,
    PullProgress,
};
use bytes::Bytes;
use futures::Stream;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::Method;
use std::collections::HashMap;

/// Query options for [`Images::list`].
#[derive(Debug, Default)]
pub struct ListImagesOptions {
    /// Include intermediate layers.
    pub all: bool,
    /// Include digest information.
    pub digests: bool,
    /// Daemon-side filters (`dangling`, `label`, `reference`, ...).
    pub filters: HashMap<String, Vec<String>>,
}

/// Query options for [`Images::build`].
#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Name (and optional tag) for the built image.
    pub tag: Option<String>,
    /// Path of the Dockerfile within the context.
    pub dockerfile: Option<String>,
    /// Do not use the layer cache.
    pub no_cache: bool,
    /// Always attempt to pull newer base images.
    pub pull: bool,
    /// Remove intermediate containers after a successful build.
    pub rm: bool,
    /// Build-time variables.
    pub build_args: HashMap<String, String>,
    /// Labels to set on the image.
    pub labels: HashMap<String, String>,
}

/// Image operations, obtained from [`DockerClient::images`].
#[derive(Debug, Clone, Copy)]
pub struct Images<'a> {
    client: &'a DockerClient,
}

impl<'a> Images<'a> {
    pub(crate) const fn new(client: &'a DockerClient) -> Self {
        Self { client }
    }

    /// Lists images.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn list(&self, options: &ListImagesOptions) -> Result<Vec<ImageSummary>> {
        let mut pairs = Vec::new();
        if options.all {
            pairs.push(("all", "true".to_string()));
        }
        if options.digests {
            pairs.push(("digests", "true".to_string()));
        }
        if let Some(filters) = filters_param(&options.filters)? {
            pairs.push(("filters", filters));
        }
        self.client
            .run(Endpoint::new(
                Method::GET,
                format!("images/json{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Inspects an image by name or ID.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn inspect(&self, name: &str) -> Result<ImageInspectResponse> {
        self.client
            .run(Endpoint::new(
                Method::GET,
                format!("images/{name}/json"),
                ResponseShape::Object,
            ))
            .await
    }

    /// Removes an image.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn remove(
        &self,
        name: &str,
        force: bool,
        noprune: bool,
    ) -> Result<Vec<ImageDeleteResponse>> {
        let mut pairs = Vec::new();
        if force {
            pairs.push(("force", "true".to_string()));
        }
        if noprune {
            pairs.push(("noprune", "true".to_string()));
        }
        self.client
            .run(Endpoint::new(
                Method::DELETE,
                format!("images/{name}{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Tags an image into a repository.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn tag(&self, name: &str, repo: &str, tag: Option<&str>) -> Result<()> {
        let mut pairs = vec![("repo", repo.to_string())];
        if let Some(tag) = tag {
            pairs.push(("tag", tag.to_string()));
        }
        self.client
            .run_unit(Endpoint::new(
                Method::POST,
                format!("images/{name}/tag{}", query(&pairs)),
                ResponseShape::Object,
            ))
            .await
    }

    /// Deletes unused images.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures.
    pub async fn prune(&self) -> Result<ImagePruneResponse> {
        self.client
            .run(Endpoint::new(
                Method::POST,
                "images/prune",
                ResponseShape::Object,
            ))
            .await
    }

    /// Pulls an image from a registry, streaming progress records.
    ///
    /// The returned sequence is lazy; the pull proceeds as records are
    /// consumed and the daemon reports completion with the final records.
    ///
    /// # Errors
    ///
    /// Transport and status failures; malformed progress records surface
    /// per record.
    pub async fn pull(
        &self,
        from_image: &str,
        tag: Option<&str>,
    ) -> Result<LineStream<PullProgress>> {
        let mut pairs = vec![("fromImage", from_image.to_string())];
        if let Some(tag) = tag {
            pairs.push(("tag", tag.to_string()));
        }
        self.client
            .run_stream(Endpoint::new(
                Method::POST,
                format!("images/create{}", query(&pairs)),
                ResponseShape::LineSequence,
            ))
            .await
    }

    /// Builds an image from a tar archive build context, streaming the
    /// context out incrementally and the daemon's build output back.
    ///
    /// # Errors
    ///
    /// Transport and status failures; malformed output records surface per
    /// record.
    pub async fn build<S>(
        &self,
        options: &BuildOptions,
        context: S,
    ) -> Result<LineStream<BuildInfo>>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        let mut pairs = Vec::new();
        if let Some(tag) = &options.tag {
            pairs.push(("t", tag.clone()));
        }
        if let Some(dockerfile) = &options.dockerfile {
            pairs.push(("dockerfile", dockerfile.clone()));
        }
        if options.no_cache {
            pairs.push(("nocache", "true".to_string()));
        }
        if options.pull {
            pairs.push(("pull", "true".to_string()));
        }
        if options.rm {
            pairs.push(("rm", "true".to_string()));
        }
        if let Some(args) = json_map_param(&options.build_args)? {
            pairs.push(("buildargs", args));
        }
        if let Some(labels) = json_map_param(&options.labels)? {
            pairs.push(("labels", labels));
        }
        let endpoint = Endpoint::new(
            Method::POST,
            format!("build{}", query(&pairs)),
            ResponseShape::UploadStream,
        )
        .header(CONTENT_TYPE, HeaderValue::from_static("application/x-tar"))
        .stream_body(context);
        self.client.run_upload(endpoint).await
    }
}

/// Encodes a string map query parameter (`buildargs`, `labels`).
fn json_map_param(map: &HashMap<String, String>) -> Result<Option<String>> {
    if map.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(map)
        .map(Some)
        .map_err(crate::error::Error::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{chunked, json_response, respond, TestDaemon};
    use futures::StreamExt;

    #[tokio::test]
    async fn pull_streams_progress_records() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.uri().path(), "/v1.41/images/create");
            assert_eq!(req.uri().query(), Some("fromImage=alpine&tag=3.19"));
            Box::pin(async {
                respond(
                    200,
                    chunked(vec![
                        Bytes::from_static(b"{\"status\":\"Pulling from library/alpine\",\"id\":\"3.19\"}\n"),
                        Bytes::from_static(b"{\"status\":\"Downloading\",\"progressDetail\":{\"current\":10,\"total\":20},\"id\":\"abc\"}\n"),
                        Bytes::from_static(b"{\"status\":\"Status: Downloaded newer image for alpine:3.19\"}\n"),
                    ]),
                )
            })
        });
        let client = daemon.client();

        let mut progress = client.images().pull("alpine", Some("3.19")).await.unwrap();
        let mut statuses = Vec::new();
        while let Some(record) = progress.next().await {
            statuses.push(record.unwrap().status.unwrap_or_default());
        }
        assert_eq!(statuses.len(), 3);
        assert!(statuses[2].starts_with("Status: Downloaded"));
    }

    #[tokio::test]
    async fn build_sends_tar_content_type_and_streams_output() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.uri().path(), "/v1.41/build");
            assert_eq!(req.uri().query(), Some("t=demo%3Alatest"));
            let content_types: Vec<_> = req
                .headers()
                .get_all(hyper::header::CONTENT_TYPE)
                .iter()
                .cloned()
                .collect();
            // Fixed JSON content type first, tar appended by the endpoint.
            assert!(content_types.contains(&HeaderValue::from_static("application/x-tar")));
            Box::pin(async move {
                use http_body_util::BodyExt;
                let context = req.into_body().collect().await.unwrap().to_bytes();
                assert_eq!(context.len(), 2048);
                json_response(
                    200,
                    "{\"stream\":\"Step 1/1 : FROM scratch\\n\"}\n{\"aux\":{\"ID\":\"sha256:feed\"}}\n",
                )
            })
        });
        let client = daemon.client();

        let context = futures::stream::iter(vec![Ok(Bytes::from(vec![0u8; 2048]))]);
        let mut output = client
            .images()
            .build(
                &BuildOptions {
                    tag: Some("demo:latest".to_string()),
                    ..Default::default()
                },
                context,
            )
            .await
            .unwrap();

        let first = output.next().await.unwrap().unwrap();
        assert!(first.stream.unwrap().starts_with("Step 1/1"));
        let second = output.next().await.unwrap().unwrap();
        assert_eq!(second.aux.unwrap().id, "sha256:feed");
        assert!(output.next().await.is_none());
    }

    #[tokio::test]
    async fn remove_decodes_delete_records() {
        let daemon = TestDaemon::new(|req| {
            assert_eq!(req.method(), Method::DELETE);
            assert_eq!(req.uri().path(), "/v1.41/images/alpine");
            assert_eq!(req.uri().query(), Some("force=true"));
            Box::pin(async {
                json_response(
                    200,
                    r#"[{"Untagged":"alpine:3.19"},{"Deleted":"sha256:abc"}]"#,
                )
            })
        });
        let client = daemon.client();

        let deleted = client.images().remove("alpine", true, false).await.unwrap();
        assert_eq!(deleted.len(), 2);
        assert_eq!(deleted[1].deleted.as_deref(), Some("sha256:abc"));
    }
}
