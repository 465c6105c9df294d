//! # stevedore
//!
//! Typed async client for the Docker Engine HTTP API.
//!
//! The crate turns strongly-typed method calls into REST requests against a
//! daemon, and daemon responses (JSON bodies, newline-delimited JSON
//! streams, and the stdout/stderr frame format) back into typed results.
//!
//! ## Architecture
//!
//! ```text
//! caller ──► api families ──► Endpoint descriptor
//!                                   │
//!                                   ▼
//!                             DockerClient
//!                          (dispatch by shape)
//!                                   │
//!                 ┌─────────────────┼──────────────────┐
//!                 ▼                 ▼                  ▼
//!           object decoder    LineStream<T>      FrameStream
//!                 │                 │                  │
//!                 └────────► Transport + pool ◄────────┘
//!                        (HTTP/1.1 over unix/tcp)
//! ```
//!
//! Every API call is described by an [`Endpoint`] whose [`ResponseShape`]
//! tag declares how the response must be interpreted; a single dispatcher
//! branches on the tag. Streaming results are lazy, pull-based sequences
//! that own their connection's pool slot and release it on drop.
//!
//! ## Usage
//!
//! ```no_run
//! use futures::StreamExt;
//! use stevedore::{DockerClient, LogsOptions};
//!
//! # async fn demo() -> stevedore::Result<()> {
//! let client = DockerClient::with_defaults();
//! let version = client.system().version().await?;
//! println!("daemon {}", version.version);
//!
//! let logs = client
//!     .containers()
//!     .logs("my-container", &LogsOptions::default())
//!     .await?;
//! let mut frames = logs.into_frames().expect("non-tty container");
//! while let Some(frame) = frames.next().await {
//!     let frame = frame?;
//!     print!("[{}] {}", frame.stream, String::from_utf8_lossy(&frame.payload));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The shipped endpoint families cover containers, images, exec, system,
//! and swarm operations; anything else can be reached by building an
//! [`Endpoint`] directly and passing it to the matching
//! [`DockerClient::run`] wrapper.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod client;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod frame;
pub mod stream;
pub mod transport;
pub mod types;

mod pool;
#[cfg(test)]
mod testutil;

pub use api::{
    AttachOptions, BuildOptions, Containers, EventsOptions, Exec, Images, ListContainersOptions,
    ListImagesOptions, LogsOptions, RemoveContainerOptions, Swarm, System,
};
pub use client::{ClientConfig, DockerClient, DEFAULT_API_VERSION};
pub use decode::parse_daemon_date;
pub use endpoint::{Endpoint, ResponseShape};
pub use error::{Error, Result, TransportError};
pub use frame::{DemuxedStream, Frame, FrameStream, StreamKind};
pub use stream::{ByteStream, LineStream};
pub use transport::{DaemonUri, DEFAULT_SOCKET_PATH};
