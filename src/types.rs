//! Docker API types.
//!
//! Types defined according to Docker Engine API v1.41 specification.
//! See: <https://docs.docker.com/engine/api/v1.41/>
//!
//! These are payloads, not behavior: the execution engine treats them as
//! opaque serde targets. Date fields pick one of the two strategies in
//! [`crate::decode`] per field, since the daemon mixes formats within a
//! single response.

use crate::decode::{daemon_time, iso8601_time};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Container Types
// ============================================================================

/// Container summary (for list).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    /// Container ID.
    pub id: String,
    /// Container names.
    pub names: Vec<String>,
    /// Image name.
    pub image: String,
    /// Image ID.
    #[serde(rename = "ImageID")]
    pub image_id: String,
    /// Command.
    pub command: String,
    /// Created timestamp (Unix seconds).
    pub created: i64,
    /// State.
    pub state: String,
    /// Status string.
    pub status: String,
    /// Ports.
    pub ports: Vec<Port>,
    /// Labels.
    pub labels: HashMap<String, String>,
    /// Size of files written (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_rw: Option<i64>,
    /// Size of root filesystem (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_root_fs: Option<i64>,
    /// Mounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mounts: Option<Vec<MountPoint>>,
}

/// Port mapping.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Port {
    /// Private port.
    pub private_port: u16,
    /// Public port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    /// Type (tcp/udp).
    #[serde(rename = "Type")]
    pub port_type: String,
    /// IP address (optional).
    #[serde(rename = "IP", skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Mount point.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountPoint {
    /// Mount type.
    #[serde(rename = "Type")]
    pub mount_type: String,
    /// Source.
    pub source: String,
    /// Destination.
    pub destination: String,
    /// Mode.
    pub mode: String,
    /// Read-write.
    #[serde(rename = "RW")]
    pub rw: bool,
    /// Propagation.
    pub propagation: String,
}

/// Container create request.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerCreateRequest {
    /// Hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// User.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Attach stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdin: Option<bool>,
    /// Attach stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdout: Option<bool>,
    /// Attach stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stderr: Option<bool>,
    /// TTY allocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    /// Open stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_stdin: Option<bool>,
    /// Stdin once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_once: Option<bool>,
    /// Environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    /// Command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    /// Image name.
    pub image: String,
    /// Working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Entrypoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    /// Labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    /// Stop signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
    /// Stop timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_timeout: Option<i32>,
    /// Host config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_config: Option<HostConfig>,
}

/// Host configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    /// Port bindings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_bindings: Option<HashMap<String, Vec<PortBinding>>>,
    /// Binds (volume mounts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binds: Option<Vec<String>>,
    /// Auto remove container when it exits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_remove: Option<bool>,
    /// Network mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    /// Memory limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    /// CPU shares.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    /// Restart policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
    /// Privileged mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    /// Read-only root filesystem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly_rootfs: Option<bool>,
    /// Extra hosts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_hosts: Option<Vec<String>>,
}

/// Port binding.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    /// Host IP.
    #[serde(rename = "HostIp", skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    /// Host port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<String>,
}

/// Restart policy.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestartPolicy {
    /// Policy name.
    pub name: String,
    /// Maximum retry count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_retry_count: Option<i32>,
}

/// Container create response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerCreateResponse {
    /// Container ID.
    pub id: String,
    /// Warnings.
    pub warnings: Vec<String>,
}

/// Container inspect response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInspectResponse {
    /// Container ID.
    pub id: String,
    /// Creation time.
    #[serde(with = "daemon_time")]
    pub created: DateTime<Utc>,
    /// Path to command.
    pub path: String,
    /// Command arguments.
    pub args: Vec<String>,
    /// Container state.
    pub state: ContainerState,
    /// Image.
    pub image: String,
    /// Name.
    pub name: String,
    /// Restart count.
    pub restart_count: i32,
    /// Container config.
    pub config: ContainerConfig,
    /// Host config.
    pub host_config: HostConfig,
    /// Mounts.
    pub mounts: Vec<MountPoint>,
}

/// Container state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerState {
    /// Status (created, running, paused, restarting, removing, exited, dead).
    pub status: String,
    /// Running.
    pub running: bool,
    /// Paused.
    pub paused: bool,
    /// Restarting.
    pub restarting: bool,
    /// OOM killed.
    #[serde(rename = "OOMKilled")]
    pub oom_killed: bool,
    /// Dead.
    pub dead: bool,
    /// PID.
    pub pid: i32,
    /// Exit code.
    pub exit_code: i32,
    /// Error.
    pub error: String,
    /// Started at. The zero time `0001-01-01T00:00:00Z` means never started.
    #[serde(with = "daemon_time")]
    pub started_at: DateTime<Utc>,
    /// Finished at.
    #[serde(with = "daemon_time")]
    pub finished_at: DateTime<Utc>,
}

/// Container config.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    /// Hostname.
    pub hostname: String,
    /// User.
    pub user: String,
    /// Environment.
    pub env: Vec<String>,
    /// Command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    /// Image.
    pub image: String,
    /// Working directory.
    pub working_dir: String,
    /// Entrypoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    /// Labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// TTY.
    pub tty: bool,
    /// Open stdin.
    pub open_stdin: bool,
}

/// Wait response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WaitResponse {
    /// Exit code.
    pub status_code: i64,
    /// Error (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WaitError>,
}

/// Wait error.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WaitError {
    /// Error message.
    pub message: String,
}

/// Container prune response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerPruneResponse {
    /// Containers deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containers_deleted: Option<Vec<String>>,
    /// Space reclaimed in bytes.
    pub space_reclaimed: u64,
}

// ============================================================================
// Exec Types
// ============================================================================

/// Exec create request.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecCreateRequest {
    /// Attach stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdin: Option<bool>,
    /// Attach stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stdout: Option<bool>,
    /// Attach stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_stderr: Option<bool>,
    /// Detach keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detach_keys: Option<String>,
    /// TTY allocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    /// Environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    /// Command to run.
    pub cmd: Vec<String>,
    /// Privileged mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    /// User.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

/// Exec create response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecCreateResponse {
    /// Exec ID.
    pub id: String,
}

/// Exec start request.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecStartRequest {
    /// Detach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detach: Option<bool>,
    /// TTY.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
}

/// Exec inspect response.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecInspectResponse {
    /// Can remove.
    pub can_remove: bool,
    /// Container ID.
    #[serde(rename = "ContainerID")]
    pub container_id: String,
    /// Detach keys.
    pub detach_keys: String,
    /// Exit code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Exec ID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Open stderr.
    pub open_stderr: bool,
    /// Open stdin.
    pub open_stdin: bool,
    /// Open stdout.
    pub open_stdout: bool,
    /// Running.
    pub running: bool,
    /// PID.
    pub pid: i32,
}

// ============================================================================
// Image Types
// ============================================================================

/// Image summary.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageSummary {
    /// Image ID.
    pub id: String,
    /// Parent ID.
    #[serde(rename = "ParentId")]
    pub parent_id: String,
    /// Repo tags.
    pub repo_tags: Vec<String>,
    /// Repo digests.
    pub repo_digests: Vec<String>,
    /// Created timestamp (Unix seconds).
    pub created: i64,
    /// Size.
    pub size: i64,
    /// Shared size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_size: Option<i64>,
    /// Labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Number of containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containers: Option<i64>,
}

/// Image inspect response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageInspectResponse {
    /// Image ID.
    pub id: String,
    /// Repo tags.
    pub repo_tags: Vec<String>,
    /// Repo digests.
    pub repo_digests: Vec<String>,
    /// Parent.
    pub parent: String,
    /// Comment.
    pub comment: String,
    /// Created. Image metadata carries the ISO-8601 variant.
    #[serde(with = "iso8601_time")]
    pub created: DateTime<Utc>,
    /// Author.
    pub author: String,
    /// Architecture.
    pub architecture: String,
    /// OS.
    pub os: String,
    /// Size.
    pub size: i64,
    /// Config.
    pub config: ContainerConfig,
    /// Root FS.
    pub root_fs: RootFs,
}

/// Root filesystem info.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RootFs {
    /// Type (usually "layers").
    #[serde(rename = "Type")]
    pub root_type: String,
    /// Layer digests.
    pub layers: Vec<String>,
}

/// Image delete response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageDeleteResponse {
    /// Deleted image ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
    /// Untagged reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub untagged: Option<String>,
}

/// Image prune response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImagePruneResponse {
    /// Images deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_deleted: Option<Vec<ImageDeleteResponse>>,
    /// Space reclaimed in bytes.
    pub space_reclaimed: u64,
}

// ============================================================================
// Progress Records (pull, build)
// ============================================================================

/// One record of a pull progress stream.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullProgress {
    /// Human-readable status line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Layer ID the record applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Rendered progress bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    /// Numeric progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_detail: Option<ProgressDetail>,
    /// Error reported mid-stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Numeric progress of one layer.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDetail {
    /// Bytes transferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<i64>,
    /// Total bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

/// One record of a build output stream.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Build output line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    /// Error reported mid-stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured error detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
    /// Auxiliary payload; carries the image ID on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aux: Option<BuildAux>,
}

/// Structured build error.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Error message.
    pub message: String,
}

/// Auxiliary build payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct BuildAux {
    /// Built image ID.
    #[serde(rename = "ID")]
    pub id: String,
}

// ============================================================================
// System Types
// ============================================================================

/// Version response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionResponse {
    /// Version.
    pub version: String,
    /// API version.
    pub api_version: String,
    /// Minimum API version.
    #[serde(rename = "MinAPIVersion")]
    pub min_api_version: String,
    /// Git commit.
    pub git_commit: String,
    /// Go version.
    pub go_version: String,
    /// OS.
    pub os: String,
    /// Architecture.
    pub arch: String,
    /// Kernel version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_version: Option<String>,
    /// Build time.
    #[serde(with = "iso8601_time::opt", default, skip_serializing_if = "Option::is_none")]
    pub build_time: Option<DateTime<Utc>>,
}

/// System info response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemInfoResponse {
    /// Containers count.
    pub containers: i64,
    /// Running containers.
    pub containers_running: i64,
    /// Paused containers.
    pub containers_paused: i64,
    /// Stopped containers.
    pub containers_stopped: i64,
    /// Images count.
    pub images: i64,
    /// Server version.
    pub server_version: String,
    /// Operating system.
    pub operating_system: String,
    /// OS type.
    #[serde(rename = "OSType")]
    pub os_type: String,
    /// Architecture.
    pub architecture: String,
    /// Number of CPUs.
    #[serde(rename = "NCPU")]
    pub ncpu: i64,
    /// Total memory.
    pub mem_total: i64,
    /// Name.
    pub name: String,
    /// ID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Docker root directory.
    pub docker_root_dir: String,
    /// Debug mode.
    pub debug: bool,
    /// Kernel version.
    pub kernel_version: String,
    /// System time.
    #[serde(with = "daemon_time::opt", default, skip_serializing_if = "Option::is_none")]
    pub system_time: Option<DateTime<Utc>>,
}

/// One record of the event stream.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventMessage {
    /// Object type (container, image, network, ...).
    #[serde(rename = "Type")]
    pub event_type: String,
    /// Action (create, start, die, ...).
    #[serde(rename = "Action")]
    pub action: String,
    /// Object the event applies to.
    #[serde(rename = "Actor")]
    pub actor: EventActor,
    /// Event scope (local or swarm).
    #[serde(rename = "scope", default)]
    pub scope: String,
    /// Timestamp (Unix seconds).
    #[serde(rename = "time")]
    pub time: i64,
    /// Timestamp (Unix nanoseconds).
    #[serde(rename = "timeNano")]
    pub time_nano: i64,
}

/// Event subject.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventActor {
    /// Object ID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Object attributes (name, image, labels...).
    #[serde(rename = "Attributes", default)]
    pub attributes: HashMap<String, String>,
}

// ============================================================================
// Swarm Types
// ============================================================================

/// Swarm inspect response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwarmInspectResponse {
    /// Swarm ID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Creation time. Swarm metadata carries the ISO-8601 variant.
    #[serde(with = "iso8601_time")]
    pub created_at: DateTime<Utc>,
    /// Last update time.
    #[serde(with = "iso8601_time")]
    pub updated_at: DateTime<Utc>,
    /// Join tokens for new nodes.
    pub join_tokens: SwarmJoinTokens,
    /// Whether a root CA rotation is in progress.
    pub root_rotation_in_progress: bool,
    /// Swarm spec.
    pub spec: SwarmSpec,
    /// Subnet size of networks created from the default pool.
    pub subnet_size: u8,
    /// Version index.
    pub version: SwarmVersion,
}

/// Swarm join tokens.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwarmJoinTokens {
    /// Token for joining as a manager.
    pub manager: String,
    /// Token for joining as a worker.
    pub worker: String,
}

/// Swarm spec.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwarmSpec {
    /// Swarm name.
    pub name: String,
    /// Labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Swarm version index.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwarmVersion {
    /// Monotonic version index.
    pub index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn container_inspect_decodes_daemon_dates() {
        let json = serde_json::json!({
            "Id": "abc123",
            "Created": "2021-03-11T21:15:35.123456789Z",
            "Path": "/bin/sh",
            "Args": ["-c", "sleep 1"],
            "State": {
                "Status": "exited",
                "Running": false,
                "Paused": false,
                "Restarting": false,
                "OOMKilled": false,
                "Dead": false,
                "Pid": 0,
                "ExitCode": 0,
                "Error": "",
                "StartedAt": "2021-03-11T21:15:36.00000001Z",
                "FinishedAt": "0001-01-01T00:00:00Z"
            },
            "Image": "sha256:deadbeef",
            "Name": "/busy",
            "RestartCount": 0,
            "Config": {
                "Hostname": "abc123",
                "User": "",
                "Env": ["PATH=/bin"],
                "Image": "busybox",
                "WorkingDir": "",
                "Tty": false,
                "OpenStdin": false
            },
            "HostConfig": {},
            "Mounts": []
        });
        let inspect: ContainerInspectResponse = serde_json::from_value(json).unwrap();
        assert_eq!(inspect.created.year(), 2021);
        assert_eq!(inspect.state.finished_at.year(), 1);
        assert_eq!(inspect.state.status, "exited");
    }

    #[test]
    fn pull_progress_record_decodes() {
        let line = r#"{"status":"Downloading","progressDetail":{"current":539,"total":772},"progress":"[===>  ]","id":"5843afab3874"}"#;
        let progress: PullProgress = serde_json::from_str(line).unwrap();
        assert_eq!(progress.status.as_deref(), Some("Downloading"));
        assert_eq!(progress.progress_detail.unwrap().total, Some(772));
    }

    #[test]
    fn build_error_record_decodes() {
        let line = r#"{"errorDetail":{"code":1,"message":"no such file"},"error":"no such file"}"#;
        let info: BuildInfo = serde_json::from_str(line).unwrap();
        assert_eq!(info.error_detail.unwrap().message, "no such file");
    }

    #[test]
    fn event_message_decodes() {
        let line = r#"{"Type":"container","Action":"start","Actor":{"ID":"abc","Attributes":{"image":"alpine","name":"brave_noyce"}},"scope":"local","time":1615497335,"timeNano":1615497335123456789}"#;
        let event: EventMessage = serde_json::from_str(line).unwrap();
        assert_eq!(event.event_type, "container");
        assert_eq!(event.actor.attributes["image"], "alpine");
    }

    #[test]
    fn swarm_inspect_decodes_iso_dates() {
        let json = serde_json::json!({
            "ID": "abajmipo7b4xz5ip2nrla6b11",
            "CreatedAt": "2016-08-18T10:44:24.496525531Z",
            "UpdatedAt": "2017-08-09T07:09:37.632105588Z",
            "JoinTokens": {"Manager": "SWMTKN-1-m", "Worker": "SWMTKN-1-w"},
            "RootRotationInProgress": false,
            "Spec": {"Name": "default", "Labels": {}},
            "SubnetSize": 24,
            "Version": {"Index": 373531}
        });
        let swarm: SwarmInspectResponse = serde_json::from_value(json).unwrap();
        assert_eq!(swarm.created_at.year(), 2016);
        assert_eq!(swarm.version.index, 373_531);
    }
}
