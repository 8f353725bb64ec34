//! Persisted launch configuration.

use super::{TransportConfig, TransportType, WorkloadName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filesystem and network permissions granted to a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionProfile {
    name: String,
    read: Vec<String>,
    write: Vec<String>,
    outbound_network: bool,
}

impl PermissionProfile {
    /// Built-in profile for STDIO servers: no mounts, no network.
    #[must_use]
    pub fn stdio() -> Self {
        Self {
            name: "stdio".to_owned(),
            read: Vec::new(),
            write: Vec::new(),
            outbound_network: false,
        }
    }

    /// Built-in profile allowing outbound network access.
    #[must_use]
    pub fn network() -> Self {
        Self {
            name: "network".to_owned(),
            read: Vec::new(),
            write: Vec::new(),
            outbound_network: true,
        }
    }

    /// Adds read-only mount sources.
    #[must_use]
    pub fn with_read(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.read.extend(paths);
        self
    }

    /// Adds read-write mount sources.
    #[must_use]
    pub fn with_write(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.write.extend(paths);
        self
    }

    /// Returns the profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns read-only mount sources.
    #[must_use]
    pub fn read(&self) -> &[String] {
        &self.read
    }

    /// Returns read-write mount sources.
    #[must_use]
    pub fn write(&self) -> &[String] {
        &self.write
    }

    /// Returns whether outbound network access is allowed.
    #[must_use]
    pub const fn outbound_network(&self) -> bool {
        self.outbound_network
    }
}

impl Default for PermissionProfile {
    fn default() -> Self {
        Self::stdio()
    }
}

/// Everything needed to relaunch a workload identically.
///
/// Written by the launch path when a workload is first started and read back
/// on resume. The reconciliation core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRunState {
    base_name: WorkloadName,
    container_name: String,
    image: String,
    #[serde(default)]
    cmd_args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    permission_profile: PermissionProfile,
    transport: TransportConfig,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    remote_url: Option<String>,
    #[serde(default)]
    secrets: Vec<String>,
    #[serde(default)]
    debug: bool,
}

impl PersistedRunState {
    /// Creates a launch configuration with the built-in STDIO profile.
    #[must_use]
    pub fn new(base_name: WorkloadName, image: impl Into<String>, transport: TransportConfig) -> Self {
        Self {
            container_name: base_name.as_str().to_owned(),
            base_name,
            image: image.into(),
            cmd_args: Vec::new(),
            env: BTreeMap::new(),
            permission_profile: PermissionProfile::stdio(),
            transport,
            group: None,
            remote_url: None,
            secrets: Vec::new(),
            debug: false,
        }
    }

    /// Sets the container name when it differs from the base name.
    #[must_use]
    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }

    /// Replaces the command arguments.
    #[must_use]
    pub fn with_cmd_args(mut self, values: impl IntoIterator<Item = String>) -> Self {
        self.cmd_args = values.into_iter().collect();
        self
    }

    /// Replaces the environment.
    #[must_use]
    pub fn with_env(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = values.into_iter().collect();
        self
    }

    /// Sets the permission profile.
    #[must_use]
    pub fn with_permission_profile(mut self, profile: PermissionProfile) -> Self {
        self.permission_profile = profile;
        self
    }

    /// Sets the group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Marks the workload as remote, proxied to `url`.
    #[must_use]
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    /// Replaces secret references.
    #[must_use]
    pub fn with_secrets(mut self, values: impl IntoIterator<Item = String>) -> Self {
        self.secrets = values.into_iter().collect();
        self
    }

    /// Enables debug output in the supervising process.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Returns the base name.
    #[must_use]
    pub const fn base_name(&self) -> &WorkloadName {
        &self.base_name
    }

    /// Returns the container name.
    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Returns the image or package reference.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Returns the command arguments.
    #[must_use]
    pub fn cmd_args(&self) -> &[String] {
        &self.cmd_args
    }

    /// Returns the environment.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Returns the permission profile.
    #[must_use]
    pub const fn permission_profile(&self) -> &PermissionProfile {
        &self.permission_profile
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Returns the transport type.
    #[must_use]
    pub const fn transport_type(&self) -> TransportType {
        self.transport.transport_type()
    }

    /// Returns the group, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns the remote URL for remote workloads.
    #[must_use]
    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    /// Returns whether this is a remote workload.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote_url.is_some()
    }

    /// Returns secret references.
    #[must_use]
    pub fn secrets(&self) -> &[String] {
        &self.secrets
    }

    /// Returns whether debug output is enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}
