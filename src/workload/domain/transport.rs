//! Transport configuration value objects for workloads.

use super::ParseTransportTypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default host the supervising proxy binds to.
pub const DEFAULT_PROXY_HOST: &str = "127.0.0.1";

/// Transport a workload speaks to its clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportType {
    /// Local process STDIO, bridged by the proxy.
    #[serde(rename = "stdio")]
    Stdio,
    /// HTTP with server-sent events.
    #[serde(rename = "sse")]
    Sse,
    /// Streamable HTTP.
    #[serde(rename = "streamable-http")]
    StreamableHttp,
}

impl TransportType {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable-http",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportType {
    type Error = ParseTransportTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "streamable-http" | "streamable_http" => Ok(Self::StreamableHttp),
            _ => Err(ParseTransportTypeError(value.to_owned())),
        }
    }
}

/// Transport settings persisted with a workload's launch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    transport_type: TransportType,
    host: String,
    proxy_port: u16,
    target_port: Option<u16>,
}

impl TransportConfig {
    /// Creates a transport configuration bound to the default host with an
    /// automatically selected proxy port.
    #[must_use]
    pub fn new(transport_type: TransportType) -> Self {
        Self {
            transport_type,
            host: DEFAULT_PROXY_HOST.to_owned(),
            proxy_port: 0,
            target_port: None,
        }
    }

    /// Sets the proxy host. Blank values keep the current host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let normalized = host.into().trim().to_owned();
        if !normalized.is_empty() {
            self.host = normalized;
        }
        self
    }

    /// Sets the proxy port. `0` selects a port at launch.
    #[must_use]
    pub const fn with_proxy_port(mut self, port: u16) -> Self {
        self.proxy_port = port;
        self
    }

    /// Sets the port the workload itself listens on.
    #[must_use]
    pub const fn with_target_port(mut self, port: u16) -> Self {
        self.target_port = Some(port);
        self
    }

    /// Returns the transport type.
    #[must_use]
    pub const fn transport_type(&self) -> TransportType {
        self.transport_type
    }

    /// Returns the proxy host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the proxy port, `0` meaning "select at launch".
    #[must_use]
    pub const fn proxy_port(&self) -> u16 {
        self.proxy_port
    }

    /// Returns the workload's own port, if configured.
    #[must_use]
    pub const fn target_port(&self) -> Option<u16> {
        self.target_port
    }
}
