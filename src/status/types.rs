//! Value types produced by a single status check.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

pub(crate) const MSG_NOT_RUNNING: &str = "Server process is not running";
pub(crate) const MSG_ONLINE: &str = "Server is online and accepting connections";
pub(crate) const MSG_PORT_CLOSED: &str = "Server process is running but the game port is not responding";

/// Snapshot of an OS process matching the configured name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub working_set_bytes: u64,
    pub name: String,
}

/// Network protocol that decided a port check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ProbeProtocol {
    Udp,
    Tcp,
}

/// Outcome of the UDP/TCP reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortCheckResult {
    pub is_open: bool,
    pub response_time_ms: u64,
    pub protocol: ProbeProtocol,
}

/// Result of one status check.
///
/// Built only through the constructors below, which keep
/// `is_online == process_running && port_open`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub is_online: bool,
    pub process_running: bool,
    pub port_open: bool,
    pub response_time_ms: Option<u64>,
    pub checked_at: DateTime<Utc>,
    pub message: String,
    pub process_info: Option<ProcessInfo>,
}

impl ServerStatus {
    /// No process with the configured name exists.
    #[must_use]
    pub fn process_not_running() -> Self {
        Self::negative(MSG_NOT_RUNNING.to_string())
    }

    /// The probe itself failed; `description` ends up in the message.
    #[must_use]
    pub fn probe_failed(description: impl std::fmt::Display) -> Self {
        Self::negative(format!("Error checking server: {description}"))
    }

    /// A matching process exists and the port was probed.
    #[must_use]
    pub fn from_probe(process: ProcessInfo, port: PortCheckResult) -> Self {
        let message = if port.is_open {
            MSG_ONLINE
        } else {
            MSG_PORT_CLOSED
        };

        Self {
            is_online: port.is_open,
            process_running: true,
            port_open: port.is_open,
            response_time_ms: Some(port.response_time_ms),
            checked_at: Utc::now(),
            message: message.to_string(),
            process_info: Some(process),
        }
    }

    fn negative(message: String) -> Self {
        Self {
            is_online: false,
            process_running: false,
            port_open: false,
            response_time_ms: None,
            checked_at: Utc::now(),
            message,
            process_info: None,
        }
    }
}

/// Display metadata about the monitored server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDetails {
    pub name: String,
    pub port: u16,
    pub world: Option<String>,
    pub password: Option<String>,
    pub mods: Vec<String>,
}
