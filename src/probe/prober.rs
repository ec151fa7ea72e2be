//! Combines process lookup and port probing into a status snapshot.

use log::{debug, error, info};

use crate::dispatch::StatusSource;
use crate::error::{BotError, Result};
use crate::status::{ProcessInfo, ServerStatus};

use super::port::{ProbeTimeouts, check_port};
use super::process::{ProcessLookup, SystemProcessLookup};

/// Checks one game server process and its port on loopback.
#[derive(Debug, Clone)]
pub struct Prober<L = SystemProcessLookup> {
    process_name: String,
    port: u16,
    timeouts: ProbeTimeouts,
    lookup: L,
}

impl Prober {
    /// Prober backed by the host's process table and default timeouts.
    #[must_use]
    pub fn new(process_name: impl Into<String>, port: u16) -> Self {
        Self::with_lookup(process_name, port, SystemProcessLookup)
    }
}

impl<L: ProcessLookup + Clone + 'static> Prober<L> {
    #[must_use]
    pub fn with_lookup(process_name: impl Into<String>, port: u16, lookup: L) -> Self {
        Self {
            process_name: process_name.into(),
            port,
            timeouts: ProbeTimeouts::default(),
            lookup,
        }
    }

    #[must_use]
    pub fn timeouts(mut self, timeouts: ProbeTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run a full status check.
    ///
    /// Never fails: lookup errors are folded into a negative status.
    pub async fn check_status(&self) -> ServerStatus {
        match self.try_check_status().await {
            Ok(status) => {
                if let Ok(json) = serde_json::to_string(&status) {
                    debug!("Status snapshot: {json}");
                }
                status
            }
            Err(e) => {
                error!("Status check for '{}' failed: {}", self.process_name, e);
                ServerStatus::probe_failed(e)
            }
        }
    }

    async fn try_check_status(&self) -> Result<ServerStatus> {
        let Some(process) = self.find_processes().await?.into_iter().next() else {
            info!("No process named '{}' is running", self.process_name);
            return Ok(ServerStatus::process_not_running());
        };

        debug!(
            "Probing port {} for process '{}' (PID {})",
            self.port, process.name, process.pid
        );
        let port = check_port(self.port, self.timeouts).await;
        info!(
            "Port {} is {} via {} ({} ms)",
            self.port,
            if port.is_open { "open" } else { "closed" },
            port.protocol,
            port.response_time_ms
        );

        Ok(ServerStatus::from_probe(process, port))
    }

    /// Scans the process table off the async workers.
    async fn find_processes(&self) -> Result<Vec<ProcessInfo>> {
        let lookup = self.lookup.clone();
        let name = self.process_name.clone();
        tokio::task::spawn_blocking(move || lookup.find_by_name(&name))
            .await
            .map_err(|e| BotError::ProcessLookup(format!("lookup task failed: {e}")))?
    }
}

impl<L: ProcessLookup + Clone + 'static> StatusSource for Prober<L> {
    async fn current_status(&self) -> Result<ServerStatus> {
        let prober = self.clone();
        tokio::spawn(async move { prober.check_status().await })
            .await
            .map_err(|e| BotError::Probe(format!("status task failed: {e}")))
    }
}
