//! Server status snapshots and their chat rendering.

mod render;
mod types;

pub use render::{format_uptime, render_status};
pub use types::{PortCheckResult, ProbeProtocol, ProcessInfo, ServerDetails, ServerStatus};
