//! Process liveness and loopback port reachability checks.

mod port;
mod process;
mod prober;

pub use port::{ProbeTimeouts, check_port};
pub use process::{ProcessLookup, SystemProcessLookup};
pub use prober::Prober;
