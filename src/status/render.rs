//! Plain-text rendering of a status snapshot for chat replies.

use std::fmt::Write;

use chrono::TimeDelta;

use super::types::{ProcessInfo, ServerDetails, ServerStatus};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Render a status snapshot as a multi-line chat message.
///
/// Uptime is measured against `checked_at`, so the same snapshot always
/// renders to the same text.
#[must_use]
pub fn render_status(status: &ServerStatus, details: &ServerDetails) -> String {
    let mut out = if status.is_online {
        render_online(status, details)
    } else {
        render_offline(status, details)
    };

    if let Some(process) = &status.process_info {
        push_process_lines(&mut out, process, status);
    }
    if let Some(ms) = status.response_time_ms {
        let _ = writeln!(out, "**Response time:** {ms} ms");
    }
    let _ = write!(out, "Checked <t:{}:R>", status.checked_at.timestamp());

    out
}

fn render_online(status: &ServerStatus, details: &ServerDetails) -> String {
    let mut out = format!("🟢 **{} is online**\n{}\n", details.name, status.message);

    if let Some(world) = &details.world {
        let _ = writeln!(out, "**World:** {world}");
    }
    if let Some(password) = &details.password {
        let _ = writeln!(out, "**Password:** `{password}`");
    }
    if !details.mods.is_empty() {
        let _ = writeln!(out, "**Mods:** {}", details.mods.join(", "));
    }

    out
}

fn render_offline(status: &ServerStatus, details: &ServerDetails) -> String {
    let mut out = format!("🔴 **{} is offline**\n{}\n", details.name, status.message);

    match &status.process_info {
        Some(process) => {
            let _ = writeln!(out, "**Process:** running (PID {})", process.pid);
        }
        None => out.push_str("**Process:** not running\n"),
    }
    let port_state = if status.port_open {
        "open"
    } else {
        "not responding"
    };
    let _ = writeln!(out, "**Port {}:** {port_state}", details.port);

    out
}

fn push_process_lines(out: &mut String, process: &ProcessInfo, status: &ServerStatus) {
    let uptime = status.checked_at - process.started_at;
    let _ = writeln!(out, "**Uptime:** {}", format_uptime(uptime));
    let _ = writeln!(
        out,
        "**Memory:** {} MB",
        process.working_set_bytes / BYTES_PER_MB
    );
}

/// Format a duration using its largest unit: `Xd Yh Zm`, `Xh Ym` or `Xm Ys`.
///
/// Negative durations (clock skew between start time and check) render as zero.
#[must_use]
pub fn format_uptime(uptime: TimeDelta) -> String {
    let total = uptime.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {seconds}s")
    }
}
