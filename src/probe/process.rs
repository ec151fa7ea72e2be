//! OS process enumeration via `sysinfo`.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::debug;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use crate::error::{BotError, Result};
use crate::status::ProcessInfo;

/// Lists live processes by exact name.
pub trait ProcessLookup: Send + Sync {
    /// Returns every live process whose name equals `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process table cannot be read or a record is malformed.
    fn find_by_name(&self, name: &str) -> Result<Vec<ProcessInfo>>;
}

/// Reads the live process table of the host.
///
/// A process matches when its kernel name, executable file name or the
/// file name of `argv[0]` equals the wanted name. Linux truncates the kernel
/// name to 15 bytes, so longer binary names only match through the latter two.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessLookup;

impl ProcessLookup for SystemProcessLookup {
    fn find_by_name(&self, name: &str) -> Result<Vec<ProcessInfo>> {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_memory()
                .with_exe(UpdateKind::OnlyIfNotSet)
                .with_cmd(UpdateKind::OnlyIfNotSet),
        );

        let wanted = OsStr::new(name);
        let matches = sys
            .processes()
            .values()
            .filter(|process| process.thread_kind().is_none())
            .filter(|process| {
                names_match(
                    wanted,
                    process.name(),
                    process.exe(),
                    process.cmd().first().map(OsString::as_os_str),
                )
            })
            .map(|process| {
                Ok(ProcessInfo {
                    pid: process.pid().as_u32(),
                    started_at: start_time(process.start_time())?,
                    working_set_bytes: process.memory(),
                    name: name.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Found {} process(es) named '{name}'", matches.len());
        Ok(matches)
    }
}

fn names_match(wanted: &OsStr, name: &OsStr, exe: Option<&Path>, argv0: Option<&OsStr>) -> bool {
    name == wanted
        || exe.and_then(Path::file_name) == Some(wanted)
        || argv0.and_then(|arg| Path::new(arg).file_name()) == Some(wanted)
}

fn start_time(epoch_secs: u64) -> Result<DateTime<Utc>> {
    i64::try_from(epoch_secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| BotError::ProcessLookup(format!("invalid process start time {epoch_secs}")))
}
