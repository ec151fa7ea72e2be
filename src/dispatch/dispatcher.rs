//! Classification and resolution of addressed chat text.

use std::future::Future;

use log::{debug, warn};

use crate::error::Result;
use crate::status::{ServerDetails, ServerStatus, render_status};

use super::mention::strip_mentions;
use super::table::CommandTable;

/// Keyword that always triggers a live status check.
pub const STATUS_KEYWORD: &str = "status";

const UNKNOWN_COMMAND_PREAMBLE: &str = "I don't recognize that command.";
const STATUS_UNKNOWN: &str = "Server status unknown.";

/// Anything that can produce a fresh server status.
pub trait StatusSource: Send + Sync {
    fn current_status(&self) -> impl Future<Output = Result<ServerStatus>> + Send;
}

/// Classified form of a cleaned message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Nothing left after removing mentions.
    Empty,
    Status,
    /// A key of the command table.
    Canned(String),
    Unknown,
}

/// Replies to messages that mention the bot.
///
/// Holds no per-call state; one instance serves all concurrent mentions.
pub struct Dispatcher<S> {
    bot_user_id: u64,
    table: CommandTable,
    details: ServerDetails,
    status: S,
}

impl<S: StatusSource> Dispatcher<S> {
    #[must_use]
    pub fn new(bot_user_id: u64, table: CommandTable, details: ServerDetails, status: S) -> Self {
        Self {
            bot_user_id,
            table,
            details,
            status,
        }
    }

    #[must_use]
    pub fn status_source(&self) -> &S {
        &self.status
    }

    #[must_use]
    pub fn details(&self) -> &ServerDetails {
        &self.details
    }

    /// Produce the reply for raw message text that mentioned the bot.
    pub async fn handle_mention(&self, raw: &str) -> String {
        let command = self.classify(raw);
        debug!("Classified {raw:?} as {command:?}");

        match command {
            Command::Empty => self.table.default_message().to_string(),
            Command::Status => self.status_reply().await,
            Command::Canned(key) => self
                .table
                .get(&key)
                .unwrap_or_else(|| self.table.default_message())
                .to_string(),
            Command::Unknown => {
                let help = self
                    .table
                    .get("help")
                    .unwrap_or_else(|| self.table.default_message());
                format!("{UNKNOWN_COMMAND_PREAMBLE}\n\n{help}")
            }
        }
    }

    /// Classify raw text by its first recognized token.
    ///
    /// Words after the first recognized one are ignored.
    #[must_use]
    pub fn classify(&self, raw: &str) -> Command {
        let cleaned = strip_mentions(raw, self.bot_user_id).trim().to_lowercase();
        if cleaned.is_empty() {
            return Command::Empty;
        }

        cleaned
            .split_whitespace()
            .find_map(|token| {
                if token == STATUS_KEYWORD {
                    Some(Command::Status)
                } else if self.table.contains(token) {
                    Some(Command::Canned(token.to_string()))
                } else {
                    None
                }
            })
            .unwrap_or(Command::Unknown)
    }

    async fn status_reply(&self) -> String {
        match self.status.current_status().await {
            Ok(status) => render_status(&status, &self.details),
            Err(e) => {
                warn!("Status check failed, using fallback reply: {e}");
                self.table
                    .get(STATUS_KEYWORD)
                    .unwrap_or(STATUS_UNKNOWN)
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::BotError;

    const BOT: u64 = 42;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl StatusSource for CountingSource {
        async fn current_status(&self) -> Result<ServerStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ServerStatus::process_not_running())
        }
    }

    struct BrokenSource;

    impl StatusSource for BrokenSource {
        async fn current_status(&self) -> Result<ServerStatus> {
            Err(BotError::Probe("task died".to_string()))
        }
    }

    fn details() -> ServerDetails {
        ServerDetails {
            name: "Midgard".to_string(),
            port: 2456,
            ..ServerDetails::default()
        }
    }

    fn table() -> CommandTable {
        CommandTable::new(
            "default reply",
            [
                ("help".to_string(), "help reply".to_string()),
                ("rules".to_string(), "rules reply".to_string()),
                ("status".to_string(), "canned status".to_string()),
            ],
        )
    }

    fn dispatcher<S: StatusSource>(table: CommandTable, source: S) -> Dispatcher<S> {
        Dispatcher::new(BOT, table, details(), source)
    }

    #[tokio::test]
    async fn mention_only_returns_default_message() {
        let d = dispatcher(table(), CountingSource::default());
        assert_eq!(d.handle_mention("<@42>").await, "default reply");
        assert_eq!(d.handle_mention("  <@!42>  ").await, "default reply");
    }

    #[tokio::test]
    async fn status_runs_probe_instead_of_canned_entry() {
        let d = dispatcher(table(), CountingSource::default());

        let reply = d.handle_mention("<@42> status").await;

        assert_eq!(d.status_source().calls.load(Ordering::SeqCst), 1);
        assert_ne!(reply, "canned status");
        assert!(reply.contains("Midgard is offline"));
    }

    #[tokio::test]
    async fn status_is_case_insensitive() {
        let d = dispatcher(table(), CountingSource::default());
        for input in ["STATUS", "Status", "status", "<@42>   sTaTuS  "] {
            assert_eq!(d.classify(input), Command::Status, "input {input:?}");
        }
    }

    #[tokio::test]
    async fn canned_reply_is_verbatim() {
        let d = dispatcher(table(), CountingSource::default());
        assert_eq!(d.handle_mention("<@42> RULES please").await, "rules reply");
        assert_eq!(d.status_source().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_command_appends_help() {
        let d = dispatcher(table(), CountingSource::default());
        let reply = d.handle_mention("<@42> foobar").await;
        assert!(reply.starts_with(UNKNOWN_COMMAND_PREAMBLE));
        assert!(reply.contains("help reply"));
    }

    #[tokio::test]
    async fn unknown_command_without_help_uses_default() {
        let d = dispatcher(
            CommandTable::new("default reply", Vec::new()),
            CountingSource::default(),
        );
        let reply = d.handle_mention("foobar").await;
        assert!(reply.starts_with(UNKNOWN_COMMAND_PREAMBLE));
        assert!(reply.contains("default reply"));
    }

    #[tokio::test]
    async fn first_recognized_token_wins() {
        let d = dispatcher(table(), CountingSource::default());
        assert_eq!(d.classify("help status"), Command::Canned("help".to_string()));
        assert_eq!(d.classify("what is the status of rules"), Command::Status);
        assert_eq!(d.handle_mention("help status").await, "help reply");
        assert_eq!(d.status_source().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn other_mentions_are_not_stripped() {
        let d = dispatcher(table(), CountingSource::default());
        assert_eq!(d.classify("<@42> <@7>"), Command::Unknown);
    }

    #[tokio::test]
    async fn probe_failure_falls_back_to_table_entry() {
        let d = dispatcher(table(), BrokenSource);
        assert_eq!(d.handle_mention("status").await, "canned status");
    }

    #[tokio::test]
    async fn probe_failure_without_entry_is_status_unknown() {
        let d = dispatcher(CommandTable::new("default reply", Vec::new()), BrokenSource);
        assert_eq!(d.handle_mention("status").await, STATUS_UNKNOWN);
    }
}
