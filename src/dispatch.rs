//! Turns text addressed to the bot into a reply.

mod dispatcher;
mod mention;
mod table;

pub use dispatcher::{Command, Dispatcher, STATUS_KEYWORD, StatusSource};
pub use mention::strip_mentions;
pub use table::{CommandTable, CommandsFile, builtin_command_table};
