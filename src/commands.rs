//! Poise slash commands.

// Doc comments here double as slash command descriptions.
#![allow(clippy::missing_errors_doc)]

use crate::bot::Data;
use crate::error::{BotError, Result};
use crate::status::render_status;

/// Context type for bot commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

/// Check whether the game server is online.
#[poise::command(slash_command)]
pub async fn status(ctx: Context<'_>) -> Result<()> {
    ctx.defer().await?;

    let dispatcher = &ctx.data().dispatcher;
    let snapshot = dispatcher.status_source().check_status().await;

    ctx.say(render_status(&snapshot, dispatcher.details()))
        .await?;
    Ok(())
}

/// Get available slash commands.
#[must_use]
pub fn bot_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![status()]
}
