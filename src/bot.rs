//! Discord transport: framework setup, mention filtering and reply delivery.

use log::{debug, error, info};
use poise::{
    Framework, FrameworkError, FrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents, Message, MessageType},
};

use crate::commands::bot_commands;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{BotError, Result};
use crate::probe::Prober;

pub struct Data {
    pub dispatcher: Dispatcher<Prober>,
    pub auto_responses_enabled: bool,
}

/// Facts about an incoming message needed to decide whether to answer it.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageMeta {
    pub author_is_bot: bool,
    pub from_webhook: bool,
    pub is_system: bool,
    pub mentions_bot: bool,
}

impl MessageMeta {
    fn of(message: &Message, bot_user_id: u64) -> Self {
        Self {
            author_is_bot: message.author.bot,
            from_webhook: message.webhook_id.is_some(),
            is_system: !matches!(message.kind, MessageType::Regular | MessageType::InlineReply),
            mentions_bot: message.mentions_user_id(bot_user_id),
        }
    }
}

/// Only human messages that explicitly mention the bot get a reply.
#[must_use]
pub fn should_dispatch(meta: MessageMeta, auto_responses_enabled: bool) -> bool {
    auto_responses_enabled
        && meta.mentions_bot
        && !meta.author_is_bot
        && !meta.from_webhook
        && !meta.is_system
}

/// Run the Discord bot until the gateway closes or Ctrl-C is received.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, or if the Discord
/// client fails to start.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;
    let table = config.command_table()?;
    let prober = Prober::new(config.process_name.clone(), config.server.port);
    let details = config.server.clone();
    let auto_responses_enabled = config.auto_responses_enabled;

    if !auto_responses_enabled {
        info!("Auto responses are disabled; mentions will be ignored");
    }

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: bot_commands(),
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord as {}", ready.user.name);
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(Data {
                    dispatcher: Dispatcher::new(ready.user.id.get(), table, details, prober),
                    auto_responses_enabled,
                })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> Result<()> {
    let FullEvent::Message { new_message } = event else {
        return Ok(());
    };

    let bot_user_id = ctx.cache.current_user().id.get();
    if !should_dispatch(
        MessageMeta::of(new_message, bot_user_id),
        data.auto_responses_enabled,
    ) {
        return Ok(());
    }

    info!(
        "Received mention from {} in channel {}: {}",
        new_message.author.tag(),
        new_message.channel_id,
        new_message.content
    );

    if let Err(e) = new_message.channel_id.broadcast_typing(&ctx.http).await {
        debug!("Failed to broadcast typing indicator: {e}");
    }

    let reply = data.dispatcher.handle_mention(&new_message.content).await;

    match new_message.reply(&ctx.http, &reply).await {
        Ok(_) => info!(
            "Replied to {} in channel {}",
            new_message.author.tag(),
            new_message.channel_id
        ),
        Err(e) => error!(
            "Failed to deliver reply to {} in channel {}: {}",
            new_message.author.tag(),
            new_message.channel_id,
            e
        ),
    }

    Ok(())
}

async fn on_error(error: FrameworkError<'_, Data, BotError>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            error!("Command '{}' failed: {}", ctx.command().name, error);
            if let Err(e) = ctx.say(error.user_message()).await {
                error!("Failed to report command error: {e}");
            }
        }
        other => {
            if let Err(e) = builtins::on_error(other).await {
                error!("Error while handling framework error: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human_mention() -> MessageMeta {
        MessageMeta {
            author_is_bot: false,
            from_webhook: false,
            is_system: false,
            mentions_bot: true,
        }
    }

    #[test]
    fn human_mention_is_dispatched() {
        assert!(should_dispatch(human_mention(), true));
    }

    #[test]
    fn disabled_feature_never_dispatches() {
        assert!(!should_dispatch(human_mention(), false));
    }

    #[test]
    fn silent_without_mention() {
        let meta = MessageMeta {
            mentions_bot: false,
            ..human_mention()
        };
        assert!(!should_dispatch(meta, true));
    }

    #[test]
    fn ignores_bots_webhooks_and_system_messages() {
        for meta in [
            MessageMeta {
                author_is_bot: true,
                ..human_mention()
            },
            MessageMeta {
                from_webhook: true,
                ..human_mention()
            },
            MessageMeta {
                is_system: true,
                ..human_mention()
            },
        ] {
            assert!(!should_dispatch(meta, true), "{meta:?}");
        }
    }
}
