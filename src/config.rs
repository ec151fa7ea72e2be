use std::env;
use std::fs;
use std::path::PathBuf;

use log::{debug, error, info};

use crate::dispatch::{CommandTable, builtin_command_table};
use crate::error::{BotError, Result};
use crate::status::ServerDetails;

const DEFAULT_SERVER_NAME: &str = "Game server";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub process_name: String,
    pub auto_responses_enabled: bool,
    pub commands_file: Option<PathBuf>,
    pub server: ServerDetails,
}

impl Config {
    /// Read the configuration from the process environment and `.env`.
    ///
    /// # Errors
    ///
    /// Returns `EnvVar` when a required variable is missing and `Config` when
    /// a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = required("DISCORD_TOKEN")?;
        let process_name = required("GAME_PROCESS_NAME")?;
        let port = parse_port(&required("GAME_PORT")?)?;

        let auto_responses_enabled = parse_flag(optional("AUTO_RESPONSES_ENABLED"), true)?;
        let commands_file = optional("COMMANDS_FILE").map(PathBuf::from);

        let server = ServerDetails {
            name: optional("SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            port,
            world: optional("SERVER_WORLD"),
            password: optional("SERVER_PASSWORD"),
            mods: parse_list(optional("SERVER_MODS")),
        };

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("Watching process '{}' on port {}", process_name, server.port);
        debug!("Auto responses enabled: {auto_responses_enabled}");

        Ok(Self {
            discord_token,
            process_name,
            auto_responses_enabled,
            commands_file,
            server,
        })
    }

    /// Load the commands file if configured, otherwise build the default table.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Json` if it is malformed.
    pub fn command_table(&self) -> Result<CommandTable> {
        let Some(path) = &self.commands_file else {
            debug!("No COMMANDS_FILE set, using built-in command table");
            return Ok(builtin_command_table(&self.server));
        };

        let json = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read commands file {}: {}", path.display(), e);
            e
        })?;
        let table = CommandTable::from_json(&json)?;
        info!(
            "Loaded {} command(s) from {}",
            table.keywords().count(),
            path.display()
        );
        Ok(table)
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|e| {
        error!("Failed to load {key} from environment: {e}");
        e.into()
    })
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|e| BotError::Config(format!("GAME_PORT '{value}' is not a valid port: {e}")))
}

fn parse_flag(value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(BotError::Config(format!("'{other}' is not a boolean flag"))),
    }
}

fn parse_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
