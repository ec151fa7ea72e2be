//! Keyword to canned reply mapping.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::status::ServerDetails;

const DEFAULT_MESSAGE: &str =
    "Hi! Mention me with `status` to check the game server, or `help` to see what I can do.";

/// On-disk shape of a commands file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandsFile {
    pub default_message: String,
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
}

/// Read-only command table consulted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    responses: BTreeMap<String, String>,
    default_message: String,
}

impl CommandTable {
    /// Build a table; keys are lower-cased and trimmed.
    #[must_use]
    pub fn new(
        default_message: impl Into<String>,
        responses: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(key, reply)| (key.trim().to_lowercase(), reply))
                .collect(),
            default_message: default_message.into(),
        }
    }

    /// Parse a JSON commands file.
    ///
    /// # Errors
    ///
    /// Returns `Json` if the document does not match [`CommandsFile`].
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CommandsFile = serde_json::from_str(json)?;
        Ok(Self::new(file.default_message, file.commands))
    }

    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.responses.get(keyword).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        self.responses.contains_key(keyword)
    }

    #[must_use]
    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.responses.keys().map(String::as_str)
    }
}

/// Table generated from the server's display metadata.
///
/// Used when no commands file is configured.
#[must_use]
pub fn builtin_command_table(details: &ServerDetails) -> CommandTable {
    let mut responses = BTreeMap::new();

    if let Some(world) = &details.world {
        responses.insert("world".to_string(), format!("🌍 World: **{world}**"));
    }
    if let Some(password) = &details.password {
        responses.insert(
            "password".to_string(),
            format!("🔑 Server password: `{password}`"),
        );
    }
    if !details.mods.is_empty() {
        let list = details
            .mods
            .iter()
            .map(|m| format!("- {m}"))
            .collect::<Vec<_>>()
            .join("\n");
        responses.insert("mods".to_string(), format!("🧩 Installed mods:\n{list}"));
    }
    responses.insert(
        "status".to_string(),
        format!("Unable to check {} right now. Please try again later.", details.name),
    );

    let mut keywords: Vec<&str> = responses.keys().map(String::as_str).collect();
    keywords.push("help");
    keywords.sort_unstable();
    let help = format!(
        "**{} bot commands** (mention me, then a command):\n{}",
        details.name,
        keywords
            .iter()
            .map(|k| format!("- `{k}`"))
            .collect::<Vec<_>>()
            .join("\n")
    );
    responses.insert("help".to_string(), help);

    CommandTable::new(DEFAULT_MESSAGE, responses)
}
