//! Removal of the bot's own mention markup.

/// Remove every `<@id>` and `<@!id>` mention of `bot_user_id` from `text`.
///
/// Mentions are replaced by a space so adjacent words stay separate.
/// Mentions of other users are left untouched.
#[must_use]
pub fn strip_mentions(text: &str, bot_user_id: u64) -> String {
    let plain = format!("<@{bot_user_id}>");
    let nickname = format!("<@!{bot_user_id}>");
    text.replace(&plain, " ").replace(&nickname, " ")
}
