use serde::Deserialize;
use teloxide::types::ChatId;

#[derive(Deserialize, Clone)]
pub(crate) struct Config {
    pub(crate) token: String,

    /// The chat the bot takes bookmark and review requests from
    pub(crate) auth_chat_id: ChatId,

    /// Optional second authorized chat (e.g. the owner's "Saved Messages")
    #[serde(default)]
    pub(crate) personal_auth_chat_id: Option<ChatId>,
}

impl Config {
    pub(crate) fn is_authorized(&self, chat_id: ChatId) -> bool {
        chat_id == self.auth_chat_id || Some(chat_id) == self.personal_auth_chat_id
    }
}
