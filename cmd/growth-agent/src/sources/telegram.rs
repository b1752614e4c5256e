use super::{CountSource, SourceError};
use teloxide::{Bot, prelude::Requester, types::ChatId};

/// Member count of a Telegram group or channel the bot belongs to.
#[derive(Clone)]
pub struct TelegramMembers {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramMembers {
    pub fn new(bot_token: String, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(bot_token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait::async_trait]
impl CountSource for TelegramMembers {
    async fn fetch_count(&self) -> Result<u64, SourceError> {
        let count = self.bot.get_chat_member_count(self.chat_id).await?;
        Ok(u64::from(count))
    }
}
