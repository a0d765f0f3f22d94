use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, ReplyMarkup};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid chat id: {0}")]
    InvalidChatId(String),
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
}

/// Исходящая сторона мессенджера.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, user_id: &str, text: &str) -> Result<(), TransportError>;

    /// Сообщение с одноразовой клавиатурой из кнопок, по одной в ряд.
    async fn send_menu(&self, user_id: &str, text: &str, buttons: &[&str]) -> Result<(), TransportError>;
}

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

// В личном чате id чата совпадает с id пользователя
fn chat_id(user_id: &str) -> Result<ChatId, TransportError> {
    user_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| TransportError::InvalidChatId(user_id.to_string()))
}

pub fn menu_keyboard(buttons: &[&str]) -> ReplyMarkup {
    let rows = buttons
        .iter()
        .map(|label| vec![KeyboardButton::new(*label)])
        .collect::<Vec<_>>();

    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard())
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, user_id: &str, text: &str) -> Result<(), TransportError> {
        self.bot.send_message(chat_id(user_id)?, text).await?;
        Ok(())
    }

    async fn send_menu(&self, user_id: &str, text: &str, buttons: &[&str]) -> Result<(), TransportError> {
        self.bot
            .send_message(chat_id(user_id)?, text)
            .reply_markup(menu_keyboard(buttons))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_id_parses_numeric_user_ids() {
        assert_eq!(chat_id("123456789").unwrap(), ChatId(123456789));
        assert!(matches!(chat_id("abc"), Err(TransportError::InvalidChatId(_))));
    }

    #[test]
    fn menu_has_one_button_per_row() {
        match menu_keyboard(&["Начать курс", "Помощь"]) {
            ReplyMarkup::Keyboard(markup) => {
                assert_eq!(markup.keyboard.len(), 2);
                assert_eq!(markup.keyboard[0][0].text, "Начать курс");
            }
            other => panic!("unexpected markup: {:?}", other),
        }
    }
}
