use teloxide::types::Message;

use crate::course::ReplyContent;

/// Ключ пользователя. В личном чате id чата совпадает с id пользователя.
pub fn user_id(msg: &Message) -> String {
    msg.chat.id.0.to_string()
}

pub fn display_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .and_then(|user| user.username.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn reply_content(msg: &Message) -> Option<ReplyContent> {
    ReplyContent::classify(
        msg.text(),
        msg.photo().is_some(),
        msg.voice().is_some(),
        msg.document().map(|doc| doc.file_name.as_deref()),
    )
}
