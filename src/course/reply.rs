use crate::models::ResponseType;

/// Содержимое ответа пользователя на урок.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContent {
    Text(String),
    Photo,
    Voice,
    Document { file_name: Option<String> },
}

impl ReplyContent {
    /// Определяет тип ответа по форме сообщения. Фото важнее подписи,
    /// сообщения без поддерживаемого содержимого дают `None`.
    pub fn classify(
        text: Option<&str>,
        has_photo: bool,
        has_voice: bool,
        document: Option<Option<&str>>,
    ) -> Option<Self> {
        if has_photo {
            Some(ReplyContent::Photo)
        } else if has_voice {
            Some(ReplyContent::Voice)
        } else if let Some(file_name) = document {
            Some(ReplyContent::Document {
                file_name: file_name.map(str::to_string),
            })
        } else {
            text.map(|t| ReplyContent::Text(t.to_string()))
        }
    }

    pub fn response_type(&self) -> ResponseType {
        match self {
            ReplyContent::Text(_) => ResponseType::Text,
            ReplyContent::Photo => ResponseType::Photo,
            ReplyContent::Voice => ResponseType::Voice,
            ReplyContent::Document { .. } => ResponseType::Document,
        }
    }

    /// Текст, который попадает в журнал ответов.
    pub fn log_text(&self) -> String {
        match self {
            ReplyContent::Text(text) => text.clone(),
            ReplyContent::Photo => "[ФОТО]".to_string(),
            ReplyContent::Voice => "[ГОЛОСОВОЕ СООБЩЕНИЕ]".to_string(),
            ReplyContent::Document { file_name } => {
                format!("[ДОКУМЕНТ: {}]", file_name.as_deref().unwrap_or("Документ"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_wins_over_caption() {
        let reply = ReplyContent::classify(Some("моя гостиная"), true, false, None).unwrap();
        assert_eq!(reply, ReplyContent::Photo);
        assert_eq!(reply.log_text(), "[ФОТО]");
        assert_eq!(reply.response_type(), ResponseType::Photo);
    }

    #[test]
    fn document_without_name_gets_placeholder() {
        let reply = ReplyContent::classify(None, false, false, Some(None)).unwrap();
        assert_eq!(reply.log_text(), "[ДОКУМЕНТ: Документ]");

        let named = ReplyContent::classify(None, false, false, Some(Some("plan.pdf"))).unwrap();
        assert_eq!(named.log_text(), "[ДОКУМЕНТ: plan.pdf]");
    }

    #[test]
    fn voice_and_text() {
        assert_eq!(
            ReplyContent::classify(None, false, true, None).unwrap().log_text(),
            "[ГОЛОСОВОЕ СООБЩЕНИЕ]"
        );
        let text = ReplyContent::classify(Some("светлые стены"), false, false, None).unwrap();
        assert_eq!(text.response_type(), ResponseType::Text);
        assert_eq!(text.log_text(), "светлые стены");
    }

    #[test]
    fn unsupported_message_is_not_a_reply() {
        assert!(ReplyContent::classify(None, false, false, None).is_none());
    }
}
