use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub is_final: bool,
}

impl Lesson {
    /// Текст сообщения, которое уходит пользователю.
    pub fn message_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.text)
    }
}
