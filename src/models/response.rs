use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Photo,
    Voice,
    Document,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Text => "text",
            ResponseType::Photo => "photo",
            ResponseType::Voice => "voice",
            ResponseType::Document => "document",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Одна строка журнала ответов. Только добавляется, никогда не меняется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub display_name: String,
    pub lesson_index: usize,
    pub lesson_title: String,
    pub response_text: String,
    pub response_type: ResponseType,
}
