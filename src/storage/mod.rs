pub mod memory;
pub mod postgres;
pub mod sheets;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ResponseRecord, UserProgress};

pub use memory::MemoryStore;
pub use postgres::Database;
pub use sheets::SheetsStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Authorization error: {0}")]
    Auth(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Malformed row for user {user_id}: {reason}")]
    Malformed { user_id: String, reason: String },
    #[error("Sheet '{sheet}' has unexpected header row: {found:?}")]
    Schema { sheet: String, found: Vec<String> },
    #[error("Spreadsheet '{0}' not found")]
    SpreadsheetNotFound(String),
}

/// Хранилище прогресса: одна запись на пользователя.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError>;
    async fn put(&self, progress: &UserProgress) -> Result<(), StoreError>;
}

/// Журнал ответов, только на добавление.
#[async_trait]
pub trait ResponseLog: Send + Sync {
    async fn append(&self, record: &ResponseRecord) -> Result<(), StoreError>;
}

pub const USERS_HEADER: [&str; 7] = [
    "user_id",
    "username",
    "current_lesson",
    "paused",
    "last_lesson_sent",
    "completed",
    "created_at",
];

pub const RESPONSES_HEADER: [&str; 7] = [
    "timestamp",
    "user_id",
    "username",
    "lesson_index",
    "lesson_title",
    "response_text",
    "response_type",
];
