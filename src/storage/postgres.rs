use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

use super::{ProgressStore, ResponseLog, StoreError};
use crate::models::{ResponseRecord, UserProgress};

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        // Колонки повторяют листы таблицы
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS course_users (
                user_id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                current_lesson INTEGER NOT NULL DEFAULT 0,
                paused BOOLEAN NOT NULL DEFAULT false,
                last_lesson_sent TIMESTAMP WITH TIME ZONE,
                completed BOOLEAN NOT NULL DEFAULT false,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS course_responses (
                id BIGSERIAL PRIMARY KEY,
                timestamp TIMESTAMP WITH TIME ZONE NOT NULL,
                user_id TEXT NOT NULL,
                username TEXT NOT NULL,
                lesson_index INTEGER NOT NULL,
                lesson_title TEXT NOT NULL,
                response_text TEXT NOT NULL,
                response_type TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_course_responses_user_id ON course_responses (user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn progress_from_row(row: &PgRow) -> Result<UserProgress, StoreError> {
        let user_id: String = row.try_get("user_id")?;
        let current_lesson: i32 = row.try_get("current_lesson")?;
        let current_lesson = usize::try_from(current_lesson).map_err(|_| StoreError::Malformed {
            user_id: user_id.clone(),
            reason: format!("negative current_lesson {}", current_lesson),
        })?;

        Ok(UserProgress {
            display_name: row.try_get("username")?,
            current_lesson,
            paused: row.try_get("paused")?,
            last_lesson_sent: row.try_get::<Option<DateTime<Utc>>, _>("last_lesson_sent")?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
            user_id,
        })
    }
}

#[async_trait]
impl ProgressStore for Database {
    async fn get(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
        let row = sqlx::query(
            "SELECT user_id, username, current_lesson, paused, last_lesson_sent, completed, created_at
             FROM course_users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::progress_from_row).transpose()
    }

    async fn put(&self, progress: &UserProgress) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO course_users
            (user_id, username, current_lesson, paused, last_lesson_sent, completed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id)
            DO UPDATE SET
                username = EXCLUDED.username,
                current_lesson = EXCLUDED.current_lesson,
                paused = EXCLUDED.paused,
                last_lesson_sent = EXCLUDED.last_lesson_sent,
                completed = EXCLUDED.completed,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&progress.user_id)
        .bind(&progress.display_name)
        .bind(progress.current_lesson as i32)
        .bind(progress.paused)
        .bind(progress.last_lesson_sent)
        .bind(progress.completed)
        .bind(progress.created_at)
        .execute(&self.pool)
        .await?;

        log::debug!("💾 Progress saved for user {}", progress.user_id);
        Ok(())
    }
}

#[async_trait]
impl ResponseLog for Database {
    async fn append(&self, record: &ResponseRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO course_responses
            (timestamp, user_id, username, lesson_index, lesson_title, response_text, response_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.timestamp)
        .bind(&record.user_id)
        .bind(&record.display_name)
        .bind(record.lesson_index as i32)
        .bind(&record.lesson_title)
        .bind(&record.response_text)
        .bind(record.response_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
