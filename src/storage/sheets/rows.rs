use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::{ResponseRecord, UserProgress};
use crate::storage::StoreError;

// Порядок колонок совпадает с USERS_HEADER / RESPONSES_HEADER
const COL_USER_ID: usize = 0;
const COL_USERNAME: usize = 1;
const COL_CURRENT_LESSON: usize = 2;
const COL_PAUSED: usize = 3;
const COL_LAST_LESSON_SENT: usize = 4;
const COL_COMPLETED: usize = 5;
const COL_CREATED_AT: usize = 6;

pub fn progress_to_row(progress: &UserProgress) -> Vec<String> {
    vec![
        progress.user_id.clone(),
        progress.display_name.clone(),
        progress.current_lesson.to_string(),
        format_bool(progress.paused),
        progress
            .last_lesson_sent
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default(),
        format_bool(progress.completed),
        progress.created_at.to_rfc3339(),
    ]
}

/// Разбор строки листа пользователей. API не возвращает пустые ячейки в
/// конце строки, поэтому недостающие колонки считаются пустыми.
pub fn progress_from_row(row: &[String]) -> Result<UserProgress, StoreError> {
    let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");
    let user_id = cell(COL_USER_ID).to_string();

    let current_lesson = match cell(COL_CURRENT_LESSON) {
        "" => 0,
        raw => raw.parse::<usize>().map_err(|_| StoreError::Malformed {
            user_id: user_id.clone(),
            reason: format!("current_lesson is not a lesson index: {:?}", raw),
        })?,
    };

    // Пустое время создания заполняется текущим, нераспознанное не
    // перезаписывается молча
    let created_at = match cell(COL_CREATED_AT) {
        "" | "None" => {
            log::warn!("⚠️ User {} has no created_at, using current time", user_id);
            Utc::now()
        }
        raw => parse_timestamp(raw).ok_or_else(|| StoreError::Malformed {
            user_id: user_id.clone(),
            reason: format!("created_at is not a timestamp: {:?}", raw),
        })?,
    };

    Ok(UserProgress {
        display_name: cell(COL_USERNAME).to_string(),
        current_lesson,
        paused: parse_bool(cell(COL_PAUSED)),
        last_lesson_sent: parse_timestamp(cell(COL_LAST_LESSON_SENT)),
        completed: parse_bool(cell(COL_COMPLETED)),
        created_at,
        user_id,
    })
}

pub fn response_to_row(record: &ResponseRecord) -> Vec<String> {
    vec![
        record.timestamp.to_rfc3339(),
        record.user_id.clone(),
        record.display_name.clone(),
        record.lesson_index.to_string(),
        record.lesson_title.clone(),
        record.response_text.clone(),
        record.response_type.to_string(),
    ]
}

pub fn header_matches(found: &[String], expected: &[&str]) -> bool {
    found.len() == expected.len()
        && found
            .iter()
            .zip(expected)
            .all(|(f, e)| f.trim().eq_ignore_ascii_case(e))
}

fn format_bool(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// RFC 3339, либо ISO-время без зоны (считается UTC). Пустое значение и
/// `None` означают отсутствие времени.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() || raw == "None" {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
