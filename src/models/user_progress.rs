use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Прогресс одного пользователя по курсу.
///
/// `current_lesson` указывает на урок, ответ на который ожидается, либо
/// равен длине каталога, когда уроков больше нет.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub display_name: String,
    pub current_lesson: usize,
    pub paused: bool,
    pub last_lesson_sent: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl UserProgress {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            current_lesson: 0,
            paused: false,
            last_lesson_sent: None,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Сброс на начало курса, как при повторном /start.
    pub fn restart(&mut self, display_name: &str) {
        self.display_name = display_name.to_string();
        self.current_lesson = 0;
        self.paused = false;
        self.last_lesson_sent = None;
        self.completed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_keeps_creation_time() {
        let mut progress = UserProgress::new("42", "anna");
        let created = progress.created_at;
        progress.current_lesson = 3;
        progress.completed = true;
        progress.paused = true;
        progress.last_lesson_sent = Some(Utc::now());

        progress.restart("anna_new");

        assert_eq!(progress.current_lesson, 0);
        assert!(!progress.completed);
        assert!(!progress.paused);
        assert!(progress.last_lesson_sent.is_none());
        assert_eq!(progress.display_name, "anna_new");
        assert_eq!(progress.created_at, created);
    }
}
