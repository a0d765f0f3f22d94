use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::catalog::LessonCatalog;
use super::locks::UserLocks;
use super::reply::ReplyContent;
use super::scheduler::Scheduler;
use super::texts;
use crate::models::{ResponseRecord, UserProgress};
use crate::storage::{ProgressStore, ResponseLog};
use crate::transport::Transport;

/// Пауза между ответом на урок и отправкой следующего.
pub const NEXT_LESSON_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Отправлен финальный урок, курс отмечен завершённым.
    Completed,
    Skipped,
    SendFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Ignored,
    Paused,
    Advanced { next_lesson: usize },
    Finished,
}

/// Машина состояний прохождения курса.
///
/// Все операции одного пользователя выполняются под его мьютексом, поэтому
/// быстрые повторные ответы не гоняются за `current_lesson`. Ошибки
/// хранилища и отправки пишутся в лог и не прерывают диалог.
pub struct CourseEngine {
    catalog: LessonCatalog,
    store: Arc<dyn ProgressStore>,
    responses: Arc<dyn ResponseLog>,
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    locks: UserLocks,
    empty_catalog_warned: AtomicBool,
}

impl CourseEngine {
    pub fn new(
        catalog: LessonCatalog,
        store: Arc<dyn ProgressStore>,
        responses: Arc<dyn ResponseLog>,
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            catalog,
            store,
            responses,
            transport,
            scheduler,
            locks: UserLocks::new(),
            empty_catalog_warned: AtomicBool::new(false),
        }
    }

    pub fn locks(&self) -> &UserLocks {
        &self.locks
    }

    /// /start: создаёт запись или сбрасывает прогресс на начало.
    pub async fn start(&self, user_id: &str, display_name: &str) {
        let _guard = self.locks.acquire(user_id).await;
        log::info!("Received /start from user {}", user_id);

        let progress = match self.load(user_id).await {
            Some(mut existing) => {
                existing.restart(display_name);
                existing
            }
            None => UserProgress::new(user_id, display_name),
        };
        if self.save(&progress).await {
            log::info!("👤 User {} saved at lesson 0", user_id);
        }

        if let Err(e) = self
            .transport
            .send_menu(user_id, texts::WELCOME, &[texts::BEGIN_COURSE_BUTTON])
            .await
        {
            log::error!("❌ Error sending welcome to user {}: {}", user_id, e);
        }
    }

    /// Кнопка «Начать курс».
    pub async fn begin_course(&self, user_id: &str) {
        let _guard = self.locks.acquire(user_id).await;

        let Some(mut progress) = self.load(user_id).await else {
            self.notify(user_id, texts::PLEASE_START).await;
            return;
        };
        if progress.paused {
            self.notify(user_id, texts::PAUSED).await;
            return;
        }

        progress.last_lesson_sent = Some(Utc::now());
        self.save(&progress).await;

        self.deliver_locked(user_id, 0).await;
    }

    pub async fn deliver_lesson(&self, user_id: &str, index: usize) -> Delivery {
        let _guard = self.locks.acquire(user_id).await;
        self.deliver_locked(user_id, index).await
    }

    pub async fn handle_reply(&self, user_id: &str, display_name: &str, content: ReplyContent) -> ReplyOutcome {
        let _guard = self.locks.acquire(user_id).await;

        let Some(mut progress) = self.load(user_id).await else {
            return ReplyOutcome::Ignored;
        };
        let index = progress.current_lesson;
        let Some(lesson) = self.catalog.get(index) else {
            log::debug!("Reply from user {} past the last lesson ignored", user_id);
            return ReplyOutcome::Ignored;
        };

        let response_text = content.log_text();
        log::info!("Reply from {}: {}", user_id, response_text);

        let now = Utc::now();
        let record = ResponseRecord {
            timestamp: now,
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            lesson_index: index,
            lesson_title: lesson.title.clone(),
            response_text,
            response_type: content.response_type(),
        };
        if let Err(e) = self.responses.append(&record).await {
            log::error!("❌ Error saving response of user {}: {}", user_id, e);
        }

        if progress.paused {
            self.notify(user_id, texts::PAUSED).await;
            return ReplyOutcome::Paused;
        }

        if lesson.is_final {
            self.notify(user_id, texts::FINAL_THANKS).await;
            return ReplyOutcome::Finished;
        }

        let next_lesson = index + 1;
        progress.current_lesson = next_lesson;
        progress.last_lesson_sent = Some(now);
        self.save(&progress).await;

        match self.scheduler.schedule(NEXT_LESSON_DELAY, user_id, next_lesson) {
            Ok(()) => self.notify(user_id, texts::NEXT_LESSON_SOON).await,
            Err(e) => {
                log::error!("❌ Error arming timer for user {}: {}", user_id, e);
                self.notify(user_id, texts::GENERIC_ERROR).await;
            }
        }

        ReplyOutcome::Advanced { next_lesson }
    }

    pub async fn pause(&self, user_id: &str) {
        let _guard = self.locks.acquire(user_id).await;

        let Some(mut progress) = self.load(user_id).await else {
            self.notify(user_id, texts::START_FIRST).await;
            return;
        };

        progress.paused = true;
        self.save(&progress).await;
        log::info!("⏸ User {} paused at lesson {}", user_id, progress.current_lesson);
        self.notify(user_id, texts::PAUSED).await;
    }

    /// Снимает паузу и повторно отправляет текущий урок, не продвигаясь
    /// вперёд.
    pub async fn resume(&self, user_id: &str) {
        let _guard = self.locks.acquire(user_id).await;

        let Some(mut progress) = self.load(user_id).await else {
            self.notify(user_id, texts::START_FIRST).await;
            return;
        };

        progress.paused = false;
        self.save(&progress).await;
        log::info!("▶️ User {} resumed at lesson {}", user_id, progress.current_lesson);
        self.notify(user_id, texts::RESUMED).await;

        if progress.completed {
            self.notify(user_id, texts::ALREADY_COMPLETED).await;
            return;
        }

        self.deliver_locked(user_id, progress.current_lesson).await;
    }

    async fn deliver_locked(&self, user_id: &str, index: usize) -> Delivery {
        if self.catalog.is_empty() {
            if !self.empty_catalog_warned.swap(true, Ordering::Relaxed) {
                log::warn!("❌ Lesson catalog is empty, nothing to deliver");
            }
            return Delivery::Skipped;
        }

        let Some(lesson) = self.catalog.get(index) else {
            log::debug!("Lesson {} does not exist, delivery to {} skipped", index, user_id);
            return Delivery::Skipped;
        };
        let Some(mut progress) = self.load(user_id).await else {
            return Delivery::Skipped;
        };
        if progress.paused {
            log::debug!("User {} is paused, lesson {} not sent", user_id, index);
            return Delivery::Skipped;
        }

        progress.current_lesson = index;
        self.save(&progress).await;

        if let Err(e) = self.transport.send_text(user_id, &lesson.message_text()).await {
            log::error!("❌ Error sending lesson {} to user {}: {}", index, user_id, e);
            return Delivery::SendFailed;
        }
        log::info!("📖 Lesson {} sent to user {}", index, user_id);

        if lesson.is_final {
            progress.completed = true;
            self.save(&progress).await;
            log::info!("🎓 User {} completed the course", user_id);
            return Delivery::Completed;
        }

        Delivery::Sent
    }

    // Ошибка чтения равносильна отсутствию записи
    async fn load(&self, user_id: &str) -> Option<UserProgress> {
        match self.store.get(user_id).await {
            Ok(progress) => progress,
            Err(e) => {
                log::error!("Error loading progress of user {}: {}", user_id, e);
                None
            }
        }
    }

    async fn save(&self, progress: &UserProgress) -> bool {
        match self.store.put(progress).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("❌ Error saving progress of user {}: {}", progress.user_id, e);
                false
            }
        }
    }

    async fn notify(&self, user_id: &str, text: &str) {
        if let Err(e) = self.transport.send_text(user_id, text).await {
            log::error!("Error sending message to user {}: {}", user_id, e);
        }
    }
}
