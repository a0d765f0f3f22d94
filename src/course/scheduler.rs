//! Отложенная доставка следующего урока.
//!
//! Каждая запланированная доставка живёт в отдельной задаче tokio, которая
//! спит заданное время и кладёт `ScheduledDelivery` в очередь. Воркер
//! разбирает очередь и запускает каждую доставку в своей задаче, так что
//! медленная доставка одному пользователю не задерживает остальных.
//! Отмены и объединения нет; при перезапуске процесса ожидающие доставки
//! теряются, и пользователь продолжает курс через /resume.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use super::engine::CourseEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDelivery {
    pub user_id: String,
    pub lesson_index: usize,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("delivery worker is not running")]
    Closed,
}

pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, user_id: &str, lesson_index: usize) -> Result<(), SchedulerError>;
}

pub struct DelayQueue {
    tx: mpsc::UnboundedSender<ScheduledDelivery>,
}

impl DelayQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScheduledDelivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Scheduler for DelayQueue {
    fn schedule(&self, delay: Duration, user_id: &str, lesson_index: usize) -> Result<(), SchedulerError> {
        if self.tx.is_closed() {
            return Err(SchedulerError::Closed);
        }

        let tx = self.tx.clone();
        let delivery = ScheduledDelivery {
            user_id: user_id.to_string(),
            lesson_index,
        };
        log::info!(
            "⏰ Lesson {} for user {} scheduled in {:?}",
            lesson_index,
            user_id,
            delay
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(delivery).is_err() {
                log::warn!("Delivery worker stopped, scheduled lesson dropped");
            }
        });

        Ok(())
    }
}

/// Воркер доставки: работает, пока жив хотя бы один отправитель. Порядок
/// операций одного пользователя обеспечивают мьютексы движка.
pub async fn run_delivery_worker(
    engine: Arc<CourseEngine>,
    mut rx: mpsc::UnboundedReceiver<ScheduledDelivery>,
) {
    while let Some(delivery) = rx.recv().await {
        log::debug!(
            "📬 Scheduled delivery of lesson {} to user {}",
            delivery.lesson_index,
            delivery.user_id
        );
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .deliver_lesson(&delivery.user_id, delivery.lesson_index)
                .await;
        });
    }
    log::info!("Delivery worker finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delivery_arrives_after_delay() {
        let (queue, mut rx) = DelayQueue::new();
        queue.schedule(Duration::from_secs(5), "7", 2).unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(rx.try_recv().is_err());

        let delivery = rx.recv().await.unwrap();
        assert_eq!(
            delivery,
            ScheduledDelivery {
                user_id: "7".to_string(),
                lesson_index: 2
            }
        );
    }

    #[tokio::test]
    async fn arming_fails_without_worker() {
        let (queue, rx) = DelayQueue::new();
        drop(rx);
        assert!(matches!(
            queue.schedule(Duration::from_secs(1), "7", 1),
            Err(SchedulerError::Closed)
        ));
    }
}
