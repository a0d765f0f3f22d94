use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

type LockMap = Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>;

/// Мьютекс на каждого пользователя: операции одного пользователя
/// выполняются строго по очереди в пределах процесса.
#[derive(Clone, Default)]
pub struct UserLocks {
    locks: LockMap,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(user_id).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => {
                let mut locks = self.locks.write().await;
                locks
                    .entry(user_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            }
        };
        lock.lock_owned().await
    }

    /// Убирает мьютексы, которые сейчас никто не держит.
    pub async fn cleanup(&self) {
        let mut locks = self.locks.write().await;
        let previous_count = locks.len();

        locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        log::debug!("🧹 User locks cleaned: {} -> {} entries", previous_count, locks.len());
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_user_is_serialized() {
        let locks = UserLocks::new();
        let guard = locks.acquire("1").await;

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = other.acquire("1").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_users_do_not_block() {
        let locks = UserLocks::new();
        let _first = locks.acquire("1").await;
        let _second = tokio::time::timeout(Duration::from_millis(100), locks.acquire("2"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cleanup_keeps_held_locks() {
        let locks = UserLocks::new();
        let held = locks.acquire("1").await;
        drop(locks.acquire("2").await);

        locks.cleanup().await;
        assert_eq!(locks.len().await, 1);

        drop(held);
        locks.cleanup().await;
        assert_eq!(locks.len().await, 0);
    }
}
