//! Per-user async locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// One async mutex per chat user, created on demand.
///
/// Holding a user's guard across an await serializes that user's
/// transitions while other users proceed. Entries are dropped once no
/// guard or waiter references them.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a user's state.
    pub async fn lock(&self, user_id: &str) -> UserGuard {
        let mutex = self.map().entry(user_id.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;

        UserGuard {
            locks: self.clone(),
            user_id: user_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of users with a live lock entry.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        // Nothing panics while holding this lock, so poisoning carries no state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn release(&self, user_id: &str) {
        let mut map = self.map();
        if map
            .get(user_id)
            .map(|m| Arc::strong_count(m) == 1)
            .unwrap_or(false)
        {
            map.remove(user_id);
        }
    }
}

/// Exclusive access to one user's state; released on drop.
pub struct UserGuard {
    locks: UserLocks,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.user_id);
    }
}
