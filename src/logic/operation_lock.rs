// One schedule-changing operation per tournament at a time.
// The engine never takes these itself, the host does before generating or clearing.
use std::{collections::HashMap, sync::{Arc, Mutex}, time::Duration};

use log::warn;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::logic::{error::{EngineError, EngineResult}, types::TournamentId};

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct TournamentLocks {
    locks: Mutex<HashMap<TournamentId, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

impl Default for TournamentLocks {
    fn default() -> Self {
        Self::build(DEFAULT_TIMEOUT)
    }
}

impl TournamentLocks {
    pub fn build(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn lock_for(&self, tournament_id: &str) -> Arc<AsyncMutex<()>> {
        // Each map update is a single step, so a poisoned guard is still usable.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());

        // Guards and waiters hold their own handle. A lone handle means the lock is idle.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        return locks.entry(tournament_id.to_string()).or_default().clone();
    }

    // Wait briefly for the tournament's lock.
    // Fail with Busy if another operation still holds it.
    pub async fn acquire(&self, tournament_id: &str) -> EngineResult<OwnedMutexGuard<()>> {
        let lock = self.lock_for(tournament_id);

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!("Tournament {tournament_id} is busy with another schedule operation");
                Err(EngineError::Busy(tournament_id.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_is_busy() {
        let locks = TournamentLocks::default();
        let _guard = locks.acquire("cup").await.unwrap();

        let result = locks.acquire("cup").await;
        assert!(matches!(result, Err(EngineError::Busy(id)) if id == "cup"));
    }

    #[tokio::test]
    async fn tournaments_do_not_block_each_other() {
        let locks = TournamentLocks::default();
        let _cup = locks.acquire("cup").await.unwrap();
        assert!(locks.acquire("league").await.is_ok());
    }

    #[tokio::test]
    async fn released_on_drop() {
        let locks = TournamentLocks::default();
        {
            let _guard = locks.acquire("cup").await.unwrap();
        }
        assert!(locks.acquire("cup").await.is_ok());
    }

    #[tokio::test]
    async fn idle_locks_are_dropped() {
        let locks = TournamentLocks::default();
        let held = locks.acquire("cup").await.unwrap();
        {
            let _guard = locks.acquire("league").await.unwrap();
        }

        // Taking any lock clears the ones nobody holds.
        let _friendly = locks.acquire("friendly").await.unwrap();
        let mut tracked: Vec<String> = locks.locks.lock().unwrap().keys().cloned().collect();
        tracked.sort();
        assert_eq!(tracked, vec!["cup".to_string(), "friendly".to_string()]);

        drop(held);
        assert!(locks.acquire("cup").await.is_ok());
    }

    #[tokio::test]
    async fn waits_for_a_short_holder() {
        let locks = Arc::new(TournamentLocks::build(Duration::from_secs(2)));
        let guard = locks.acquire("cup").await.unwrap();

        let holder = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(guard);
        });

        assert!(locks.acquire("cup").await.is_ok());
        holder.await.unwrap();
    }
}
