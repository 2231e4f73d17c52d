//! ReaperLoop - 完了済み task の定期回収
//!
//! # フロー
//! 1. `interval` ごとに TaskManager::evict_completed(ttl) を呼ぶ
//! 2. 回収があれば件数と残りの集計を info で出す
//! 3. shutdown 要求（watch channel）で抜ける
//!
//! Running の task には触らない。

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::app::task_manager::TaskManager;

/// Handle of the background eviction loop.
/// - `request_shutdown()` で次の tick を待たずに止まる
/// - handle を drop しても loop は止まる（sender が消えるため）
pub struct Reaper {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl Reaper {
    pub fn spawn(manager: TaskManager, ttl: Duration, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(reaper_loop(manager, ttl, interval, shutdown_rx));
        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn reaper_loop(
    manager: TaskManager,
    ttl: Duration,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let evicted = manager.evict_completed(ttl).await;
        if evicted > 0 {
            let counts = manager.counts().await;
            info!(
                evicted,
                total = counts.total(),
                running = counts.running,
                completed = counts.completed,
                failed = counts.failed,
                "evicted completed tasks"
            );
        }
    }
    debug!("reaper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entity, PollResult, Term};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[tokio::test]
    async fn evicts_expired_tasks_and_stops_on_request() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let manager = TaskManager::new(clock.clone());
        let id = manager
            .submit(Entity::new(Term::blank("x")), |input| async move {
                Ok(input.into_graph())
            })
            .await;

        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.poll(&id).await.is_pending() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        clock.advance(chrono::Duration::seconds(120));
        let reaper = Reaper::spawn(manager.clone(), Duration::from_secs(60), Duration::from_millis(10));

        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.poll(&id).await != PollResult::NotFound {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        tokio::time::timeout(Duration::from_secs(5), reaper.shutdown_and_join())
            .await
            .unwrap();
    }
}
