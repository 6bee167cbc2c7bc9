//! Live dashboard state and event fan-out

use crash_types::{DashboardEvent, LiveStatus};
use tokio::sync::{broadcast, RwLock};

/// Current script status and balance, plus the channel dashboards listen on
#[derive(Debug)]
pub struct LiveContext {
    status: RwLock<LiveStatus>,
    event_tx: broadcast::Sender<DashboardEvent>,
}

impl LiveContext {
    /// Create a context whose broadcast channel holds `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            status: RwLock::new(LiveStatus::default()),
            event_tx,
        }
    }

    /// Copy of the current live status
    pub async fn snapshot(&self) -> LiveStatus {
        self.status.read().await.clone()
    }

    /// Mutate the live status and return the result
    pub async fn update<F>(&self, f: F) -> LiveStatus
    where
        F: FnOnce(&mut LiveStatus),
    {
        let mut status = self.status.write().await;
        f(&mut status);
        status.clone()
    }

    /// Broadcast an event to every connected dashboard.
    ///
    /// Having no subscribers is not an error.
    pub fn publish(&self, event: DashboardEvent) {
        let name = event.name();
        match self.event_tx.send(event) {
            Ok(receivers) => tracing::debug!(event = name, receivers, "dashboard event published"),
            Err(_) => tracing::trace!(event = name, "no dashboard listening"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.event_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_types::ScriptStatus;

    #[tokio::test]
    async fn test_update_and_snapshot() {
        let live = LiveContext::new(8);
        assert!(!live.snapshot().await.script_status.is_running);

        let updated = live
            .update(|s| {
                s.script_status = ScriptStatus::running();
                s.balance = 250.0;
            })
            .await;
        assert!(updated.script_status.is_running);
        assert_eq!(live.snapshot().await.balance, 250.0);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let live = LiveContext::new(8);
        live.publish(DashboardEvent::BalanceUpdated { balance: 1.0 });
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let live = LiveContext::new(8);
        let mut rx = live.subscribe();

        live.publish(DashboardEvent::BalanceUpdated { balance: 1.0 });
        live.publish(DashboardEvent::ScriptStopped {
            status: ScriptStatus::stopped("done"),
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            DashboardEvent::BalanceUpdated { balance: 1.0 }
        );
        assert_eq!(rx.recv().await.unwrap().name(), "script_stopped");
    }
}
