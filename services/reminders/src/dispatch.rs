//! services/reminders/src/dispatch.rs
//!
//! The background job that polls for due reminders and hands them to the
//! notification service.

use crate::lifecycle::ReminderService;
use chrono::Local;
use practice_reminders_core::ports::NotificationService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Runs `dispatch_due` every `interval` until `cancellation_token` is cancelled.
///
/// A failed poll is logged and the loop carries on with the next tick.
pub async fn run_dispatch_loop(
    service: Arc<ReminderService>,
    notifier: Arc<dyn NotificationService>,
    interval: Duration,
    cancellation_token: CancellationToken,
) {
    info!("Reminder dispatch started (interval: {:?})", interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Reminder dispatch cancelled.");
                return;
            }
            _ = ticker.tick() => {
                let now = Local::now().naive_local();
                if let Err(e) = service.dispatch_due(notifier.as_ref(), now).await {
                    error!("Reminder dispatch failed: {:?}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use practice_reminders_core::domain::{Frequency, NewReminder, Owner, Reminder, ReminderType};
    use practice_reminders_core::ports::PortResult;
    use tokio::sync::mpsc;

    struct ChannelNotifier {
        tx: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl NotificationService for ChannelNotifier {
        async fn send_reminder(&self, reminder: &Reminder) -> PortResult<()> {
            let _ = self.tx.send(reminder.title.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_loop_dispatches_then_stops_on_cancel() {
        let service = Arc::new(ReminderService::new(Arc::new(MemoryStore::new())));
        // Created a day ago with every hour preferred, so it is already due.
        let created_at = Local::now().naive_local() - ChronoDuration::days(1);
        service
            .create(
                NewReminder {
                    owner: Owner::Session("s-1".to_string()),
                    title: "Breathe".to_string(),
                    description: String::new(),
                    reminder_type: ReminderType::Technique,
                    frequency: Frequency::Daily,
                    time_preferences: Some((0..24).collect()),
                    days_of_week: None,
                    linked_content_id: None,
                },
                created_at,
            )
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_dispatch_loop(
            service.clone(),
            Arc::new(ChannelNotifier { tx }),
            Duration::from_millis(10),
            token.clone(),
        ));

        let title = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(title.as_deref(), Some("Breathe"));

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
