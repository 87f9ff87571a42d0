//! Command broker - the shared, synchronized front of the queue engine

use relayq_shared::{
    Clock, Command, CommandId, CommandQueue, CommandType, Completion, QueueConfig, QueueError,
    QueueStatus, Submitted, SweepReport,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owns the command queue and serializes every operation on it
///
/// Each method takes the lock once and runs the whole engine operation
/// under it, so check-then-insert, sweep-then-read and lookup-then-remove
/// are atomic with respect to each other.
#[derive(Debug)]
pub struct CommandBroker {
    queue: Mutex<CommandQueue>,
    clock: Arc<dyn Clock>,
}

impl CommandBroker {
    /// Create a new broker with an empty queue
    pub fn new(config: QueueConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            queue: Mutex::new(CommandQueue::new(config)),
            clock,
        }
    }

    /// Queue a command for a player
    pub async fn submit(
        &self,
        cmd_type: CommandType,
        player: &str,
        client_timestamp: i64,
    ) -> Result<Submitted, QueueError> {
        let mut queue = self.queue.lock().await;
        let now = self.clock.now_ms();

        match queue.submit(cmd_type, player, client_timestamp, now) {
            Ok(submitted) => {
                info!(
                    command_id = %submitted.id,
                    %cmd_type,
                    player,
                    position = submitted.position,
                    "Command queued"
                );
                Ok(submitted)
            }
            Err(e) => {
                warn!(%cmd_type, player, kind = e.kind(), "Command rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Oldest pending command, left in place until completed
    pub async fn poll(&self) -> Option<Command> {
        let mut queue = self.queue.lock().await;
        let now = self.clock.now_ms();

        let command = queue.poll(now);
        match &command {
            Some(cmd) => debug!(command_id = %cmd.id, player = %cmd.player, "Poll returned command"),
            None => debug!("Poll found queue empty"),
        }
        command
    }

    /// Acknowledge a polled command
    ///
    /// `error` is only logged; it never changes what happens to the queue.
    pub async fn complete(&self, id: &CommandId, success: bool, error: Option<&str>) -> Completion {
        let mut queue = self.queue.lock().await;
        let now = self.clock.now_ms();

        let completion = queue.complete(id, success, now);
        match &completion {
            Completion::Removed { command, success: true } => {
                info!(
                    command_id = %id,
                    player = %command.player,
                    elapsed_ms = command.age_ms(now),
                    "Command completed"
                );
            }
            Completion::Removed { command, success: false } => {
                warn!(
                    command_id = %id,
                    player = %command.player,
                    error = error.unwrap_or("unspecified"),
                    "Command failed on consumer"
                );
            }
            Completion::AlreadyGone => {
                debug!(command_id = %id, "Completion for unknown command ignored");
            }
        }
        completion
    }

    pub async fn status(&self) -> QueueStatus {
        let mut queue = self.queue.lock().await;
        let now = self.clock.now_ms();
        queue.status(now)
    }

    /// Remove expired commands and stale cooldown entries
    pub async fn sweep(&self) -> SweepReport {
        let mut queue = self.queue.lock().await;
        let now = self.clock.now_ms();

        let report = queue.sweep(now);
        for cmd in &report.expired {
            warn!(
                command_id = %cmd.id,
                player = %cmd.player,
                cmd_type = %cmd.cmd_type,
                "Command expired and removed"
            );
        }
        report
    }

    /// Drop everything, returning the number of commands discarded
    pub async fn clear(&self) -> usize {
        let cleared = self.queue.lock().await.clear();
        info!(cleared, "Queue cleared");
        cleared
    }

    /// Number of stored commands, without sweeping
    #[cfg(test)]
    pub(crate) async fn pending_count(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayq_shared::{limits, ManualClock};

    fn broker(max_pending: usize) -> (Arc<CommandBroker>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let config = QueueConfig {
            max_pending,
            ..Default::default()
        };
        (Arc::new(CommandBroker::new(config, clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_submit_poll_complete() {
        let (broker, clock) = broker(10);

        let submitted = broker.submit(CommandType::Kick, "Alice", 1000).await.unwrap();
        assert_eq!(submitted.position, 1);

        clock.advance(500);
        let polled = broker.poll().await.expect("pending command");
        assert_eq!(polled.id, submitted.id);

        let completion = broker.complete(&submitted.id, true, None).await;
        assert!(completion.removed());
        assert!(broker.poll().await.is_none());
    }

    #[tokio::test]
    async fn test_uses_injected_clock_for_expiry() {
        let (broker, clock) = broker(10);
        broker.submit(CommandType::Ban, "Alice", 1).await.unwrap();

        clock.advance(limits::COMMAND_EXPIRATION_MS - 1);
        assert_eq!(broker.status().await.pending, 1);

        clock.advance(1);
        let report = broker.sweep().await;
        assert_eq!(report.expired.len(), 1);
        assert_eq!(broker.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_completion_is_logged_only() {
        let (broker, _clock) = broker(10);
        let submitted = broker.submit(CommandType::Kick, "Alice", 1).await.unwrap();

        let completion = broker
            .complete(&submitted.id, false, Some("player offline"))
            .await;
        assert!(completion.removed());

        let retry = broker.submit(CommandType::Kick, "Alice", 2).await;
        assert!(matches!(retry, Err(QueueError::DuplicateCommand { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_for_one_player() {
        let (broker, _clock) = broker(100);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let broker = broker.clone();
                tokio::spawn(async move { broker.submit(CommandType::Kick, "Alice", i).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(broker.pending_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_respect_capacity() {
        let (broker, _clock) = broker(5);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let broker = broker.clone();
                tokio::spawn(async move {
                    broker
                        .submit(CommandType::Kick, &format!("player{i}"), 1)
                        .await
                })
            })
            .collect();

        let mut full = 0;
        for handle in handles {
            if let Err(QueueError::QueueFull { .. }) = handle.await.unwrap() {
                full += 1;
            }
        }

        assert_eq!(full, 15);
        assert_eq!(broker.status().await.pending, 5);
    }

    #[tokio::test]
    async fn test_clear() {
        let (broker, _clock) = broker(10);
        broker.submit(CommandType::Kick, "a", 1).await.unwrap();
        broker.submit(CommandType::Kick, "b", 1).await.unwrap();

        assert_eq!(broker.clear().await, 2);
        assert_eq!(broker.status().await.cooldowns, 0);
    }
}
