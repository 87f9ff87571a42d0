//! Command queue engine
//!
//! Pending commands are kept in arrival order alongside a per-player
//! cooldown table. The engine is a plain state machine: it owns no lock
//! and never reads the clock, every operation is handed `now_ms` by the
//! caller.

use crate::{limits, Command, CommandId, CommandType};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Tunable queue limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of pending commands
    pub max_pending: usize,
    /// How long a command may stay pending
    pub expiration_ms: u64,
    /// Minimum time between two accepted commands for one player
    pub cooldown_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_pending: limits::MAX_PENDING_COMMANDS,
            expiration_ms: limits::COMMAND_EXPIRATION_MS,
            cooldown_ms: limits::PLAYER_COOLDOWN_MS,
        }
    }
}

/// Errors the queue reports to its callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("A command for player {player} was accepted recently; retry in {retry_after_ms}ms")]
    DuplicateCommand { player: String, retry_after_ms: u64 },

    #[error("Queue is full ({max} pending commands)")]
    QueueFull { max: usize },

    #[error("Command not found: {0}")]
    CommandNotFound(CommandId),
}

impl QueueError {
    /// Stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            QueueError::DuplicateCommand { .. } => "DUPLICATE_COMMAND",
            QueueError::QueueFull { .. } => "QUEUE_FULL",
            QueueError::CommandNotFound(_) => "COMMAND_NOT_FOUND",
        }
    }
}

/// A command accepted by `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub id: CommandId,
    /// 1-based position in arrival order
    pub position: usize,
}

/// Outcome of a completion acknowledgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The command was pending and is now gone
    Removed { command: Command, success: bool },
    /// Nothing to remove: completed earlier, expired, or never existed
    AlreadyGone,
}

impl Completion {
    pub fn removed(&self) -> bool {
        matches!(self, Completion::Removed { .. })
    }

    pub fn message(&self) -> &'static str {
        match self {
            Completion::Removed { success: true, .. } => "Command completed",
            Completion::Removed { success: false, .. } => "Command marked as failed",
            Completion::AlreadyGone => "Command not found (already completed or expired)",
        }
    }
}

/// Point-in-time view of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    pub pending: usize,
    pub max_pending: usize,
    pub cooldowns: usize,
    /// Age of the oldest pending command, 0 when empty
    pub oldest_age_ms: u64,
}

/// What an expiry sweep removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: Vec<Command>,
    pub stale_cooldowns: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.stale_cooldowns == 0
    }
}

/// In-memory FIFO of pending commands with duplicate suppression
#[derive(Debug)]
pub struct CommandQueue {
    config: QueueConfig,
    /// Arrival sequence handed to the next accepted command
    next_seq: u64,
    /// Pending commands keyed by arrival sequence
    pending: BTreeMap<u64, Command>,
    index: HashMap<CommandId, u64>,
    /// Player -> time of their last accepted command
    cooldowns: HashMap<String, u64>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            next_seq: 0,
            pending: BTreeMap::new(),
            index: HashMap::new(),
            cooldowns: HashMap::new(),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Number of stored commands, including any not yet swept
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn cooldown_count(&self) -> usize {
        self.cooldowns.len()
    }

    /// Stored commands, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.pending.values()
    }

    /// Accept a new command
    ///
    /// The duplicate check runs before the capacity check, and neither
    /// failure touches the queue or the cooldown table.
    pub fn submit(
        &mut self,
        cmd_type: CommandType,
        player: &str,
        client_timestamp: i64,
        now_ms: u64,
    ) -> Result<Submitted, QueueError> {
        if let Some(retry_after_ms) = self.cooldown_remaining(player, now_ms) {
            return Err(QueueError::DuplicateCommand {
                player: player.to_string(),
                retry_after_ms,
            });
        }

        let live = self.live_count(now_ms);
        if live >= self.config.max_pending {
            return Err(QueueError::QueueFull {
                max: self.config.max_pending,
            });
        }

        let id = self.allocate_id();
        let command = Command::new(
            id.clone(),
            cmd_type,
            player,
            client_timestamp,
            now_ms,
            self.config.expiration_ms,
        );

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(seq, command);
        self.index.insert(id.clone(), seq);
        self.cooldowns.insert(player.to_string(), now_ms);

        Ok(Submitted {
            id,
            position: live + 1,
        })
    }

    /// Return the oldest pending command without removing it
    pub fn poll(&mut self, now_ms: u64) -> Option<Command> {
        self.sweep(now_ms);
        self.pending.values().next().cloned()
    }

    /// Acknowledge a command
    ///
    /// A successful completion clears the player's cooldown; a failed one
    /// leaves it in place. Unknown ids are not an error.
    pub fn complete(&mut self, id: &CommandId, success: bool, now_ms: u64) -> Completion {
        self.sweep(now_ms);

        match self.remove(id) {
            Ok(command) => {
                if success {
                    self.cooldowns.remove(&command.player);
                }
                Completion::Removed { command, success }
            }
            Err(_) => Completion::AlreadyGone,
        }
    }

    pub fn status(&mut self, now_ms: u64) -> QueueStatus {
        self.sweep(now_ms);

        QueueStatus {
            pending: self.pending.len(),
            max_pending: self.config.max_pending,
            cooldowns: self.cooldowns.len(),
            oldest_age_ms: self
                .pending
                .values()
                .next()
                .map(|c| c.age_ms(now_ms))
                .unwrap_or(0),
        }
    }

    /// Drop expired commands and stale cooldown entries
    ///
    /// An expired command always takes its player's cooldown entry with it.
    /// Cooldown entries older than the window are collected only when the
    /// player has nothing pending.
    pub fn sweep(&mut self, now_ms: u64) -> SweepReport {
        let expired_seqs: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, c)| c.is_expired(now_ms))
            .map(|(seq, _)| *seq)
            .collect();

        let mut expired = Vec::with_capacity(expired_seqs.len());
        for seq in expired_seqs {
            if let Some(command) = self.pending.remove(&seq) {
                self.index.remove(&command.id);
                self.cooldowns.remove(&command.player);
                expired.push(command);
            }
        }

        let active: HashSet<&str> = self.pending.values().map(|c| c.player.as_str()).collect();
        let cooldown_ms = self.config.cooldown_ms;
        let before = self.cooldowns.len();
        self.cooldowns.retain(|player, last| {
            now_ms.saturating_sub(*last) <= cooldown_ms || active.contains(player.as_str())
        });

        SweepReport {
            expired,
            stale_cooldowns: before - self.cooldowns.len(),
        }
    }

    /// Drop every command and cooldown entry, returning how many commands went
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.index.clear();
        self.cooldowns.clear();
        dropped
    }

    fn remove(&mut self, id: &CommandId) -> Result<Command, QueueError> {
        let seq = self
            .index
            .remove(id)
            .ok_or_else(|| QueueError::CommandNotFound(id.clone()))?;
        self.pending
            .remove(&seq)
            .ok_or_else(|| QueueError::CommandNotFound(id.clone()))
    }

    // An expired command releases its player's cooldown whether or not a
    // sweep has run yet.
    fn cooldown_remaining(&self, player: &str, now_ms: u64) -> Option<u64> {
        let last = *self.cooldowns.get(player)?;
        let released = self
            .pending
            .values()
            .any(|c| c.player == player && c.is_expired(now_ms));
        if released {
            return None;
        }

        let elapsed = now_ms.saturating_sub(last);
        if elapsed < self.config.cooldown_ms {
            Some(self.config.cooldown_ms - elapsed)
        } else {
            None
        }
    }

    // Expired commands awaiting a sweep do not take up capacity.
    fn live_count(&self, now_ms: u64) -> usize {
        self.pending
            .values()
            .filter(|c| !c.is_expired(now_ms))
            .count()
    }

    fn allocate_id(&self) -> CommandId {
        loop {
            let id = CommandId::generate();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }
}
