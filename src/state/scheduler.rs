//! Turn scheduling.
//!
//! Delayed tasks that reveal dice rolls and drive the computer's turn.
//! Every task carries the game id that was current when it was scheduled;
//! nothing is ever cancelled, the engine drops tasks whose game id no longer
//! matches when they come due.
//!
//! Time comes from a [`Clock`] so tests can step a [`ManualClock`] instead
//! of sleeping.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::config::EngineConfig;
use super::session::{GameId, Turn};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(deadline(self.now.get(), by));
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// `now + delay`, saturating at the latest representable time.
pub fn deadline(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// What a task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Apply a rolled die for `owner`
    ApplyRoll { owner: Turn, dice: u8 },
    /// Computer has finished thinking; surface the intermediate message
    OpponentThinking,
    /// Computer commits to rolling
    OpponentDecided,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplyRoll { .. } => "apply_roll",
            Self::OpponentThinking => "opponent_thinking",
            Self::OpponentDecided => "opponent_decided",
        }
    }
}

/// A pending task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: u64,
    /// Game that was current when this was scheduled
    pub game_id: GameId,
    pub due: DateTime<Utc>,
    pub kind: TaskKind,
}

/// Delayed task queue, ordered by due time then scheduling order.
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    roll_delay: Duration,
    think_delay: Duration,
    decide_delay: Duration,
    next_id: u64,
    queue: BTreeMap<(DateTime<Utc>, u64), ScheduledTask>,
}

impl TurnScheduler {
    pub fn new(roll_delay: Duration, think_delay: Duration, decide_delay: Duration) -> Self {
        Self {
            roll_delay,
            think_delay,
            decide_delay,
            next_id: 0,
            queue: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.roll_delay(),
            config.think_delay(),
            config.decide_delay(),
        )
    }

    /// Apply `dice` for `owner` once the roll delay has passed.
    pub fn schedule_roll(
        &mut self,
        game_id: &GameId,
        owner: Turn,
        dice: u8,
        now: DateTime<Utc>,
    ) -> u64 {
        self.schedule(
            game_id,
            TaskKind::ApplyRoll { owner, dice },
            self.roll_delay,
            now,
        )
    }

    /// Start the computer's thinking interval.
    pub fn schedule_opponent_turn(&mut self, game_id: &GameId, now: DateTime<Utc>) -> u64 {
        self.schedule(game_id, TaskKind::OpponentThinking, self.think_delay, now)
    }

    /// Second half of the thinking interval.
    pub fn schedule_decision(&mut self, game_id: &GameId, now: DateTime<Utc>) -> u64 {
        self.schedule(game_id, TaskKind::OpponentDecided, self.decide_delay, now)
    }

    fn schedule(
        &mut self,
        game_id: &GameId,
        kind: TaskKind,
        delay: Duration,
        now: DateTime<Utc>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let task = ScheduledTask {
            id,
            game_id: game_id.clone(),
            due: deadline(now, delay),
            kind,
        };
        tracing::debug!(task = task.id, game = %task.game_id, kind = kind.as_str(), due = %task.due, "scheduled");
        self.queue.insert((task.due, id), task);
        id
    }

    /// Remove and return the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<ScheduledTask> {
        let (due, _) = *self.queue.first_key_value()?.0;
        if due > now {
            return None;
        }
        self.queue.pop_first().map(|(_, task)| task)
    }

    /// When the next task comes due.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Tasks still queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Tasks still queued for one game.
    pub fn pending_for(&self, game_id: &GameId) -> usize {
        self.queue
            .values()
            .filter(|t| &t.game_id == game_id)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
