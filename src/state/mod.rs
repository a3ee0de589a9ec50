//! Session state and the engine that drives it.
//!
//! - `board` - validated board model and jump lookup
//! - `resolver` - where a token comes to rest after a throw
//! - `outcome` - WIN / LOSE / DRAW rules for the guess
//! - `phase` - session phase machine
//! - `session` - the observable session state
//! - `scheduler` - clock and delayed turn tasks
//! - `dice` - seeded die and local random choices
//! - `config` - engine tunables
//! - `engine` - intents and scheduled tasks applied to a session
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                          SessionEngine                              │
//! │                                                                     │
//! │  intents ──▶ ┌──────────────┐     ┌──────────────────────────────┐  │
//! │  start       │    Phase     │     │        TurnScheduler         │  │
//! │  guess       │              │     │                              │  │
//! │  roll ──────▶│ Setup        │     │ (due, id) → task             │  │
//! │  restart     │   ▼          │     │   ApplyRoll(owner, dice)     │  │
//! │  quit        │ Guessing     │◀────│   OpponentThinking           │  │
//! │              │   ▼          │tick │   OpponentDecided            │  │
//! │              │ Playing      │     └──────────────────────────────┘  │
//! │              │   ▼          │                                       │
//! │              │ Finished     │──▶ Resolver ──▶ Board               │
//! │              └──────────────┘                                       │
//! │                     │                                               │
//! │                     ▼                                               │
//! │               PuzzleService  (start, submit_guess, get_path)        │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

pub mod board;
pub mod config;
pub mod dice;
pub mod engine;
pub mod outcome;
pub mod phase;
pub mod resolver;
pub mod scheduler;
pub mod session;

// Re-export commonly used types
pub use board::{Board, BoardError, BoardPayload, Jump, JumpKind, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
pub use config::{ConfigError, EngineConfig};
pub use dice::{Dice, InvalidFace};
pub use engine::{ConsistencyError, SessionEngine, SessionError};
pub use outcome::{evaluate, Outcome};
pub use phase::{InvalidTransition, Phase, PhaseEvent};
pub use resolver::{advance, resolve, Landing, MalformedBoard, Step};
pub use scheduler::{Clock, ManualClock, ScheduledTask, SystemClock, TaskKind, TurnScheduler};
pub use session::{GameId, Move, SessionState, Turn, DEFAULT_PLAYER_NAME};
