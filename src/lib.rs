//! Ladder Session Library
//!
//! Client-side session engine for a "guess the minimum throws" snakes and
//! ladders puzzle.
//!
//! # Overview
//!
//! A session goes through three stages:
//!
//! - **Setup** - The player picks a board side N and a mode (solo or
//!   against the computer). The puzzle service generates an N x N board and
//!   three candidate answers.
//!
//! - **Guessing** - The player picks the answer they think is the minimum
//!   number of throws needed to reach the last cell. The service scores it.
//!
//! - **Playing** - The player (and the computer, in vs mode) roll a die in
//!   turns until someone reaches the last cell exactly.
//!
//! # Design Principles
//!
//! 1. **Phases validate transitions** - Intents that do not fit the current
//!    phase are rejected without touching state.
//!
//! 2. **Delays are scheduled, not slept** - Roll and opponent delays are
//!    tasks on a [`TurnScheduler`](state::TurnScheduler) driven by an
//!    injected clock. Tasks for a session that has ended are dropped.
//!
//! 3. **No networking** - The puzzle service is a trait; an in-process
//!    implementation ships with the crate.
//!
//! 4. **Serialization-ready** - Session state renders to JSON for display.
//!
//! # Example
//!
//! ```rust
//! use ladder_session::service::LocalPuzzleService;
//! use ladder_session::state::{EngineConfig, ManualClock, Phase, SessionEngine};
//! use std::time::Duration;
//!
//! let config = EngineConfig::default().with_seed(1);
//! let clock = ManualClock::default();
//! let service = LocalPuzzleService::from_config(&config);
//! let mut engine = SessionEngine::with_clock(service, clock.clone(), config);
//!
//! engine.start(8, "Alice", false).unwrap();
//! let pick = engine.state().choices()[0];
//! engine.guess(pick).unwrap();
//! assert_eq!(engine.state().phase(), Phase::Playing);
//!
//! assert!(engine.roll());
//! clock.advance(Duration::from_millis(600));
//! engine.tick();
//! assert_eq!(engine.state().move_count(), 1);
//! ```

pub mod service;
pub mod state;

pub use state::*;
