//! Session engine.
//!
//! Turns user intents (start, guess, roll, restart, quit) and scheduler
//! firings into state transitions. Each handler runs to completion and
//! either applies fully or leaves the state untouched.
//!
//! # Turn flow
//!
//! ```text
//! roll() ──▶ ApplyRoll(PLAYER) ──┬──▶ FINISHED(WIN)
//!                                ├──▶ PLAYING, turn=PLAYER          (solo)
//!                                └──▶ turn=COMPUTER
//!                                        │ think delay
//!                                        ▼
//!                                  OpponentThinking
//!                                        │ decide delay
//!                                        ▼
//!                                  OpponentDecided ──▶ ApplyRoll(COMPUTER) ──┬──▶ FINISHED(LOSE)
//!                                                                            └──▶ turn=PLAYER
//! ```

use tracing::{debug, info, warn};

use super::board::{Board, BoardError};
use super::config::EngineConfig;
use super::dice::Dice;
use super::outcome::{evaluate, Outcome};
use super::phase::{InvalidTransition, Phase, PhaseEvent};
use super::resolver::{advance, Step};
use super::scheduler::{Clock, ScheduledTask, SystemClock, TaskKind, TurnScheduler};
use super::session::{GameId, Move, SessionState, Turn, DEFAULT_PLAYER_NAME};
use crate::service::{PathStep, PuzzleService, ServiceError};

/// Number of answer choices offered for the guess.
pub const CHOICE_COUNT: usize = 3;

/// Errors returned to the caller of an intent.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("puzzle service error: {0}")]
    Network(#[from] ServiceError),
    #[error("invalid board: {0}")]
    InvalidBoard(#[from] BoardError),
    #[error("expected three distinct choices, got {0:?}")]
    InvalidChoices(Vec<u32>),
    #[error("guess {guess} is not one of {choices:?}")]
    InvalidGuess { guess: u32, choices: Vec<u32> },
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("no active game")]
    NoActiveGame,
}

impl SessionError {
    /// Check if repeating the same intent may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// A scheduled task that no longer applies. Dropped without telling the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("task for game {task} fired while current game is {current:?}")]
    StaleTask {
        task: GameId,
        current: Option<GameId>,
    },
    #[error("{kind} task fired during {phase}")]
    UnexpectedTask { kind: &'static str, phase: Phase },
}

/// Owns a session and drives it.
pub struct SessionEngine<S, C = SystemClock> {
    config: EngineConfig,
    service: S,
    clock: C,
    dice: Dice,
    scheduler: TurnScheduler,
    state: SessionState,
}

impl<S: PuzzleService> SessionEngine<S, SystemClock> {
    /// Engine on the wall clock.
    pub fn new(service: S, config: EngineConfig) -> Self {
        Self::with_clock(service, SystemClock, config)
    }
}

impl<S: PuzzleService, C: Clock> SessionEngine<S, C> {
    pub fn with_clock(service: S, clock: C, config: EngineConfig) -> Self {
        let dice = match config.seed {
            Some(seed) => Dice::new(seed),
            None => Dice::from_entropy(),
        };
        Self {
            scheduler: TurnScheduler::from_config(&config),
            config,
            service,
            clock,
            dice,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Read-only snapshot for the presentation layer.
    pub fn snapshot(&self) -> serde_json::Value {
        self.state.to_json()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// Dice used for rolls and the computer's guess.
    pub fn dice_mut(&mut self) -> &mut Dice {
        &mut self.dice
    }

    /// When the next scheduled task comes due.
    pub fn next_due(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.scheduler.next_due()
    }

    /// Optimal throw sequence, empty until the guess is scored.
    pub fn optimal_path(&self) -> &[PathStep] {
        self.state.optimal_path()
    }

    /// Request a board of side `n` and move to guessing.
    ///
    /// On a service failure the phase is unchanged and the status message
    /// says so; the call can be retried.
    pub fn start(
        &mut self,
        n: u32,
        player_name: &str,
        vs_computer: bool,
    ) -> Result<(), SessionError> {
        let next = self.state.phase.transition(&PhaseEvent::Start)?;

        let sizes = self.config.board_sizes();
        if !sizes.contains(&n) {
            return Err(BoardError::SizeOutOfRange {
                size: n,
                min: *sizes.start(),
                max: *sizes.end(),
            }
            .into());
        }

        let response = match self.service.start(n) {
            Ok(response) => response,
            Err(err) => {
                warn!(n, error = %err, "start failed");
                self.state.message = "Error starting game".to_string();
                return Err(err.into());
            }
        };

        let board = Board::from_payload(&response.board, sizes).and_then(|board| {
            if board.size() == n {
                Ok(board)
            } else {
                Err(BoardError::SizeMismatch {
                    requested: n,
                    got: board.size(),
                })
            }
        });
        let board = match board {
            Ok(board) => board,
            Err(err) => {
                warn!(game = %response.game_id, error = %err, "rejected board payload");
                self.state.message = "Error starting game".to_string();
                return Err(err.into());
            }
        };
        if !distinct_choices(&response.choices) {
            warn!(game = %response.game_id, choices = ?response.choices, "rejected choices");
            self.state.message = "Error starting game".to_string();
            return Err(SessionError::InvalidChoices(response.choices));
        }

        let mut fresh = SessionState::new(player_name);
        fresh.phase = next;
        fresh.game_id = Some(response.game_id);
        fresh.vs_computer = vs_computer;
        fresh.board = Some(board);
        fresh.choices = response.choices;
        fresh.started_at = Some(self.clock.now());
        self.state = fresh;

        info!(
            game = ?self.state.game_id,
            n,
            player = %self.state.player_name,
            vs_computer,
            "session started"
        );
        Ok(())
    }

    /// Record the minimum-throws guess.
    ///
    /// Accepted once, and only for one of the offered choices. In
    /// vs-computer mode the computer's guess is drawn from the same choices.
    pub fn guess(&mut self, value: u32) -> Result<Outcome, SessionError> {
        let next = self.state.phase.transition(&PhaseEvent::Guess)?;
        if !self.state.choices.contains(&value) {
            return Err(SessionError::InvalidGuess {
                guess: value,
                choices: self.state.choices.clone(),
            });
        }
        let game_id = self
            .state
            .game_id
            .clone()
            .ok_or(SessionError::NoActiveGame)?;

        let response = match self
            .service
            .submit_guess(&game_id, &self.state.player_name, value)
        {
            Ok(response) => response,
            Err(err) => {
                warn!(game = %game_id, error = %err, "submit guess failed");
                self.state.message = "Error submitting guess".to_string();
                return Err(err.into());
            }
        };

        let opponent_guess = if self.state.vs_computer {
            self.dice.choose(&self.state.choices)
        } else {
            None
        };
        let outcome = evaluate(
            value,
            response.actual,
            self.state.vs_computer,
            opponent_guess,
        );

        // display only; a failure here does not block play
        let path = match self.service.get_path(&game_id) {
            Ok(path) => path.path,
            Err(err) => {
                warn!(game = %game_id, error = %err, "optimal path unavailable");
                Vec::new()
            }
        };

        self.state.phase = next;
        self.state.guessed_answer = Some(value);
        self.state.opponent_guess = opponent_guess;
        self.state.correct_answer = Some(response.actual);
        self.state.guess_outcome = Some(outcome);
        self.state.optimal_path = path;
        self.state.message = guess_message(outcome, value, response.actual);

        info!(game = %game_id, guess = value, actual = response.actual, ?opponent_guess, %outcome, "guess scored");
        Ok(outcome)
    }

    /// Roll for the player.
    ///
    /// Ignored unless it is the player's turn and no roll is in flight.
    /// Returns whether the roll was accepted.
    pub fn roll(&mut self) -> bool {
        if !self.state.can_roll() {
            debug!(phase = %self.state.phase, turn = %self.state.turn, rolling = self.state.roll_in_progress, "roll ignored");
            return false;
        }
        let Some(game_id) = self.state.game_id.clone() else {
            return false;
        };

        let dice = self.dice.roll();
        self.state.roll_in_progress = true;
        self.scheduler
            .schedule_roll(&game_id, Turn::Player, dice, self.clock.now());
        debug!(game = %game_id, dice, "roll accepted");
        true
    }

    /// New session with the same player name. Pending tasks become inert.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        let name = self.state.player_name.clone();
        self.reset(name)?;
        info!(player = %self.state.player_name, "session restarted");
        Ok(())
    }

    /// Leave the session entirely. Pending tasks become inert.
    pub fn quit(&mut self) -> Result<(), SessionError> {
        self.reset(DEFAULT_PLAYER_NAME.to_string())?;
        info!("session quit");
        Ok(())
    }

    fn reset(&mut self, player_name: String) -> Result<(), SessionError> {
        let mut phase = self.state.phase;
        phase.apply_mut(PhaseEvent::Reset)?;
        debug!(game = ?self.state.game_id, from = %self.state.phase, "session reset");

        let mut fresh = SessionState::new(player_name);
        fresh.phase = phase;
        self.state = fresh;
        Ok(())
    }

    /// Fire every task due at the clock's current time.
    ///
    /// Returns how many tasks were applied; stale ones are dropped.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut applied = 0;

        while let Some(task) = self.scheduler.pop_due(now) {
            let id = task.id;
            match self.dispatch(task) {
                Ok(()) => applied += 1,
                Err(err) => debug!(task = id, "dropped task: {err}"),
            }
        }

        applied
    }

    fn dispatch(&mut self, task: ScheduledTask) -> Result<(), ConsistencyError> {
        if self.state.game_id.as_ref() != Some(&task.game_id) {
            return Err(ConsistencyError::StaleTask {
                task: task.game_id,
                current: self.state.game_id.clone(),
            });
        }
        if !self.state.phase.is_playing() {
            return Err(ConsistencyError::UnexpectedTask {
                kind: task.kind.as_str(),
                phase: self.state.phase,
            });
        }

        match task.kind {
            TaskKind::ApplyRoll { owner, dice } => self.apply_roll(&task.game_id, owner, dice),
            TaskKind::OpponentThinking => {
                self.state.message = "Computer is rolling...".to_string();
                self.scheduler
                    .schedule_decision(&task.game_id, self.clock.now());
                Ok(())
            }
            TaskKind::OpponentDecided => {
                let dice = self.dice.roll();
                self.state.roll_in_progress = true;
                self.scheduler
                    .schedule_roll(&task.game_id, Turn::Computer, dice, self.clock.now());
                Ok(())
            }
        }
    }

    fn apply_roll(&mut self, game_id: &GameId, owner: Turn, dice: u8) -> Result<(), ConsistencyError> {
        let Some(board) = self.state.board.as_ref() else {
            return Err(ConsistencyError::UnexpectedTask {
                kind: "apply_roll",
                phase: self.state.phase,
            });
        };
        let last = board.last_cell();
        let step = advance(board, self.state.position(owner), dice);

        let finished = if step.to == last {
            let outcome = match owner {
                Turn::Player => Outcome::Win,
                Turn::Computer => Outcome::Lose,
            };
            let phase = self
                .state
                .phase
                .transition(&PhaseEvent::Finish { outcome })
                .map_err(|_| ConsistencyError::UnexpectedTask {
                    kind: "apply_roll",
                    phase: self.state.phase,
                })?;
            Some((phase, outcome))
        } else {
            None
        };

        self.state.set_position(owner, step.to);
        self.state.last_dice_value = Some(dice);
        self.state.roll_in_progress = false;
        if owner == Turn::Player {
            self.state.move_count += 1;
        }
        if self.config.record_moves {
            self.state.moves.push(Move::from_step(owner, &step));
        }
        debug!(game = %game_id, %owner, dice, from = step.from, raw = step.raw, to = step.to, wasted = step.wasted, "move applied");

        if let Some((phase, outcome)) = finished {
            self.state.phase = phase;
            self.state.finished_at = Some(self.clock.now());
            self.state.message = match owner {
                Turn::Player => format!(
                    "Game Over! You reached the end in {} moves.",
                    self.state.move_count
                ),
                Turn::Computer => "The computer reached the end first.".to_string(),
            };
            info!(game = %game_id, %outcome, moves = self.state.move_count, "session finished");
            return Ok(());
        }

        let described = describe_step(&step, last);
        match owner {
            Turn::Player if self.state.vs_computer => {
                self.state.turn = Turn::Computer;
                self.state.message = format!("{described} Computer is thinking...");
                self.scheduler
                    .schedule_opponent_turn(game_id, self.clock.now());
            }
            Turn::Player => self.state.message = described,
            Turn::Computer => {
                self.state.turn = Turn::Player;
                self.state.message = format!("Computer: {described} Your turn.");
            }
        }
        Ok(())
    }
}

fn distinct_choices(choices: &[u32]) -> bool {
    choices.len() == CHOICE_COUNT
        && choices
            .iter()
            .enumerate()
            .all(|(i, c)| !choices[..i].contains(c))
}

fn guess_message(outcome: Outcome, guess: u32, actual: u32) -> String {
    match outcome {
        Outcome::Draw => format!("Draw! You and the computer both guessed {guess}."),
        Outcome::Win => "Correct! You identified the minimum throws.".to_string(),
        Outcome::Lose => format!("Wrong! The correct answer was {actual}."),
    }
}

fn describe_step(step: &Step, last: u32) -> String {
    if step.wasted {
        format!(
            "Rolled {}: need exactly {} to finish.",
            step.dice,
            last - step.from
        )
    } else if step.transition_applied && step.to < step.raw {
        format!("Rolled {}: slid down to {}.", step.dice, step.to)
    } else if step.transition_applied {
        format!("Rolled {}: climbed to {}.", step.dice, step.to)
    } else {
        format!("Rolled {}: moved to {}.", step.dice, step.to)
    }
}
