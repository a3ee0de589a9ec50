//! Session state.
//!
//! Everything the presentation layer can observe about one playthrough.
//! Only the [`SessionEngine`](super::engine::SessionEngine) mutates it;
//! everyone else reads getters or the JSON snapshot.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::board::{Board, START_CELL};
use super::outcome::Outcome;
use super::phase::Phase;
use super::resolver::Step;
use crate::service::PathStep;

/// Name used until the player picks one.
pub const DEFAULT_PLAYER_NAME: &str = "Player 1";

/// Game identifier issued by the puzzle service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Turn {
    #[default]
    Player,
    Computer,
}

impl Turn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "PLAYER",
            Self::Computer => "COMPUTER",
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applied roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub turn_owner: Turn,
    pub dice_value: u8,
    pub from_cell: u32,
    pub to_cell: u32,
    pub transition_applied: bool,
}

impl Move {
    pub fn from_step(owner: Turn, step: &Step) -> Self {
        Self {
            turn_owner: owner,
            dice_value: step.dice,
            from_cell: step.from,
            to_cell: step.to,
            transition_applied: step.transition_applied,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "turnOwner": self.turn_owner.as_str(),
            "diceValue": self.dice_value,
            "fromCell": self.from_cell,
            "toCell": self.to_cell,
            "transitionApplied": self.transition_applied
        })
    }
}

/// State of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) phase: Phase,
    pub(crate) game_id: Option<GameId>,
    pub(crate) player_name: String,
    pub(crate) vs_computer: bool,
    pub(crate) board: Option<Board>,
    pub(crate) choices: Vec<u32>,

    pub(crate) guessed_answer: Option<u32>,
    /// Computer's guess, sampled locally from `choices`
    pub(crate) opponent_guess: Option<u32>,
    pub(crate) correct_answer: Option<u32>,
    pub(crate) guess_outcome: Option<Outcome>,
    pub(crate) optimal_path: Vec<PathStep>,

    pub(crate) player_pos: u32,
    pub(crate) computer_pos: u32,
    pub(crate) turn: Turn,
    /// Player rolls only
    pub(crate) move_count: u32,
    pub(crate) last_dice_value: Option<u8>,
    /// Set between sampling a die and applying it
    pub(crate) roll_in_progress: bool,

    /// User-visible status line
    pub(crate) message: String,
    pub(crate) moves: Vec<Move>,

    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) finished_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Fresh state in the setup phase.
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            phase: Phase::Setup,
            game_id: None,
            player_name: player_name.into(),
            vs_computer: false,
            board: None,
            choices: Vec::new(),
            guessed_answer: None,
            opponent_guess: None,
            correct_answer: None,
            guess_outcome: None,
            optimal_path: Vec::new(),
            player_pos: START_CELL,
            computer_pos: START_CELL,
            turn: Turn::Player,
            move_count: 0,
            last_dice_value: None,
            roll_in_progress: false,
            message: String::new(),
            moves: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game_id(&self) -> Option<&GameId> {
        self.game_id.as_ref()
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn vs_computer(&self) -> bool {
        self.vs_computer
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn choices(&self) -> &[u32] {
        &self.choices
    }

    pub fn guessed_answer(&self) -> Option<u32> {
        self.guessed_answer
    }

    pub fn opponent_guess(&self) -> Option<u32> {
        self.opponent_guess
    }

    pub fn correct_answer(&self) -> Option<u32> {
        self.correct_answer
    }

    pub fn guess_outcome(&self) -> Option<Outcome> {
        self.guess_outcome
    }

    pub fn optimal_path(&self) -> &[PathStep] {
        &self.optimal_path
    }

    pub fn player_pos(&self) -> u32 {
        self.player_pos
    }

    pub fn computer_pos(&self) -> u32 {
        self.computer_pos
    }

    /// Position of whoever `owner` is.
    pub fn position(&self, owner: Turn) -> u32 {
        match owner {
            Turn::Player => self.player_pos,
            Turn::Computer => self.computer_pos,
        }
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn last_dice_value(&self) -> Option<u8> {
        self.last_dice_value
    }

    pub fn roll_in_progress(&self) -> bool {
        self.roll_in_progress
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Check if the player may roll right now.
    pub fn can_roll(&self) -> bool {
        self.phase.is_playing() && self.turn == Turn::Player && !self.roll_in_progress
    }

    pub(crate) fn set_position(&mut self, owner: Turn, cell: u32) {
        match owner {
            Turn::Player => self.player_pos = cell,
            Turn::Computer => self.computer_pos = cell,
        }
    }

    /// Read-only snapshot for the presentation layer.
    pub fn to_json(&self) -> serde_json::Value {
        let moves: Vec<serde_json::Value> = self.moves.iter().map(|m| m.to_json()).collect();
        let path: Vec<serde_json::Value> = self
            .optimal_path
            .iter()
            .map(|s| serde_json::json!({"cell": s.cell, "diceRoll": s.dice_roll}))
            .collect();

        serde_json::json!({
            "phase": self.phase.as_str(),
            "outcome": self.phase.outcome().map(|o| o.as_str()),
            "gameId": self.game_id.as_ref().map(GameId::as_str),
            "playerName": self.player_name,
            "vsComputer": self.vs_computer,
            "board": self.board.as_ref().map(Board::to_json),
            "choices": self.choices,
            "guessedAnswer": self.guessed_answer,
            "opponentGuess": self.opponent_guess,
            "correctAnswer": self.correct_answer,
            "guessOutcome": self.guess_outcome.map(|o| o.as_str()),
            "optimalPath": path,
            "playerPos": self.player_pos,
            "computerPos": self.vs_computer.then_some(self.computer_pos),
            "turn": self.turn.as_str(),
            "moveCount": self.move_count,
            "lastDiceValue": self.last_dice_value,
            "rollInProgress": self.roll_in_progress,
            "message": self.message,
            "moves": moves
        })
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYER_NAME)
    }
}
