//! Puzzle service call contract.
//!
//! The engine talks to the puzzle service through [`PuzzleService`]. Calls
//! are request/response: the caller is suspended until a response or an
//! error comes back, and nothing about the session changes in between.
//!
//! - `local` - in-process service that generates and solves boards
//! - `fixed` - serves one pre-built board; used for replays and tests
//! - `generator` - random board and answer-choice generation
//! - `solver` - minimum-throws search (BFS, Dijkstra, A*)

pub mod fixed;
pub mod generator;
pub mod local;
pub mod solver;

use serde::{Deserialize, Serialize};

use crate::state::board::BoardPayload;
use crate::state::session::GameId;

pub use fixed::FixedPuzzleService;
pub use local::{AlgorithmStats, LocalPuzzleService, PlayerResult};
pub use solver::Algorithm;

/// Response to `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub game_id: GameId,
    pub board: BoardPayload,
    pub choices: Vec<u32>,
}

/// Response to `submit_guess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResponse {
    pub correct: bool,
    pub actual: u32,
}

/// One throw of an optimal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStep {
    /// Resting cell after the throw
    pub cell: u32,
    pub dice_roll: u8,
}

/// Response to `get_path`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathResponse {
    pub path: Vec<PathStep>,
}

/// One timed solver run, as reported by `run_simulation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmRun {
    pub algorithm_name: String,
    pub execution_time_nano: u64,
    /// `None` if the last cell was unreachable
    pub result_min_throws: Option<u32>,
    pub board_size: u32,
}

/// Failures of a puzzle service call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("puzzle service unavailable: {0}")]
    Unavailable(String),
    #[error("unknown game {0}")]
    UnknownGame(GameId),
    #[error("board size N must be between {min} and {max}, got {n}")]
    InvalidSize { n: u32, min: u32, max: u32 },
    #[error("no playable board after {0} attempts")]
    BoardGeneration(u32),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The puzzle service as seen by the session engine.
pub trait PuzzleService {
    /// Generate a board of side `n` and three answer choices.
    fn start(&mut self, n: u32) -> Result<StartResponse, ServiceError>;

    /// Check a minimum-throws guess.
    fn submit_guess(
        &mut self,
        game_id: &GameId,
        player_name: &str,
        guess: u32,
    ) -> Result<GuessResponse, ServiceError>;

    /// Optimal throw sequence, for display after the guess.
    fn get_path(&mut self, game_id: &GameId) -> Result<PathResponse, ServiceError>;

    /// Benchmark the solvers over a batch of fresh boards.
    fn run_simulation(&mut self) -> Result<Vec<AlgorithmRun>, ServiceError>;
}

impl<T: PuzzleService + ?Sized> PuzzleService for Box<T> {
    fn start(&mut self, n: u32) -> Result<StartResponse, ServiceError> {
        (**self).start(n)
    }

    fn submit_guess(
        &mut self,
        game_id: &GameId,
        player_name: &str,
        guess: u32,
    ) -> Result<GuessResponse, ServiceError> {
        (**self).submit_guess(game_id, player_name, guess)
    }

    fn get_path(&mut self, game_id: &GameId) -> Result<PathResponse, ServiceError> {
        (**self).get_path(game_id)
    }

    fn run_simulation(&mut self) -> Result<Vec<AlgorithmRun>, ServiceError> {
        (**self).run_simulation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start_response_wire_shape() {
        let raw = r#"{
            "gameId": "3f1c",
            "board": {"size": 6, "totalCells": 36, "snakes": [], "ladders": [{"start": 2, "end": 30}]},
            "choices": [3, 4, 5]
        }"#;
        let response: StartResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.game_id, GameId::from("3f1c"));
        assert_eq!(response.board.size, 6);
        assert_eq!(response.choices, vec![3, 4, 5]);
    }

    #[test]
    fn test_path_and_run_wire_shape() {
        let path: PathResponse =
            serde_json::from_str(r#"{"path": [{"cell": 30, "diceRoll": 1}]}"#).unwrap();
        assert_eq!(
            path.path,
            vec![PathStep {
                cell: 30,
                dice_roll: 1
            }]
        );

        let run = AlgorithmRun {
            algorithm_name: "BFS".to_string(),
            execution_time_nano: 1200,
            result_min_throws: Some(4),
            board_size: 10,
        };
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["algorithmName"], "BFS");
        assert_eq!(json["resultMinThrows"], 4);
    }
}
