//! A puzzle service that always serves the same board.
//!
//! Used to replay a known puzzle and to drive the engine in tests. Failures
//! can be queued with [`FixedPuzzleService::fail_next`].

use std::collections::HashSet;

use crate::state::board::{Board, BoardPayload};
use crate::state::dice::Dice;
use crate::state::session::GameId;

use super::generator::generate_choices;
use super::solver::{shortest_path, Algorithm};
use super::{
    AlgorithmRun, GuessResponse, PathResponse, PuzzleService, ServiceError, StartResponse,
};

/// One guess as the service received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedGuess {
    pub game_id: GameId,
    pub player_name: String,
    pub guess: u32,
}

#[derive(Debug, Clone)]
pub struct FixedPuzzleService {
    board: BoardPayload,
    answer: u32,
    choices: Vec<u32>,
    started: u32,
    games: HashSet<GameId>,
    failures: u32,
    guesses: Vec<ReceivedGuess>,
}

impl FixedPuzzleService {
    /// Serve `board` with the given answer and choices.
    pub fn new(board: Board, answer: u32, choices: Vec<u32>) -> Self {
        Self::from_payload(board.to_payload(), answer, choices)
    }

    /// Serve a raw payload as-is, even if it would not validate.
    pub fn from_payload(board: BoardPayload, answer: u32, choices: Vec<u32>) -> Self {
        Self {
            board,
            answer,
            choices,
            started: 0,
            games: HashSet::new(),
            failures: 0,
            guesses: Vec::new(),
        }
    }

    /// Serve `board` with its true minimum and choices drawn around it.
    ///
    /// Returns `None` if the last cell cannot be reached.
    pub fn solved(board: Board, seed: u64) -> Option<Self> {
        let answer = Algorithm::Bfs.solve(&board)?;
        let choices = generate_choices(answer, &mut Dice::new(seed));
        Some(Self::new(board, answer, choices))
    }

    /// Make the next `count` calls fail as if the service were down.
    pub fn fail_next(&mut self, count: u32) {
        self.failures = count;
    }

    pub fn answer(&self) -> u32 {
        self.answer
    }

    pub fn guesses(&self) -> &[ReceivedGuess] {
        &self.guesses
    }

    fn check_available(&mut self) -> Result<(), ServiceError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(ServiceError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn check_game(&self, game_id: &GameId) -> Result<(), ServiceError> {
        if self.games.contains(game_id) {
            Ok(())
        } else {
            Err(ServiceError::UnknownGame(game_id.clone()))
        }
    }

    fn board(&self) -> Result<Board, ServiceError> {
        Board::from_payload(&self.board, 2..=u32::from(u16::MAX))
            .map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

impl PuzzleService for FixedPuzzleService {
    fn start(&mut self, _n: u32) -> Result<StartResponse, ServiceError> {
        self.check_available()?;
        self.started += 1;
        let game_id = GameId::new(format!("fixed-{}", self.started));
        self.games.insert(game_id.clone());
        Ok(StartResponse {
            game_id,
            board: self.board.clone(),
            choices: self.choices.clone(),
        })
    }

    fn submit_guess(
        &mut self,
        game_id: &GameId,
        player_name: &str,
        guess: u32,
    ) -> Result<GuessResponse, ServiceError> {
        self.check_available()?;
        self.check_game(game_id)?;
        self.guesses.push(ReceivedGuess {
            game_id: game_id.clone(),
            player_name: player_name.to_string(),
            guess,
        });
        Ok(GuessResponse {
            correct: guess == self.answer,
            actual: self.answer,
        })
    }

    fn get_path(&mut self, game_id: &GameId) -> Result<PathResponse, ServiceError> {
        self.check_available()?;
        self.check_game(game_id)?;
        let path = shortest_path(&self.board()?).unwrap_or_default();
        Ok(PathResponse { path })
    }

    fn run_simulation(&mut self) -> Result<Vec<AlgorithmRun>, ServiceError> {
        self.check_available()?;
        let board = self.board()?;
        Ok(Algorithm::ALL
            .iter()
            .map(|algorithm| AlgorithmRun {
                algorithm_name: algorithm.as_str().to_string(),
                execution_time_nano: 0,
                result_min_throws: algorithm.solve(&board),
                board_size: board.size(),
            })
            .collect())
    }
}
