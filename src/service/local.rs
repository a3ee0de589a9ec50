//! In-process puzzle service.
//!
//! Generates boards, times every solver on each one, and keeps the results
//! of correct guesses. Games live until the service is dropped.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::state::board::{Board, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::state::config::EngineConfig;
use crate::state::dice::Dice;
use crate::state::session::GameId;

use super::generator::{generate_board, generate_choices};
use super::solver::{shortest_path, Algorithm};
use super::{
    AlgorithmRun, GuessResponse, PathResponse, PuzzleService, ServiceError, StartResponse,
};

/// Boards per simulation run.
pub const SIMULATION_ROUNDS: u32 = 15;

/// Board side used by simulation runs.
pub const SIMULATION_BOARD_SIZE: u32 = 10;

/// A correct guess, kept for the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub player_name: String,
    pub board_size: u32,
    pub correct_min_throws: u32,
    pub won: bool,
    pub timestamp: DateTime<Utc>,
}

/// Average solver time over recorded runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmStats {
    pub average_time_nano: f64,
    pub samples: usize,
}

#[derive(Debug)]
struct ActiveGame {
    board: Board,
    min_throws: u32,
}

#[derive(Debug)]
pub struct LocalPuzzleService {
    dice: Dice,
    sizes: RangeInclusive<u32>,
    games: HashMap<GameId, ActiveGame>,
    executions: Vec<AlgorithmRun>,
    results: Vec<PlayerResult>,
}

impl LocalPuzzleService {
    pub fn new(seed: u64) -> Self {
        Self::with_dice(Dice::new(seed), MIN_BOARD_SIZE..=MAX_BOARD_SIZE)
    }

    /// Service accepting the same sizes as the engine.
    pub fn from_config(config: &EngineConfig) -> Self {
        let dice = match config.seed {
            // offset so the service does not mirror the engine's dice
            Some(seed) => Dice::new(seed.wrapping_add(1)),
            None => Dice::from_entropy(),
        };
        Self::with_dice(dice, config.board_sizes())
    }

    fn with_dice(dice: Dice, sizes: RangeInclusive<u32>) -> Self {
        Self {
            dice,
            sizes,
            games: HashMap::new(),
            executions: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Solver runs recorded since the last simulation reset.
    pub fn executions(&self) -> &[AlgorithmRun] {
        &self.executions
    }

    pub fn results(&self) -> &[PlayerResult] {
        &self.results
    }

    /// Average execution time per algorithm name.
    pub fn stats(&self) -> BTreeMap<String, AlgorithmStats> {
        let mut totals: BTreeMap<String, (u128, usize)> = BTreeMap::new();
        for run in &self.executions {
            let entry = totals.entry(run.algorithm_name.clone()).or_default();
            entry.0 += u128::from(run.execution_time_nano);
            entry.1 += 1;
        }
        totals
            .into_iter()
            .map(|(name, (total, samples))| {
                let stats = AlgorithmStats {
                    average_time_nano: total as f64 / samples as f64,
                    samples,
                };
                (name, stats)
            })
            .collect()
    }

    /// Generate, solve and register one game.
    fn new_game(&mut self, n: u32, sizes: RangeInclusive<u32>) -> Result<StartResponse, ServiceError> {
        let board = generate_board(n, &mut self.dice, sizes)?;

        let mut min_throws = None;
        for algorithm in Algorithm::ALL {
            let started = Instant::now();
            let result = algorithm.solve(&board);
            let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
            if algorithm == Algorithm::Bfs {
                min_throws = result;
            }
            self.executions.push(AlgorithmRun {
                algorithm_name: algorithm.as_str().to_string(),
                execution_time_nano: elapsed,
                result_min_throws: result,
                board_size: n,
            });
        }
        // generated boards are always reachable
        let min_throws = min_throws.ok_or(ServiceError::BoardGeneration(1))?;

        let game_id = GameId::new(format!("{:016x}", self.dice.next_u64()));
        let choices = generate_choices(min_throws, &mut self.dice);
        debug!(%game_id, n, min_throws, ?choices, "game created");

        let response = StartResponse {
            game_id: game_id.clone(),
            board: board.to_payload(),
            choices,
        };
        self.games.insert(game_id, ActiveGame { board, min_throws });
        Ok(response)
    }

    fn game(&self, game_id: &GameId) -> Result<&ActiveGame, ServiceError> {
        self.games
            .get(game_id)
            .ok_or_else(|| ServiceError::UnknownGame(game_id.clone()))
    }
}

impl Default for LocalPuzzleService {
    fn default() -> Self {
        Self::with_dice(Dice::from_entropy(), MIN_BOARD_SIZE..=MAX_BOARD_SIZE)
    }
}

impl PuzzleService for LocalPuzzleService {
    fn start(&mut self, n: u32) -> Result<StartResponse, ServiceError> {
        if !self.sizes.contains(&n) {
            return Err(ServiceError::InvalidSize {
                n,
                min: *self.sizes.start(),
                max: *self.sizes.end(),
            });
        }
        self.new_game(n, self.sizes.clone())
    }

    fn submit_guess(
        &mut self,
        game_id: &GameId,
        player_name: &str,
        guess: u32,
    ) -> Result<GuessResponse, ServiceError> {
        let game = self.game(game_id)?;
        let actual = game.min_throws;
        let board_size = game.board.size();
        let correct = guess == actual;

        if correct {
            self.results.push(PlayerResult {
                player_name: player_name.to_string(),
                board_size,
                correct_min_throws: actual,
                won: true,
                timestamp: Utc::now(),
            });
        }
        debug!(%game_id, player_name, guess, actual, correct, "guess checked");
        Ok(GuessResponse { correct, actual })
    }

    fn get_path(&mut self, game_id: &GameId) -> Result<PathResponse, ServiceError> {
        let game = self.game(game_id)?;
        Ok(PathResponse {
            path: shortest_path(&game.board).unwrap_or_default(),
        })
    }

    fn run_simulation(&mut self) -> Result<Vec<AlgorithmRun>, ServiceError> {
        self.executions.clear();
        let n = SIMULATION_BOARD_SIZE;
        for _ in 0..SIMULATION_ROUNDS {
            self.new_game(n, n..=n)?;
        }
        info!(rounds = SIMULATION_ROUNDS, n, "simulation complete");
        Ok(self.executions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start() {
        let mut svc = LocalPuzzleService::new(1);
        let response = svc.start(8).unwrap();

        let board = Board::from_payload(&response.board, 6..=12).unwrap();
        assert_eq!(board.size(), 8);
        assert_eq!(response.choices.len(), 3);
        assert_eq!(svc.game_count(), 1);

        let min = Algorithm::Bfs.solve(&board).unwrap();
        assert!(response.choices.contains(&min));
        assert_eq!(svc.executions().len(), 3);
    }

    #[test]
    fn test_invalid_size() {
        let mut svc = LocalPuzzleService::new(1);
        assert_eq!(
            svc.start(5).unwrap_err(),
            ServiceError::InvalidSize {
                n: 5,
                min: 6,
                max: 12
            }
        );
        assert_eq!(svc.game_count(), 0);
    }

    #[test]
    fn test_oversized_side_is_an_error() {
        let config = EngineConfig {
            max_board_size: 70_000,
            ..EngineConfig::default()
        };
        let mut svc = LocalPuzzleService::from_config(&config);
        assert!(matches!(
            svc.start(65_536),
            Err(ServiceError::InvalidSize { n: 65_536, .. })
        ));
        assert_eq!(svc.game_count(), 0);
    }

    #[test]
    fn test_guess_records_correct_results_only() {
        let mut svc = LocalPuzzleService::new(4);
        let id = svc.start(6).unwrap().game_id;
        let actual = svc.submit_guess(&id, "Ada", 0).unwrap().actual;
        assert!(svc.results().is_empty());

        let response = svc.submit_guess(&id, "Ada", actual).unwrap();
        assert!(response.correct);
        assert_eq!(svc.results().len(), 1);
        assert_eq!(svc.results()[0].player_name, "Ada");
        assert_eq!(svc.results()[0].correct_min_throws, actual);
    }

    #[test]
    fn test_path_matches_answer() {
        let mut svc = LocalPuzzleService::new(8);
        let id = svc.start(10).unwrap().game_id;
        let actual = svc.submit_guess(&id, "Ada", 1).unwrap().actual;
        let path = svc.get_path(&id).unwrap().path;
        assert_eq!(path.len() as u32, actual);
        assert_eq!(path.last().map(|s| s.cell), Some(100));
    }

    #[test]
    fn test_unknown_game() {
        let mut svc = LocalPuzzleService::new(1);
        let id = GameId::from("missing");
        assert_eq!(
            svc.get_path(&id).unwrap_err(),
            ServiceError::UnknownGame(id)
        );
    }

    #[test]
    fn test_simulation() {
        let mut svc = LocalPuzzleService::new(2);
        svc.start(6).unwrap();

        let runs = svc.run_simulation().unwrap();
        assert_eq!(runs.len(), 45);
        assert!(runs.iter().all(|r| r.board_size == 10));
        for chunk in runs.chunks(3) {
            assert_eq!(chunk[0].result_min_throws, chunk[1].result_min_throws);
            assert_eq!(chunk[0].result_min_throws, chunk[2].result_min_throws);
        }

        let stats = svc.stats();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats["A*"].samples, 15);
        assert_eq!(stats["BFS"].samples, 15);
    }

    #[test]
    fn test_simulation_ignores_size_range() {
        let config = EngineConfig {
            min_board_size: 6,
            max_board_size: 8,
            ..EngineConfig::default()
        }
        .with_seed(3);
        let mut svc = LocalPuzzleService::from_config(&config);
        assert!(svc.start(10).is_err());
        assert_eq!(svc.run_simulation().unwrap().len(), 45);
    }
}
