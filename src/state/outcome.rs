//! Guess scoring.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Lose => "LOSE",
            Self::Draw => "DRAW",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score a guess against the authoritative answer.
///
/// Against the computer, agreeing with the opponent's guess is a draw and
/// is checked before correctness: two matching wrong guesses draw, and so
/// do two matching right ones.
pub fn evaluate(
    player_guess: u32,
    correct_answer: u32,
    vs_computer: bool,
    opponent_guess: Option<u32>,
) -> Outcome {
    if vs_computer && opponent_guess == Some(player_guess) {
        return Outcome::Draw;
    }
    if player_guess == correct_answer {
        Outcome::Win
    } else {
        Outcome::Lose
    }
}
