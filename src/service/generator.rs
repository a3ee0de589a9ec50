//! Random board and answer-choice generation.
//!
//! A board of side N gets up to N-2 snakes and N-2 ladders. Every start and
//! end cell is used at most once, so jumps never chain. The first few snakes
//! drop exactly one row and the first few ladders climb straight up, which
//! keeps small boards from being all long slides.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use tracing::debug;

use crate::state::board::{Board, Jump, START_CELL};
use crate::state::dice::Dice;
use crate::state::engine::CHOICE_COUNT;
use crate::state::resolver::resolve;

use super::solver::bfs;
use super::ServiceError;

/// Placement tries per jump before giving up on it.
pub const PLACEMENT_ATTEMPTS: u32 = 200;

/// Whole-board retries when a layout is unplayable.
pub const GENERATION_ATTEMPTS: u32 = 50;

const ONE_ROW_SNAKES: usize = 3;
const VERTICAL_LADDERS: usize = 2;

/// Generate a playable board of side `n`.
///
/// Playable means no jump chain loops and the last cell is reachable.
pub fn generate_board(
    n: u32,
    dice: &mut Dice,
    sizes: RangeInclusive<u32>,
) -> Result<Board, ServiceError> {
    let invalid = ServiceError::InvalidSize {
        n,
        min: *sizes.start(),
        max: *sizes.end(),
    };
    if n < 2 || !sizes.contains(&n) {
        return Err(invalid);
    }
    let Some(total) = n.checked_mul(n) else {
        return Err(invalid);
    };

    for attempt in 1..=GENERATION_ATTEMPTS {
        let board = layout(n, total, dice, sizes.clone())?;
        if is_playable(&board) {
            debug!(
                n,
                attempt,
                snakes = board.snakes().len(),
                ladders = board.ladders().len(),
                "generated board"
            );
            return Ok(board);
        }
        debug!(n, attempt, "regenerating unplayable board");
    }
    Err(ServiceError::BoardGeneration(GENERATION_ATTEMPTS))
}

fn is_playable(board: &Board) -> bool {
    let acyclic = board
        .snakes()
        .iter()
        .chain(board.ladders())
        .all(|jump| resolve(board, jump.start).is_ok());
    acyclic && bfs(board).is_some()
}

fn layout(
    n: u32,
    total: u32,
    dice: &mut Dice,
    sizes: RangeInclusive<u32>,
) -> Result<Board, ServiceError> {
    let count = (n - 2) as usize;
    let mut occupied = HashSet::from([START_CELL, total]);

    let mut snakes = Vec::with_capacity(count);
    for _ in 0..count {
        let one_row = snakes.len() < ONE_ROW_SNAKES;
        if let Some(jump) = place_snake(n, total, dice, &mut occupied, one_row) {
            snakes.push(jump);
        }
    }

    let mut ladders = Vec::with_capacity(count);
    for _ in 0..count {
        let vertical = ladders.len() < VERTICAL_LADDERS;
        if let Some(jump) = place_ladder(n, total, dice, &mut occupied, vertical) {
            ladders.push(jump);
        }
    }

    Board::new_in(n, snakes, ladders, sizes).map_err(|e| ServiceError::Malformed(e.to_string()))
}

fn place_snake(
    n: u32,
    total: u32,
    dice: &mut Dice,
    occupied: &mut HashSet<u32>,
    one_row: bool,
) -> Option<Jump> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        // n..total, never the last cell
        let start = dice.gen_range(0..total - n) + n;
        let start_row = (start - 1) / n;

        let end_row = if one_row {
            match start_row.checked_sub(1) {
                Some(row) => row,
                None => continue,
            }
        } else if start_row < 2 {
            continue;
        } else if start_row >= 3 && dice.coin() {
            start_row - 3
        } else {
            dice.gen_range(0..start_row - 1)
        };

        let end = end_row * n + dice.gen_range(0..n) + 1;
        if end >= start || occupied.contains(&start) || occupied.contains(&end) {
            continue;
        }
        occupied.insert(start);
        occupied.insert(end);
        return Some(Jump::new(start, end));
    }
    None
}

fn place_ladder(
    n: u32,
    total: u32,
    dice: &mut Dice,
    occupied: &mut HashSet<u32>,
    vertical: bool,
) -> Option<Jump> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        // 1..=total-n, so at least one row remains above
        let start = dice.gen_range(0..total - n) + 1;
        let start_row = (start - 1) / n;
        let start_col = (start - 1) % n;

        let end_row = start_row + dice.gen_range(0..n - 1 - start_row) + 1;
        let end_col = if vertical {
            start_col
        } else {
            let col = dice.gen_range(0..n);
            if col == start_col {
                (start_col + 1) % n
            } else {
                col
            }
        };

        let end = end_row * n + end_col + 1;
        if end <= start || occupied.contains(&start) || occupied.contains(&end) {
            continue;
        }
        occupied.insert(start);
        occupied.insert(end);
        return Some(Jump::new(start, end));
    }
    None
}

/// Three distinct positive choices, one of them `correct`, in random order.
///
/// Distractors sit within two of the answer; when that would go below one
/// they are drawn from just above it instead.
pub fn generate_choices(correct: u32, dice: &mut Dice) -> Vec<u32> {
    let correct = correct.max(1);
    let mut choices = vec![correct];
    while choices.len() < CHOICE_COUNT {
        let offset = i64::from(dice.gen_range(0..5)) - 2;
        let value = i64::from(correct) + offset;
        let candidate = match u32::try_from(value) {
            Ok(v) if v > 0 => v,
            _ => correct + dice.gen_range(0..3) + 1,
        };
        if !choices.contains(&candidate) {
            choices.push(candidate);
        }
    }
    dice.shuffle(&mut choices);
    choices
}
