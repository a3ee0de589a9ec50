//! Board model.
//!
//! An immutable description of a generated board: an N×N grid numbered
//! 1..=N², plus snakes (downward jumps) and ladders (upward jumps).
//! Boards are validated once, at the boundary where the service payload
//! becomes a typed value.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Smallest board side the game accepts.
pub const MIN_BOARD_SIZE: u32 = 6;

/// Largest board side the game accepts.
pub const MAX_BOARD_SIZE: u32 = 12;

/// Cell every token starts on.
pub const START_CELL: u32 = 1;

/// Kind of jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpKind {
    Snake,
    Ladder,
}

impl JumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Ladder => "ladder",
        }
    }
}

impl fmt::Display for JumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single snake or ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jump {
    pub start: u32,
    pub end: u32,
}

impl Jump {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Board as it crosses the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPayload {
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cells: Option<u32>,
    #[serde(default)]
    pub snakes: Vec<Jump>,
    #[serde(default)]
    pub ladders: Vec<Jump>,
}

/// Reasons a board payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board size {size} outside {min}..={max}")]
    SizeOutOfRange { size: u32, min: u32, max: u32 },
    #[error("total cells {got} does not match size² = {expected}")]
    TotalCellsMismatch { expected: u32, got: u32 },
    #[error("{kind} {start}->{end} leaves the board (1..={max})")]
    CellOutOfBounds {
        kind: JumpKind,
        start: u32,
        end: u32,
        max: u32,
    },
    #[error("snake {start}->{end} does not go down")]
    SnakeNotDescending { start: u32, end: u32 },
    #[error("ladder {start}->{end} does not go up")]
    LadderNotAscending { start: u32, end: u32 },
    #[error("{kind} starts on reserved cell {cell}")]
    ReservedCell { kind: JumpKind, cell: u32 },
    #[error("two {kind}s start on cell {cell}")]
    DuplicateStart { kind: JumpKind, cell: u32 },
    #[error("cell {cell} is both a snake start and a ladder start")]
    ConflictingStart { cell: u32 },
    #[error("requested a board of side {requested}, got {got}")]
    SizeMismatch { requested: u32, got: u32 },
}

/// Validated, immutable board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: u32,
    snakes: Vec<Jump>,
    ladders: Vec<Jump>,
    /// start -> end, per kind
    snake_index: HashMap<u32, u32>,
    ladder_index: HashMap<u32, u32>,
}

impl Board {
    /// Build a board within the default size range.
    pub fn new(size: u32, snakes: Vec<Jump>, ladders: Vec<Jump>) -> Result<Self, BoardError> {
        Self::new_in(size, snakes, ladders, MIN_BOARD_SIZE..=MAX_BOARD_SIZE)
    }

    /// Build a board, accepting sides within `sizes`.
    pub fn new_in(
        size: u32,
        snakes: Vec<Jump>,
        ladders: Vec<Jump>,
        sizes: RangeInclusive<u32>,
    ) -> Result<Self, BoardError> {
        let out_of_range = BoardError::SizeOutOfRange {
            size,
            min: *sizes.start(),
            max: *sizes.end(),
        };
        if !sizes.contains(&size) {
            return Err(out_of_range);
        }
        let Some(max) = size.checked_mul(size) else {
            return Err(out_of_range);
        };

        let snake_index = index_jumps(JumpKind::Snake, &snakes, max)?;
        let ladder_index = index_jumps(JumpKind::Ladder, &ladders, max)?;

        if let Some(cell) = snake_index
            .keys()
            .filter(|cell| ladder_index.contains_key(cell))
            .min()
        {
            return Err(BoardError::ConflictingStart { cell: *cell });
        }

        Ok(Self {
            size,
            snakes,
            ladders,
            snake_index,
            ladder_index,
        })
    }

    /// Validate a service payload.
    pub fn from_payload(
        payload: &BoardPayload,
        sizes: RangeInclusive<u32>,
    ) -> Result<Self, BoardError> {
        if let Some(got) = payload.total_cells {
            let expected = payload.size.saturating_mul(payload.size);
            if got != expected {
                return Err(BoardError::TotalCellsMismatch { expected, got });
            }
        }
        Self::new_in(
            payload.size,
            payload.snakes.clone(),
            payload.ladders.clone(),
            sizes,
        )
    }

    /// Board side N.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Last cell, N².
    pub fn last_cell(&self) -> u32 {
        self.size * self.size
    }

    pub fn snakes(&self) -> &[Jump] {
        &self.snakes
    }

    pub fn ladders(&self) -> &[Jump] {
        &self.ladders
    }

    /// Check if a cell is on the board.
    pub fn contains(&self, cell: u32) -> bool {
        (START_CELL..=self.last_cell()).contains(&cell)
    }

    /// Jump leaving `cell`, if any.
    ///
    /// Snakes are looked up before ladders. Construction already rejects a
    /// cell that starts both, so the order only matters as a tie-break.
    pub fn jump_from(&self, cell: u32) -> Option<(JumpKind, u32)> {
        if let Some(end) = self.snake_index.get(&cell) {
            return Some((JumpKind::Snake, *end));
        }
        self.ladder_index
            .get(&cell)
            .map(|end| (JumpKind::Ladder, *end))
    }

    /// Convert back to the wire shape.
    pub fn to_payload(&self) -> BoardPayload {
        BoardPayload {
            size: self.size,
            total_cells: Some(self.last_cell()),
            snakes: self.snakes.clone(),
            ladders: self.ladders.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let jumps = |list: &[Jump]| -> Vec<serde_json::Value> {
            list.iter()
                .map(|j| serde_json::json!({"start": j.start, "end": j.end}))
                .collect()
        };
        serde_json::json!({
            "size": self.size,
            "totalCells": self.last_cell(),
            "snakes": jumps(&self.snakes),
            "ladders": jumps(&self.ladders)
        })
    }
}

fn index_jumps(kind: JumpKind, jumps: &[Jump], max: u32) -> Result<HashMap<u32, u32>, BoardError> {
    let mut index = HashMap::with_capacity(jumps.len());

    for jump in jumps {
        let in_bounds = |cell: u32| (START_CELL..=max).contains(&cell);
        if !in_bounds(jump.start) || !in_bounds(jump.end) {
            return Err(BoardError::CellOutOfBounds {
                kind,
                start: jump.start,
                end: jump.end,
                max,
            });
        }

        match kind {
            JumpKind::Snake if jump.start <= jump.end => {
                return Err(BoardError::SnakeNotDescending {
                    start: jump.start,
                    end: jump.end,
                });
            }
            JumpKind::Ladder if jump.start >= jump.end => {
                return Err(BoardError::LadderNotAscending {
                    start: jump.start,
                    end: jump.end,
                });
            }
            _ => {}
        }

        if jump.start == START_CELL || jump.start == max {
            return Err(BoardError::ReservedCell {
                kind,
                cell: jump.start,
            });
        }

        if index.insert(jump.start, jump.end).is_some() {
            return Err(BoardError::DuplicateStart {
                kind,
                cell: jump.start,
            });
        }
    }

    Ok(index)
}
