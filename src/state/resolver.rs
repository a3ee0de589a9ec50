//! Snake and ladder transition resolution.
//!
//! A landing cell is chased through every snake or ladder it starts until
//! the token comes to rest. A validated board can still contain a jump
//! cycle (a snake 20->5 paired with a ladder 5->20), so the chase tracks the
//! cells it has visited and stops before entering one twice.

use std::collections::HashSet;

use super::board::Board;

/// Where a chase came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub cell: u32,
    /// Number of jumps taken
    pub jumps: u32,
}

/// A jump cycle was found during resolution.
///
/// Recoverable: `stopped_at` is the cell reached just before the chase would
/// have revisited `entry`, and is used as the resting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("jump cycle through cell {entry}, stopped at {stopped_at}")]
pub struct MalformedBoard {
    pub entry: u32,
    pub stopped_at: u32,
}

/// Chase jumps from `cell` until it rests.
pub fn resolve(board: &Board, cell: u32) -> Result<Landing, MalformedBoard> {
    let mut visited = HashSet::from([cell]);
    let mut current = cell;
    let mut jumps = 0;

    while let Some((_, end)) = board.jump_from(current) {
        if !visited.insert(end) {
            return Err(MalformedBoard {
                entry: end,
                stopped_at: current,
            });
        }
        current = end;
        jumps += 1;
    }

    Ok(Landing {
        cell: current,
        jumps,
    })
}

/// Outcome of moving a token by one dice value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: u32,
    pub dice: u8,
    /// Landing cell before any jump
    pub raw: u32,
    pub to: u32,
    pub transition_applied: bool,
    /// The roll overshot the last cell and the token stayed put
    pub wasted: bool,
}

/// Move a token from `from` by `dice` and resolve the landing.
///
/// A roll past the last cell is wasted, not rejected. A jump cycle is logged
/// and the cell before the repeat becomes the resting cell.
pub fn advance(board: &Board, from: u32, dice: u8) -> Step {
    let raw = from + u32::from(dice);

    if raw > board.last_cell() {
        return Step {
            from,
            dice,
            raw,
            to: from,
            transition_applied: false,
            wasted: true,
        };
    }

    let (to, transition_applied) = match resolve(board, raw) {
        Ok(landing) => (landing.cell, landing.jumps > 0),
        Err(err) => {
            tracing::warn!(from, dice, raw, entry = err.entry, stopped_at = err.stopped_at, "malformed board: {err}");
            (err.stopped_at, true)
        }
    };

    Step {
        from,
        dice,
        raw,
        to,
        transition_applied,
        wasted: false,
    }
}
