//! Minimum-throws search.
//!
//! The move graph has an edge from `cell` for every die face that stays on
//! the board, landing where the resolver says the token comes to rest. All
//! three searches walk the same graph and must agree.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

use crate::state::board::{Board, START_CELL};
use crate::state::dice::DICE_FACES;
use crate::state::resolver::resolve;

use super::PathStep;

/// Search algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Bfs,
    Dijkstra,
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Self::Bfs, Self::Dijkstra, Self::AStar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "BFS",
            Self::Dijkstra => "Dijkstra",
            Self::AStar => "A*",
        }
    }

    /// Minimum throws from the first to the last cell.
    pub fn solve(&self, board: &Board) -> Option<u32> {
        match self {
            Self::Bfs => bfs(board),
            Self::Dijkstra => dijkstra(board),
            Self::AStar => a_star(board),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(face, resting cell)` for every legal throw from `cell`.
fn moves(board: &Board, cell: u32) -> impl Iterator<Item = (u8, u32)> + '_ {
    (1..=DICE_FACES).filter_map(move |face| {
        let raw = cell + u32::from(face);
        if raw > board.last_cell() {
            return None;
        }
        let rest = resolve(board, raw).map_or_else(|cycle| cycle.stopped_at, |landing| landing.cell);
        Some((face, rest))
    })
}

pub fn bfs(board: &Board) -> Option<u32> {
    let target = board.last_cell();
    let mut visited = vec![false; target as usize + 1];
    let mut queue = VecDeque::from([(START_CELL, 0u32)]);
    visited[START_CELL as usize] = true;

    while let Some((cell, dist)) = queue.pop_front() {
        if cell == target {
            return Some(dist);
        }
        for (_, next) in moves(board, cell) {
            if !visited[next as usize] {
                visited[next as usize] = true;
                queue.push_back((next, dist + 1));
            }
        }
    }
    None
}

pub fn dijkstra(board: &Board) -> Option<u32> {
    let target = board.last_cell();
    let mut dist = vec![u32::MAX; target as usize + 1];
    let mut heap = BinaryHeap::from([Reverse((0u32, START_CELL))]);
    dist[START_CELL as usize] = 0;

    while let Some(Reverse((d, cell))) = heap.pop() {
        if d > dist[cell as usize] {
            continue;
        }
        if cell == target {
            return Some(d);
        }
        for (_, next) in moves(board, cell) {
            if d + 1 < dist[next as usize] {
                dist[next as usize] = d + 1;
                heap.push(Reverse((d + 1, next)));
            }
        }
    }
    None
}

/// Throws needed assuming every throw is a six. Never overestimates.
fn heuristic(cell: u32, target: u32) -> u32 {
    target.saturating_sub(cell).div_ceil(u32::from(DICE_FACES))
}

pub fn a_star(board: &Board) -> Option<u32> {
    let target = board.last_cell();
    let mut g_score = vec![u32::MAX; target as usize + 1];
    let mut heap = BinaryHeap::from([Reverse((heuristic(START_CELL, target), 0u32, START_CELL))]);
    g_score[START_CELL as usize] = 0;

    while let Some(Reverse((_, g, cell))) = heap.pop() {
        if g > g_score[cell as usize] {
            continue;
        }
        if cell == target {
            return Some(g);
        }
        for (_, next) in moves(board, cell) {
            let tentative = g + 1;
            if tentative < g_score[next as usize] {
                g_score[next as usize] = tentative;
                heap.push(Reverse((tentative + heuristic(next, target), tentative, next)));
            }
        }
    }
    None
}

/// One optimal throw sequence, found by BFS.
pub fn shortest_path(board: &Board) -> Option<Vec<PathStep>> {
    let target = board.last_cell();
    // cell -> (previous cell, face thrown)
    let mut parent: Vec<Option<(u32, u8)>> = vec![None; target as usize + 1];
    let mut visited = vec![false; target as usize + 1];
    let mut queue = VecDeque::from([START_CELL]);
    visited[START_CELL as usize] = true;

    while let Some(cell) = queue.pop_front() {
        if cell == target {
            break;
        }
        for (face, next) in moves(board, cell) {
            if !visited[next as usize] {
                visited[next as usize] = true;
                parent[next as usize] = Some((cell, face));
                queue.push_back(next);
            }
        }
    }

    if !visited[target as usize] {
        return None;
    }

    let mut path = Vec::new();
    let mut cell = target;
    while let Some((prev, face)) = parent[cell as usize] {
        path.push(PathStep {
            cell,
            dice_roll: face,
        });
        cell = prev;
    }
    path.reverse();
    Some(path)
}
