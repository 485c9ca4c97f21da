#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* pathfinding over a walkability snapshot.
//!
//! The search is fully deterministic: the frontier is scanned linearly for
//! the smallest f-score with strict `<` so the earliest-inserted node wins
//! ties, and neighbors expand in Up, Left, Right, Down order. Step cost is
//! 1.0 per orthogonal move and the heuristic is the Manhattan distance, so
//! returned paths are always shortest.

use storm_arena_core::{Direction, GridPos};

/// Dense boolean snapshot of which cells admit movement.
#[derive(Clone, Debug)]
pub struct WalkabilityGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl WalkabilityGrid {
    /// Creates a grid with every cell walkable.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let count = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            cells: vec![true; count],
        }
    }

    /// Creates a grid by sampling the predicate for every cell.
    #[must_use]
    pub fn from_fn<F>(width: i32, height: i32, mut walkable: F) -> Self
    where
        F: FnMut(GridPos) -> bool,
    {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let position = GridPos::new(x, y);
                grid.set_walkable(position, walkable(position));
            }
        }
        grid
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Overwrites the walkability of a cell. Out-of-bounds cells are ignored.
    pub fn set_walkable(&mut self, position: GridPos, walkable: bool) {
        if let Some(index) = self.index(position) {
            self.cells[index] = walkable;
        }
    }

    /// Whether the cell admits movement. Out-of-bounds cells never do.
    #[must_use]
    pub fn is_walkable(&self, position: GridPos) -> bool {
        self.index(position)
            .map_or(false, |index| self.cells[index])
    }

    fn index(&self, position: GridPos) -> Option<usize> {
        if (0..self.width).contains(&position.x()) && (0..self.height).contains(&position.y()) {
            Some((position.y() as usize) * (self.width as usize) + position.x() as usize)
        } else {
            None
        }
    }

    fn position(&self, index: usize) -> GridPos {
        let width = self.width as usize;
        GridPos::new((index % width) as i32, (index / width) as i32)
    }
}

const EXPANSION_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Right,
    Direction::Down,
];

/// Shortest path from `start` to `goal`, excluding the start cell and
/// including the goal cell.
///
/// Returns an empty path when the goal is unreachable, when either endpoint
/// is unwalkable or out of bounds, or when `start == goal`.
#[must_use]
pub fn shortest_path(grid: &WalkabilityGrid, start: GridPos, goal: GridPos) -> Vec<GridPos> {
    if start == goal || !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return Vec::new();
    }
    let Some(start_index) = grid.index(start) else {
        return Vec::new();
    };
    let Some(goal_index) = grid.index(goal) else {
        return Vec::new();
    };

    let cell_count = grid.cells.len();
    let mut g_scores = vec![0.0_f64; cell_count];
    let mut f_scores = vec![0.0_f64; cell_count];
    let mut parents: Vec<Option<usize>> = vec![None; cell_count];
    let mut in_open = vec![false; cell_count];
    let mut closed = vec![false; cell_count];
    let mut open: Vec<usize> = Vec::new();

    in_open[start_index] = true;
    open.push(start_index);

    let mut found = false;
    while !open.is_empty() {
        let mut best = 0;
        for offset in 1..open.len() {
            if f_scores[open[offset]] < f_scores[open[best]] {
                best = offset;
            }
        }
        let current = open.remove(best);
        in_open[current] = false;
        closed[current] = true;
        if current == goal_index {
            found = true;
            break;
        }
        let current_position = grid.position(current);
        for direction in EXPANSION_ORDER {
            let neighbor_position = current_position.step(direction);
            if !grid.is_walkable(neighbor_position) {
                continue;
            }
            let Some(neighbor) = grid.index(neighbor_position) else {
                continue;
            };
            if closed[neighbor] {
                continue;
            }
            let tentative_g = g_scores[current] + 1.0;
            let tentative_f =
                tentative_g + f64::from(neighbor_position.manhattan_distance(goal));
            if tentative_f < f_scores[neighbor] || !in_open[neighbor] {
                g_scores[neighbor] = tentative_g;
                f_scores[neighbor] = tentative_f;
                parents[neighbor] = Some(current);
                if !in_open[neighbor] {
                    in_open[neighbor] = true;
                    open.push(neighbor);
                }
            }
        }
    }

    if !found {
        return Vec::new();
    }
    let mut path = Vec::new();
    let mut cursor = goal_index;
    while cursor != start_index {
        path.push(grid.position(cursor));
        match parents[cursor] {
            Some(parent) => cursor = parent,
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// Whether a non-empty path exists from `start` to `goal`.
#[must_use]
pub fn is_reachable(grid: &WalkabilityGrid, start: GridPos, goal: GridPos) -> bool {
    !shortest_path(grid, start, goal).is_empty()
}
