//! Shared identifiers and small enums used across the system.

/// Unique identifier for a task on the grid (1-based, placement order).
pub type TaskId = u32;
/// Grid coordinate as (x, y).
pub type Coord = (i32, i32);

/// What a single grid cell holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Barrier,
    Task,
}

/// Which priority the best-first search uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Priority is path cost alone (uniform cost search).
    Uninformed,
    /// Priority adds the Manhattan distance to the target (A*).
    Heuristic,
}

impl SearchMode {
    /// Short label for summaries and CSV output.
    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Uninformed => "UCS",
            SearchMode::Heuristic => "A*",
        }
    }
}

/// Manhattan distance between two cells.
pub fn manhattan(a: Coord, b: Coord) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_is_symmetric_and_axis_summed() {
        assert_eq!(manhattan((0, 0), (3, 4)), 7);
        assert_eq!(manhattan((3, 4), (0, 0)), 7);
        assert_eq!(manhattan((2, 2), (2, 2)), 0);
        assert_eq!(manhattan((-1, 0), (1, 0)), 2);
    }
}
