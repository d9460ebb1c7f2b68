//! Generalized best-first search. UCS and A* share one implementation and
//! differ only in whether the heuristic term joins the priority.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::GridWorld;
use crate::types::{Coord, SearchMode, manhattan};

/// What a planning call produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Forward path from start to target; excludes start, includes target.
    Found(Vec<Coord>),
    /// The frontier drained before the target came up.
    Unreachable,
}

/// Outcome of a search plus how much work it took.
#[derive(Debug)]
pub struct SearchRun {
    pub outcome: SearchOutcome,
    /// Nodes popped from the frontier.
    pub expanded: usize,
}

/// Plan a path from `start` to `target`. With [`SearchMode::Uninformed`]
/// the priority is path cost alone (uniform cost search); with
/// [`SearchMode::Heuristic`] the Manhattan distance to the target is added
/// (A*). Both return cost-optimal paths on a unit-cost 4-connected grid.
pub fn plan(grid: &GridWorld, start: Coord, target: Coord, mode: SearchMode) -> SearchRun {
    let h = |pos: Coord| match mode {
        SearchMode::Uninformed => 0,
        SearchMode::Heuristic => manhattan(pos, target),
    };

    // Reverse turns the max-heap into a min-heap; keeping the coordinate in
    // the key makes equal-priority pops deterministic.
    let mut frontier: BinaryHeap<Reverse<(u32, Coord)>> = BinaryHeap::new();
    let mut cost_so_far: HashMap<Coord, u32> = HashMap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();

    frontier.push(Reverse((h(start), start)));
    cost_so_far.insert(start, 0);

    let mut expanded = 0usize;
    let mut reached = false;
    while let Some(Reverse((_, current))) = frontier.pop() {
        expanded += 1;
        if current == target {
            reached = true;
            break;
        }
        // Every pushed node has an entry; stale heap duplicates only ever
        // see an equal-or-better recorded cost.
        let current_cost = cost_so_far[&current];
        for next in grid.neighbors(current) {
            let new_cost = current_cost + grid.step_cost(current, next);
            let improved = match cost_so_far.get(&next) {
                Some(&known) => new_cost < known,
                None => true,
            };
            if improved {
                cost_so_far.insert(next, new_cost);
                frontier.push(Reverse((new_cost + h(next), next)));
                came_from.insert(next, current);
            }
        }
    }

    if !reached {
        return SearchRun {
            outcome: SearchOutcome::Unreachable,
            expanded,
        };
    }

    // Walk predecessors back from the target, then flip to forward order.
    let mut path = Vec::new();
    let mut current = target;
    while current != start {
        path.push(current);
        current = came_from[&current];
    }
    path.reverse();
    SearchRun {
        outcome: SearchOutcome::Found(path),
        expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridWorld;
    use crate::types::CellState;

    const MODES: [SearchMode; 2] = [SearchMode::Uninformed, SearchMode::Heuristic];

    fn found(run: SearchRun) -> Vec<Coord> {
        match run.outcome {
            SearchOutcome::Found(path) => path,
            SearchOutcome::Unreachable => panic!("expected a path"),
        }
    }

    /// Every step must be 4-adjacent, passable, and end on the target.
    fn assert_walkable(grid: &GridWorld, start: Coord, target: Coord, path: &[Coord]) {
        let mut previous = start;
        for &step in path {
            assert_eq!(manhattan(previous, step), 1, "steps must be adjacent");
            assert!(grid.is_passable(step), "path crosses a barrier");
            assert!(grid.in_bounds(step));
            previous = step;
        }
        assert_eq!(previous, target);
    }

    #[test]
    fn open_grid_diagonal_costs_manhattan_in_both_modes() {
        let grid = GridWorld::from_layout(5, &[], &[]);
        for mode in MODES {
            let path = found(plan(&grid, (0, 0), (4, 4), mode));
            assert_eq!(path.len(), 8, "{} path length", mode.label());
            assert_walkable(&grid, (0, 0), (4, 4), &path);
        }
    }

    #[test]
    fn detour_around_wall_costs_the_same_in_both_modes() {
        // Vertical wall with a gap at the bottom row.
        let wall: Vec<Coord> = (1..5).map(|y| (2, y)).collect();
        let grid = GridWorld::from_layout(5, &wall, &[]);
        let ucs = found(plan(&grid, (0, 4), (4, 4), SearchMode::Uninformed));
        let astar = found(plan(&grid, (0, 4), (4, 4), SearchMode::Heuristic));
        assert_eq!(ucs.len(), astar.len(), "both modes must be optimal");
        assert_walkable(&grid, (0, 4), (4, 4), &ucs);
        assert_walkable(&grid, (0, 4), (4, 4), &astar);
        // Forced through the gap at (2, 0): 4 down, 4 across, 4 up.
        assert_eq!(ucs.len(), 12);
    }

    #[test]
    fn heuristic_mode_expands_fewer_nodes_on_a_straight_run() {
        let grid = GridWorld::from_layout(7, &[], &[]);
        let ucs = plan(&grid, (0, 0), (6, 0), SearchMode::Uninformed);
        let astar = plan(&grid, (0, 0), (6, 0), SearchMode::Heuristic);
        let (ucs_expanded, astar_expanded) = (ucs.expanded, astar.expanded);
        assert_eq!(found(ucs).len(), 6);
        assert_eq!(found(astar).len(), 6);
        assert!(
            astar_expanded < ucs_expanded,
            "A* expanded {astar_expanded} vs UCS {ucs_expanded}"
        );
    }

    #[test]
    fn enclosed_target_reports_unreachable() {
        // Task cell at (3, 3) boxed in by barriers on all four sides.
        let box_walls = [(2, 3), (4, 3), (3, 2), (3, 4)];
        let grid = GridWorld::from_layout(6, &box_walls, &[(3, 3)]);
        assert_eq!(grid.cell((3, 3)), Some(CellState::Task));
        for mode in MODES {
            let run = plan(&grid, (0, 0), (3, 3), mode);
            assert_eq!(run.outcome, SearchOutcome::Unreachable, "{}", mode.label());
        }
    }

    #[test]
    fn target_equal_to_start_yields_empty_path() {
        let grid = GridWorld::from_layout(3, &[], &[]);
        for mode in MODES {
            let path = found(plan(&grid, (1, 1), (1, 1), mode));
            assert!(path.is_empty());
        }
    }
}
