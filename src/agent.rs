//! A search-driven agent that walks the grid collecting numbered tasks.

use std::collections::VecDeque;

use crate::grid::GridWorld;
use crate::search::{self, SearchOutcome};
use crate::types::{Coord, SearchMode, TaskId, manhattan};

/// Result of asking an agent to plan a route.
#[derive(Debug, PartialEq, Eq)]
pub enum PlanResult {
    /// A path was installed; `steps` is its length.
    Planned { steps: usize },
    /// No route exists; the agent stays idle.
    Unreachable,
}

/// One competitor: a position, a pending path, and a search mode.
pub struct SearchAgent {
    mode: SearchMode,
    position: Coord,
    path: VecDeque<Coord>,
    moving: bool,
    completed: u32,
    completed_tasks: Vec<TaskId>,
    steps_taken: u32,
    nodes_expanded: usize,
}

impl SearchAgent {
    /// Create an idle agent at `start`.
    pub fn new(start: Coord, mode: SearchMode) -> Self {
        Self {
            mode,
            position: start,
            path: VecDeque::new(),
            moving: false,
            completed: 0,
            completed_tasks: Vec::new(),
            steps_taken: 0,
            nodes_expanded: 0,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    /// Whether a planned path is still being walked.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Number of tasks this agent has collected.
    pub fn completed_count(&self) -> u32 {
        self.completed
    }

    /// Collected task ids in pickup order.
    pub fn completed_tasks(&self) -> &[TaskId] {
        &self.completed_tasks
    }

    /// Total cells moved across all routes.
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    /// Total frontier pops across all searches.
    pub fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    /// Nearest remaining task by Manhattan distance. Ties go to the
    /// lexicographically lowest coordinate. `None` when the grid is clear.
    pub fn find_nearest_task(&self, grid: &GridWorld) -> Option<Coord> {
        grid.tasks()
            .map(|(pos, _)| pos)
            .min_by_key(|&pos| (manhattan(self.position, pos), pos))
    }

    /// Run this agent's search mode toward `target` and install the result
    /// as the new pending path. On `Unreachable` the agent stays idle and
    /// keeps no stale path.
    pub fn plan_to(&mut self, grid: &GridWorld, target: Coord) -> PlanResult {
        let run = search::plan(grid, self.position, target, self.mode);
        self.nodes_expanded += run.expanded;
        match run.outcome {
            SearchOutcome::Found(path) => {
                let steps = path.len();
                self.path = VecDeque::from(path);
                self.moving = steps > 0;
                PlanResult::Planned { steps }
            }
            SearchOutcome::Unreachable => {
                self.path.clear();
                self.moving = false;
                PlanResult::Unreachable
            }
        }
    }

    /// Take one step along the pending path and collect a task if the new
    /// cell holds one. With no path left this is a no-op that parks the
    /// agent idle.
    pub fn advance(&mut self, grid: &mut GridWorld) -> Option<TaskId> {
        let Some(next) = self.path.pop_front() else {
            self.moving = false;
            return None;
        };
        self.position = next;
        self.steps_taken += 1;
        if self.path.is_empty() {
            self.moving = false;
        }
        // Task removal goes through the grid; the agent never edits cells.
        let picked = grid.pop_task(next);
        if let Some(id) = picked {
            self.completed += 1;
            self.completed_tasks.push(id);
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridWorld;

    #[test]
    fn nearest_task_prefers_shorter_manhattan_distance() {
        // Tasks at (0,0) -> id 1 and (0,5) -> id 2, agent at (0,2).
        let grid = GridWorld::from_layout(6, &[], &[(0, 0), (0, 5)]);
        let agent = SearchAgent::new((0, 2), SearchMode::Uninformed);
        assert_eq!(agent.find_nearest_task(&grid), Some((0, 0)));
    }

    #[test]
    fn nearest_task_breaks_ties_lexicographically() {
        // Both tasks sit two steps from (1,1).
        let grid = GridWorld::from_layout(4, &[], &[(2, 0), (0, 2)]);
        let agent = SearchAgent::new((1, 1), SearchMode::Heuristic);
        assert_eq!(agent.find_nearest_task(&grid), Some((0, 2)));
    }

    #[test]
    fn nearest_task_on_empty_grid_is_none() {
        let grid = GridWorld::from_layout(4, &[], &[]);
        let agent = SearchAgent::new((0, 0), SearchMode::Uninformed);
        assert_eq!(agent.find_nearest_task(&grid), None);
    }

    #[test]
    fn plan_and_walk_collects_the_task() {
        let mut grid = GridWorld::from_layout(5, &[], &[(4, 4)]);
        let mut agent = SearchAgent::new((0, 0), SearchMode::Heuristic);
        let target = agent.find_nearest_task(&grid).expect("task exists");
        assert_eq!(agent.plan_to(&grid, target), PlanResult::Planned { steps: 8 });
        assert!(agent.is_moving());

        let mut picked = None;
        while agent.is_moving() {
            if let Some(id) = agent.advance(&mut grid) {
                picked = Some(id);
            }
        }
        assert_eq!(picked, Some(1));
        assert_eq!(agent.position(), (4, 4));
        assert_eq!(agent.completed_count(), 1);
        assert_eq!(agent.completed_tasks(), &[1]);
        assert_eq!(agent.steps_taken(), 8);
        assert_eq!(grid.task_count(), 0);
    }

    #[test]
    fn tasks_crossed_en_route_are_picked_up() {
        // Task 1 at (2,0) lies on the straight line to task 2 at (4,0).
        let mut grid = GridWorld::from_layout(5, &[], &[(2, 0), (4, 0)]);
        let mut agent = SearchAgent::new((0, 0), SearchMode::Uninformed);
        assert_eq!(
            agent.plan_to(&grid, (4, 0)),
            PlanResult::Planned { steps: 4 }
        );
        while agent.is_moving() {
            agent.advance(&mut grid);
        }
        assert_eq!(agent.completed_tasks(), &[1, 2]);
        assert_eq!(grid.task_count(), 0);
    }

    #[test]
    fn advance_with_no_path_is_an_idle_no_op() {
        let mut grid = GridWorld::from_layout(3, &[], &[(2, 2)]);
        let mut agent = SearchAgent::new((1, 1), SearchMode::Uninformed);
        assert_eq!(agent.advance(&mut grid), None);
        assert_eq!(agent.position(), (1, 1));
        assert!(!agent.is_moving());
        assert_eq!(grid.task_count(), 1);
    }

    #[test]
    fn unreachable_target_leaves_the_agent_idle() {
        let box_walls = [(2, 3), (4, 3), (3, 2), (3, 4)];
        let grid = GridWorld::from_layout(6, &box_walls, &[(3, 3)]);
        let mut agent = SearchAgent::new((0, 0), SearchMode::Heuristic);
        // Nearest-task still offers the boxed-in cell.
        assert_eq!(agent.find_nearest_task(&grid), Some((3, 3)));
        assert_eq!(agent.plan_to(&grid, (3, 3)), PlanResult::Unreachable);
        assert!(!agent.is_moving());
        assert_eq!(agent.position(), (0, 0));
    }
}
