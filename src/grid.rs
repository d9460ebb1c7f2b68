//! Grid world: barriers, numbered tasks, and movement queries.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use thiserror::Error;

use crate::types::{CellState, Coord, TaskId};

/// Neighbor expansion order. Fixed so search tie-breaking stays reproducible.
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Rejection-sampling attempts allowed per cell before construction fails.
const PLACEMENT_ATTEMPTS_PER_CELL: usize = 64;

/// Errors raised while constructing a grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// More tasks and barriers requested than cells exist.
    #[error("requested {requested} placements but the grid has {available} cells")]
    CapacityExceeded { requested: usize, available: usize },
    /// The sampler ran out of retries before filling every placement.
    #[error("placement gave up after {attempts} sampling attempts")]
    PlacementBudget { attempts: usize },
}

/// An NxN world of empty, barrier, and task cells. Immutable after
/// construction except for task removal through [`GridWorld::pop_task`].
#[derive(Debug)]
pub struct GridWorld {
    size: i32,
    cells: Vec<CellState>,
    barriers: HashSet<Coord>,
    // BTreeMap so iteration (and therefore nearest-task tie-breaking)
    // is lexicographic by coordinate.
    tasks: BTreeMap<Coord, TaskId>,
}

impl GridWorld {
    /// Build a world by placing `num_tasks` tasks and then `num_barriers`
    /// barriers at distinct uniformly-random empty cells. Task ids are
    /// assigned 1..=num_tasks in placement order.
    pub fn generate<R: Rng>(
        size: i32,
        num_tasks: usize,
        num_barriers: usize,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        debug_assert!(size > 0, "grid size must be > 0");
        let available = (size as usize) * (size as usize);
        let requested = num_tasks + num_barriers;
        if requested > available {
            return Err(GridError::CapacityExceeded {
                requested,
                available,
            });
        }

        let mut world = Self {
            size,
            cells: vec![CellState::Empty; available],
            barriers: HashSet::new(),
            tasks: BTreeMap::new(),
        };

        let budget = available.saturating_mul(PLACEMENT_ATTEMPTS_PER_CELL);
        let mut attempts = 0usize;
        for id in 1..=num_tasks as TaskId {
            let pos = world.sample_empty(rng, budget, &mut attempts)?;
            let idx = world.index(pos);
            world.cells[idx] = CellState::Task;
            world.tasks.insert(pos, id);
        }
        for _ in 0..num_barriers {
            let pos = world.sample_empty(rng, budget, &mut attempts)?;
            let idx = world.index(pos);
            world.cells[idx] = CellState::Barrier;
            world.barriers.insert(pos);
        }
        Ok(world)
    }

    /// Draw random coordinates until an empty cell turns up or the shared
    /// retry budget runs out.
    fn sample_empty<R: Rng>(
        &self,
        rng: &mut R,
        budget: usize,
        attempts: &mut usize,
    ) -> Result<Coord, GridError> {
        loop {
            if *attempts >= budget {
                return Err(GridError::PlacementBudget { attempts: *attempts });
            }
            *attempts += 1;
            let pos = (rng.gen_range(0..self.size), rng.gen_range(0..self.size));
            if self.cells[self.index(pos)] == CellState::Empty {
                return Ok(pos);
            }
        }
    }

    /// Build a world with a fixed layout, for deterministic tests.
    #[cfg(test)]
    pub fn from_layout(size: i32, barriers: &[Coord], tasks: &[Coord]) -> Self {
        let mut world = Self {
            size,
            cells: vec![CellState::Empty; (size as usize) * (size as usize)],
            barriers: HashSet::new(),
            tasks: BTreeMap::new(),
        };
        for &pos in barriers {
            let idx = world.index(pos);
            world.cells[idx] = CellState::Barrier;
            world.barriers.insert(pos);
        }
        for (offset, &pos) in tasks.iter().enumerate() {
            let idx = world.index(pos);
            world.cells[idx] = CellState::Task;
            world.tasks.insert(pos, offset as TaskId + 1);
        }
        world
    }

    fn index(&self, pos: Coord) -> usize {
        debug_assert!(self.in_bounds(pos), "coordinate out of bounds");
        (pos.1 * self.size + pos.0) as usize
    }

    /// Side length of the square grid.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Whether a coordinate lies inside the grid.
    pub fn in_bounds(&self, pos: Coord) -> bool {
        pos.0 >= 0 && pos.0 < self.size && pos.1 >= 0 && pos.1 < self.size
    }

    /// Whether a coordinate is free of barriers.
    pub fn is_passable(&self, pos: Coord) -> bool {
        !self.barriers.contains(&pos)
    }

    /// Cell content at a coordinate; `None` when out of bounds.
    pub fn cell(&self, pos: Coord) -> Option<CellState> {
        if self.in_bounds(pos) {
            Some(self.cells[self.index(pos)])
        } else {
            None
        }
    }

    /// The 4-adjacent cells of `pos` that are in bounds and passable,
    /// in +x, -x, +y, -y order.
    pub fn neighbors(&self, pos: Coord) -> Vec<Coord> {
        let mut result = Vec::with_capacity(DIRECTIONS.len());
        for (dx, dy) in DIRECTIONS {
            let next = (pos.0 + dx, pos.1 + dy);
            if self.in_bounds(next) && self.is_passable(next) {
                result.push(next);
            }
        }
        result
    }

    /// Cost of moving between two adjacent cells. Constant for now; the
    /// seam exists for variable terrain cost later.
    pub fn step_cost(&self, _from: Coord, _to: Coord) -> u32 {
        1
    }

    /// Remove the task at `pos` and return its id, if one is there. This
    /// is the only way tasks leave the grid.
    pub fn pop_task(&mut self, pos: Coord) -> Option<TaskId> {
        let id = self.tasks.remove(&pos)?;
        let idx = self.index(pos);
        self.cells[idx] = CellState::Empty;
        Some(id)
    }

    /// Number of tasks still on the grid.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Remaining tasks in lexicographic coordinate order.
    pub fn tasks(&self) -> impl Iterator<Item = (Coord, TaskId)> + '_ {
        self.tasks.iter().map(|(&pos, &id)| (pos, id))
    }
}
