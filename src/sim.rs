//! Race, benchmark, and stress-test drivers for the UCS vs A* duel.

use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::agent::{PlanResult, SearchAgent};
use crate::grid::{GridError, GridWorld};
use crate::log_dev;
use crate::search::{self, SearchOutcome};
use crate::types::{CellState, Coord, SearchMode, manhattan};

// Demo defaults, small enough for readable terminal output.
const DEMO_GRID_SIZE: i32 = 12;
const DEMO_NUM_TASKS: usize = 6;
const DEMO_NUM_BARRIERS: usize = 20;
// Benchmark defaults.
const BENCH_GRID_SIZE: i32 = 20;
const BENCH_NUM_TASKS: usize = 10;
const BENCH_NUM_BARRIERS: usize = 30;

const CSV_HEADER: &str = "size,tasks,barriers,seed,ticks,ucs_completed,ucs_steps,\
ucs_expanded,astar_completed,astar_steps,astar_expanded,unassigned,elapsed_ms,\
cpu_user_s,cpu_sys_s,optimality_violation";

/// Best-effort CPU user/system time snapshot (seconds) on Unix platforms.
#[cfg(unix)]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    use libc::{RUSAGE_SELF, getrusage, rusage};
    let mut usage: rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { getrusage(RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    let user = usage.ru_utime.tv_sec as f64 + (usage.ru_utime.tv_usec as f64 / 1_000_000.0);
    let sys = usage.ru_stime.tv_sec as f64 + (usage.ru_stime.tv_usec as f64 / 1_000_000.0);
    Some((user, sys))
}

/// Stub on non-Unix platforms.
#[cfg(not(unix))]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    None
}

/// Per-agent slice of a finished race.
struct AgentReport {
    label: &'static str,
    completed: u32,
    completed_tasks: Vec<u32>,
    steps: u32,
    expanded: usize,
    position: Coord,
}

/// Everything a finished race can tell the presentation layer.
struct RaceReport {
    ticks: u64,
    unassigned: usize,
    optimality_violation: bool,
    agents: Vec<AgentReport>,
}

impl RaceReport {
    fn agent(&self, index: usize) -> &AgentReport {
        &self.agents[index]
    }
}

/// Nearest assignable task for an idle agent, skipping coordinates the
/// agent has already failed to reach.
fn next_target(agent: &SearchAgent, grid: &GridWorld, blocked: &HashSet<Coord>) -> Option<Coord> {
    if blocked.is_empty() {
        return agent.find_nearest_task(grid);
    }
    grid.tasks()
        .map(|(pos, _)| pos)
        .filter(|pos| !blocked.contains(pos))
        .min_by_key(|&pos| (manhattan(agent.position(), pos), pos))
}

/// Plan the same leg under the other mode and compare path costs. Both
/// searches are optimal, so any difference is a bug.
fn leg_is_optimal(grid: &GridWorld, agent: &SearchAgent, target: Coord, steps: usize) -> bool {
    let other = match agent.mode() {
        SearchMode::Uninformed => SearchMode::Heuristic,
        SearchMode::Heuristic => SearchMode::Uninformed,
    };
    match search::plan(grid, agent.position(), target, other).outcome {
        SearchOutcome::Found(path) => path.len() == steps,
        SearchOutcome::Unreachable => false,
    }
}

/// Run one full race to completion: a UCS agent from the top-left corner
/// and an A* agent from the bottom-right, clearing tasks until none remain
/// or every leftover task is unreachable for both.
fn race_once(
    size: i32,
    num_tasks: usize,
    num_barriers: usize,
    seed: u64,
    tick: Duration,
    validate: bool,
) -> Result<RaceReport, GridError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = GridWorld::generate(size, num_tasks, num_barriers, &mut rng)?;
    log_grid(&grid);

    let mut agents = [
        SearchAgent::new((0, 0), SearchMode::Uninformed),
        SearchAgent::new((size - 1, size - 1), SearchMode::Heuristic),
    ];
    // Per-agent coordinates proven unreachable; never retried.
    let mut blocked: [HashSet<Coord>; 2] = [HashSet::new(), HashSet::new()];
    let mut optimality_violation = false;

    let mut ticks = 0u64;
    loop {
        if grid.task_count() == 0 && agents.iter().all(|agent| !agent.is_moving()) {
            break;
        }
        ticks += 1;
        let mut progressed = false;
        for (agent, blocked) in agents.iter_mut().zip(blocked.iter_mut()) {
            let label = agent.mode().label();
            if agent.is_moving() {
                if let Some(id) = agent.advance(&mut grid) {
                    log_dev!("[{label}] picked task {id} at {:?}", agent.position());
                }
                progressed = true;
                continue;
            }
            let Some(target) = next_target(agent, &grid, blocked) else {
                continue;
            };
            match agent.plan_to(&grid, target) {
                PlanResult::Planned { steps } if steps > 0 => {
                    log_dev!("[{label}] planned {steps} steps to {target:?}");
                    if validate && !leg_is_optimal(&grid, agent, target, steps) {
                        optimality_violation = true;
                    }
                    progressed = true;
                }
                PlanResult::Planned { .. } => {
                    // Standing on the target; a zero-step path cannot
                    // trigger pickup, so stop offering this cell.
                    log_dev!("[{label}] zero-step plan for {target:?}, skipping");
                    blocked.insert(target);
                }
                PlanResult::Unreachable => {
                    log_dev!("[{label}] no path to {target:?}, leaving it");
                    blocked.insert(target);
                }
            }
        }

        if !progressed {
            log_dev!("[RACE] no agent can make progress, stopping");
            break;
        }
        if !tick.is_zero() {
            thread::sleep(tick);
        }
    }

    let agents = agents
        .into_iter()
        .map(|agent| AgentReport {
            label: agent.mode().label(),
            completed: agent.completed_count(),
            completed_tasks: agent.completed_tasks().to_vec(),
            steps: agent.steps_taken(),
            expanded: agent.nodes_expanded(),
            position: agent.position(),
        })
        .collect();
    Ok(RaceReport {
        ticks,
        unassigned: grid.task_count(),
        optimality_violation,
        agents,
    })
}

/// Dump the initial layout to the dev log, one row per line.
fn log_grid(grid: &GridWorld) {
    for y in 0..grid.size() {
        let row: String = (0..grid.size())
            .map(|x| match grid.cell((x, y)) {
                Some(CellState::Barrier) => '#',
                Some(CellState::Task) => 'T',
                _ => '.',
            })
            .collect();
        log_dev!("[GRID] {row}");
    }
}

/// Run the default demo race and print a human-readable summary.
pub fn run_demo(
    size: Option<i32>,
    num_tasks: Option<usize>,
    num_barriers: Option<usize>,
    seed: Option<u64>,
    tick_ms: Option<u64>,
) {
    let size = size.unwrap_or(DEMO_GRID_SIZE);
    let num_tasks = num_tasks.unwrap_or(DEMO_NUM_TASKS);
    let num_barriers = num_barriers.unwrap_or(DEMO_NUM_BARRIERS);
    let seed = seed.unwrap_or_else(rand::random);
    let tick = Duration::from_millis(tick_ms.unwrap_or(0));
    if size <= 0 {
        eprintln!("demo error: size must be > 0");
        std::process::exit(1);
    }

    log_dev!("[RACE] start seed={seed}");
    let start = Instant::now();
    let report = match race_once(size, num_tasks, num_barriers, seed, tick, false) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("demo error: {err}");
            std::process::exit(1);
        }
    };
    log_dev!(
        "[RACE] finished in {}ms (dev logs suppressed in release mode)",
        start.elapsed().as_millis()
    );

    println!("RACE SUMMARY");
    println!("size={size} tasks={num_tasks} barriers={num_barriers} seed={seed}");
    println!("ticks={}", report.ticks);
    for agent in &report.agents {
        println!(
            "{}: completed={} steps={} expanded={} position={:?} ids={:?}",
            agent.label,
            agent.completed,
            agent.steps,
            agent.expanded,
            agent.position,
            agent.completed_tasks
        );
    }
    println!("tasks_unassigned={}", report.unassigned);
}

/// Format one CSV row from a finished race.
fn csv_row(
    size: i32,
    num_tasks: usize,
    num_barriers: usize,
    seed: u64,
    report: &RaceReport,
    elapsed_ms: f64,
    cpu: (Option<f64>, Option<f64>),
) -> String {
    let fmt_cpu = |value: Option<f64>| {
        value
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "NA".to_string())
    };
    let ucs = report.agent(0);
    let astar = report.agent(1);
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{:.2},{},{},{}",
        size,
        num_tasks,
        num_barriers,
        seed,
        report.ticks,
        ucs.completed,
        ucs.steps,
        ucs.expanded,
        astar.completed,
        astar.steps,
        astar.expanded,
        report.unassigned,
        elapsed_ms,
        fmt_cpu(cpu.0),
        fmt_cpu(cpu.1),
        report.optimality_violation
    )
}

/// Race once without tick delays and print one CSV row.
fn benchmark_once(
    size: i32,
    num_tasks: usize,
    num_barriers: usize,
    seed: u64,
    validate: bool,
) -> Result<(), GridError> {
    let cpu_start = cpu_times_seconds();
    let start = Instant::now();
    let report = race_once(size, num_tasks, num_barriers, seed, Duration::ZERO, validate)?;
    let elapsed_ms = start.elapsed().as_millis() as f64;
    let cpu = match (cpu_start, cpu_times_seconds()) {
        (Some((user_start, sys_start)), Some((user_end, sys_end))) => {
            (Some(user_end - user_start), Some(sys_end - sys_start))
        }
        _ => (None, None),
    };
    println!(
        "{}",
        csv_row(size, num_tasks, num_barriers, seed, &report, elapsed_ms, cpu)
    );
    if report.unassigned > 0 {
        eprintln!("# warning,unassigned_tasks,{}", report.unassigned);
    }
    if validate && report.optimality_violation {
        eprintln!("# violation,optimality");
    }
    Ok(())
}

/// Run a single benchmark race with optional parameter overrides.
pub fn run_benchmark(
    size: Option<i32>,
    num_tasks: Option<usize>,
    num_barriers: Option<usize>,
    seed: Option<u64>,
    validate: bool,
) {
    let size = size.unwrap_or(BENCH_GRID_SIZE);
    let num_tasks = num_tasks.unwrap_or(BENCH_NUM_TASKS);
    let num_barriers = num_barriers.unwrap_or(BENCH_NUM_BARRIERS);
    let seed = seed.unwrap_or_else(rand::random);
    if size <= 0 {
        eprintln!("benchmark error: size must be > 0");
        std::process::exit(1);
    }
    println!("{CSV_HEADER}");
    if let Err(err) = benchmark_once(size, num_tasks, num_barriers, seed, validate) {
        eprintln!("benchmark error: {err}");
        std::process::exit(1);
    }
}

/// Sweep size, task, and barrier sets and print CSV output. Each
/// combination derives its seed from the base seed so runs reproduce.
pub fn run_stress(
    size_sets: Option<Vec<i32>>,
    task_sets: Option<Vec<usize>>,
    barrier_sets: Option<Vec<usize>>,
    seed: Option<u64>,
    validate: bool,
) {
    // Every default combination fits the smallest grid (20 + 60 <= 100).
    let default_size_sets = [10i32, 20, 40];
    let default_task_sets = [5usize, 10, 20];
    let default_barrier_sets = [0usize, 30, 60];

    let size_sets = size_sets.unwrap_or_else(|| default_size_sets.to_vec());
    let task_sets = task_sets.unwrap_or_else(|| default_task_sets.to_vec());
    let barrier_sets = barrier_sets.unwrap_or_else(|| default_barrier_sets.to_vec());
    let base_seed = seed.unwrap_or_else(rand::random);
    if size_sets.iter().any(|&size| size <= 0) {
        eprintln!("stress error: size_sets must be > 0");
        std::process::exit(1);
    }

    println!("{CSV_HEADER}");
    let mut combo = 0u64;
    let mut failures = 0usize;
    for &size in &size_sets {
        for &num_tasks in &task_sets {
            for &num_barriers in &barrier_sets {
                let seed = base_seed.wrapping_add(combo);
                combo += 1;
                if let Err(err) = benchmark_once(size, num_tasks, num_barriers, seed, validate) {
                    // Overfull combinations are reported; the sweep goes on
                    // but the process still exits nonzero.
                    eprintln!("# error,{size},{num_tasks},{num_barriers},{err}");
                    failures += 1;
                }
            }
        }
    }
    if failures > 0 {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_clears_every_task_on_an_open_grid() {
        let report = race_once(8, 4, 0, 5, Duration::ZERO, true).expect("race");
        let total: u32 = report.agents.iter().map(|agent| agent.completed).sum();
        assert_eq!(total, 4);
        assert_eq!(report.unassigned, 0);
        assert!(!report.optimality_violation);
    }

    #[test]
    fn race_terminates_with_heavy_barriers() {
        // Barrier-dense worlds may wall tasks off; the race must still end,
        // with every task either collected or left unassigned.
        let report = race_once(9, 5, 40, 77, Duration::ZERO, false).expect("race");
        let total: u32 = report.agents.iter().map(|agent| agent.completed).sum();
        assert_eq!(total as usize + report.unassigned, 5);
    }

    #[test]
    fn race_is_deterministic_for_a_seed() {
        let first = race_once(10, 6, 15, 123, Duration::ZERO, false).expect("race");
        let second = race_once(10, 6, 15, 123, Duration::ZERO, false).expect("race");
        assert_eq!(first.ticks, second.ticks);
        for (a, b) in first.agents.iter().zip(second.agents.iter()) {
            assert_eq!(a.completed_tasks, b.completed_tasks);
            assert_eq!(a.steps, b.steps);
            assert_eq!(a.expanded, b.expanded);
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn race_with_no_tasks_takes_no_ticks() {
        let report = race_once(5, 0, 0, 1, Duration::ZERO, false).expect("race");
        assert_eq!(report.ticks, 0);
        assert_eq!(report.unassigned, 0);
        assert!(report.agents.iter().all(|agent| agent.completed == 0));
    }

    #[test]
    fn overfull_config_surfaces_a_grid_error() {
        let err = match race_once(3, 9, 9, 1, Duration::ZERO, false) {
            Err(err) => err,
            Ok(_) => panic!("overfull config must fail"),
        };
        assert!(matches!(err, GridError::CapacityExceeded { .. }));
    }
}
