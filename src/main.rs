mod agent;
mod grid;
mod logging;
mod search;
mod sim;
mod types;

fn parse_i32_list(arg: &str) -> Option<Vec<i32>> {
    if arg == "-" {
        return None;
    }
    let mut values = Vec::new();
    for part in arg.split(',') {
        if part.trim().is_empty() {
            return None;
        }
        let value = part.trim().parse::<i32>().ok()?;
        values.push(value);
    }
    Some(values)
}

fn parse_usize_list(arg: &str) -> Option<Vec<usize>> {
    if arg == "-" {
        return None;
    }
    let mut values = Vec::new();
    for part in arg.split(',') {
        if part.trim().is_empty() {
            return None;
        }
        let value = part.trim().parse::<usize>().ok()?;
        values.push(value);
    }
    Some(values)
}

fn print_usage(program: &str) {
    println!("Grid Duel CLI — UCS vs A* pathfinding race");
    println!("Usage:");
    println!("  {program} (run demo)");
    println!("  {program} demo [size] [tasks] [barriers] [seed] [tick_ms]");
    println!("  {program} bench [size] [tasks] [barriers] [seed] [validate]");
    println!("  {program} stress [size_sets] [task_sets] [barrier_sets] [seed] [validate]");
    println!("  {program} --help");
    println!();
    println!("Sets are comma-separated lists (e.g., 10,20,40). Use \"-\" to keep a default.");
    println!("Omit seed for a random one; the chosen seed is always printed.");
    println!("Defaults:");
    println!("  demo   size=12 tasks=6 barriers=20 tick_ms=0");
    println!("  bench  size=20 tasks=10 barriers=30");
    println!("  stress sizes=10,20,40 tasks=5,10,20 barriers=0,30,60");
    println!("Flags:");
    println!("  validate  re-plan every route under the other mode and check costs match");
}

fn exit_with_usage(program: &str, message: &str) -> ! {
    eprintln!("{message}");
    print_usage(program);
    std::process::exit(2);
}

fn main() {
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "grid_duel".to_string());
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("demo") | None => {
            let size = args.next().and_then(|v| v.parse::<i32>().ok());
            let tasks = args.next().and_then(|v| v.parse::<usize>().ok());
            let barriers = args.next().and_then(|v| v.parse::<usize>().ok());
            let seed = args.next().and_then(|v| v.parse::<u64>().ok());
            let tick_ms = args.next().and_then(|v| v.parse::<u64>().ok());
            sim::run_demo(size, tasks, barriers, seed, tick_ms);
        }
        Some("bench") => {
            let size = args.next().and_then(|v| v.parse::<i32>().ok());
            let tasks = args.next().and_then(|v| v.parse::<usize>().ok());
            let barriers = args.next().and_then(|v| v.parse::<usize>().ok());
            let seed = args.next().and_then(|v| v.parse::<u64>().ok());
            let mut validate = false;
            for arg in args {
                if arg.as_str() == "validate" {
                    validate = true;
                }
            }
            sim::run_benchmark(size, tasks, barriers, seed, validate);
        }
        Some("stress") => {
            let mut size_sets: Option<Vec<i32>> = None;
            let mut task_sets: Option<Vec<usize>> = None;
            let mut barrier_sets: Option<Vec<usize>> = None;
            let mut seed: Option<u64> = None;
            let mut size_sets_skipped = false;
            let mut task_sets_skipped = false;
            let mut barrier_sets_skipped = false;
            let mut validate = false;

            for arg in args {
                if arg.as_str() == "validate" {
                    validate = true;
                    continue;
                }

                let mut consumed = false;
                if size_sets.is_none() && !size_sets_skipped {
                    if arg == "-" {
                        size_sets_skipped = true;
                        consumed = true;
                    } else if let Some(values) = parse_i32_list(&arg) {
                        size_sets = Some(values);
                        consumed = true;
                    }
                    if !consumed {
                        exit_with_usage(&program, &format!("stress: invalid size_sets value: {arg}"));
                    }
                    continue;
                }
                if task_sets.is_none() && !task_sets_skipped {
                    if arg == "-" {
                        task_sets_skipped = true;
                        consumed = true;
                    } else if let Some(values) = parse_usize_list(&arg) {
                        task_sets = Some(values);
                        consumed = true;
                    }
                    if !consumed {
                        exit_with_usage(&program, &format!("stress: invalid task_sets value: {arg}"));
                    }
                    continue;
                }
                if barrier_sets.is_none() && !barrier_sets_skipped {
                    if arg == "-" {
                        barrier_sets_skipped = true;
                        consumed = true;
                    } else if let Some(values) = parse_usize_list(&arg) {
                        barrier_sets = Some(values);
                        consumed = true;
                    }
                    if !consumed {
                        exit_with_usage(
                            &program,
                            &format!("stress: invalid barrier_sets value: {arg}"),
                        );
                    }
                    continue;
                }
                if seed.is_none() {
                    if let Ok(value) = arg.parse::<u64>() {
                        seed = Some(value);
                    } else {
                        exit_with_usage(&program, &format!("stress: invalid seed value: {arg}"));
                    }
                    continue;
                }

                exit_with_usage(&program, &format!("stress: unexpected argument: {arg}"));
            }

            sim::run_stress(size_sets, task_sets, barrier_sets, seed, validate);
        }
        Some("--help") | Some("-h") | Some("help") => print_usage(&program),
        Some(other) => {
            exit_with_usage(&program, &format!("unknown command: {other}"));
        }
    }
}
