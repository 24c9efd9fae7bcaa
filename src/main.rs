//! Sliding-Block Puzzle Solver
//!
//! Solves Klotski-style puzzles: rigid blocks slide one cell at a time until
//! the board matches a goal pattern. Puzzles come from built-in presets or
//! text files; solutions can be saved, replayed and played back step by step.

mod playback;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, Level};

use klotski::board::format_board;
use klotski::catalog::format_catalog;
use klotski::{persistence, presets};
use klotski::{ExternalSolver, LoadError, Puzzle, SolutionResult, SolveConfig, SolveReport};

/// Solves sliding-block puzzles with weighted A*.
#[derive(Parser)]
#[command(name = "klotski")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Where a puzzle comes from: a file if given, otherwise a preset.
#[derive(Args)]
struct PuzzleSource {
    /// Puzzle definition file.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Built-in puzzle name (see `presets`).
    #[arg(short, long, default_value = "classic")]
    preset: String,
}

#[derive(Args)]
struct SolveArgs {
    /// Heuristic weight; 1 is plain A*, larger is greedier.
    #[arg(short, long, default_value_t = klotski::solver::DEFAULT_WEIGHT)]
    weight: u32,

    /// Give up after this many expanded states.
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Give up after this many seconds.
    #[arg(long)]
    timeout: Option<f64>,

    /// External solver executable to try before the built-in engine.
    #[arg(long)]
    alternate: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle and print the moves.
    Solve {
        #[command(flatten)]
        source: PuzzleSource,
        #[command(flatten)]
        options: SolveArgs,
        /// Save the solution to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a puzzle's board, goal and block catalog.
    Show {
        #[command(flatten)]
        source: PuzzleSource,
    },
    /// Play a saved solution back and check that it reaches the goal.
    Replay {
        #[command(flatten)]
        source: PuzzleSource,
        /// Solution file written by `solve --output`.
        solution: PathBuf,
        /// Pause between steps, in milliseconds.
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
    /// List the built-in puzzles.
    Presets,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Some(Command::Solve {
            source,
            options,
            output,
        }) => run_solve(&source, &options, output),
        Some(Command::Show { source }) => run_show(&source),
        Some(Command::Replay {
            source,
            solution,
            delay_ms,
        }) => run_replay(&source, solution, Duration::from_millis(delay_ms)),
        Some(Command::Presets) => {
            run_presets();
            Ok(())
        }
        None => {
            // default: solve the classic layout
            let source = PuzzleSource {
                file: None,
                preset: presets::CLASSIC.name.to_owned(),
            };
            let options = SolveArgs {
                weight: klotski::solver::DEFAULT_WEIGHT,
                max_expansions: None,
                timeout: None,
                alternate: None,
            };
            run_solve(&source, &options, None)
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the puzzle named by `source`.
fn load(source: &PuzzleSource) -> Result<Puzzle, String> {
    match &source.file {
        Some(path) => persistence::load_puzzle(path)
            .map_err(|e: LoadError| format!("Failed to load {}: {e}", path.display())),
        None => {
            let preset = presets::find(&source.preset).ok_or_else(|| {
                format!("Unknown preset '{}'. Run 'klotski presets' for a list.", source.preset)
            })?;
            preset
                .puzzle()
                .map_err(|e| format!("Preset '{}' is invalid: {e}", preset.name))
        }
    }
}

/// Solves the puzzle, prints the moves and optionally saves them.
fn run_solve(
    source: &PuzzleSource,
    options: &SolveArgs,
    output: Option<PathBuf>,
) -> Result<(), String> {
    let mut puzzle = load(source)?;
    if let Some(program) = &options.alternate {
        puzzle = puzzle.with_alternate(Box::new(ExternalSolver::new(program)));
    }

    let config = SolveConfig {
        weight: options.weight,
        max_expansions: options.max_expansions,
        deadline: options
            .timeout
            .map(|secs| Instant::now() + Duration::from_secs_f64(secs.max(0.0))),
        ..SolveConfig::default()
    };

    println!("{}", format_board(puzzle.current_board(), puzzle.empty()));
    let started = Instant::now();
    let report = puzzle.solve_with(options.alternate.is_some(), &config, &mut |stats| {
        info!(
            expanded = stats.expanded,
            frontier = stats.frontier,
            discovered = stats.discovered,
            "searching"
        );
    });
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "solve finished");

    print!("{}", format_report(&report));

    if let (Some(path), SolutionResult::Solved(actions)) = (output, &report.result) {
        persistence::save_solution(&path, actions)
            .map_err(|e| format!("Failed to save solution: {e}"))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Summarizes a solve report, one move per line.
fn format_report(report: &SolveReport) -> String {
    let mut output = String::new();
    match &report.result {
        SolutionResult::Solved(actions) => {
            output.push_str(&format!(
                "Solved by {} in {} moves ({} states expanded)\n",
                report.backend,
                actions.len(),
                report.stats.expanded
            ));
            for (i, action) in actions.iter().enumerate() {
                output.push_str(&format!("{:>4}: {}\n", i + 1, action));
            }
        }
        SolutionResult::NoSolution => {
            output.push_str(&format!(
                "No solution ({} states expanded)\n",
                report.stats.expanded
            ));
        }
        SolutionResult::Aborted(reason) => {
            output.push_str(&format!(
                "Search stopped: {:?} ({} states expanded)\n",
                reason, report.stats.expanded
            ));
        }
    }
    output
}

/// Prints the board, goal and block catalog.
fn run_show(source: &PuzzleSource) -> Result<(), String> {
    let puzzle = load(source)?;
    let empty = puzzle.empty();
    println!("board:\n{}", format_board(puzzle.current_board(), empty));
    println!("goal:\n{}", format_board(puzzle.goal_pattern(), empty));
    print!("{}", format_catalog(puzzle.rules().catalog()));
    Ok(())
}

/// Plays a saved solution back step by step.
fn run_replay(source: &PuzzleSource, solution: PathBuf, delay: Duration) -> Result<(), String> {
    let mut puzzle = load(source)?;
    let actions = persistence::load_solution(&solution)
        .map_err(|e| format!("Failed to load {}: {e}", solution.display()))?;

    playback::play(&mut puzzle, &actions, delay)
        .map_err(|index| format!("Move {} ({}) is illegal", index + 1, actions[index]))?;

    if puzzle.is_solved() {
        println!("\nSolved in {} moves", actions.len());
        Ok(())
    } else {
        Err(format!("{} moves played but the goal is not reached", actions.len()))
    }
}

/// Lists the built-in puzzles.
fn run_presets() {
    for preset in presets::PRESETS {
        println!("{:<10} {}", preset.name, preset.description);
    }
}
