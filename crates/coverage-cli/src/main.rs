// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use clap::{Parser, Subcommand, ValueEnum};
use coverage_bnb::{
    batch::DEFAULT_JOB_BATCH_SIZE,
    parallel::DEFAULT_DEPTH_THRESHOLD,
    result::SolveOutcome,
    solver::{CoverageSolver, Strategy},
};
use coverage_dist::{
    cluster::{coordinate_tcp, solve_distributed, work_tcp},
    worker::WorkerConfig,
};
use coverage_model::{loading::ProblemLoader, problem::Problem};
use std::{
    net::TcpListener,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};
use tracing_subscriber::EnvFilter;

/// Places straight blocks on a grid to maximize value minus uncovered-cell penalty.
#[derive(Parser, Debug)]
#[command(name = "coverage", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve an instance on this machine.
    Solve {
        /// Instance file.
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = StrategyArg::Task)]
        strategy: StrategyArg,
        /// Depth below which placements spawn parallel tasks.
        #[arg(long, default_value_t = DEFAULT_DEPTH_THRESHOLD)]
        depth: usize,
        /// Number of jobs the data-parallel strategy aims for.
        #[arg(long, default_value_t = DEFAULT_JOB_BATCH_SIZE)]
        batch: usize,
        /// Worker threads for the distributed strategy.
        #[arg(long, default_value_t = 4)]
        workers: usize,
        /// Size of the thread pool, per worker for the distributed strategy.
        /// Defaults to the number of cores.
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Hand out jobs to workers connecting over TCP.
    Coordinate {
        file: PathBuf,
        #[arg(long)]
        listen: String,
        #[arg(long)]
        workers: usize,
    },
    /// Connect to a coordinator and process its jobs.
    Work {
        file: PathBuf,
        #[arg(long)]
        connect: String,
        #[arg(long, default_value_t = DEFAULT_DEPTH_THRESHOLD)]
        depth: usize,
        /// Size of the worker's thread pool. Defaults to the number of cores.
        #[arg(long)]
        threads: Option<usize>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StrategyArg {
    Sequential,
    Task,
    Data,
    Distributed,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn load(path: &Path) -> Result<Problem<i64>, Box<dyn std::error::Error>> {
    let problem = ProblemLoader::<i64>::new().from_path(path)?;
    tracing::info!(
        file = %path.display(),
        rows = problem.rows(),
        columns = problem.columns(),
        forbidden = problem.num_forbidden(),
        "instance loaded"
    );
    Ok(problem)
}

fn report(problem: &Problem<i64>, outcome: &SolveOutcome<i64>, start: Instant) {
    println!("{}", problem);
    println!("{}", outcome.grid());
    println!("Best cost: {}", outcome.cost());
    println!("{}", outcome.statistics());
    println!("Elapsed: {:.3}s", start.elapsed().as_secs_f64());
}

fn worker_config(depth: usize, threads: Option<usize>) -> WorkerConfig {
    let config = WorkerConfig::new(depth);
    match threads {
        Some(threads) => config.with_threads(threads),
        None => config,
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Solve {
            file,
            strategy,
            depth,
            batch,
            workers,
            threads,
        } => {
            let problem = load(&file)?;
            let start = Instant::now();
            let outcome = match strategy {
                StrategyArg::Distributed => {
                    solve_distributed(&problem, workers, &worker_config(depth, threads))?
                }
                other => {
                    let strategy = match other {
                        StrategyArg::Sequential => Strategy::Sequential,
                        StrategyArg::Data => Strategy::DataParallel {
                            job_batch_size: batch,
                        },
                        _ => Strategy::TaskParallel {
                            depth_threshold: depth,
                        },
                    };
                    let mut builder = CoverageSolver::builder().with_strategy(strategy);
                    if let Some(threads) = threads {
                        builder = builder.with_threads(threads);
                    }
                    builder.build().solve(&problem)?
                }
            };
            report(&problem, &outcome, start);
        }
        Command::Coordinate {
            file,
            listen,
            workers,
        } => {
            let problem = load(&file)?;
            let listener = TcpListener::bind(&listen)?;
            let start = Instant::now();
            let outcome = coordinate_tcp(&problem, &listener, workers)?;
            report(&problem, &outcome, start);
        }
        Command::Work {
            file,
            connect,
            depth,
            threads,
        } => {
            let problem = load(&file)?;
            let config = worker_config(depth, threads);
            let statistics = work_tcp(&problem, connect.as_str(), &config)?;
            println!("{}", statistics);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    enable_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "coverage failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_solve_defaults() {
        let cli = Cli::try_parse_from(["coverage", "solve", "grid.txt"]).unwrap();
        match cli.command {
            Command::Solve {
                strategy,
                depth,
                batch,
                threads,
                ..
            } => {
                assert_eq!(strategy, StrategyArg::Task);
                assert_eq!(depth, DEFAULT_DEPTH_THRESHOLD);
                assert_eq!(batch, DEFAULT_JOB_BATCH_SIZE);
                assert_eq!(threads, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_thread_count_reaches_worker_config() {
        let cli = Cli::try_parse_from([
            "coverage", "solve", "grid.txt", "--strategy", "distributed", "--threads", "3",
        ])
        .unwrap();
        match cli.command {
            Command::Solve { depth, threads, .. } => {
                let config = worker_config(depth, threads);
                assert_eq!(config.threads, Some(3));
                assert_eq!(config.depth_threshold, DEFAULT_DEPTH_THRESHOLD);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(worker_config(4, None), WorkerConfig::new(4));
    }

    #[test]
    fn test_work_requires_address() {
        assert!(Cli::try_parse_from(["coverage", "work", "grid.txt"]).is_err());
        assert!(
            Cli::try_parse_from(["coverage", "work", "grid.txt", "--connect", "127.0.0.1:7000"])
                .is_ok()
        );
    }
}
