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

//! # Coverage Solver
//!
//! A small facade that picks one of the search strategies and the thread pool
//! it runs on.
//!
//! ```rust
//! use coverage_bnb::solver::{CoverageSolver, Strategy};
//! use coverage_model::problem::ProblemBuilder;
//!
//! let problem = ProblemBuilder::<i64>::new(1, 4)
//!     .type1(1, 1)
//!     .type2(4, 10)
//!     .penalty(1)
//!     .build()
//!     .unwrap();
//!
//! let solver = CoverageSolver::builder()
//!     .with_strategy(Strategy::DataParallel { job_batch_size: 8 })
//!     .with_threads(2)
//!     .build();
//!
//! let outcome = solver.solve(&problem).unwrap();
//! assert_eq!(outcome.cost(), 10);
//! ```

use crate::{
    batch::{DEFAULT_JOB_BATCH_SIZE, solve_data_parallel},
    bnb::solve_sequential,
    err::SearchError,
    parallel::{DEFAULT_DEPTH_THRESHOLD, solve_task_parallel},
    result::SolveOutcome,
};
use coverage_model::{num::CoverageNumeric, problem::Problem};

/// How the search tree is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One thread, plain recursion.
    Sequential,
    /// Fork-join tasks for every placement above `depth_threshold`.
    TaskParallel { depth_threshold: usize },
    /// Breadth-first split into `job_batch_size` jobs, explored in parallel.
    DataParallel { job_batch_size: usize },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::TaskParallel {
            depth_threshold: DEFAULT_DEPTH_THRESHOLD,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::TaskParallel { depth_threshold } => {
                write!(f, "task-parallel (depth threshold {})", depth_threshold)
            }
            Strategy::DataParallel { job_batch_size } => {
                write!(f, "data-parallel (job batch size {})", job_batch_size)
            }
        }
    }
}

impl Strategy {
    /// Data-parallel strategy with the default batch size.
    #[inline]
    pub fn data_parallel() -> Self {
        Strategy::DataParallel {
            job_batch_size: DEFAULT_JOB_BATCH_SIZE,
        }
    }

    /// Returns `true` if the strategy needs a thread pool.
    #[inline]
    pub fn is_parallel(&self) -> bool {
        !matches!(self, Strategy::Sequential)
    }
}

/// Settings of a `CoverageSolver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverConfig {
    /// The scheduling strategy.
    pub strategy: Strategy,
    /// Size of a dedicated pool; `None` runs on the global `rayon` pool.
    pub threads: Option<usize>,
}

/// Runs a search strategy on a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoverageSolver {
    config: SolverConfig,
}

impl CoverageSolver {
    #[inline]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn builder() -> CoverageSolverBuilder {
        CoverageSolverBuilder::new()
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves `problem` and returns the best grid with the run statistics.
    pub fn solve<T>(&self, problem: &Problem<T>) -> Result<SolveOutcome<T>, SearchError>
    where
        T: CoverageNumeric,
    {
        let strategy = self.config.strategy;
        tracing::info!(%strategy, rows = problem.rows(), columns = problem.columns(), "solving");

        match (strategy.is_parallel(), self.config.threads) {
            (true, Some(threads)) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("coverage-worker-{i}"))
                    .build()?;
                pool.install(|| Self::run(strategy, problem))
            }
            _ => Self::run(strategy, problem),
        }
    }

    fn run<T>(strategy: Strategy, problem: &Problem<T>) -> Result<SolveOutcome<T>, SearchError>
    where
        T: CoverageNumeric,
    {
        match strategy {
            Strategy::Sequential => solve_sequential(problem),
            Strategy::TaskParallel { depth_threshold } => {
                solve_task_parallel(problem, depth_threshold)
            }
            Strategy::DataParallel { job_batch_size } => {
                solve_data_parallel(problem, job_batch_size)
            }
        }
    }
}

/// A builder for `CoverageSolver`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageSolverBuilder {
    config: SolverConfig,
}

impl CoverageSolverBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Runs parallel strategies on a dedicated pool of `threads` threads.
    #[inline]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    #[inline]
    pub fn build(self) -> CoverageSolver {
        CoverageSolver::new(self.config)
    }
}
