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

//! The worker side of the distributed search.
//!
//! A worker waits for `JOB` or `FINISHED`. Each job is explored to exhaustion
//! with the task-parallel engine, seeded with the received grid as its own
//! best, and the best grid goes back as a `RESULT` together with the job's
//! cursor.
//!
//! Jobs run on a dedicated `rayon` pool when `WorkerConfig::threads` is set.
//! Worker threads are plain OS threads, so a pool installed by the caller
//! would not reach them.

use crate::{err::DistributedError, message::Message, payload, transport::WorkerLink};
use coverage_bnb::{
    err::SearchError,
    parallel::{DEFAULT_DEPTH_THRESHOLD, solve_task_parallel_from},
    stats::SearchStatistics,
};
use coverage_model::{num::CoverageNumeric, problem::Problem};

/// Settings of a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Depth below which placements spawn parallel tasks.
    pub depth_threshold: usize,
    /// Size of the worker's own thread pool. `None` uses the global pool.
    pub threads: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            depth_threshold: DEFAULT_DEPTH_THRESHOLD,
            threads: None,
        }
    }
}

impl WorkerConfig {
    #[inline]
    pub fn new(depth_threshold: usize) -> Self {
        Self {
            depth_threshold,
            threads: None,
        }
    }

    #[inline]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// The pool a worker runs its jobs on.
#[derive(Debug)]
enum JobPool {
    Global,
    Dedicated(rayon::ThreadPool),
}

impl JobPool {
    fn new(threads: Option<usize>) -> Result<Self, SearchError> {
        match threads {
            Some(threads) => Ok(Self::Dedicated(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("coverage-job-{i}"))
                    .build()?,
            )),
            None => Ok(Self::Global),
        }
    }

    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            Self::Global => f(),
            Self::Dedicated(pool) => pool.install(f),
        }
    }
}

/// Runs the worker protocol over `link` until the coordinator sends
/// `FINISHED`. Returns the accumulated statistics of all processed jobs.
pub fn run_worker<T, L>(
    problem: &Problem<T>,
    link: &mut L,
    config: &WorkerConfig,
) -> Result<SearchStatistics, DistributedError>
where
    T: CoverageNumeric,
    L: WorkerLink,
{
    let start = std::time::Instant::now();
    let pool = JobPool::new(config.threads)?;
    let mut statistics = SearchStatistics::default();

    loop {
        let job = match link.recv()? {
            Message::Job(job) => payload::decode(problem, &job)?,
            Message::Finished => break,
            other => {
                return Err(DistributedError::Protocol(format!(
                    "worker received unexpected {}",
                    other.tag()
                )));
            }
        };

        let (grid, cursor) = job.into_parts();
        let outcome = pool.install(|| {
            solve_task_parallel_from(problem, grid, cursor, config.depth_threshold)
        })?;
        statistics.merge(outcome.statistics());
        statistics.jobs += 1;

        tracing::debug!(cost = %outcome.cost(), "job finished");
        link.send(Message::Result(payload::encode(outcome.grid(), cursor)))?;
    }

    statistics.set_total_time(start.elapsed());
    tracing::info!(jobs = statistics.jobs, "worker finished");
    Ok(statistics)
}
