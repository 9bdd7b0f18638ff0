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

//! Entry points that wire the coordinator and workers together.
//!
//! [`solve_distributed`] runs a whole cluster inside one process, with every
//! worker on its own thread. [`coordinate_tcp`] and [`work_tcp`] run one side
//! each over TCP.

use crate::{
    channel::channel_links,
    coordinator::run_coordinator,
    err::DistributedError,
    tcp::{TcpCoordinatorLink, TcpWorkerLink},
    worker::{WorkerConfig, run_worker},
};
use coverage_bnb::{result::SolveOutcome, stats::SearchStatistics};
use coverage_model::{num::CoverageNumeric, problem::Problem};
use std::net::{TcpListener, ToSocketAddrs};

/// Solves `problem` with one coordinator and `workers` worker threads that
/// talk over in-process channels. Every worker runs its jobs as configured by
/// `config`, so `config.threads` is the pool size of each worker.
///
/// The returned statistics combine the coordinator's counters with the search
/// counters of every worker.
pub fn solve_distributed<T>(
    problem: &Problem<T>,
    workers: usize,
    config: &WorkerConfig,
) -> Result<SolveOutcome<T>, DistributedError>
where
    T: CoverageNumeric,
{
    let start = std::time::Instant::now();
    let (mut coordinator, links) = channel_links(workers);

    let (outcome, worker_results) = std::thread::scope(|s| {
        let handles: Vec<_> = links
            .into_iter()
            .map(|mut link| {
                let id = link.id();
                s.spawn(move || {
                    let result = run_worker(problem, &mut link, config);
                    if let Err(e) = &result {
                        tracing::error!(worker = id, error = %e, "worker failed");
                    }
                    result
                })
            })
            .collect();

        let outcome = run_coordinator(problem, &mut coordinator);
        // Releases workers still waiting for a job if the coordinator bailed.
        drop(coordinator);

        let worker_results: Vec<_> = handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect();
        (outcome, worker_results)
    });

    let mut worker_stats = SearchStatistics::default();
    let mut worker_error = None;
    for result in worker_results {
        match result {
            Ok(stats) => worker_stats.merge(&stats),
            Err(e) => {
                worker_error.get_or_insert(e);
            }
        }
    }

    // A failed worker makes the coordinator see a hang-up; report the cause.
    let outcome = match (outcome, worker_error) {
        (Err(DistributedError::Disconnected { .. }), Some(e)) => return Err(e),
        (Err(e), _) => return Err(e),
        (Ok(_), Some(e)) => return Err(e),
        (Ok(outcome), None) => outcome,
    };
    let mut statistics = *outcome.statistics();
    let jobs = statistics.jobs;
    statistics.merge(&worker_stats);
    statistics.jobs = jobs;
    statistics.set_total_time(start.elapsed());
    Ok(SolveOutcome::new(outcome.into_grid(), statistics))
}

/// Accepts `workers` connections on `listener` and coordinates them until the
/// search is complete.
pub fn coordinate_tcp<T>(
    problem: &Problem<T>,
    listener: &TcpListener,
    workers: usize,
) -> Result<SolveOutcome<T>, DistributedError>
where
    T: CoverageNumeric,
{
    tracing::info!(workers, addr = ?listener.local_addr().ok(), "waiting for workers");
    let mut link = TcpCoordinatorLink::accept(listener, workers)?;
    run_coordinator(problem, &mut link)
}

/// Connects to the coordinator at `addr` and processes jobs until released.
pub fn work_tcp<T, A>(
    problem: &Problem<T>,
    addr: A,
    config: &WorkerConfig,
) -> Result<SearchStatistics, DistributedError>
where
    T: CoverageNumeric,
    A: ToSocketAddrs,
{
    let mut link = TcpWorkerLink::connect(addr)?;
    run_worker(problem, &mut link, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_bnb::bnb::solve_sequential;
    use coverage_model::{index::Cell, problem::ProblemBuilder};

    fn problem() -> Problem<i64> {
        ProblemBuilder::new(4, 4)
            .type1(2, 3)
            .type2(3, 7)
            .penalty(2)
            .forbid_all([Cell::new(1, 2), Cell::new(3, 0)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_matches_sequential_for_various_worker_counts() {
        let problem = problem();
        let expected = solve_sequential(&problem).unwrap();
        for workers in [1, 2, 3, 8] {
            let outcome = solve_distributed(&problem, workers, &WorkerConfig::new(4)).unwrap();
            assert_eq!(outcome.cost(), expected.cost(), "workers = {}", workers);
            assert!(outcome.grid().is_consistent_with(&problem));
        }
    }

    #[test]
    fn test_workers_with_dedicated_pools_match_sequential() {
        let problem = problem();
        let config = WorkerConfig::new(3).with_threads(2);
        let outcome = solve_distributed(&problem, 3, &config).unwrap();
        assert_eq!(outcome.cost(), solve_sequential(&problem).unwrap().cost());
        assert!(outcome.statistics().nodes_explored > 0);
    }

    #[test]
    fn test_more_workers_than_jobs() {
        // A single row of one usable cell leaves very few jobs to hand out.
        let problem = ProblemBuilder::<i64>::new(1, 2)
            .type1(1, 4)
            .type2(2, 1)
            .penalty(1)
            .forbid(Cell::new(0, 1))
            .build()
            .unwrap();
        let outcome = solve_distributed(&problem, 16, &WorkerConfig::new(2)).unwrap();
        assert_eq!(outcome.cost(), 4);
    }

    #[test]
    fn test_zero_workers_fails() {
        assert!(matches!(
            solve_distributed(&problem(), 0, &WorkerConfig::default()),
            Err(DistributedError::Protocol(_))
        ));
    }

    #[test]
    fn test_end_to_end_over_localhost() {
        let problem = problem();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let outcome = std::thread::scope(|s| {
            let workers: Vec<_> = (0..2)
                .map(|_| s.spawn(|| work_tcp(&problem, addr, &WorkerConfig::new(4))))
                .collect();
            let outcome = coordinate_tcp(&problem, &listener, 2).unwrap();
            for worker in workers {
                worker.join().unwrap().unwrap();
            }
            outcome
        });

        let expected = solve_sequential(&problem).unwrap();
        assert_eq!(outcome.cost(), expected.cost());
    }
}
