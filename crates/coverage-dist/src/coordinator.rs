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

//! The coordinator side of the distributed search.
//!
//! 1. Split the root state breadth first into at least one job per worker.
//! 2. Send one job to every worker. Workers left without a job are told
//!    `FINISHED` straight away.
//! 3. Receive results from any worker, install strictly better grids, and
//!    answer each result with the next job or `FINISHED`.
//! 4. Stop once no worker is active.
//!
//! Jobs carry no identity. A result is attributed to the worker it came from,
//! which has exactly one job outstanding at any time.

use crate::{
    err::DistributedError,
    message::Message,
    payload,
    transport::CoordinatorLink,
};
use coverage_bnb::{
    batch::{Job, generate_jobs},
    grid::Grid,
    incumbent::{IncumbentStore, LocalIncumbent},
    result::SolveOutcome,
    stats::StatisticsCollector,
};
use coverage_model::{num::CoverageNumeric, problem::Problem};
use std::collections::VecDeque;

/// Runs the coordinator protocol over `link` until every worker is done, and
/// returns the best grid any worker reported.
pub fn run_coordinator<T, L>(
    problem: &Problem<T>,
    link: &mut L,
) -> Result<SolveOutcome<T>, DistributedError>
where
    T: CoverageNumeric,
    L: CoordinatorLink,
{
    let start = std::time::Instant::now();
    let stats = StatisticsCollector::new();
    let workers = link.num_workers();
    if workers == 0 {
        return Err(DistributedError::Protocol("no workers to coordinate".to_string()));
    }

    let root = Grid::new(problem);
    let cursor = root.first_cursor();
    let mut best = LocalIncumbent::new(root.clone());
    let mut queue: VecDeque<Job<T>> = generate_jobs(problem, root, cursor, workers);
    stats.on_jobs(queue.len() as u64);
    tracing::info!(workers, jobs = queue.len(), "coordinator started");

    let mut active = vec![false; workers];
    let mut num_active = 0usize;
    for (worker, slot) in active.iter_mut().enumerate() {
        match queue.pop_front() {
            Some(job) => {
                link.send(worker, Message::Job(payload::encode_job(&job)))?;
                *slot = true;
                num_active += 1;
                tracing::debug!(worker, "job dispatched");
            }
            None => link.send(worker, Message::Finished)?,
        }
    }

    while num_active > 0 {
        let envelope = link.recv_any()?;
        let worker = envelope.origin;
        let is_active = active.get(worker).copied().unwrap_or(false);

        let message = match envelope.message {
            Ok(message) => message,
            // Workers that were already released may hang up at any time.
            Err(_) if !is_active => continue,
            Err(e) => return Err(e),
        };

        let result = match message {
            Message::Result(result) if is_active => result,
            other => {
                return Err(DistributedError::Protocol(format!(
                    "unexpected {} from worker {}",
                    other.tag(),
                    worker
                )));
            }
        };

        let job = payload::decode(problem, &result)?;
        if best.offer(job.grid()) {
            stats.on_improvement();
            tracing::debug!(worker, cost = %job.grid().cost(), "incumbent improved");
        }

        match queue.pop_front() {
            Some(next) => {
                link.send(worker, Message::Job(payload::encode_job(&next)))?;
                tracing::debug!(worker, remaining = queue.len(), "job dispatched");
            }
            None => {
                link.send(worker, Message::Finished)?;
                active[worker] = false;
                num_active -= 1;
            }
        }
    }

    let best = best.into_best();
    let statistics = stats.snapshot(start.elapsed());
    tracing::info!(cost = %best.cost(), jobs = statistics.jobs, "coordinator finished");
    Ok(SolveOutcome::new(best, statistics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channel::channel_links, transport::WorkerLink};
    use coverage_bnb::bnb::solve_sequential;
    use coverage_model::problem::ProblemBuilder;

    fn problem() -> Problem<i64> {
        ProblemBuilder::new(3, 3)
            .type1(2, 3)
            .type2(3, 5)
            .penalty(1)
            .forbid(coverage_model::index::Cell::new(1, 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_scripted_worker_reaches_optimum() {
        let problem = problem();
        let (mut coordinator, mut workers) = channel_links(1);
        let mut worker = workers.pop().unwrap();

        let outcome = std::thread::scope(|s| {
            let p = &problem;
            s.spawn(move || {
                while let Message::Job(job) = worker.recv().unwrap() {
                    let job = payload::decode(p, &job).unwrap();
                    let (grid, cursor) = job.into_parts();
                    let best = coverage_bnb::bnb::solve_sequential_from(p, grid, cursor).unwrap();
                    worker
                        .send(Message::Result(payload::encode(best.grid(), cursor)))
                        .unwrap();
                }
            });
            run_coordinator(p, &mut coordinator).unwrap()
        });

        let expected = solve_sequential(&problem).unwrap();
        assert_eq!(outcome.cost(), expected.cost());
        assert!(outcome.grid().is_consistent_with(&problem));
        assert!(outcome.statistics().jobs >= 1);
    }

    #[test]
    fn test_unexpected_message_is_a_protocol_error() {
        let problem = problem();
        let (mut coordinator, mut workers) = channel_links(1);
        let mut worker = workers.pop().unwrap();

        let result = std::thread::scope(|s| {
            s.spawn(move || {
                let _ = worker.recv();
                let _ = worker.send(Message::Finished);
            });
            run_coordinator(&problem, &mut coordinator)
        });
        assert!(matches!(result, Err(DistributedError::Protocol(_))));
    }

    #[test]
    fn test_no_workers_is_rejected() {
        let (mut coordinator, _workers) = channel_links(0);
        assert!(matches!(
            run_coordinator(&problem(), &mut coordinator),
            Err(DistributedError::Protocol(_))
        ));
    }
}
