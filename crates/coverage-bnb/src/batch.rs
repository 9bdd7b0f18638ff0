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

//! Breadth-first job generation and the batched data-parallel strategy.
//!
//! `generate_jobs` expands the root state level by level until the queue holds
//! the requested number of independent `(grid, cursor)` jobs. States whose
//! cursor has run past the last cell cannot be expanded and are rotated to the
//! back of the queue, so generation ends early once nothing is left to expand.
//! The same queue feeds the data-parallel solve here and the distributed
//! coordinator.

use crate::{
    bnb::Explorer,
    err::SearchError,
    grid::Grid,
    incumbent::{SharedIncumbent, SharedIncumbentAdapter},
    parallel::ErrorSlot,
    result::SolveOutcome,
    stats::StatisticsCollector,
};
use coverage_model::{index::Cell, num::CoverageNumeric, problem::Problem};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::VecDeque;

/// Default number of jobs the data-parallel strategy generates.
pub const DEFAULT_JOB_BATCH_SIZE: usize = 64;

/// A self-contained unit of search work: explore everything below `cursor`
/// starting from `grid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job<T> {
    grid: Grid<T>,
    cursor: Option<Cell>,
}

impl<T> Job<T> {
    #[inline]
    pub fn new(grid: Grid<T>, cursor: Option<Cell>) -> Self {
        Self { grid, cursor }
    }

    #[inline]
    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    #[inline]
    pub fn cursor(&self) -> Option<Cell> {
        self.cursor
    }

    /// Returns `true` if the job has no undecided cell left.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }

    #[inline]
    pub fn into_parts(self) -> (Grid<T>, Option<Cell>) {
        (self.grid, self.cursor)
    }
}

/// Expands `(root, cursor)` breadth first until at least `target` jobs are
/// queued or no queued state can be expanded any more.
pub fn generate_jobs<T>(
    problem: &Problem<T>,
    root: Grid<T>,
    cursor: Option<Cell>,
    target: usize,
) -> VecDeque<Job<T>>
where
    T: CoverageNumeric,
{
    let mut queue = VecDeque::with_capacity(target.max(1));
    let mut expandable = usize::from(cursor.is_some());
    queue.push_back(Job::new(root, cursor));

    while queue.len() < target && expandable > 0 {
        let Some(job) = queue.pop_front() else {
            break;
        };
        let Some(cell) = job.cursor else {
            queue.push_back(job);
            continue;
        };
        expandable -= 1;

        let grid = job.grid;
        let candidates = grid.candidate_placements(problem, cell);
        if candidates.is_empty() {
            let next = grid.advance(cell);
            expandable += usize::from(next.is_some());
            queue.push_back(Job::new(grid, next));
            continue;
        }

        for placement in candidates {
            let mut child = grid.clone();
            if !child.place(problem, &placement) {
                continue;
            }
            let next = child.advance(cell);
            expandable += usize::from(next.is_some());
            queue.push_back(Job::new(child, next));
        }
    }

    tracing::debug!(jobs = queue.len(), target, "job generation finished");
    queue
}

/// Solves `problem` by splitting it into about `job_batch_size` jobs and
/// exploring them in parallel on the current `rayon` pool.
pub fn solve_data_parallel<T>(
    problem: &Problem<T>,
    job_batch_size: usize,
) -> Result<SolveOutcome<T>, SearchError>
where
    T: CoverageNumeric,
{
    let start = std::time::Instant::now();
    let stats = StatisticsCollector::new();
    let errors = ErrorSlot::new();

    let root = Grid::new(problem);
    let cursor = root.first_cursor();
    let incumbent = SharedIncumbent::new(root.clone());
    let jobs = generate_jobs(problem, root, cursor, job_batch_size.max(1));
    stats.on_jobs(jobs.len() as u64);

    jobs.into_par_iter().for_each(|job| {
        if errors.is_raised() {
            return;
        }

        let (mut grid, cursor) = job.into_parts();
        let mut explorer = Explorer::new(problem, SharedIncumbentAdapter::new(&incumbent), &stats)
            .with_abort_flag(errors.flag());
        if !explorer.is_promising(&grid, cursor) {
            stats.on_pruning_bound();
            return;
        }
        if let Err(error) = explorer.explore(&mut grid, cursor, 0) {
            errors.record(error);
        }
    });

    errors.into_result()?;
    let best = incumbent.into_inner();
    let statistics = stats.snapshot(start.elapsed());
    tracing::info!(cost = %best.cost(), jobs = statistics.jobs, "data-parallel search finished");
    Ok(SolveOutcome::new(best, statistics))
}
