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

//! Fork-join branch-and-bound on the `rayon` pool.
//!
//! Near the root every successful placement hands a private copy of the grid
//! to a new task and moves on without waiting. Tasks at or below the depth
//! threshold run the sequential `Explorer` inline. All tasks share one
//! `SharedIncumbent`, which is also the only channel results flow through;
//! the enclosing `rayon::scope` is the single join point.
//!
//! A consistency violation in any task is kept in an `ErrorSlot`. Raising it
//! stops every other task from expanding further, and the solve reports it.

use crate::{
    bnb::Explorer,
    err::{GridError, SearchError},
    grid::Grid,
    incumbent::{IncumbentStore, SharedIncumbent, SharedIncumbentAdapter},
    result::SolveOutcome,
    stats::StatisticsCollector,
};
use coverage_model::{index::Cell, num::CoverageNumeric, problem::Problem};
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

/// Default depth below which subtrees are no longer split into tasks.
pub const DEFAULT_DEPTH_THRESHOLD: usize = 10;

/// The first grid error raised by any of a set of concurrent tasks.
#[derive(Debug, Default)]
pub struct ErrorSlot {
    raised: AtomicBool,
    error: Mutex<Option<GridError>>,
}

impl ErrorSlot {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `error` unless an earlier one is already stored, and raises the flag.
    pub fn record(&self, error: GridError) {
        let mut guard = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            tracing::error!(%error, "search task aborted");
            *guard = Some(error);
        }
        self.raised.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once any error has been recorded.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }

    /// Returns the flag tasks poll to stop expanding.
    #[inline]
    pub fn flag(&self) -> &AtomicBool {
        &self.raised
    }

    /// Consumes the slot, returning the stored error if there is one.
    pub fn into_result(self) -> Result<(), GridError> {
        match self.error.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Everything a task borrows from the solve that spawned it.
struct TaskContext<'a, T> {
    problem: &'a Problem<T>,
    incumbent: &'a SharedIncumbent<T>,
    stats: &'a StatisticsCollector,
    errors: &'a ErrorSlot,
    depth_threshold: usize,
}

impl<'a, T> TaskContext<'a, T>
where
    T: CoverageNumeric,
{
    #[inline]
    fn explorer(&self) -> Explorer<'a, T, SharedIncumbentAdapter<'a, T>> {
        Explorer::new(
            self.problem,
            SharedIncumbentAdapter::new(self.incumbent),
            self.stats,
        )
        .with_abort_flag(self.errors.flag())
    }
}

fn run_task<'s, T>(
    scope: &rayon::Scope<'s>,
    ctx: &'s TaskContext<'s, T>,
    mut grid: Grid<T>,
    cursor: Option<Cell>,
    depth: usize,
) where
    T: CoverageNumeric,
{
    if ctx.errors.is_raised() {
        return;
    }

    let mut explorer = ctx.explorer();
    if depth >= ctx.depth_threshold {
        if let Err(error) = explorer.explore(&mut grid, cursor, depth as u64) {
            ctx.errors.record(error);
        }
        return;
    }

    ctx.stats.on_node_explored(depth as u64);
    let Some(cell) = cursor else {
        explorer.offer(&grid);
        return;
    };

    let candidates = grid.candidate_placements(ctx.problem, cell);
    if candidates.is_empty() {
        let next = grid.advance(cell);
        if explorer.is_promising(&grid, next) {
            run_task(scope, ctx, grid, next, depth);
        } else {
            ctx.stats.on_pruning_bound();
        }
        return;
    }

    for placement in candidates {
        if !grid.place(ctx.problem, &placement) {
            continue;
        }
        ctx.stats.on_placement_applied();

        if grid.cost() > explorer.incumbent().best_cost() {
            explorer.offer(&grid);
        }

        let next = grid.advance(cell);
        if explorer.is_promising(&grid, next) {
            let child = grid.clone();
            scope.spawn(move |s| run_task(s, ctx, child, next, depth + 1));
        } else {
            ctx.stats.on_pruning_bound();
        }

        if let Err(error) = grid.undo(ctx.problem, &placement) {
            ctx.errors.record(error);
            return;
        }
    }
}

/// Solves `problem` with fork-join parallelism on the current `rayon` pool.
///
/// Placements at depth `< depth_threshold` spawn their subtree as a new task.
pub fn solve_task_parallel<T>(
    problem: &Problem<T>,
    depth_threshold: usize,
) -> Result<SolveOutcome<T>, SearchError>
where
    T: CoverageNumeric,
{
    let root = Grid::new(problem);
    let cursor = root.first_cursor();
    solve_task_parallel_from(problem, root, cursor, depth_threshold)
}

/// Solves the subtree below `(grid, cursor)` with fork-join parallelism,
/// with `grid` itself as the initial best.
pub fn solve_task_parallel_from<T>(
    problem: &Problem<T>,
    grid: Grid<T>,
    cursor: Option<Cell>,
    depth_threshold: usize,
) -> Result<SolveOutcome<T>, SearchError>
where
    T: CoverageNumeric,
{
    let start = std::time::Instant::now();
    let stats = StatisticsCollector::new();
    let incumbent = SharedIncumbent::new(grid.clone());
    let errors = ErrorSlot::new();

    tracing::debug!(
        depth_threshold,
        threads = rayon::current_num_threads(),
        "task-parallel search started"
    );

    let ctx = TaskContext {
        problem,
        incumbent: &incumbent,
        stats: &stats,
        errors: &errors,
        depth_threshold,
    };
    rayon::scope(|s| run_task(s, &ctx, grid, cursor, 0));

    errors.into_result()?;
    let best = incumbent.into_inner();
    let statistics = stats.snapshot(start.elapsed());
    tracing::info!(cost = %best.cost(), nodes = statistics.nodes_explored, "task-parallel search finished");
    Ok(SolveOutcome::new(best, statistics))
}
