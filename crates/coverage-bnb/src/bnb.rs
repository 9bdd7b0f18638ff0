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

//! Branch-and-bound walk over `(grid, cursor)` states.
//!
//! The `Explorer` visits the undecided cells in column-major scan order. At
//! every cursor it tries the candidate placements in their fixed order,
//! mutates the grid in place, offers improvements to its incumbent store,
//! recurses into the next cursor when the bound says the subtree can still
//! beat the incumbent, and undoes the placement before trying the next one.
//! The trailing `Empty` candidate guarantees every path resolves every cell.
//!
//! The explorer is generic over `IncumbentStore`, so the same walk serves the
//! single-threaded solve (`LocalIncumbent`) and the leaves of the parallel
//! strategies (`SharedIncumbentAdapter`).

use crate::{
    bounds,
    err::{GridError, SearchError},
    grid::Grid,
    incumbent::{IncumbentStore, LocalIncumbent},
    result::SolveOutcome,
    stats::StatisticsCollector,
};
use coverage_model::{index::Cell, num::CoverageNumeric, problem::Problem};
use std::sync::atomic::{AtomicBool, Ordering};

/// A depth-first branch-and-bound walker.
pub struct Explorer<'a, T, I>
where
    T: CoverageNumeric,
    I: IncumbentStore<T>,
{
    problem: &'a Problem<T>,
    incumbent: I,
    stats: &'a StatisticsCollector,
    abort: Option<&'a AtomicBool>,
}

impl<'a, T, I> Explorer<'a, T, I>
where
    T: CoverageNumeric,
    I: IncumbentStore<T>,
{
    /// Creates an explorer that reports to `incumbent` and `stats`.
    #[inline]
    pub fn new(problem: &'a Problem<T>, incumbent: I, stats: &'a StatisticsCollector) -> Self {
        Self {
            problem,
            incumbent,
            stats,
            abort: None,
        }
    }

    /// Makes the explorer stop expanding once `flag` is raised.
    #[inline]
    pub fn with_abort_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Returns the incumbent store.
    #[inline]
    pub fn incumbent(&self) -> &I {
        &self.incumbent
    }

    /// Consumes the explorer and returns its incumbent store.
    #[inline]
    pub fn into_incumbent(self) -> I {
        self.incumbent
    }

    #[inline]
    fn is_aborted(&self) -> bool {
        self.abort.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Returns `true` if the optimistic ceiling of the subtree at `cursor`
    /// exceeds the incumbent's cost.
    #[inline]
    pub fn is_promising(&self, grid: &Grid<T>, cursor: Option<Cell>) -> bool {
        let ceiling = bounds::upper_bound(self.problem, grid, cursor)
            + grid.cost_excluding_future_penalty(self.problem, cursor);
        ceiling > self.incumbent.best_cost()
    }

    /// Offers `grid` to the incumbent store.
    #[inline]
    pub fn offer(&mut self, grid: &Grid<T>) {
        if self.incumbent.offer(grid) {
            self.stats.on_improvement();
            tracing::debug!(cost = %grid.cost(), "incumbent improved");
        }
    }

    /// Explores the whole subtree below `(grid, cursor)`.
    ///
    /// On success the grid is returned in the state it was passed in. On
    /// error the grid is no longer trustworthy and must be discarded.
    pub fn explore(
        &mut self,
        grid: &mut Grid<T>,
        cursor: Option<Cell>,
        depth: u64,
    ) -> Result<(), GridError> {
        if self.is_aborted() {
            return Ok(());
        }
        self.stats.on_node_explored(depth);

        let Some(cell) = cursor else {
            self.offer(grid);
            return Ok(());
        };

        let candidates = grid.candidate_placements(self.problem, cell);
        if candidates.is_empty() {
            // Blocked or already covered; nothing to decide here.
            let next = grid.advance(cell);
            return self.descend(grid, next, depth);
        }

        for placement in candidates {
            if !grid.place(self.problem, &placement) {
                continue;
            }
            self.stats.on_placement_applied();

            if grid.cost() > self.incumbent.best_cost() {
                self.offer(grid);
            }

            let next = grid.advance(cell);
            self.descend(grid, next, depth + 1)?;
            grid.undo(self.problem, &placement)?;
        }

        Ok(())
    }

    #[inline]
    fn descend(
        &mut self,
        grid: &mut Grid<T>,
        next: Option<Cell>,
        depth: u64,
    ) -> Result<(), GridError> {
        if self.is_promising(grid, next) {
            self.explore(grid, next, depth)
        } else {
            self.stats.on_pruning_bound();
            Ok(())
        }
    }
}

/// Solves `problem` on the calling thread.
pub fn solve_sequential<T>(problem: &Problem<T>) -> Result<SolveOutcome<T>, SearchError>
where
    T: CoverageNumeric,
{
    let root = Grid::new(problem);
    let cursor = root.first_cursor();
    solve_sequential_from(problem, root, cursor)
}

/// Solves the subtree below `(grid, cursor)` on the calling thread, with
/// `grid` itself as the initial best.
pub fn solve_sequential_from<T>(
    problem: &Problem<T>,
    mut grid: Grid<T>,
    cursor: Option<Cell>,
) -> Result<SolveOutcome<T>, SearchError>
where
    T: CoverageNumeric,
{
    let start = std::time::Instant::now();
    let stats = StatisticsCollector::new();
    let incumbent = LocalIncumbent::new(grid.clone());

    let mut explorer = Explorer::new(problem, incumbent, &stats);
    explorer.explore(&mut grid, cursor, 0)?;

    let best = explorer.into_incumbent().into_best();
    let statistics = stats.snapshot(start.elapsed());
    tracing::info!(cost = %best.cost(), nodes = statistics.nodes_explored, "sequential search finished");
    Ok(SolveOutcome::new(best, statistics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incumbent::{SharedIncumbent, SharedIncumbentAdapter};
    use coverage_model::{loading::ProblemLoader, problem::ProblemBuilder};

    fn scenario_a() -> Problem<i64> {
        ProblemBuilder::new(1, 4)
            .type1(1, 1)
            .type2(4, 10)
            .penalty(1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_scenario_single_long_block_wins() {
        let outcome = solve_sequential(&scenario_a()).unwrap();
        assert_eq!(outcome.cost(), 10);
        assert_eq!(outcome.grid().cells(), &[4, 4, 4, 4]);
    }

    #[test]
    fn test_scenario_zero_value_blocks_beat_penalty() {
        let p = ProblemBuilder::<i64>::new(2, 2)
            .type1(1, 0)
            .type2(2, -100)
            .penalty(5)
            .forbid(Cell::new(0, 0))
            .build()
            .unwrap();
        let outcome = solve_sequential(&p).unwrap();
        assert_eq!(outcome.cost(), 0);
        assert_eq!(outcome.grid().count_empty(), 0);
    }

    #[test]
    fn test_scenario_all_cells_forbidden() {
        let p = ProblemBuilder::<i64>::new(2, 2)
            .type1(1, 50)
            .type2(2, 80)
            .penalty(3)
            .forbid_all([
                Cell::new(0, 0),
                Cell::new(0, 1),
                Cell::new(1, 0),
                Cell::new(1, 1),
            ])
            .build()
            .unwrap();
        let outcome = solve_sequential(&p).unwrap();
        assert_eq!(outcome.cost(), 0);
        assert_eq!(outcome.statistics().placements_applied, 0);
    }

    #[test]
    fn test_scenario_leaving_cells_empty_beats_costly_blocks() {
        // Type 2 saves 2 * 1 penalty but costs 5, type 1 saves 1 but costs 2.
        let p = ProblemBuilder::<i64>::new(2, 3)
            .type1(1, -2)
            .type2(2, -5)
            .penalty(1)
            .build()
            .unwrap();
        let outcome = solve_sequential(&p).unwrap();
        assert_eq!(outcome.cost(), -6);
        assert_eq!(outcome.grid().covered_cells(), 0);
    }

    #[test]
    fn test_loaded_instance_charges_uncovered_cells() {
        let loader = ProblemLoader::<i64>::new();

        // One cell, a block worth 1, uncovered cells cost 2.
        let problem = loader.from_str("1 1 1 1 1 1 -2 0").unwrap();
        let outcome = solve_sequential(&problem).unwrap();
        assert_eq!(outcome.cost(), 1);
        assert_eq!(outcome.grid().count_empty(), 0);

        let problem = loader.from_str("1 4  1 4  1 10  -1  0").unwrap();
        assert_eq!(problem, scenario_a());
        assert_eq!(solve_sequential(&problem).unwrap().cost(), 10);
    }

    #[test]
    fn test_mixed_blocks_reach_known_optimum() {
        // 2x3 grid: two horizontal length-3 blocks are worth 2 * (4 + 0) = 8,
        // three vertical length-2 blocks would only be worth 3 * 2 = 6.
        let p = ProblemBuilder::<i64>::new(2, 3)
            .type1(2, 2)
            .type2(3, 4)
            .penalty(1)
            .build()
            .unwrap();
        let outcome = solve_sequential(&p).unwrap();
        assert_eq!(outcome.cost(), 8);
        assert_eq!(outcome.grid().cells(), &[4, 4, 4, 4, 4, 4]);
    }

    #[test]
    fn test_solve_from_partial_state_keeps_seed_when_nothing_better() {
        let p = scenario_a();
        let mut grid = Grid::new(&p);
        let block = coverage_model::block::Placement::block(
            Cell::new(0, 0),
            coverage_model::block::BlockType::Type2,
            coverage_model::block::Orientation::Horizontal,
        );
        assert!(grid.place(&p, &block));

        let outcome = solve_sequential_from(&p, grid.clone(), None).unwrap();
        assert_eq!(outcome.grid(), &grid);
        assert_eq!(outcome.statistics().nodes_explored, 1);
    }

    #[test]
    fn test_explorer_restores_grid_after_walk() {
        let p = ProblemBuilder::<i64>::new(3, 3)
            .type1(2, 3)
            .type2(3, 5)
            .penalty(2)
            .forbid(Cell::new(1, 1))
            .build()
            .unwrap();
        let stats = StatisticsCollector::new();
        let mut grid = Grid::new(&p);
        let original = grid.clone();
        let cursor = grid.first_cursor();

        let mut explorer = Explorer::new(&p, LocalIncumbent::new(grid.clone()), &stats);
        explorer.explore(&mut grid, cursor, 0).unwrap();

        assert_eq!(grid, original);
        assert!(explorer.incumbent().best().cost() > original.cost());
    }

    #[test]
    fn test_explorer_against_shared_incumbent() {
        let p = scenario_a();
        let stats = StatisticsCollector::new();
        let mut grid = Grid::new(&p);
        let shared = SharedIncumbent::new(grid.clone());
        let cursor = grid.first_cursor();

        let mut explorer = Explorer::new(&p, SharedIncumbentAdapter::new(&shared), &stats);
        explorer.explore(&mut grid, cursor, 0).unwrap();

        assert_eq!(shared.best_cost(), 10);
    }

    #[test]
    fn test_raised_abort_flag_stops_exploration() {
        let p = scenario_a();
        let stats = StatisticsCollector::new();
        let flag = AtomicBool::new(true);
        let mut grid = Grid::new(&p);
        let cursor = grid.first_cursor();

        let mut explorer =
            Explorer::new(&p, LocalIncumbent::new(grid.clone()), &stats).with_abort_flag(&flag);
        explorer.explore(&mut grid, cursor, 0).unwrap();

        assert_eq!(stats.snapshot(std::time::Duration::ZERO).nodes_explored, 0);
        assert_eq!(explorer.incumbent().best_cost(), -4);
    }

    #[test]
    fn test_pruning_reduces_search() {
        let p = ProblemBuilder::<i64>::new(3, 4)
            .type1(2, 1)
            .type2(3, 9)
            .penalty(1)
            .build()
            .unwrap();
        let outcome = solve_sequential(&p).unwrap();
        // Four vertical type 2 blocks cover every cell: 4 * 9 = 36.
        assert_eq!(outcome.cost(), 36);
        assert!(outcome.statistics().prunings_bound > 0);
    }
}
