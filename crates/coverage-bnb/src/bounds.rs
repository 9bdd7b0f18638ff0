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

//! Bounding functions for the coverage search.
//!
//! `upper_bound` relaxes the geometry away: the `u` undecided cells are
//! treated as a pool of cell units that blocks can draw from in any
//! combination `k1 · L1 + k2 · L2 ≤ u`. The best such combination is an
//! optimistic ceiling on what the subtree can still gain, so adding it to
//! `Grid::cost_excluding_future_penalty` never underestimates the best
//! reachable cost.
//!
//! For a fixed `k2` the objective is linear in `k1`, so only `k1 = 0` and the
//! largest feasible `k1` need to be checked.

use crate::grid::Grid;
use coverage_model::{block::BlockType, index::Cell, num::CoverageNumeric, problem::Problem};

/// Returns an admissible ceiling on the value still obtainable from the
/// `EMPTY` cells at or after `cursor`. Zero when nothing is left to decide.
pub fn upper_bound<T>(problem: &Problem<T>, grid: &Grid<T>, cursor: Option<Cell>) -> T
where
    T: CoverageNumeric,
{
    remaining_value_bound(problem, grid.count_empty_from(cursor))
}

/// Returns the best value `k1 · c1 + k2 · c2 − penalty · (u − k1 · L1 − k2 · L2)`
/// over all block counts that fit into `undecided` cells.
pub fn remaining_value_bound<T>(problem: &Problem<T>, undecided: usize) -> T
where
    T: CoverageNumeric,
{
    let l1 = problem.block_length(BlockType::Type1);
    let l2 = problem.block_length(BlockType::Type2);
    let c1 = problem.block_cost(BlockType::Type1);
    let c2 = problem.block_cost(BlockType::Type2);
    let penalty = problem.penalty();

    let value = |k1: usize, k2: usize| -> T {
        let uncovered = undecided - k1 * l1 - k2 * l2;
        T::from_count(k1) * c1 + T::from_count(k2) * c2 - penalty * T::from_count(uncovered)
    };

    let mut best = value(0, 0);
    for k2 in 0..=undecided / l2 {
        let rest = undecided - k2 * l2;
        best = best.max(value(0, k2)).max(value(rest / l1, k2));
    }
    best
}

/// Returns the value of placing nothing at all: every usable cell pays the penalty.
#[inline]
pub fn lower_bound<T>(problem: &Problem<T>) -> T
where
    T: CoverageNumeric,
{
    T::zero() - problem.penalty() * T::from_count(problem.num_usable_cells())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_model::{
        block::{Orientation, Placement},
        problem::ProblemBuilder,
    };

    fn exhaustive_best(problem: &Problem<i64>, grid: &mut Grid<i64>, cursor: Option<Cell>) -> i64 {
        let Some(cell) = cursor else {
            return grid.cost();
        };
        let mut best = i64::MIN;
        for placement in grid.candidate_placements(problem, cell) {
            assert!(grid.place(problem, &placement));
            let next = grid.advance(cell);
            best = best.max(exhaustive_best(problem, grid, next));
            grid.undo(problem, &placement).unwrap();
        }
        best
    }

    #[test]
    fn test_lower_bound_is_all_empty_cost() {
        let p = ProblemBuilder::<i64>::new(3, 3)
            .penalty(2)
            .forbid(Cell::new(1, 1))
            .build()
            .unwrap();
        assert_eq!(lower_bound(&p), -16);
        assert_eq!(lower_bound(&p), Grid::new(&p).cost());
    }

    #[test]
    fn test_upper_bound_is_zero_past_the_last_cell() {
        let p = ProblemBuilder::<i64>::new(2, 2)
            .type1(1, 5)
            .penalty(1)
            .build()
            .unwrap();
        let grid = Grid::new(&p);
        assert_eq!(upper_bound(&p, &grid, None), 0);
    }

    #[test]
    fn test_remaining_value_bound_picks_best_mix() {
        let p = ProblemBuilder::<i64>::new(1, 7)
            .type1(2, 1)
            .type2(3, 10)
            .penalty(1)
            .build()
            .unwrap();
        // Two type 2 blocks cover 6 cells and leave one uncovered: 20 - 1.
        assert_eq!(remaining_value_bound(&p, 7), 19);
        // Nothing fits into a single cell.
        assert_eq!(remaining_value_bound(&p, 1), -1);
    }

    #[test]
    fn test_remaining_value_bound_prefers_empty_with_negative_blocks() {
        let p = ProblemBuilder::<i64>::new(1, 4)
            .type1(1, -10)
            .type2(2, -10)
            .penalty(1)
            .build()
            .unwrap();
        assert_eq!(remaining_value_bound(&p, 4), -4);
    }

    #[test]
    fn test_upper_bound_is_admissible_on_small_grids() {
        let configs = [
            (2, 1, 3, 5, 1),
            (1, 2, 3, 4, 2),
            (2, -1, 3, 6, 3),
            (1, 0, 2, 0, 5),
            (2, 4, 3, -2, 0),
        ];

        for (l1, c1, l2, c2, penalty) in configs {
            let p = ProblemBuilder::<i64>::new(3, 3)
                .type1(l1, c1)
                .type2(l2, c2)
                .penalty(penalty)
                .forbid(Cell::new(2, 0))
                .build()
                .unwrap();

            let mut grid = Grid::new(&p);
            let root = grid.first_cursor();
            let best = exhaustive_best(&p, &mut grid, root);
            let ceiling = upper_bound(&p, &grid, root) + grid.cost_excluding_future_penalty(&p, root);
            assert!(
                ceiling >= best,
                "bound {} underestimates best {} for {:?}",
                ceiling,
                best,
                (l1, c1, l2, c2, penalty)
            );

            // Also check a state one placement deep.
            let origin = Cell::new(0, 0);
            let block = Placement::block(origin, BlockType::Type1, Orientation::Vertical);
            if grid.place(&p, &block) {
                let next = grid.advance(origin);
                let best = exhaustive_best(&p, &mut grid, next);
                let ceiling =
                    upper_bound(&p, &grid, next) + grid.cost_excluding_future_penalty(&p, next);
                assert!(ceiling >= best);
                grid.undo(&p, &block).unwrap();
            }
        }
    }
}
