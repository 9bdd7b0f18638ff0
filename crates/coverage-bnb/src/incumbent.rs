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

//! # Incumbent (Best Grid Holder)
//!
//! The search maximizes the grid cost. The best grid seen so far is the
//! incumbent; it is only ever replaced by a strictly better candidate.
//!
//! - `SharedIncumbent<T>`: the concurrent holder used by the parallel
//!   strategies. The authoritative grid lives behind a `Mutex`, and an
//!   `AtomicI64` mirrors its cost so pruning reads never take the lock.
//! - `IncumbentStore<T>`: the interface the search engine talks to.
//!   `LocalIncumbent<T>` owns its grid and serves single-threaded runs;
//!   `SharedIncumbentAdapter<'a, T>` forwards to a `SharedIncumbent`.
//!
//! ```rust
//! use coverage_bnb::{grid::Grid, incumbent::SharedIncumbent};
//! use coverage_model::problem::ProblemBuilder;
//!
//! let problem = ProblemBuilder::<i64>::new(1, 2).penalty(1).build().unwrap();
//! let root = Grid::new(&problem);
//! let incumbent = SharedIncumbent::new(root.clone());
//!
//! assert_eq!(incumbent.best_cost(), -2);
//! assert!(!incumbent.try_install(&root)); // equal is not better
//! ```

use crate::grid::Grid;
use coverage_model::num::CoverageNumeric;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicI64, Ordering},
};

/// A concurrent holder for the best grid found during search.
///
/// The cost hint is read and written with `Ordering::Relaxed`. It only serves
/// to skip obviously worse candidates; every install re-checks against the
/// grid held by the mutex.
#[derive(Debug)]
pub struct SharedIncumbent<T> {
    best_cost: AtomicI64,
    grid: Mutex<Grid<T>>,
}

impl<T> SharedIncumbent<T>
where
    T: CoverageNumeric,
{
    /// Creates a shared incumbent seeded with `initial`.
    #[inline]
    pub fn new(initial: Grid<T>) -> Self {
        Self {
            best_cost: AtomicI64::new(initial.cost().into()),
            grid: Mutex::new(initial),
        }
    }

    /// Returns the cost of the incumbent as a lock-free read.
    #[inline]
    pub fn best_cost_hint(&self) -> i64 {
        self.best_cost.load(Ordering::Relaxed)
    }

    /// Returns the cost of the incumbent.
    #[inline]
    pub fn best_cost(&self) -> T {
        // The hint is always written from a `T`, so the conversion only fails
        // if the value was corrupted; fall back to the authoritative grid.
        T::from_i64(self.best_cost_hint()).unwrap_or_else(|| self.snapshot().cost())
    }

    /// Returns a copy of the incumbent grid.
    #[inline]
    pub fn snapshot(&self) -> Grid<T> {
        self.grid
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consumes the holder and returns the incumbent grid.
    #[inline]
    pub fn into_inner(self) -> Grid<T> {
        self.grid.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs `candidate` if its cost is strictly greater than the
    /// incumbent's. Returns `true` if it was installed.
    pub fn try_install(&self, candidate: &Grid<T>) -> bool {
        let candidate_cost: i64 = candidate.cost().into();
        if candidate_cost <= self.best_cost_hint() {
            return false;
        }

        let mut guard = self.grid.lock().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have installed something better while we waited.
        if candidate.cost() <= guard.cost() {
            return false;
        }

        *guard = candidate.clone();
        self.best_cost.store(candidate_cost, Ordering::Relaxed);
        true
    }
}

impl<T> std::fmt::Display for SharedIncumbent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Incumbent(best_cost: {})",
            self.best_cost.load(Ordering::Relaxed)
        )
    }
}

/// Where the search engine reads the best known cost from and reports
/// improvements to.
pub trait IncumbentStore<T>
where
    T: CoverageNumeric,
{
    /// Returns the cost a subtree has to beat to be worth exploring.
    fn best_cost(&self) -> T;
    /// Offers a grid; it is kept only if strictly better. Returns `true` if kept.
    fn offer(&mut self, grid: &Grid<T>) -> bool;
}

/// An incumbent owned by a single search, with no sharing.
#[derive(Debug, Clone)]
pub struct LocalIncumbent<T> {
    best: Grid<T>,
}

impl<T> LocalIncumbent<T>
where
    T: CoverageNumeric,
{
    /// Creates a local incumbent seeded with `initial`.
    #[inline]
    pub fn new(initial: Grid<T>) -> Self {
        Self { best: initial }
    }

    /// Returns the best grid seen so far.
    #[inline]
    pub fn best(&self) -> &Grid<T> {
        &self.best
    }

    /// Consumes the store and returns the best grid.
    #[inline]
    pub fn into_best(self) -> Grid<T> {
        self.best
    }
}

impl<T> IncumbentStore<T> for LocalIncumbent<T>
where
    T: CoverageNumeric,
{
    #[inline]
    fn best_cost(&self) -> T {
        self.best.cost()
    }

    #[inline]
    fn offer(&mut self, grid: &Grid<T>) -> bool {
        if grid.cost() > self.best.cost() {
            self.best.clone_from(grid);
            true
        } else {
            false
        }
    }
}

/// Forwards to a `SharedIncumbent` so that many tasks can search against one
/// best grid.
#[derive(Debug, Clone, Copy)]
pub struct SharedIncumbentAdapter<'a, T> {
    inner: &'a SharedIncumbent<T>,
}

impl<'a, T> SharedIncumbentAdapter<'a, T> {
    /// Creates a new adapter around `inner`.
    #[inline]
    pub fn new(inner: &'a SharedIncumbent<T>) -> Self {
        Self { inner }
    }
}

impl<'a, T> IncumbentStore<T> for SharedIncumbentAdapter<'a, T>
where
    T: CoverageNumeric,
{
    #[inline]
    fn best_cost(&self) -> T {
        self.inner.best_cost()
    }

    #[inline]
    fn offer(&mut self, grid: &Grid<T>) -> bool {
        self.inner.try_install(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_model::{
        block::{BlockType, Orientation, Placement},
        index::Cell,
        problem::{Problem, ProblemBuilder},
    };
    use std::{sync::Arc, thread};

    fn problem() -> Problem<i64> {
        ProblemBuilder::new(1, 8)
            .type1(1, 1)
            .type2(2, 5)
            .penalty(1)
            .build()
            .unwrap()
    }

    fn grid_with_cost(problem: &Problem<i64>, cost: i64) -> Grid<i64> {
        let root = Grid::new(problem);
        Grid::from_parts(root.rows(), root.columns(), root.cells().to_vec(), cost).unwrap()
    }

    #[test]
    fn test_initial_state_reflects_seed() {
        let p = problem();
        let inc = SharedIncumbent::new(Grid::new(&p));
        assert_eq!(inc.best_cost_hint(), -8);
        assert_eq!(inc.best_cost(), -8);
        assert_eq!(inc.snapshot(), Grid::new(&p));
    }

    #[test]
    fn test_install_better_grid_updates_hint_and_snapshot() {
        let p = problem();
        let inc = SharedIncumbent::new(Grid::new(&p));

        let mut better = Grid::new(&p);
        let block = Placement::block(Cell::new(0, 0), BlockType::Type2, Orientation::Horizontal);
        assert!(better.place(&p, &block));
        assert_eq!(better.cost(), -1);

        assert!(inc.try_install(&better));
        assert_eq!(inc.best_cost(), -1);
        assert_eq!(inc.snapshot(), better);
        assert_eq!(format!("{}", inc), "Incumbent(best_cost: -1)");
    }

    #[test]
    fn test_reject_worse_or_equal_candidates() {
        let p = problem();
        let inc = SharedIncumbent::new(grid_with_cost(&p, 10));

        assert!(!inc.try_install(&grid_with_cost(&p, 3)));
        assert!(!inc.try_install(&grid_with_cost(&p, 10)));
        assert_eq!(inc.best_cost(), 10);
        assert_eq!(inc.into_inner().cost(), 10);
    }

    #[test]
    fn test_concurrent_installs_maximum_wins() {
        let p = problem();
        let inc = Arc::new(SharedIncumbent::new(grid_with_cost(&p, i64::MIN)));
        let costs = vec![30, 200, 40, 5, 120, 75, 500, 60, 90];

        let handles = costs
            .iter()
            .map(|&cost| {
                let inc = Arc::clone(&inc);
                let grid = grid_with_cost(&p, cost);
                thread::spawn(move || inc.try_install(&grid))
            })
            .collect::<Vec<_>>();

        let installed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        assert!(installed.iter().any(|&ok| ok));

        let max_cost = *costs.iter().max().unwrap();
        assert_eq!(inc.best_cost(), max_cost);
        assert_eq!(inc.snapshot().cost(), max_cost);
    }

    #[test]
    fn test_local_incumbent_keeps_strictly_better() {
        let p = problem();
        let mut store = LocalIncumbent::new(grid_with_cost(&p, 0));

        assert!(!store.offer(&grid_with_cost(&p, 0)));
        assert!(store.offer(&grid_with_cost(&p, 4)));
        assert!(!store.offer(&grid_with_cost(&p, 2)));
        assert_eq!(store.best_cost(), 4);
        assert_eq!(store.into_best().cost(), 4);
    }

    #[test]
    fn test_adapter_forwards_to_shared() {
        let p = problem();
        let shared = SharedIncumbent::new(grid_with_cost(&p, 1));
        let mut a = SharedIncumbentAdapter::new(&shared);
        let mut b = a;

        assert_eq!(a.best_cost(), 1);
        assert!(a.offer(&grid_with_cost(&p, 7)));
        assert_eq!(b.best_cost(), 7);
        assert!(!b.offer(&grid_with_cost(&p, 6)));
        assert_eq!(shared.best_cost(), 7);
    }
}
