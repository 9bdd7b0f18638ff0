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

//! Coverage-BnB: branch-and-bound for block coverage
//!
//! Finds a placement of non-overlapping straight blocks on a grid with
//! forbidden cells that maximizes the total block value minus a penalty for
//! every usable cell left uncovered.
//!
//! Core flow
//! - Build a `coverage_model::problem::Problem<T>`.
//! - Pick a strategy and run it through `solver::CoverageSolver`, or call one
//!   of `bnb::solve_sequential`, `parallel::solve_task_parallel` or
//!   `batch::solve_data_parallel` directly.
//!
//! Design highlights
//! - The grid is mutated in place (place, recurse, undo); every grid that
//!   crosses a thread boundary is a fresh deep copy.
//! - The best grid is a single value behind `incumbent::SharedIncumbent`,
//!   reachable only through its compare-and-replace operation.
//! - `bounds::upper_bound` ignores geometry, which keeps it admissible.
//!
//! Module map
//! - `grid`: the mutable search state and its place/undo operations.
//! - `bounds`: admissible upper bound and the trivial lower bound.
//! - `bnb`: the depth-first walker and the sequential strategy.
//! - `parallel`: fork-join tasks on the `rayon` pool.
//! - `batch`: breadth-first job generation and the data-parallel strategy.
//! - `incumbent`: local and shared best-grid holders.
//! - `solver`: strategy selection and thread pool configuration.
//! - `result`, `stats`, `err`: outcomes, counters, errors.

pub mod batch;
pub mod bnb;
pub mod bounds;
pub mod err;
pub mod grid;
pub mod incumbent;
pub mod parallel;
pub mod result;
pub mod solver;
pub mod stats;
