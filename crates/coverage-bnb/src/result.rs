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

use crate::{grid::Grid, stats::SearchStatistics};
use coverage_model::num::CoverageNumeric;

/// The best grid of a finished solve and the statistics of the run.
#[derive(Debug, Clone)]
pub struct SolveOutcome<T> {
    grid: Grid<T>,
    statistics: SearchStatistics,
}

impl<T> SolveOutcome<T>
where
    T: CoverageNumeric,
{
    #[inline]
    pub fn new(grid: Grid<T>, statistics: SearchStatistics) -> Self {
        Self { grid, statistics }
    }

    /// Returns the best grid found.
    #[inline]
    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    /// Returns the cost of the best grid found.
    #[inline]
    pub fn cost(&self) -> T {
        self.grid.cost()
    }

    /// Returns the solver statistics.
    #[inline]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Consumes the outcome and returns the best grid.
    #[inline]
    pub fn into_grid(self) -> Grid<T> {
        self.grid
    }
}

impl<T> std::fmt::Display for SolveOutcome<T>
where
    T: CoverageNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.grid)?;
        write!(f, "{}", self.statistics)
    }
}
