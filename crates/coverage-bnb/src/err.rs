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

//! Error types of the search engine.
//!
//! A failed `place` is ordinary control flow and never shows up here. The
//! errors below mean the engine itself is broken (a place/undo pairing went
//! wrong) or that the runtime could not be set up.

use coverage_model::index::Cell;

/// An internal consistency violation on a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// `undo` found a footprint cell that does not carry the placement's id.
    FootprintMismatch {
        cell: Cell,
        expected: i32,
        found: i32,
    },
    /// `undo` was asked to clear a footprint that leaves the grid.
    FootprintOutOfBounds { cell: Cell },
    /// A cell buffer does not match the grid dimensions.
    SizeMismatch { expected: usize, found: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FootprintMismatch {
                cell,
                expected,
                found,
            } => write!(
                f,
                "Footprint mismatch at {}: expected id {} but found {}",
                cell, expected, found
            ),
            Self::FootprintOutOfBounds { cell } => {
                write!(f, "Footprint cell {} lies outside the grid", cell)
            }
            Self::SizeMismatch { expected, found } => write!(
                f,
                "Cell buffer has {} entries but the grid needs {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// The error type returned by the search strategies.
#[derive(Debug)]
pub enum SearchError {
    /// A search task hit a grid consistency violation and was aborted.
    Grid(GridError),
    /// The dedicated worker pool could not be created.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "Search aborted: {}", e),
            Self::ThreadPool(e) => write!(f, "Could not build thread pool: {}", e),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::ThreadPool(e) => Some(e),
        }
    }
}

impl From<GridError> for SearchError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for SearchError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_display() {
        let e = GridError::FootprintMismatch {
            cell: Cell::new(1, 2),
            expected: 3,
            found: 0,
        };
        assert_eq!(
            e.to_string(),
            "Footprint mismatch at (1, 2): expected id 3 but found 0"
        );
    }

    #[test]
    fn test_search_error_wraps_grid_error() {
        let inner = GridError::SizeMismatch {
            expected: 4,
            found: 3,
        };
        let e: SearchError = inner.clone().into();
        assert!(matches!(e, SearchError::Grid(ref g) if *g == inner));
        assert!(std::error::Error::source(&e).is_some());
    }
}
