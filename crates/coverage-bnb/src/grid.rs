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

//! # Coverage Grid
//!
//! The mutable search state: a contiguous `rows × columns` buffer of cell ids
//! plus the running objective value.
//!
//! Each cell holds `BLOCKED` (a forbidden cell), `EMPTY` (usable and not yet
//! covered) or the positive id of the block shape covering it. The running
//! cost always equals the sum of the values of the placed blocks minus the
//! penalty for every `EMPTY` cell, and `place`/`undo` keep that invariant
//! incrementally.
//!
//! The grid does not own its `Problem`; every operation that needs block
//! lengths, values or the penalty takes the problem by reference. `Clone` is a
//! full deep copy, which is how branches, jobs and best snapshots become
//! independent owners of their state.

use crate::err::GridError;
use coverage_model::{
    block::{BlockType, EMPTY_ID, MAX_BLOCK_ID, Orientation, Placement},
    index::Cell,
    num::CoverageNumeric,
    problem::Problem,
};
use smallvec::SmallVec;

/// Cell value of a permanently forbidden cell.
pub const BLOCKED: i32 = -1;

/// Cell value of a usable cell that no block covers.
pub const EMPTY: i32 = EMPTY_ID;

/// Candidate list for one cell; at most four block shapes plus `Empty`.
pub type Candidates = SmallVec<[Placement; 5]>;

/// Block shapes in the order the search tries them.
const SHAPE_ORDER: [(BlockType, Orientation); 4] = [
    (BlockType::Type1, Orientation::Horizontal),
    (BlockType::Type1, Orientation::Vertical),
    (BlockType::Type2, Orientation::Vertical),
    (BlockType::Type2, Orientation::Horizontal),
];

/// A `rows × columns` matrix of cell ids with a running cost.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid<T> {
    rows: usize,
    columns: usize,
    cells: Vec<i32>, // row-major
    cost: T,
}

impl<T> Grid<T>
where
    T: CoverageNumeric,
{
    /// Creates the root grid of `problem`: forbidden cells are `BLOCKED`,
    /// everything else is `EMPTY`, and the cost charges the penalty for every
    /// usable cell.
    pub fn new(problem: &Problem<T>) -> Self {
        let (rows, columns) = (problem.rows(), problem.columns());
        let mut cells = vec![EMPTY; rows * columns];
        for cell in problem.forbidden_cells() {
            cells[cell.flatten(columns)] = BLOCKED;
        }

        let cost = T::zero() - problem.penalty() * T::from_count(problem.num_usable_cells());
        Self {
            rows,
            columns,
            cells,
            cost,
        }
    }

    /// Rebuilds a grid from a row-major cell buffer and a cost.
    ///
    /// Only the buffer length is checked here; the values are trusted.
    pub fn from_parts(
        rows: usize,
        columns: usize,
        cells: Vec<i32>,
        cost: T,
    ) -> Result<Self, GridError> {
        let expected = rows * columns;
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                found: cells.len(),
            });
        }

        Ok(Self {
            rows,
            columns,
            cells,
            cost,
        })
    }

    /// Returns the number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the current objective value.
    #[inline]
    pub fn cost(&self) -> T {
        self.cost
    }

    /// Returns the row-major cell buffer.
    #[inline]
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Returns the id stored at `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell` lies outside the grid.
    #[inline]
    pub fn cell(&self, cell: Cell) -> i32 {
        assert!(
            cell.is_within(self.rows, self.columns),
            "called `Grid::cell` with cell out of bounds: the grid is {}x{} but the cell is {}",
            self.rows,
            self.columns,
            cell
        );
        self.cells[cell.flatten(self.columns)]
    }

    /// Returns the number of usable cells no block covers.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == EMPTY).count()
    }

    /// Returns the number of cells covered by a block.
    #[inline]
    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|&&v| v > EMPTY).count()
    }

    /// Returns the number of `EMPTY` cells at or after `cursor` in scan order.
    /// A `None` cursor has nothing after it.
    pub fn count_empty_from(&self, cursor: Option<Cell>) -> usize {
        let Some(cursor) = cursor else {
            return 0;
        };

        self.cells
            .iter()
            .enumerate()
            .filter(|&(offset, &value)| {
                value == EMPTY
                    && Cell::new(offset / self.columns, offset % self.columns)
                        .is_at_or_after(cursor)
            })
            .count()
    }

    /// Returns the first `EMPTY` cell in scan order, or `None` if every cell
    /// is blocked or covered.
    #[inline]
    pub fn first_cursor(&self) -> Option<Cell> {
        let origin = Cell::new(0, 0);
        if self.cells.is_empty() {
            return None;
        }
        if self.cells[0] == EMPTY {
            Some(origin)
        } else {
            self.advance(origin)
        }
    }

    /// Returns the next `EMPTY` cell strictly after `cursor` in scan order,
    /// or `None` once the scan runs past the last cell.
    pub fn advance(&self, cursor: Cell) -> Option<Cell> {
        let mut next = cursor.scan_successor(self.rows, self.columns);
        while let Some(cell) = next {
            if self.cells[cell.flatten(self.columns)] == EMPTY {
                return Some(cell);
            }
            next = cell.scan_successor(self.rows, self.columns);
        }
        None
    }

    /// Returns `true` if `placement` could be applied to the grid right now.
    fn fits(&self, problem: &Problem<T>, placement: &Placement) -> bool {
        if !placement.cell().is_within(self.rows, self.columns) {
            return false;
        }

        let Some(block_type) = placement.kind().block_type() else {
            return true;
        };

        let length = problem.block_length(block_type);
        match placement.far_end(length) {
            Some(end) if end.is_within(self.rows, self.columns) => placement
                .footprint(length)
                .all(|c| self.cells[c.flatten(self.columns)] == EMPTY),
            _ => false,
        }
    }

    /// Applies `placement`. Returns `false` without touching the grid if the
    /// footprint leaves the grid or overlaps a cell that is not `EMPTY`.
    ///
    /// An `Empty` placement succeeds without mutation whenever its cell lies
    /// inside the grid.
    pub fn place(&mut self, problem: &Problem<T>, placement: &Placement) -> bool {
        if !self.fits(problem, placement) {
            return false;
        }

        let Some(block_type) = placement.kind().block_type() else {
            return true;
        };

        let id = placement.id();
        for c in placement.footprint(problem.block_length(block_type)) {
            self.cells[c.flatten(self.columns)] = id;
        }
        self.cost = self.cost + problem.placement_delta(block_type);
        true
    }

    /// Reverses a previously applied `placement`.
    ///
    /// Every footprint cell must carry the placement's id; otherwise the grid is
    /// left untouched and a `GridError` is returned. Undoing `Empty` is a no-op.
    pub fn undo(&mut self, problem: &Problem<T>, placement: &Placement) -> Result<(), GridError> {
        let Some(block_type) = placement.kind().block_type() else {
            return Ok(());
        };

        let id = placement.id();
        let length = problem.block_length(block_type);
        for c in placement.footprint(length) {
            if !c.is_within(self.rows, self.columns) {
                return Err(GridError::FootprintOutOfBounds { cell: c });
            }
            let found = self.cells[c.flatten(self.columns)];
            if found != id {
                return Err(GridError::FootprintMismatch {
                    cell: c,
                    expected: id,
                    found,
                });
            }
        }

        for c in placement.footprint(length) {
            self.cells[c.flatten(self.columns)] = EMPTY;
        }
        self.cost = self.cost - problem.placement_delta(block_type);
        Ok(())
    }

    /// Returns every placement that can be applied at `cell`, in search order:
    /// type 1 horizontal, type 1 vertical, type 2 vertical, type 2 horizontal,
    /// then `Empty`. A blocked or covered cell yields no candidates.
    pub fn candidate_placements(&self, problem: &Problem<T>, cell: Cell) -> Candidates {
        let mut candidates = Candidates::new();
        if !cell.is_within(self.rows, self.columns)
            || self.cells[cell.flatten(self.columns)] != EMPTY
        {
            return candidates;
        }

        for (block_type, orientation) in SHAPE_ORDER {
            let placement = Placement::block(cell, block_type, orientation);
            if self.fits(problem, &placement) {
                candidates.push(placement);
            }
        }
        candidates.push(Placement::empty(cell));
        candidates
    }

    /// Returns the cost with the penalty of the still undecided cells (the
    /// `EMPTY` cells at or after `cursor`) added back.
    #[inline]
    pub fn cost_excluding_future_penalty(&self, problem: &Problem<T>, cursor: Option<Cell>) -> T {
        self.cost + problem.penalty() * T::from_count(self.count_empty_from(cursor))
    }

    /// Returns `true` if every cell holds a value a grid of this problem can
    /// carry: `BLOCKED` exactly on the forbidden cells and `EMPTY` or a shape
    /// id everywhere else.
    pub fn is_consistent_with(&self, problem: &Problem<T>) -> bool {
        if self.rows != problem.rows() || self.columns != problem.columns() {
            return false;
        }

        self.cells.iter().enumerate().all(|(offset, &value)| {
            let cell = Cell::new(offset / self.columns, offset % self.columns);
            if problem.is_forbidden(cell) {
                value == BLOCKED
            } else {
                (EMPTY..=MAX_BLOCK_ID).contains(&value)
            }
        })
    }
}

impl<T> std::fmt::Display for Grid<T>
where
    T: CoverageNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.rows {
            for column in 0..self.columns {
                if column > 0 {
                    write!(f, " ")?;
                }
                match self.cells[row * self.columns + column] {
                    BLOCKED => write!(f, "#")?,
                    EMPTY => write!(f, ".")?,
                    id => write!(f, "{}", id)?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "Cost: {}", self.cost)
    }
}
