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

//! The immutable problem descriptor.
//!
//! A `Problem<T>` describes the grid extent, the two block kinds (length and
//! placement value), the penalty charged per uncovered usable cell, and the
//! set of permanently forbidden cells. It is built once through
//! `ProblemBuilder`, validated eagerly, and shared read-only by every solver
//! strategy afterwards.

use crate::{block::BlockType, index::Cell, num::CoverageNumeric};
use fixedbitset::FixedBitSet;

/// Length and placement value of one block kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlockSpec<T> {
    length: usize,
    cost: T,
}

impl<T> BlockSpec<T>
where
    T: Copy,
{
    /// Creates a new block specification.
    #[inline]
    pub const fn new(length: usize, cost: T) -> Self {
        Self { length, cost }
    }

    /// Returns the number of cells a block of this kind covers.
    #[inline]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Returns the value added to the objective when a block of this kind is placed.
    #[inline]
    pub const fn cost(&self) -> T {
        self.cost
    }
}

/// The error type for problem construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    /// The grid has zero rows or zero columns.
    InvalidDimensions { rows: usize, columns: usize },
    /// A block kind has length zero.
    InvalidBlockLength { block_type: BlockType },
    /// A forbidden cell lies outside the grid.
    ForbiddenCellOutOfBounds { cell: Cell, rows: usize, columns: usize },
    /// Block values and penalty are too large for every objective value the
    /// search computes to fit the numeric type.
    CostOverflow,
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { rows, columns } => write!(
                f,
                "Grid dimensions must be positive, got {} rows and {} columns",
                rows, columns
            ),
            Self::InvalidBlockLength { block_type } => {
                write!(f, "Block type {} must have a positive length", block_type)
            }
            Self::ForbiddenCellOutOfBounds {
                cell,
                rows,
                columns,
            } => write!(
                f,
                "Forbidden cell {} lies outside the {}x{} grid",
                cell, rows, columns
            ),
            Self::CostOverflow => write!(
                f,
                "Block values and penalty are too large for the numeric cost type"
            ),
        }
    }
}

impl std::error::Error for ProblemError {}

/// The immutable description of a coverage problem instance.
///
/// Construction:
/// - Use `ProblemBuilder` and call `ProblemBuilder::build` to obtain a validated `Problem`.
#[derive(Clone, PartialEq, Eq)]
pub struct Problem<T> {
    rows: usize,
    columns: usize,
    type1: BlockSpec<T>,
    type2: BlockSpec<T>,
    penalty: T,
    forbidden_mask: FixedBitSet,     // len = rows * columns, row-major
    forbidden_cells: Vec<Cell>,      // sorted, deduplicated
}

impl<T> Problem<T>
where
    T: CoverageNumeric,
{
    /// Returns the number of rows of the grid.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns of the grid.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the total number of cells, forbidden ones included.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.rows * self.columns
    }

    /// Returns the number of cells that are not forbidden.
    #[inline]
    pub fn num_usable_cells(&self) -> usize {
        self.num_cells() - self.forbidden_cells.len()
    }

    /// Returns the number of distinct forbidden cells.
    #[inline]
    pub fn num_forbidden(&self) -> usize {
        self.forbidden_cells.len()
    }

    /// Returns the forbidden cells in row-major order.
    #[inline]
    pub fn forbidden_cells(&self) -> &[Cell] {
        &self.forbidden_cells
    }

    /// Returns `true` if `cell` is permanently unusable.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `cell` lies outside the grid.
    #[inline]
    pub fn is_forbidden(&self, cell: Cell) -> bool {
        debug_assert!(
            cell.is_within(self.rows, self.columns),
            "called `Problem::is_forbidden` with cell out of bounds: the grid is {}x{} but the cell is {}",
            self.rows,
            self.columns,
            cell
        );
        self.forbidden_mask.contains(cell.flatten(self.columns))
    }

    /// Returns the specification of the given block kind.
    #[inline]
    pub fn block(&self, block_type: BlockType) -> BlockSpec<T> {
        match block_type {
            BlockType::Type1 => self.type1,
            BlockType::Type2 => self.type2,
        }
    }

    /// Returns the length of the given block kind.
    #[inline]
    pub fn block_length(&self, block_type: BlockType) -> usize {
        self.block(block_type).length()
    }

    /// Returns the placement value of the given block kind.
    #[inline]
    pub fn block_cost(&self, block_type: BlockType) -> T {
        self.block(block_type).cost()
    }

    /// Returns the length of type 1 blocks.
    #[inline]
    pub fn type1_length(&self) -> usize {
        self.type1.length()
    }

    /// Returns the value of type 1 blocks.
    #[inline]
    pub fn type1_cost(&self) -> T {
        self.type1.cost()
    }

    /// Returns the length of type 2 blocks.
    #[inline]
    pub fn type2_length(&self) -> usize {
        self.type2.length()
    }

    /// Returns the value of type 2 blocks.
    #[inline]
    pub fn type2_cost(&self) -> T {
        self.type2.cost()
    }

    /// Returns the penalty charged for every uncovered usable cell.
    #[inline]
    pub fn penalty(&self) -> T {
        self.penalty
    }

    /// Returns the net change of the objective when a block of the given kind is
    /// placed on empty cells: its value plus the penalty it no longer pays.
    #[inline]
    pub fn placement_delta(&self, block_type: BlockType) -> T {
        let spec = self.block(block_type);
        spec.cost() + self.penalty * T::from_count(spec.length())
    }
}

impl<T> std::fmt::Debug for Problem<T>
where
    T: CoverageNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .field("type1", &self.type1)
            .field("type2", &self.type2)
            .field("penalty", &self.penalty)
            .field("forbidden_cells", &self.forbidden_cells)
            .finish()
    }
}

impl<T> std::fmt::Display for Problem<T>
where
    T: CoverageNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix size: {}, {}", self.rows, self.columns)?;
        writeln!(
            f,
            "Length of I1 {} with cost {}",
            self.type1.length(),
            self.type1.cost()
        )?;
        writeln!(
            f,
            "Length of I2 {} with cost {}",
            self.type2.length(),
            self.type2.cost()
        )?;
        writeln!(f, "Penalization of uncovered block: {}", self.penalty)?;
        write!(f, "Forbidden Points ({})", self.forbidden_cells.len())?;
        for cell in &self.forbidden_cells {
            write!(f, " {}", cell)?;
        }
        Ok(())
    }
}

/// A builder for `Problem<T>`.
///
/// ```rust
/// use coverage_model::problem::ProblemBuilder;
/// use coverage_model::index::Cell;
///
/// let problem = ProblemBuilder::<i64>::new(2, 2)
///     .type1(1, 0)
///     .type2(2, 3)
///     .penalty(5)
///     .forbid(Cell::new(0, 0))
///     .build()
///     .expect("valid problem");
///
/// assert_eq!(problem.num_usable_cells(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct ProblemBuilder<T> {
    rows: usize,
    columns: usize,
    type1: BlockSpec<T>,
    type2: BlockSpec<T>,
    penalty: T,
    forbidden: Vec<Cell>,
}

impl<T> ProblemBuilder<T>
where
    T: CoverageNumeric,
{
    /// Creates a builder for a `rows × columns` grid with unit-length,
    /// zero-value blocks and no penalty.
    #[inline]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            type1: BlockSpec::new(1, T::zero()),
            type2: BlockSpec::new(1, T::zero()),
            penalty: T::zero(),
            forbidden: Vec::new(),
        }
    }

    /// Sets the length and value of type 1 blocks.
    #[inline]
    pub fn type1(mut self, length: usize, cost: T) -> Self {
        self.type1 = BlockSpec::new(length, cost);
        self
    }

    /// Sets the length and value of type 2 blocks.
    #[inline]
    pub fn type2(mut self, length: usize, cost: T) -> Self {
        self.type2 = BlockSpec::new(length, cost);
        self
    }

    /// Sets the penalty charged per uncovered usable cell.
    #[inline]
    pub fn penalty(mut self, penalty: T) -> Self {
        self.penalty = penalty;
        self
    }

    /// Marks a cell as permanently forbidden.
    #[inline]
    pub fn forbid(mut self, cell: Cell) -> Self {
        self.forbidden.push(cell);
        self
    }

    /// Marks every cell of `cells` as permanently forbidden.
    #[inline]
    pub fn forbid_all<I>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        self.forbidden.extend(cells);
        self
    }

    /// Validates the configuration and builds the problem.
    pub fn build(self) -> Result<Problem<T>, ProblemError> {
        let (rows, columns) = (self.rows, self.columns);
        if rows == 0 || columns == 0 {
            return Err(ProblemError::InvalidDimensions { rows, columns });
        }
        if self.type1.length() == 0 {
            return Err(ProblemError::InvalidBlockLength {
                block_type: BlockType::Type1,
            });
        }
        if self.type2.length() == 0 {
            return Err(ProblemError::InvalidBlockLength {
                block_type: BlockType::Type2,
            });
        }

        let mut forbidden_mask = FixedBitSet::with_capacity(rows * columns);
        for &cell in &self.forbidden {
            if !cell.is_within(rows, columns) {
                return Err(ProblemError::ForbiddenCellOutOfBounds {
                    cell,
                    rows,
                    columns,
                });
            }
            forbidden_mask.insert(cell.flatten(columns));
        }

        // Rebuild from the mask so the list is ordered and free of duplicates.
        let forbidden_cells = forbidden_mask
            .ones()
            .map(|offset| Cell::new(offset / columns, offset % columns))
            .collect();

        let usable = rows * columns - forbidden_mask.count_ones(..);
        if !fits_objective_range(&self.type1, &self.type2, self.penalty, usable) {
            return Err(ProblemError::CostOverflow);
        }

        Ok(Problem {
            rows,
            columns,
            type1: self.type1,
            type2: self.type2,
            penalty: self.penalty,
            forbidden_mask,
            forbidden_cells,
        })
    }
}

/// Returns `true` if four times the largest objective magnitude fits into `T`.
///
/// Grid costs, placement deltas and bound terms are each at most
/// `span · (|c1| + |c2| + |penalty|)` in magnitude, where `span` is the larger
/// of the usable cell count and the block lengths. A bound plus a partial cost
/// adds at most three such terms.
fn fits_objective_range<T>(
    type1: &BlockSpec<T>,
    type2: &BlockSpec<T>,
    penalty: T,
    usable: usize,
) -> bool
where
    T: CoverageNumeric,
{
    let widen = |v: T| -> i128 {
        let v: i64 = v.into();
        i128::from(v)
    };
    let span = usable.max(type1.length()).max(type2.length()) as i128;
    let per_cell = widen(type1.cost()).abs() + widen(type2.cost()).abs() + widen(penalty).abs();
    let limit = widen(T::max_value());

    span.checked_mul(per_cell)
        .and_then(|m| m.checked_mul(4))
        .is_some_and(|m| m <= limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_valid_problem() {
        let problem = ProblemBuilder::<i64>::new(3, 4)
            .type1(2, 3)
            .type2(3, 7)
            .penalty(2)
            .forbid(Cell::new(1, 1))
            .forbid(Cell::new(2, 3))
            .build()
            .expect("problem should build");

        assert_eq!(problem.rows(), 3);
        assert_eq!(problem.columns(), 4);
        assert_eq!(problem.num_cells(), 12);
        assert_eq!(problem.num_forbidden(), 2);
        assert_eq!(problem.num_usable_cells(), 10);
        assert!(problem.is_forbidden(Cell::new(1, 1)));
        assert!(!problem.is_forbidden(Cell::new(0, 0)));
        assert_eq!(problem.block_length(BlockType::Type1), 2);
        assert_eq!(problem.block_cost(BlockType::Type2), 7);
        assert_eq!(problem.penalty(), 2);
    }

    #[test]
    fn test_duplicate_forbidden_cells_are_counted_once() {
        let problem = ProblemBuilder::<i64>::new(2, 2)
            .forbid_all([Cell::new(0, 1), Cell::new(0, 1), Cell::new(1, 0)])
            .build()
            .unwrap();

        assert_eq!(problem.num_forbidden(), 2);
        assert_eq!(
            problem.forbidden_cells(),
            &[Cell::new(0, 1), Cell::new(1, 0)]
        );
    }

    #[test]
    fn test_placement_delta_adds_saved_penalty() {
        let problem = ProblemBuilder::<i64>::new(1, 4)
            .type1(1, 1)
            .type2(4, 10)
            .penalty(1)
            .build()
            .unwrap();

        assert_eq!(problem.placement_delta(BlockType::Type1), 2);
        assert_eq!(problem.placement_delta(BlockType::Type2), 14);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let err = ProblemBuilder::<i64>::new(0, 3).build().unwrap_err();
        assert_eq!(
            err,
            ProblemError::InvalidDimensions {
                rows: 0,
                columns: 3
            }
        );
    }

    #[test]
    fn test_rejects_zero_length_blocks() {
        let err = ProblemBuilder::<i64>::new(2, 2)
            .type2(0, 4)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ProblemError::InvalidBlockLength {
                block_type: BlockType::Type2
            }
        );
    }

    #[test]
    fn test_rejects_forbidden_cell_out_of_bounds() {
        let err = ProblemBuilder::<i64>::new(2, 2)
            .forbid(Cell::new(2, 0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ProblemError::ForbiddenCellOutOfBounds { .. }));
        assert!(err.to_string().contains("outside the 2x2 grid"));
    }

    #[test]
    fn test_rejects_costs_that_overflow_the_numeric_type() {
        // 100 usable cells at up to 20 per cell do not fit an i8.
        let err = ProblemBuilder::<i8>::new(10, 10)
            .type1(1, 10)
            .penalty(10)
            .build()
            .unwrap_err();
        assert_eq!(err, ProblemError::CostOverflow);

        let err = ProblemBuilder::<i64>::new(2, 2)
            .penalty(i64::MAX / 2)
            .build()
            .unwrap_err();
        assert_eq!(err, ProblemError::CostOverflow);

        let err = ProblemBuilder::<i64>::new(1, 1)
            .type2(1, i64::MIN)
            .build()
            .unwrap_err();
        assert_eq!(err, ProblemError::CostOverflow);
    }

    #[test]
    fn test_accepts_costs_within_range() {
        // 4 cells · (3 + 0 + 5) · 4 = 128 would not fit, 3 usable cells do.
        let problem = ProblemBuilder::<i8>::new(2, 2)
            .type1(1, 3)
            .penalty(5)
            .forbid(Cell::new(0, 0))
            .build()
            .unwrap();
        assert_eq!(problem.num_usable_cells(), 3);

        assert_eq!(
            ProblemBuilder::<i8>::new(2, 2)
                .type1(1, 3)
                .penalty(5)
                .build()
                .unwrap_err(),
            ProblemError::CostOverflow
        );
    }

    #[test]
    fn test_display_lists_configuration() {
        let problem = ProblemBuilder::<i64>::new(2, 3)
            .type1(1, 2)
            .type2(2, 5)
            .penalty(3)
            .forbid(Cell::new(1, 2))
            .build()
            .unwrap();

        let text = format!("{}", problem);
        assert!(text.contains("Matrix size: 2, 3"));
        assert!(text.contains("Length of I2 2 with cost 5"));
        assert!(text.contains("Forbidden Points (1) (1, 2)"));
    }
}
