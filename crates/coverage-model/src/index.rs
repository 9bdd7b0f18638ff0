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

//! Grid coordinates.
//!
//! A `Cell` addresses one square of the grid by `row` (the `x` coordinate,
//! `0 ≤ row < rows`) and `column` (the `y` coordinate, `0 ≤ column < columns`).
//! The search visits cells in column-major scan order: the row advances first,
//! and when it wraps the column advances.

/// A position on the grid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Cell {
    row: usize,
    column: usize,
}

impl Cell {
    /// Creates a new cell at the given row and column.
    #[inline(always)]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Returns the row (`x`) of the cell.
    #[inline(always)]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Returns the column (`y`) of the cell.
    #[inline(always)]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Returns the row-major offset of this cell in a buffer with `columns` columns.
    #[inline(always)]
    pub const fn flatten(&self, columns: usize) -> usize {
        self.row * columns + self.column
    }

    /// Returns `true` if the cell lies inside a `rows × columns` grid.
    #[inline(always)]
    pub const fn is_within(&self, rows: usize, columns: usize) -> bool {
        self.row < rows && self.column < columns
    }

    /// Returns the cell that follows this one in column-major scan order,
    /// or `None` if this is the last cell of a `rows × columns` grid.
    #[inline]
    pub const fn scan_successor(&self, rows: usize, columns: usize) -> Option<Cell> {
        if self.row + 1 < rows {
            Some(Cell::new(self.row + 1, self.column))
        } else if self.column + 1 < columns {
            Some(Cell::new(0, self.column + 1))
        } else {
            None
        }
    }

    /// Returns `true` if this cell comes at or after `cursor` in column-major
    /// scan order.
    #[inline(always)]
    pub const fn is_at_or_after(&self, cursor: Cell) -> bool {
        self.column > cursor.column || (self.column == cursor.column && self.row >= cursor.row)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::Cell;

    #[test]
    fn test_scan_successor_advances_row_first() {
        let c = Cell::new(0, 0);
        assert_eq!(c.scan_successor(3, 2), Some(Cell::new(1, 0)));
        assert_eq!(Cell::new(2, 0).scan_successor(3, 2), Some(Cell::new(0, 1)));
        assert_eq!(Cell::new(2, 1).scan_successor(3, 2), None);
    }

    #[test]
    fn test_scan_successor_single_cell_grid() {
        assert_eq!(Cell::new(0, 0).scan_successor(1, 1), None);
    }

    #[test]
    fn test_is_at_or_after_follows_scan_order() {
        let cursor = Cell::new(1, 1);
        assert!(Cell::new(1, 1).is_at_or_after(cursor));
        assert!(Cell::new(2, 1).is_at_or_after(cursor));
        assert!(Cell::new(0, 2).is_at_or_after(cursor));
        assert!(!Cell::new(0, 1).is_at_or_after(cursor));
        assert!(!Cell::new(5, 0).is_at_or_after(cursor));
    }

    #[test]
    fn test_flatten_is_row_major() {
        assert_eq!(Cell::new(0, 0).flatten(4), 0);
        assert_eq!(Cell::new(1, 2).flatten(4), 6);
        assert_eq!(Cell::new(2, 3).flatten(4), 11);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Cell::new(3, 7)), "(3, 7)");
    }
}
