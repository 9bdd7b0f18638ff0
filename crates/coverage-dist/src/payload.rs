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

//! Flat integer serialization of `(grid, cursor)` states.
//!
//! Layout, `3 + rows × columns` entries:
//!
//! ```raw
//! [cursor_row, cursor_column, cost, cell(0, 0), cell(0, 1), ..., cell(rows - 1, columns - 1)]
//! ```
//!
//! Cells are row-major. A cursor past the last cell is written as `(-1, -1)`.
//! Decoding checks the payload against the problem and never panics.

use crate::err::PayloadError;
use coverage_bnb::{
    batch::Job,
    grid::{BLOCKED, EMPTY, Grid},
};
use coverage_model::{block::MAX_BLOCK_ID, index::Cell, num::CoverageNumeric, problem::Problem};

/// Number of header entries before the cells.
pub const HEADER_LEN: usize = 3;

/// Cursor coordinate used for "no cursor".
pub const NO_CURSOR: i64 = -1;

/// Returns the payload length for `problem`.
#[inline]
pub fn payload_len<T>(problem: &Problem<T>) -> usize
where
    T: CoverageNumeric,
{
    HEADER_LEN + problem.num_cells()
}

/// Serializes `grid` and `cursor`.
pub fn encode<T>(grid: &Grid<T>, cursor: Option<Cell>) -> Vec<i64>
where
    T: CoverageNumeric,
{
    let mut payload = Vec::with_capacity(HEADER_LEN + grid.cells().len());
    match cursor {
        Some(cell) => {
            payload.push(cell.row() as i64);
            payload.push(cell.column() as i64);
        }
        None => {
            payload.push(NO_CURSOR);
            payload.push(NO_CURSOR);
        }
    }
    payload.push(grid.cost().into());
    payload.extend(grid.cells().iter().map(|&v| i64::from(v)));
    payload
}

/// Serializes a job.
#[inline]
pub fn encode_job<T>(job: &Job<T>) -> Vec<i64>
where
    T: CoverageNumeric,
{
    encode(job.grid(), job.cursor())
}

/// Deserializes a payload into a job of `problem`.
pub fn decode<T>(problem: &Problem<T>, payload: &[i64]) -> Result<Job<T>, PayloadError>
where
    T: CoverageNumeric,
{
    let expected = payload_len(problem);
    if payload.len() != expected {
        return Err(PayloadError::Length {
            expected,
            found: payload.len(),
        });
    }

    let (row, column) = (payload[0], payload[1]);
    let cursor = decode_cursor(problem, row, column)?;
    let cost = T::from_i64(payload[2]).ok_or(PayloadError::Cost { value: payload[2] })?;

    let columns = problem.columns();
    let mut cells = Vec::with_capacity(problem.num_cells());
    for (index, &value) in payload[HEADER_LEN..].iter().enumerate() {
        let cell = Cell::new(index / columns, index % columns);
        let valid = if problem.is_forbidden(cell) {
            value == i64::from(BLOCKED)
        } else {
            (i64::from(EMPTY)..=i64::from(MAX_BLOCK_ID)).contains(&value)
        };
        if !valid {
            return Err(PayloadError::Cell { index, value });
        }
        // In range of `i32` after the check above.
        cells.push(value as i32);
    }

    let grid = Grid::from_parts(problem.rows(), columns, cells, cost).map_err(|_| {
        PayloadError::Length {
            expected,
            found: payload.len(),
        }
    })?;
    Ok(Job::new(grid, cursor))
}

fn decode_cursor<T>(
    problem: &Problem<T>,
    row: i64,
    column: i64,
) -> Result<Option<Cell>, PayloadError>
where
    T: CoverageNumeric,
{
    if row == NO_CURSOR && column == NO_CURSOR {
        return Ok(None);
    }

    let in_range = |v: i64, limit: usize| usize::try_from(v).ok().filter(|&v| v < limit);
    match (
        in_range(row, problem.rows()),
        in_range(column, problem.columns()),
    ) {
        (Some(r), Some(c)) => Ok(Some(Cell::new(r, c))),
        _ => Err(PayloadError::Cursor { row, column }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_model::{
        block::{BlockType, Orientation, Placement},
        problem::ProblemBuilder,
    };

    fn problem() -> Problem<i64> {
        ProblemBuilder::new(2, 3)
            .type1(2, 4)
            .type2(3, 9)
            .penalty(1)
            .forbid(Cell::new(1, 2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_layout_is_cursor_cost_then_row_major_cells() {
        let p = problem();
        let mut grid = Grid::new(&p);
        let origin = Cell::new(0, 0);
        assert!(grid.place(
            &p,
            &Placement::block(origin, BlockType::Type2, Orientation::Horizontal)
        ));
        let cursor = grid.advance(origin);
        assert_eq!(cursor, Some(Cell::new(1, 0)));

        let payload = encode(&grid, cursor);
        assert_eq!(payload, vec![1, 0, 7, 4, 4, 4, 0, 0, -1]);
        assert_eq!(payload.len(), payload_len(&p));

        let job = decode(&p, &payload).unwrap();
        assert_eq!(job.grid(), &grid);
        assert_eq!(job.cursor(), cursor);
    }

    #[test]
    fn test_missing_cursor_is_minus_one() {
        let p = problem();
        let grid = Grid::new(&p);
        let payload = encode(&grid, None);
        assert_eq!(&payload[..2], &[NO_CURSOR, NO_CURSOR]);
        assert!(decode(&p, &payload).unwrap().is_finished());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let p = problem();
        let err = decode(&p, &[0, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            PayloadError::Length {
                expected: 9,
                found: 3
            }
        );
    }

    #[test]
    fn test_rejects_bad_cursor() {
        let p = problem();
        let mut payload = encode(&Grid::new(&p), Some(Cell::new(0, 0)));
        payload[1] = 3;
        assert_eq!(
            decode(&p, &payload).unwrap_err(),
            PayloadError::Cursor { row: 0, column: 3 }
        );
        payload[0] = -1;
        payload[1] = 0;
        assert!(matches!(
            decode(&p, &payload),
            Err(PayloadError::Cursor { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_cells() {
        let p = problem();
        let grid = Grid::new(&p);

        let mut payload = encode(&grid, None);
        payload[HEADER_LEN] = 9;
        assert_eq!(
            decode(&p, &payload).unwrap_err(),
            PayloadError::Cell { index: 0, value: 9 }
        );

        // The forbidden cell must stay blocked, and only it.
        let mut payload = encode(&grid, None);
        payload[HEADER_LEN + 5] = 0;
        assert!(matches!(
            decode(&p, &payload),
            Err(PayloadError::Cell { index: 5, .. })
        ));
        let mut payload = encode(&grid, None);
        payload[HEADER_LEN + 1] = -1;
        assert!(matches!(
            decode(&p, &payload),
            Err(PayloadError::Cell { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_cost_out_of_range() {
        let p = ProblemBuilder::<i16>::new(1, 1).build().unwrap();
        let payload = vec![NO_CURSOR, NO_CURSOR, 1 << 20, 0];
        assert_eq!(
            decode(&p, &payload).unwrap_err(),
            PayloadError::Cost { value: 1 << 20 }
        );
    }
}
