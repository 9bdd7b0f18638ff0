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

//! Block shapes and placements.
//!
//! A block is a `1 × L` (horizontal) or `L × 1` (vertical) rectangle of one of
//! two types. A `Placement` pins a block shape to a cell, or records the
//! decision to leave the cell uncovered.
//!
//! Every shape carries a fixed id that is written into the grid cells it
//! covers. The ids are part of the wire format and must not change:
//!
//! | Shape              | Id |
//! |--------------------|----|
//! | leave empty        | 0  |
//! | type 1, vertical   | 1  |
//! | type 1, horizontal | 2  |
//! | type 2, vertical   | 3  |
//! | type 2, horizontal | 4  |

use crate::index::Cell;

/// One of the two block kinds of a problem.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BlockType {
    Type1,
    Type2,
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockType::Type1 => write!(f, "I1"),
            BlockType::Type2 => write!(f, "I2"),
        }
    }
}

/// The direction a block extends from its anchor cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Orientation {
    /// Extends along the row, towards higher columns.
    Horizontal,
    /// Extends along the column, towards higher rows.
    Vertical,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

/// What a placement does with its anchor cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PlacementKind {
    /// Cover the anchor cell and the following cells with a block.
    Block {
        block_type: BlockType,
        orientation: Orientation,
    },
    /// Leave the anchor cell uncovered.
    Empty,
}

/// Id written into the grid for cells covered by no block.
pub const EMPTY_ID: i32 = 0;

/// The largest id any placement can carry.
pub const MAX_BLOCK_ID: i32 = 4;

impl PlacementKind {
    /// Returns the fixed grid id of this shape.
    #[inline]
    pub const fn id(&self) -> i32 {
        match self {
            PlacementKind::Empty => EMPTY_ID,
            PlacementKind::Block {
                block_type: BlockType::Type1,
                orientation: Orientation::Vertical,
            } => 1,
            PlacementKind::Block {
                block_type: BlockType::Type1,
                orientation: Orientation::Horizontal,
            } => 2,
            PlacementKind::Block {
                block_type: BlockType::Type2,
                orientation: Orientation::Vertical,
            } => 3,
            PlacementKind::Block {
                block_type: BlockType::Type2,
                orientation: Orientation::Horizontal,
            } => 4,
        }
    }

    /// Returns the block type, or `None` for an empty placement.
    #[inline]
    pub const fn block_type(&self) -> Option<BlockType> {
        match self {
            PlacementKind::Block { block_type, .. } => Some(*block_type),
            PlacementKind::Empty => None,
        }
    }
}

/// A candidate move: a shape anchored at a cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Placement {
    cell: Cell,
    kind: PlacementKind,
}

impl Placement {
    /// Creates a block placement anchored at `cell`.
    #[inline]
    pub const fn block(cell: Cell, block_type: BlockType, orientation: Orientation) -> Self {
        Self {
            cell,
            kind: PlacementKind::Block {
                block_type,
                orientation,
            },
        }
    }

    /// Creates a placement that leaves `cell` uncovered.
    #[inline]
    pub const fn empty(cell: Cell) -> Self {
        Self {
            cell,
            kind: PlacementKind::Empty,
        }
    }

    /// Returns the anchor cell.
    #[inline]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Returns what this placement does.
    #[inline]
    pub const fn kind(&self) -> PlacementKind {
        self.kind
    }

    /// Returns the grid id written by this placement.
    #[inline]
    pub const fn id(&self) -> i32 {
        self.kind.id()
    }

    /// Returns `true` if this placement leaves its cell uncovered.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self.kind, PlacementKind::Empty)
    }

    /// Returns the cells covered by this placement when its block has
    /// `length` cells. An empty placement covers nothing.
    ///
    /// Cells are not clipped to any grid; callers check bounds first.
    #[inline]
    pub fn footprint(&self, length: usize) -> impl Iterator<Item = Cell> + use<> {
        let (row, column) = (self.cell.row(), self.cell.column());
        let (len, vertical) = match self.kind {
            PlacementKind::Block { orientation, .. } => {
                (length, orientation == Orientation::Vertical)
            }
            PlacementKind::Empty => (0, false),
        };
        (0..len).map(move |i| {
            if vertical {
                Cell::new(row + i, column)
            } else {
                Cell::new(row, column + i)
            }
        })
    }

    /// Returns the last cell covered by a block of `length` cells, or `None`
    /// for empty placements and zero lengths.
    #[inline]
    pub fn far_end(&self, length: usize) -> Option<Cell> {
        if length == 0 {
            return None;
        }
        match self.kind {
            PlacementKind::Block {
                orientation: Orientation::Vertical,
                ..
            } => Some(Cell::new(self.cell.row() + length - 1, self.cell.column())),
            PlacementKind::Block {
                orientation: Orientation::Horizontal,
                ..
            } => Some(Cell::new(self.cell.row(), self.cell.column() + length - 1)),
            PlacementKind::Empty => None,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            PlacementKind::Block {
                block_type,
                orientation,
            } => write!(
                f,
                "Placement({} {} at {}, id: {})",
                block_type,
                orientation,
                self.cell,
                self.id()
            ),
            PlacementKind::Empty => write!(f, "Placement(empty at {})", self.cell),
        }
    }
}
