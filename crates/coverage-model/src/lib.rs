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

//! # Coverage Model
//!
//! **The Domain Model for the Block Coverage Solver.**
//!
//! This crate defines the immutable description of a coverage instance: a
//! rectangular grid with permanently forbidden cells, two kinds of straight
//! blocks with a length and a placement value each, and a penalty for every
//! usable cell left uncovered. It is the shared vocabulary between the loader,
//! the search engines (`coverage_bnb`) and the distributed runtime
//! (`coverage_dist`).
//!
//! ## Architecture
//!
//! * **`num`**: The `CoverageNumeric` trait alias for objective values.
//! * **`index`**: The `Cell` coordinate and the column-major scan order.
//! * **`block`**: Block kinds, orientations, and the `Placement` candidate type with its stable shape ids.
//! * **`problem`**: The validated `Problem` and its `ProblemBuilder`.
//! * **`loading`**: The `ProblemLoader` for the whitespace-token text format.

pub mod block;
pub mod index;
pub mod loading;
pub mod num;
pub mod problem;
