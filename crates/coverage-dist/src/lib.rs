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

//! Coverage-Dist: coordinator/worker distribution of the coverage search
//!
//! One coordinator splits the root state into jobs and hands them out one at
//! a time. Each worker explores its job to exhaustion and returns the best
//! grid it found. The coordinator keeps the best of all returned grids.
//!
//! Wire format
//! - A `(grid, cursor)` state is the integer sequence
//!   `[row, column, cost, cell values...]` with cells in row-major order and
//!   `(-1, -1)` standing for "no cursor".
//! - On a byte stream every message is framed as `[tag: u8][len: u32 BE]`
//!   followed by `len` big-endian `i64` values. Tags are `JOB = 1`,
//!   `RESULT = 3` and `FINISHED = 4`.
//!
//! Module map
//! - `message`, `payload`, `codec`: tags, state encoding, framing.
//! - `transport`: the link traits both sides talk through.
//! - `channel`, `tcp`: in-process and TCP links.
//! - `coordinator`, `worker`: the two protocol loops.
//! - `cluster`: ready-made entry points.

pub mod channel;
pub mod cluster;
pub mod codec;
pub mod coordinator;
pub mod err;
pub mod message;
pub mod payload;
pub mod tcp;
pub mod transport;
pub mod worker;
