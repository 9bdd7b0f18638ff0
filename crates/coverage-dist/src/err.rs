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

use coverage_bnb::err::SearchError;

/// A payload that does not describe a valid `(grid, cursor)` state of the
/// problem at hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload does not have `3 + rows × columns` entries.
    Length { expected: usize, found: usize },
    /// A cell value is out of range or contradicts the forbidden mask.
    Cell { index: usize, value: i64 },
    /// The cursor is neither `(-1, -1)` nor a cell of the grid.
    Cursor { row: i64, column: i64 },
    /// The cost does not fit the numeric type of the problem.
    Cost { value: i64 },
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length { expected, found } => write!(
                f,
                "Payload has {} entries but {} were expected",
                found, expected
            ),
            Self::Cell { index, value } => {
                write!(f, "Invalid value {} for cell {} of the payload", value, index)
            }
            Self::Cursor { row, column } => write!(f, "Invalid cursor ({}, {})", row, column),
            Self::Cost { value } => write!(f, "Cost {} is out of range", value),
        }
    }
}

impl std::error::Error for PayloadError {}

/// The error type of the coordinator/worker runtime.
#[derive(Debug)]
pub enum DistributedError {
    /// Reading from or writing to a connection failed.
    Io(std::io::Error),
    /// A job or result payload was malformed.
    Payload(PayloadError),
    /// A peer sent a message that is not valid at this point of the protocol.
    Protocol(String),
    /// A peer went away. `None` stands for the coordinator.
    Disconnected { worker: Option<usize> },
    /// The local search of a worker failed.
    Search(SearchError),
}

impl std::fmt::Display for DistributedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Payload(e) => write!(f, "Malformed payload: {}", e),
            Self::Protocol(detail) => write!(f, "Protocol violation: {}", detail),
            Self::Disconnected { worker: Some(w) } => write!(f, "Worker {} disconnected", w),
            Self::Disconnected { worker: None } => write!(f, "Coordinator disconnected"),
            Self::Search(e) => write!(f, "Worker search failed: {}", e),
        }
    }
}

impl std::error::Error for DistributedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Payload(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::Protocol(_) | Self::Disconnected { .. } => None,
        }
    }
}

impl From<std::io::Error> for DistributedError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<PayloadError> for DistributedError {
    fn from(e: PayloadError) -> Self {
        Self::Payload(e)
    }
}

impl From<SearchError> for DistributedError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}
