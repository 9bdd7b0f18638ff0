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

//! Problem instance loader for the block coverage domain.
//!
//! Instances are whitespace-delimited token streams in the following order:
//!
//! ```raw
//! rows columns
//! type1_length type2_length
//! type1_cost type2_cost
//! penalty
//! forbidden_count
//! column_1 row_1
//! ...
//! column_k row_k
//! ```
//!
//! Line breaks carry no meaning. A `#` starts a comment that runs to the end
//! of the line. Forbidden cells are given column first.
//!
//! The file states the penalty as the signed amount every uncovered cell adds
//! to the objective, so it is normally negative (`-2` charges two per cell).
//! `Problem::penalty` holds the charge itself, the negated file value. The loader accepts any
//! `BufRead`, file path, raw reader, or string slice, and every structural
//! problem is reported through `ProblemLoaderError` rather than a panic.

use crate::{
    index::Cell,
    num::CoverageNumeric,
    problem::{Problem, ProblemBuilder, ProblemError},
};
use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader, Read},
    marker::PhantomData,
    path::Path,
    str::FromStr,
};

/// The error type for the problem loading process.
#[derive(Debug)]
pub enum ProblemLoaderError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// The input stream ended before all expected tokens were read.
    UnexpectedEof,
    /// A token could not be parsed into the expected numeric type.
    Parse(ParseTokenError),
    /// The parsed values do not describe a valid problem.
    Problem(ProblemError),
}

/// Details about a failed token parsing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTokenError {
    /// The string token that failed to parse.
    pub token: String,
    /// The name of the type we tried to parse into (e.g., "usize").
    pub type_name: &'static str,
}

impl std::fmt::Display for ParseTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not parse token '{}' as type {}",
            self.token, self.type_name
        )
    }
}

impl std::error::Error for ParseTokenError {}

impl Display for ProblemLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof => write!(f, "Unexpected end of file while parsing instance"),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::Problem(e) => write!(f, "Invalid problem: {}", e),
        }
    }
}

impl std::error::Error for ProblemLoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Problem(e) => Some(e),
            Self::UnexpectedEof => None,
        }
    }
}

impl From<std::io::Error> for ProblemLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseTokenError> for ProblemLoaderError {
    fn from(e: ParseTokenError) -> Self {
        Self::Parse(e)
    }
}

impl From<ProblemError> for ProblemLoaderError {
    fn from(e: ProblemError) -> Self {
        Self::Problem(e)
    }
}

/// A loader for coverage problem instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemLoader<T> {
    _marker: PhantomData<T>,
}

impl<T> Default for ProblemLoader<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> ProblemLoader<T>
where
    T: CoverageNumeric + FromStr,
{
    /// Creates a new `ProblemLoader`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a problem from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<Problem<T>, ProblemLoaderError> {
        let mut sc = Scanner::new(rdr);

        let rows: usize = sc.next()?;
        let columns: usize = sc.next()?;
        let type1_length: usize = sc.next()?;
        let type2_length: usize = sc.next()?;
        let type1_cost: T = sc.next()?;
        let type2_cost: T = sc.next()?;
        let file_penalty: T = sc.next()?;
        let forbidden_count: usize = sc.next()?;

        let mut builder = ProblemBuilder::new(rows, columns)
            .type1(type1_length, type1_cost)
            .type2(type2_length, type2_cost)
            .penalty(
                T::zero()
                    .checked_sub(&file_penalty)
                    .ok_or(ProblemError::CostOverflow)?,
            );

        for _ in 0..forbidden_count {
            let column: usize = sc.next()?;
            let row: usize = sc.next()?;
            builder = builder.forbid(Cell::new(row, column));
        }

        Ok(builder.build()?)
    }

    /// Loads a problem from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Problem<T>, ProblemLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a problem from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Problem<T>, ProblemLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a problem from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Problem<T>, ProblemLoaderError> {
        self.from_reader(s.as_bytes())
    }
}

/// Reads whitespace-delimited tokens, skipping `#` comments.
struct Scanner<R> {
    rdr: R,
    buf: String,
    pos: usize,
}

impl<R: BufRead> Scanner<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
        }
    }

    /// Refills the line buffer. Returns `Ok(false)` on EOF.
    #[inline]
    fn fill_line(&mut self) -> Result<bool, ProblemLoaderError> {
        self.buf.clear();
        self.pos = 0;
        let n = self.rdr.read_line(&mut self.buf)?;
        Ok(n > 0)
    }

    fn next<U>(&mut self) -> Result<U, ProblemLoaderError>
    where
        U: FromStr,
    {
        loop {
            if self.pos >= self.buf.len() && !self.fill_line()? {
                return Err(ProblemLoaderError::UnexpectedEof);
            }

            let line = &self.buf[self.pos..];
            let line = match line.find('#') {
                Some(comment) => &line[..comment],
                None => line,
            };

            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                self.pos = self.buf.len();
                continue;
            }

            let start = self.pos + (line.len() - trimmed.len());
            let token_len = trimmed
                .find(char::is_whitespace)
                .unwrap_or(trimmed.len());
            let end = start + token_len;
            let token = &self.buf[start..end];
            self.pos = end;

            return token.parse::<U>().map_err(|_| {
                ProblemLoaderError::Parse(ParseTokenError {
                    token: token.to_owned(),
                    type_name: std::any::type_name::<U>(),
                })
            });
        }
    }
}
