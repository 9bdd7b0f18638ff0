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

//! Protocol messages between the coordinator and its workers.
//!
//! Tags are fixed so that coordinator and worker builds can talk to each other.

/// Wire tag of a message kind.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Job = 1,
    Result = 3,
    Finished = 4,
}

impl Tag {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tag::Job),
            3 => Ok(Tag::Result),
            4 => Ok(Tag::Finished),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Job => write!(f, "JOB"),
            Tag::Result => write!(f, "RESULT"),
            Tag::Finished => write!(f, "FINISHED"),
        }
    }
}

/// A message with its flat integer payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A state to explore, sent coordinator to worker.
    Job(Vec<i64>),
    /// The best grid of a finished job, sent worker to coordinator.
    Result(Vec<i64>),
    /// No more work; the receiving worker exits.
    Finished,
}

impl Message {
    #[inline]
    pub fn tag(&self) -> Tag {
        match self {
            Message::Job(_) => Tag::Job,
            Message::Result(_) => Tag::Result,
            Message::Finished => Tag::Finished,
        }
    }

    /// Returns the payload; `Finished` has an empty one.
    #[inline]
    pub fn payload(&self) -> &[i64] {
        match self {
            Message::Job(p) | Message::Result(p) => p,
            Message::Finished => &[],
        }
    }

    /// Rebuilds a message from its tag and payload.
    #[inline]
    pub fn from_parts(tag: Tag, payload: Vec<i64>) -> Self {
        match tag {
            Tag::Job => Message::Job(payload),
            Tag::Result => Message::Result(payload),
            Tag::Finished => Message::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values_are_fixed() {
        assert_eq!(Tag::Job.as_u8(), 1);
        assert_eq!(Tag::Result.as_u8(), 3);
        assert_eq!(Tag::Finished.as_u8(), 4);
        assert_eq!(Tag::try_from(3), Ok(Tag::Result));
        assert_eq!(Tag::try_from(2), Err(2));
    }

    #[test]
    fn test_message_parts() {
        let m = Message::Job(vec![0, 0, -4, 0, 0]);
        assert_eq!(m.tag(), Tag::Job);
        assert_eq!(m.payload().len(), 5);
        assert_eq!(Message::from_parts(Tag::Finished, vec![1, 2]), Message::Finished);
        assert_eq!(format!("{}", Message::Finished.tag()), "FINISHED");
    }
}
