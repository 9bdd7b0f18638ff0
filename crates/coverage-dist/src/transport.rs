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

//! The two ends of the message layer.
//!
//! The coordinator addresses workers by index and receives from whichever
//! worker answers first. A worker only ever talks to the coordinator. Two
//! implementations exist: in-process channels (`channel`) and TCP (`tcp`).

use crate::{err::DistributedError, message::Message};

/// Something that arrived at the coordinator from one worker.
#[derive(Debug)]
pub struct Envelope {
    /// Index of the worker the event came from.
    pub origin: usize,
    /// The received message, or the reason the worker's connection failed.
    pub message: Result<Message, DistributedError>,
}

impl Envelope {
    #[inline]
    pub fn new(origin: usize, message: Result<Message, DistributedError>) -> Self {
        Self { origin, message }
    }
}

/// The coordinator's side of the message layer.
pub trait CoordinatorLink {
    /// Returns the number of connected workers.
    fn num_workers(&self) -> usize;
    /// Sends `message` to worker `worker`.
    fn send(&mut self, worker: usize, message: Message) -> Result<(), DistributedError>;
    /// Blocks until any worker delivers something.
    fn recv_any(&mut self) -> Result<Envelope, DistributedError>;
}

/// A worker's side of the message layer.
pub trait WorkerLink {
    /// Sends `message` to the coordinator.
    fn send(&mut self, message: Message) -> Result<(), DistributedError>;
    /// Blocks until the coordinator sends the next message.
    fn recv(&mut self) -> Result<Message, DistributedError>;
}
