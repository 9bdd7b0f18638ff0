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

//! In-process links over `crossbeam-channel`.
//!
//! Every worker has its own inbound channel. All workers share one outbound
//! channel into the coordinator, which is what makes "receive from any" a
//! single blocking `recv`.

use crate::{
    err::DistributedError,
    message::Message,
    transport::{CoordinatorLink, Envelope, WorkerLink},
};
use crossbeam_channel::{Receiver, Sender, unbounded};

/// The coordinator end of a set of in-process links.
#[derive(Debug)]
pub struct ChannelCoordinatorLink {
    to_workers: Vec<Sender<Message>>,
    inbox: Receiver<Envelope>,
}

/// One worker end of a set of in-process links.
#[derive(Debug)]
pub struct ChannelWorkerLink {
    id: usize,
    inbox: Receiver<Message>,
    to_coordinator: Sender<Envelope>,
}

impl ChannelWorkerLink {
    /// Returns the index the coordinator knows this worker by.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Creates a coordinator link and `workers` worker links wired to it.
pub fn channel_links(workers: usize) -> (ChannelCoordinatorLink, Vec<ChannelWorkerLink>) {
    let (to_coordinator, inbox) = unbounded();
    let mut to_workers = Vec::with_capacity(workers);
    let mut links = Vec::with_capacity(workers);

    for id in 0..workers {
        let (tx, rx) = unbounded();
        to_workers.push(tx);
        links.push(ChannelWorkerLink {
            id,
            inbox: rx,
            to_coordinator: to_coordinator.clone(),
        });
    }

    (ChannelCoordinatorLink { to_workers, inbox }, links)
}

impl CoordinatorLink for ChannelCoordinatorLink {
    #[inline]
    fn num_workers(&self) -> usize {
        self.to_workers.len()
    }

    fn send(&mut self, worker: usize, message: Message) -> Result<(), DistributedError> {
        let sender = self.to_workers.get(worker).ok_or_else(|| {
            DistributedError::Protocol(format!("no worker with index {}", worker))
        })?;
        sender
            .send(message)
            .map_err(|_| DistributedError::Disconnected {
                worker: Some(worker),
            })
    }

    fn recv_any(&mut self) -> Result<Envelope, DistributedError> {
        // Fails only once every worker link is gone.
        self.inbox
            .recv()
            .map_err(|_| DistributedError::Disconnected { worker: None })
    }
}

impl WorkerLink for ChannelWorkerLink {
    fn send(&mut self, message: Message) -> Result<(), DistributedError> {
        self.to_coordinator
            .send(Envelope::new(self.id, Ok(message)))
            .map_err(|_| DistributedError::Disconnected { worker: None })
    }

    fn recv(&mut self) -> Result<Message, DistributedError> {
        self.inbox
            .recv()
            .map_err(|_| DistributedError::Disconnected { worker: None })
    }
}
