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

//! TCP links using the frame codec.
//!
//! The coordinator accepts a fixed number of worker connections up front. One
//! reader thread per connection decodes incoming frames and forwards them into
//! a shared `crossbeam-channel` inbox, so the coordinator can block on a
//! single receive for all workers. A connection that closes or fails is
//! forwarded as an `Envelope` carrying the error.

use crate::{
    codec::{read_frame, write_frame},
    err::DistributedError,
    message::Message,
    transport::{CoordinatorLink, Envelope, WorkerLink},
};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::{
    io::BufReader,
    net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs},
    thread::JoinHandle,
};

/// The coordinator end of a set of TCP connections.
#[derive(Debug)]
pub struct TcpCoordinatorLink {
    streams: Vec<TcpStream>,
    inbox: Receiver<Envelope>,
    readers: Vec<JoinHandle<()>>,
}

impl TcpCoordinatorLink {
    /// Accepts `workers` connections on `listener`. Workers are numbered in
    /// the order they connect.
    pub fn accept(listener: &TcpListener, workers: usize) -> Result<Self, DistributedError> {
        let (tx, inbox) = unbounded();
        // Dropping a partially connected link on error closes what it holds.
        let mut link = Self {
            streams: Vec::with_capacity(workers),
            inbox,
            readers: Vec::with_capacity(workers),
        };

        for id in 0..workers {
            let (stream, peer) = listener.accept()?;
            tracing::info!(worker = id, %peer, "worker connected");
            let reader = stream.try_clone();
            link.streams.push(stream);

            let reader = reader?;
            reader.set_nodelay(true)?;
            let tx = tx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("coverage-reader-{id}"))
                .spawn(move || forward_frames(id, reader, tx))?;
            link.readers.push(handle);
        }

        Ok(link)
    }
}

fn forward_frames(id: usize, stream: TcpStream, tx: Sender<Envelope>) {
    let mut reader = BufReader::new(stream);
    loop {
        let message = match read_frame(&mut reader) {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(DistributedError::Disconnected { worker: Some(id) }),
            Err(e) => Err(e),
        };
        let closed = message.is_err();
        if tx.send(Envelope::new(id, message)).is_err() || closed {
            break;
        }
    }
}

impl CoordinatorLink for TcpCoordinatorLink {
    #[inline]
    fn num_workers(&self) -> usize {
        self.streams.len()
    }

    fn send(&mut self, worker: usize, message: Message) -> Result<(), DistributedError> {
        let mut stream = self.streams.get(worker).ok_or_else(|| {
            DistributedError::Protocol(format!("no worker with index {}", worker))
        })?;
        write_frame(&mut stream, &message)
    }

    fn recv_any(&mut self) -> Result<Envelope, DistributedError> {
        self.inbox
            .recv()
            .map_err(|_| DistributedError::Disconnected { worker: None })
    }
}

impl Drop for TcpCoordinatorLink {
    fn drop(&mut self) {
        for stream in &self.streams {
            // Already closed connections are fine here.
            let _ = stream.shutdown(Shutdown::Both);
        }
        for handle in self.readers.drain(..) {
            let _ = handle.join();
        }
    }
}

/// The worker end of a TCP connection.
#[derive(Debug)]
pub struct TcpWorkerLink {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TcpWorkerLink {
    /// Connects to the coordinator at `addr`.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, DistributedError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        })
    }
}

impl WorkerLink for TcpWorkerLink {
    fn send(&mut self, message: Message) -> Result<(), DistributedError> {
        write_frame(&mut self.writer, &message)
    }

    fn recv(&mut self) -> Result<Message, DistributedError> {
        read_frame(&mut self.reader)?.ok_or(DistributedError::Disconnected { worker: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Read, time::Duration};

    #[test]
    fn test_round_trip_over_localhost() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let worker = std::thread::spawn(move || {
            let mut link = TcpWorkerLink::connect(addr).unwrap();
            let job = link.recv().unwrap();
            link.send(Message::Result(job.payload().to_vec())).unwrap();
            assert_eq!(link.recv().unwrap(), Message::Finished);
        });

        let mut coordinator = TcpCoordinatorLink::accept(&listener, 1).unwrap();
        assert_eq!(coordinator.num_workers(), 1);
        coordinator.send(0, Message::Job(vec![-1, -1, 42])).unwrap();

        let envelope = coordinator.recv_any().unwrap();
        assert_eq!(envelope.origin, 0);
        assert_eq!(envelope.message.unwrap(), Message::Result(vec![-1, -1, 42]));

        coordinator.send(0, Message::Finished).unwrap();
        worker.join().unwrap();

        // The worker hung up after FINISHED.
        let envelope = coordinator.recv_any().unwrap();
        assert!(matches!(
            envelope.message,
            Err(DistributedError::Disconnected { worker: Some(0) })
        ));
    }

    #[test]
    fn test_failed_accept_closes_earlier_connections() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();

        // The first connection is pending, the second accept would block.
        let res = TcpCoordinatorLink::accept(&listener, 2);
        match res {
            Err(DistributedError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::WouldBlock),
            other => panic!("expected a would-block error, got {:?}", other),
        }

        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(client.read(&mut buf).unwrap(), 0);
    }
}
