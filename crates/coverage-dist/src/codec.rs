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

//! Length-prefixed binary frames for stream transports.
//!
//! ```raw
//! [tag: u8][len: u32, big endian][len × i64, big endian]
//! ```
//!
//! `read_frame` returns `Ok(None)` when the stream ends cleanly before a new
//! frame starts; an end of stream inside a frame is an I/O error.

use crate::{
    err::DistributedError,
    message::{Message, Tag},
};
use std::io::{ErrorKind, Read, Write};

/// Size of the frame header in bytes.
pub const FRAME_HEADER_LEN: usize = 5;

/// Upper bound on the number of payload entries a frame may announce.
pub const MAX_FRAME_ENTRIES: u32 = 1 << 24;

/// Encodes `message` into a single buffer.
pub fn encode_frame(message: &Message) -> Vec<u8> {
    let payload = message.payload();
    let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + payload.len() * 8);
    buf.push(message.tag().as_u8());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    for value in payload {
        buf.extend_from_slice(&value.to_be_bytes());
    }
    buf
}

/// Writes `message` as one frame.
pub fn write_frame<W: Write>(writer: &mut W, message: &Message) -> Result<(), DistributedError> {
    writer.write_all(&encode_frame(message))?;
    writer.flush()?;
    Ok(())
}

/// Reads one frame. Returns `Ok(None)` on a clean end of stream.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Message>, DistributedError> {
    let mut tag = [0u8; 1];
    loop {
        match reader.read(&mut tag) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let tag = Tag::try_from(tag[0])
        .map_err(|raw| DistributedError::Protocol(format!("unknown message tag {}", raw)))?;

    let mut len = [0u8; 4];
    reader.read_exact(&mut len)?;
    let len = u32::from_be_bytes(len);
    if len > MAX_FRAME_ENTRIES {
        return Err(DistributedError::Protocol(format!(
            "frame announces {} entries, the limit is {}",
            len, MAX_FRAME_ENTRIES
        )));
    }
    if tag == Tag::Finished && len != 0 {
        return Err(DistributedError::Protocol(format!(
            "{} frame carries {} entries",
            tag, len
        )));
    }

    let mut bytes = vec![0u8; len as usize * 8];
    reader.read_exact(&mut bytes)?;
    let payload = bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            i64::from_be_bytes(raw)
        })
        .collect();

    Ok(Some(Message::from_parts(tag, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frame_layout() {
        let bytes = encode_frame(&Message::Job(vec![1, -1]));
        assert_eq!(
            bytes,
            vec![
                1, 0, 0, 0, 2, // tag, len
                0, 0, 0, 0, 0, 0, 0, 1, // 1
                255, 255, 255, 255, 255, 255, 255, 255, // -1
            ]
        );
        assert_eq!(encode_frame(&Message::Finished), vec![4, 0, 0, 0, 0]);
    }

    #[test]
    fn test_reads_consecutive_frames_from_stream() {
        let mut stream = Vec::new();
        write_frame(&mut stream, &Message::Job(vec![0, 0, -6, 0, 0, 0])).unwrap();
        write_frame(&mut stream, &Message::Result(vec![-1, -1, 3, 2, 2, 0])).unwrap();
        write_frame(&mut stream, &Message::Finished).unwrap();

        let mut reader = Cursor::new(stream);
        assert_eq!(
            read_frame(&mut reader).unwrap(),
            Some(Message::Job(vec![0, 0, -6, 0, 0, 0]))
        );
        assert_eq!(
            read_frame(&mut reader).unwrap(),
            Some(Message::Result(vec![-1, -1, 3, 2, 2, 0]))
        );
        assert_eq!(read_frame(&mut reader).unwrap(), Some(Message::Finished));
        assert_eq!(read_frame(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_unknown_tag_is_protocol_error() {
        let mut reader = Cursor::new(vec![2u8, 0, 0, 0, 0]);
        assert!(matches!(
            read_frame(&mut reader),
            Err(DistributedError::Protocol(_))
        ));
    }

    #[test]
    fn test_truncated_frame_is_io_error() {
        let mut bytes = encode_frame(&Message::Result(vec![5, 6, 7]));
        bytes.truncate(bytes.len() - 3);
        let mut reader = Cursor::new(bytes);
        match read_frame(&mut reader) {
            Err(DistributedError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let mut bytes = vec![Tag::Job.as_u8()];
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());
        let mut reader = Cursor::new(bytes);
        assert!(matches!(
            read_frame(&mut reader),
            Err(DistributedError::Protocol(_))
        ));
    }
}
