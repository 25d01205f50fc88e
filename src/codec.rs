use bytes::{Buf, BytesMut};
use std::env;
use std::io::{self, Cursor};
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{self, Frame};
use crate::Error;

const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Splits a byte stream into RESP frames and writes frames back out.
///
/// Decoding is re-entrant: a partially received frame leaves the buffer untouched and is parsed
/// again from the start once more bytes arrive.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new() -> FrameCodec {
        let max_frame_size = env::var("MAX_FRAME_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_FRAME_SIZE);

        FrameCodec { max_frame_size }
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> FrameCodec {
        FrameCodec { max_frame_size }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            Err(frame::Error::Incomplete) => {
                // Check if the pending frame exceeds the limit to prevent DoS attacks.
                if src.len() > self.max_frame_size {
                    return Err("frame size exceeds limit".into());
                }
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let position = cursor.position() as usize;

        // Remove the parsed frame from the buffer.
        src.advance(position);

        Ok(Some(frame))
    }
}

#[derive(Debug, ThisError)]
pub enum EncodeError {
    #[error("cannot encode {0:?}: line frames must not contain CR or LF")]
    InvalidLine(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Encoder<&Frame> for FrameCodec {
    type Error = EncodeError;

    fn encode(&mut self, frame: &Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        frame.encode(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decode_pipelined_commands() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&b"*1\r\n$4\r\nPING\r\n*2\r\n$3\r\nGET\r\n$1\r\nk\r\n"[..]);

        let first = codec.decode(&mut buf).unwrap();
        assert_eq!(first, Some(Frame::Array(vec![Frame::bulk("PING")])));
        assert!(!buf.is_empty());

        let second = codec.decode(&mut buf).unwrap();
        assert_eq!(
            second,
            Some(Frame::Array(vec![Frame::bulk("GET"), Frame::bulk("k")]))
        );
        assert!(buf.is_empty());

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_keeps_partial_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&b"*2\r\n$3\r\nGET\r\n$1"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 15);

        buf.extend_from_slice(b"\r\nk\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Frame::Array(vec![Frame::bulk("GET"), Frame::Bulk(Bytes::from("k"))]))
        );
    }

    #[test]
    fn decode_rejects_bulk_size_mismatch() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&b"*1\r\n$5\r\nPING\r\n\r\n"[..]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert_eq!(err.to_string(), "invalid bulk size");
    }

    #[test]
    fn decode_enforces_max_frame_size() {
        let mut codec = FrameCodec::with_max_frame_size(8);
        let mut buf = BytesMut::from(&b"$100\r\n0123456789"[..]);

        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn encode_appends_to_buffer() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(&Frame::ok(), &mut buf).unwrap();
        codec.encode(&Frame::Integer(3), &mut buf).unwrap();

        assert_eq!(&buf[..], b"+OK\r\n:3\r\n");
    }
}
