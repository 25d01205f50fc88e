use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use uuid::Uuid;

use crate::codec::{EncodeError, FrameCodec};
use crate::frame::Frame;
use crate::Error;

/// Reads request frames from a socket and buffers reply frames until they are flushed.
pub struct Connection {
    pub id: Uuid,
    stream: TcpStream,
    codec: FrameCodec,
    // Data is read from the socket into the read buffer. When a frame is parsed, the corresponding
    // data is removed from the buffer.
    buffer: BytesMut,
    // The frame (or parse error) following the one last handed out, if it is already buffered.
    lookahead: Option<Result<Frame, Error>>,
    out: BytesMut,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            stream,
            codec: FrameCodec::new(),
            // Allocate the buffers with 4kb of capacity.
            buffer: BytesMut::with_capacity(4096),
            lookahead: None,
            out: BytesMut::with_capacity(4096),
        }
    }

    /// Reads the next complete frame.
    ///
    /// Returns `Ok(None)` when the peer closed the connection on a frame boundary. A close in the
    /// middle of a frame is an error.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            if let Some(next) = self.lookahead.take() {
                let frame = next?;
                self.lookahead = self.codec.decode(&mut self.buffer).transpose();
                return Ok(Some(frame));
            }

            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                self.lookahead = self.codec.decode(&mut self.buffer).transpose();
                return Ok(Some(frame));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err("connection reset by peer".into());
            }
        }
    }

    /// Whether the frame last returned by [`Connection::read_frame`] was the last complete one in
    /// the read buffer, i.e. the end of the current pipeline batch.
    pub fn is_drained(&self) -> bool {
        self.lookahead.is_none()
    }

    /// Encodes a frame into the write buffer. Nothing reaches the socket until
    /// [`Connection::flush`] is called.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), EncodeError> {
        self.codec.encode(frame, &mut self.out)
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }
        self.stream.write_all(&self.out).await?;
        self.out.clear();
        self.stream.flush().await
    }
}
