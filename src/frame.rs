// https://redis.io/docs/reference/protocol-spec

use bytes::{Buf, BufMut, Bytes, BytesMut};
use itertools::Itertools;
use std::fmt;
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

use crate::codec::EncodeError;

const CRLF: &[u8; 2] = b"\r\n";

const SIMPLE_STRING: u8 = b'+';
const SIMPLE_ERROR: u8 = b'-';
const INTEGER: u8 = b':';
const BULK_STRING: u8 = b'$';
const ARRAY: u8 = b'*';
// RESP3 types, accepted when decoding only.
const NULL: u8 = b'_';
const BULK_ERROR: u8 = b'!';

// Upper bound for preallocating array elements, a header alone can claim any count.
const MAX_PREALLOCATED_ELEMENTS: usize = 1024;
// Requests are a single array of bulk strings, replies nest a couple of levels at most.
const MAX_NESTING: usize = 32;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    /// The declared length of a bulk string does not match the bytes before the terminator.
    #[error("invalid bulk size")]
    InvalidBulkSize,
    #[error("{0}")]
    Other(crate::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    /// Nil bulk string, `$-1\r\n` on the wire.
    Null,
    /// Nil array, `*-1\r\n` on the wire.
    NullArray,
    Array(Vec<Frame>),
}

impl Frame {
    /// Parses one frame from the front of `src` and leaves the cursor right after it.
    ///
    /// [`Error::Incomplete`] means `src` ends before the frame does. Nothing is consumed from the
    /// underlying buffer, so the caller retries from the same start once more bytes arrived.
    ///
    /// Arrays nested deeper than `MAX_NESTING` levels are rejected.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Frame, Error> {
        Frame::parse_nested(src, 0)
    }

    fn parse_nested(src: &mut Cursor<&[u8]>, depth: usize) -> Result<Frame, Error> {
        match get_byte(src)? {
            SIMPLE_STRING => Ok(Frame::Simple(get_text(src)?)),
            SIMPLE_ERROR => Ok(Frame::Error(get_text(src)?)),
            INTEGER => Ok(Frame::Integer(parse_decimal(get_line(src)?)?)),
            BULK_STRING => match get_length(src)? {
                Some(len) => Ok(Frame::Bulk(Bytes::copy_from_slice(get_sized(src, len)?))),
                None => Ok(Frame::Null),
            },
            // There is no null bulk error, a nil length reads as a nil bulk.
            BULK_ERROR => match get_length(src)? {
                Some(len) => {
                    let text = String::from_utf8(get_sized(src, len)?.to_vec())?;
                    Ok(Frame::Error(text))
                }
                None => Ok(Frame::Null),
            },
            ARRAY if depth >= MAX_NESTING => {
                Err(Error::Other("protocol error; nesting too deep".into()))
            }
            ARRAY => match get_length(src)? {
                Some(len) => {
                    let mut frames = Vec::with_capacity(len.min(MAX_PREALLOCATED_ELEMENTS));
                    for _ in 0..len {
                        frames.push(Frame::parse_nested(src, depth + 1)?);
                    }
                    Ok(Frame::Array(frames))
                }
                None => Ok(Frame::NullArray),
            },
            NULL => {
                get_line(src)?;
                Ok(Frame::Null)
            }
            byte => Err(Error::InvalidDataType(byte)),
        }
    }

    /// Appends the wire representation of the frame to `dst`.
    ///
    /// Simple strings and errors are single-line frames: text containing `\r` or `\n` is rejected
    /// with [`EncodeError::InvalidLine`]. Bytes written before the offending value stay in `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        match self {
            Frame::Simple(text) => put_line(dst, SIMPLE_STRING, text)?,
            Frame::Error(text) => put_line(dst, SIMPLE_ERROR, text)?,
            Frame::Integer(n) => put_header(dst, INTEGER, *n),
            Frame::Bulk(bytes) => {
                dst.reserve(bytes.len() + 16);
                put_header(dst, BULK_STRING, bytes.len() as i64);
                dst.extend_from_slice(bytes);
                dst.extend_from_slice(CRLF);
            }
            Frame::Null => put_header(dst, BULK_STRING, -1),
            Frame::NullArray => put_header(dst, ARRAY, -1),
            Frame::Array(frames) => {
                put_header(dst, ARRAY, frames.len() as i64);
                for frame in frames {
                    frame.encode(dst)?;
                }
            }
        }

        Ok(())
    }

    /// Encodes the frame into a standalone buffer.
    pub fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Shorthand for a bulk string built from anything byte-like.
    pub fn bulk(value: impl Into<Bytes>) -> Frame {
        Frame::Bulk(value.into())
    }

    /// Error reply with any line break in `message` turned into a space, so text echoed back from
    /// a request always encodes.
    pub fn error(message: impl Into<String>) -> Frame {
        Frame::Error(message.into().replace(['\r', '\n'], " "))
    }

    pub fn ok() -> Frame {
        Frame::Simple("OK".to_string())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Frame::Error(_))
    }
}

/// Renders frames the way `redis-cli` prints replies, used in log lines and error messages.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(text) => write!(f, "{}", text),
            Frame::Error(text) => write!(f, "(error) {}", text),
            Frame::Integer(n) => write!(f, "(integer) {}", n),
            Frame::Bulk(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "(nil)"),
            Frame::NullArray => write!(f, "(nil array)"),
            Frame::Array(frames) => write!(f, "[{}]", frames.iter().join(", ")),
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Error {
        Error::Other("protocol error; invalid UTF-8 in frame".into())
    }
}

fn put_header(dst: &mut BytesMut, prefix: u8, n: i64) {
    dst.put_u8(prefix);
    dst.extend_from_slice(n.to_string().as_bytes());
    dst.extend_from_slice(CRLF);
}

fn put_line(dst: &mut BytesMut, prefix: u8, text: &str) -> Result<(), EncodeError> {
    if text.contains(['\r', '\n']) {
        return Err(EncodeError::InvalidLine(text.to_string()));
    }

    dst.reserve(text.len() + 3);
    dst.put_u8(prefix);
    dst.extend_from_slice(text.as_bytes());
    dst.extend_from_slice(CRLF);
    Ok(())
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

/// Everything up to the next CRLF. The cursor moves past the terminator.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let buf: &'a [u8] = *src.get_ref();
    let start = src.position() as usize;

    let len = buf[start..]
        .windows(CRLF.len())
        .position(|window| window == CRLF)
        .ok_or(Error::Incomplete)?;

    src.set_position((start + len + CRLF.len()) as u64);
    Ok(&buf[start..start + len])
}

fn get_text(src: &mut Cursor<&[u8]>) -> Result<String, Error> {
    Ok(String::from_utf8(get_line(src)?.to_vec())?)
}

/// Length header of bulk strings and arrays. `None` stands for the nil length `-1`.
fn get_length(src: &mut Cursor<&[u8]>) -> Result<Option<usize>, Error> {
    match parse_decimal(get_line(src)?)? {
        -1 => Ok(None),
        n if n < 0 => Err(Error::Other(format!("protocol error; invalid length {}", n).into())),
        n => Ok(Some(n as usize)),
    }
}

/// Exactly `len` bytes followed by CRLF. Anything else where the terminator should be means the
/// declared size is wrong.
fn get_sized<'a>(src: &mut Cursor<&'a [u8]>, len: usize) -> Result<&'a [u8], Error> {
    let buf: &'a [u8] = *src.get_ref();
    let start = src.position() as usize;
    let end = start.saturating_add(len);

    if buf.len() < end.saturating_add(CRLF.len()) {
        return Err(Error::Incomplete);
    }
    if &buf[end..end + CRLF.len()] != CRLF {
        return Err(Error::InvalidBulkSize);
    }

    src.set_position((end + CRLF.len()) as u64);
    Ok(&buf[start..end])
}

fn parse_decimal(digits: &[u8]) -> Result<i64, Error> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            let digits = String::from_utf8_lossy(digits);
            Error::Other(format!("protocol error; invalid integer {:?}", digits).into())
        })
}
