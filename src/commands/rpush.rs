use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Insert all the specified values at the tail of the list stored at key. The list is created when
/// absent.
///
/// Ref: <https://redis.io/docs/latest/commands/rpush/>
#[derive(Debug, PartialEq)]
pub struct RPush {
    pub key: String,
    pub values: Vec<Bytes>,
}

impl Executable for RPush {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let len = session
            .context()
            .store
            .write()
            .rpush(&self.key, self.values);

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for RPush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let values = parser.remaining_bytes()?;

        Ok(Self { key, values })
    }
}
