use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Insert all the specified values at the head of the list stored at key, one after the other,
/// so `LPUSH mylist a b c` results in the list `c b a`. The list is created when absent.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
#[derive(Debug, PartialEq)]
pub struct LPush {
    pub key: String,
    pub values: Vec<Bytes>,
}

impl Executable for LPush {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let len = session
            .context()
            .store
            .write()
            .lpush(&self.key, self.values);

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for LPush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let values = parser.remaining_bytes()?;

        Ok(Self { key, values })
    }
}
