use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns the length of the list stored at key, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/llen/>
#[derive(Debug, PartialEq)]
pub struct LLen {
    pub key: String,
}

impl Executable for LLen {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let len = session.context().store.read().llen(&self.key);
        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for LLen {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}
