use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns the value associated with field in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hget/>
#[derive(Debug, PartialEq)]
pub struct HGet {
    pub key: String,
    pub field: String,
}

impl Executable for HGet {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let state = session.context().store.read();

        match state.hget(&self.key, &self.field) {
            Some(value) => Ok(Frame::Bulk(value.clone())),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for HGet {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;

        Ok(Self { key, field })
    }
}
