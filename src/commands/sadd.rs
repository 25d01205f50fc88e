use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Add the specified members to the set stored at key. Returns the number of members that were
/// not already in the set.
///
/// Ref: <https://redis.io/docs/latest/commands/sadd/>
#[derive(Debug, PartialEq)]
pub struct SAdd {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for SAdd {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let added = session
            .context()
            .store
            .write()
            .sadd(&self.key, self.members);

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for SAdd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_strings()?;

        Ok(Self { key, members })
    }
}
