use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns if member is a member of the set stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/sismember/>
#[derive(Debug, PartialEq)]
pub struct SIsMember {
    pub key: String,
    pub member: String,
}

impl Executable for SIsMember {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let is_member = session
            .context()
            .store
            .read()
            .sismember(&self.key, &self.member);

        Ok(Frame::Integer(is_member as i64))
    }
}

impl TryFrom<&mut CommandParser> for SIsMember {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let member = parser.next_string()?;

        Ok(Self { key, member })
    }
}
