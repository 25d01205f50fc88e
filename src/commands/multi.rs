use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Marks the start of a transaction block. Subsequent commands are queued for atomic execution
/// using EXEC.
///
/// Ref: <https://redis.io/docs/latest/commands/multi/>
#[derive(Debug, PartialEq)]
pub struct Multi;

impl Executable for Multi {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        Ok(session.begin_transaction())
    }
}

impl TryFrom<&mut CommandParser> for Multi {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
