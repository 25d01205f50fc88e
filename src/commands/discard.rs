use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Flushes all previously queued commands in a transaction.
///
/// Ref: <https://redis.io/docs/latest/commands/discard/>
#[derive(Debug, PartialEq)]
pub struct Discard;

impl Executable for Discard {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        Ok(session.discard_transaction())
    }
}

impl TryFrom<&mut CommandParser> for Discard {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
