use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Executes all previously queued commands in a transaction. Execution stops at the first command
/// that fails, and its error becomes the reply; commands that already ran are not undone.
///
/// Ref: <https://redis.io/docs/latest/commands/exec/>
#[derive(Debug, PartialEq)]
pub struct Exec;

impl Executable for Exec {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        Ok(session.exec_transaction())
    }
}

impl TryFrom<&mut CommandParser> for Exec {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
