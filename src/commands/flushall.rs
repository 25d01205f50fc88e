use tracing::info;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Delete all the keys of every namespace. Transactions opened before the flush can no longer be
/// executed.
///
/// Ref: <https://redis.io/docs/latest/commands/flushall/>
#[derive(Debug, PartialEq)]
pub struct FlushAll;

impl Executable for FlushAll {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        session.context().store.write().flush();
        info!("store flushed");

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for FlushAll {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
