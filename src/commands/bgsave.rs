use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Asks the background saver to write a snapshot as soon as possible.
///
/// Ref: <https://redis.io/docs/latest/commands/bgsave/>
#[derive(Debug, PartialEq)]
pub struct BgSave;

impl Executable for BgSave {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        session.context().persistence.request_save();
        Ok(Frame::Simple("Background saving started".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for BgSave {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
