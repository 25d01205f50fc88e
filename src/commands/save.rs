use tracing::error;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Synchronously writes a snapshot of the whole store to disk.
///
/// Ref: <https://redis.io/docs/latest/commands/save/>
#[derive(Debug, PartialEq)]
pub struct Save;

impl Executable for Save {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match session.context().persistence.save_in_place() {
            Ok(()) => Ok(Frame::ok()),
            Err(e) => {
                error!(error = %e, "SAVE failed");
                Ok(Frame::error(format!("ERR {}", e)))
            }
        }
    }
}

impl TryFrom<&mut CommandParser> for Save {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
