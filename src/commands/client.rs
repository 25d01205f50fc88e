use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Connection management subcommands (`CLIENT SETINFO`, `CLIENT SETNAME`, ...). Client libraries
/// send these while setting up a connection; they are acknowledged and otherwise ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/client/>
#[derive(Debug, PartialEq)]
pub struct Client {
    pub subcommand: String,
}

impl Executable for Client {
    fn exec(self, _session: &mut Session) -> Result<Frame, Error> {
        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Client {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let subcommand = parser.next_string()?.to_lowercase();
        // Subcommand arguments are not used.
        parser.remaining_bytes()?;

        Ok(Self { subcommand })
    }
}
