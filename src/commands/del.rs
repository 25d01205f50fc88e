use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Removes the specified keys from every namespace. A key is ignored if it does not exist.
///
/// The reply counts removals per namespace: a key holding both a string and a list counts twice.
///
/// Ref: <https://redis.io/docs/latest/commands/del/>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<String>,
}

impl Executable for Del {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let mut state = session.context().store.write();

        let removed: usize = self.keys.iter().map(|key| state.remove(key)).sum();

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings()?;

        Ok(Self { keys })
    }
}
