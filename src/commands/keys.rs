use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns the string keys containing `pattern`, sorted. The pattern is matched as a plain
/// substring; glob characters have no special meaning.
///
/// Ref: <https://redis.io/docs/latest/commands/keys/>
#[derive(Debug, PartialEq)]
pub struct Keys {
    pub pattern: String,
}

impl Executable for Keys {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let state = session.context().store.read();

        let keys = state
            .keys_containing(&self.pattern)
            .into_iter()
            .map(|key| Frame::bulk(key.clone()))
            .collect();

        Ok(Frame::Array(keys))
    }
}

impl TryFrom<&mut CommandParser> for Keys {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let pattern = parser.next_string()?;

        Ok(Self { pattern })
    }
}
