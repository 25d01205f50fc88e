use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns all fields and values of the hash stored at key, as a flat `field value ...` list
/// ordered by field.
///
/// Ref: <https://redis.io/docs/latest/commands/hgetall/>
#[derive(Debug, PartialEq)]
pub struct HGetAll {
    pub key: String,
}

impl Executable for HGetAll {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let state = session.context().store.read();

        let Some(hash) = state.hash(&self.key) else {
            return Ok(Frame::Array(vec![]));
        };

        let frames = hash
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .flat_map(|(field, value)| [Frame::bulk(field.clone()), Frame::Bulk(value.clone())])
            .collect();

        Ok(Frame::Array(frames))
    }
}

impl TryFrom<&mut CommandParser> for HGetAll {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}
