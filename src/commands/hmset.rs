use bytes::Bytes;
use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Sets the specified fields to their respective values in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hmset/>
#[derive(Debug, PartialEq)]
pub struct HMSet {
    pub key: String,
    pub pairs: Vec<(String, Bytes)>,
}

impl Executable for HMSet {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let mut state = session.context().store.write();

        for (field, value) in self.pairs {
            state.hset(&self.key, field, value);
        }

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for HMSet {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        let mut pairs = vec![];
        for (field, value) in parser.remaining_bytes()?.into_iter().tuples() {
            pairs.push((String::from_utf8(field.to_vec())?, value));
        }

        Ok(Self { key, pairs })
    }
}
