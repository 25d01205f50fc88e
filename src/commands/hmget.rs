use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns the values associated with the specified fields in the hash stored at key, nil for
/// every field that does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/hmget/>
#[derive(Debug, PartialEq)]
pub struct HMGet {
    pub key: String,
    pub fields: Vec<String>,
}

impl Executable for HMGet {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let state = session.context().store.read();

        let values = self
            .fields
            .iter()
            .map(|field| match state.hget(&self.key, field) {
                Some(value) => Frame::Bulk(value.clone()),
                None => Frame::Null,
            })
            .collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for HMGet {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let fields = parser.remaining_strings()?;

        Ok(Self { key, fields })
    }
}
