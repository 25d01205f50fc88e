use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Removes the specified fields from the hash stored at key. Returns how many fields were actually
/// removed.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel/>
#[derive(Debug, PartialEq)]
pub struct HDel {
    pub key: String,
    pub fields: Vec<String>,
}

impl Executable for HDel {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let removed = session
            .context()
            .store
            .write()
            .hdel(&self.key, &self.fields);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for HDel {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let fields = parser.remaining_strings()?;

        Ok(Self { key, fields })
    }
}
