use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns the specified elements of the list stored at key. The offsets start and stop are
/// zero-based indexes; negative offsets count from the end of the list, so -1 is the last element.
///
/// Out of range indexes are clamped to the list bounds. When start is past the end of the list or
/// after stop, the result is an empty list.
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct LRange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for LRange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let values = session
            .context()
            .store
            .read()
            .lrange(&self.key, self.start, self.stop);

        Ok(Frame::Array(values.into_iter().map(Frame::Bulk).collect()))
    }
}

impl TryFrom<&mut CommandParser> for LRange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        Ok(Self { key, start, stop })
    }
}
