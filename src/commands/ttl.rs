use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::store::Ttl as Remaining;
use crate::Error;

/// Returns the remaining time to live of a key that has a timeout, in seconds.
///
/// Returns -1 when the key has no timeout. A key whose deadline has passed is deleted on the spot
/// and -2 is returned. Only that deletion marks the store dirty.
///
/// Ref: <https://redis.io/docs/latest/commands/ttl/>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: String,
}

impl Executable for Ttl {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let ttl = session.context().store.write().ttl(&self.key);

        let seconds = match ttl {
            Remaining::NoExpiry => -1,
            Remaining::Expired => {
                session.context().persistence.mark_dirty();
                -2
            }
            Remaining::Remaining(remaining) => remaining.as_secs() as i64,
        };

        Ok(Frame::Integer(seconds))
    }
}

impl TryFrom<&mut CommandParser> for Ttl {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}
