use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Unsubscribes the client from the given channels, or from all of them when none is given.
///
/// Ref: <https://redis.io/docs/latest/commands/unsubscribe/>
#[derive(Debug, PartialEq)]
pub struct Unsubscribe {
    pub channels: Vec<String>,
}

impl Executable for Unsubscribe {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let left = session.unsubscribe(self.channels);

        // Not subscribed to anything: a single confirmation without channel.
        if left.is_empty() {
            return Ok(Frame::Array(vec![
                Frame::bulk("unsubscribe"),
                Frame::Null,
                Frame::Integer(0),
            ]));
        }

        let frames = left
            .into_iter()
            .flat_map(|(channel, remaining)| {
                [
                    Frame::bulk("unsubscribe"),
                    Frame::bulk(channel),
                    Frame::Integer(remaining as i64),
                ]
            })
            .collect();

        Ok(Frame::Array(frames))
    }
}

impl TryFrom<&mut CommandParser> for Unsubscribe {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let channels = parser.remaining_strings()?;

        Ok(Self { channels })
    }
}
