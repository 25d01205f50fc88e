use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Subscribes the client to the specified channels. Messages published afterwards are pushed to
/// the connection as `message` arrays.
///
/// The reply holds one `subscribe` confirmation per channel, with the number of channels the
/// client is subscribed to.
///
/// Ref: <https://redis.io/docs/latest/commands/subscribe/>
#[derive(Debug, PartialEq)]
pub struct Subscribe {
    pub channels: Vec<String>,
}

impl Executable for Subscribe {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let mut frames = Vec::with_capacity(self.channels.len() * 3);

        for channel in self.channels {
            let count = session.subscribe(channel.clone());
            frames.push(Frame::bulk("subscribe"));
            frames.push(Frame::bulk(channel));
            frames.push(Frame::Integer(count as i64));
        }

        Ok(Frame::Array(frames))
    }
}

impl TryFrom<&mut CommandParser> for Subscribe {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let channels = parser.remaining_strings()?;

        Ok(Self { channels })
    }
}
