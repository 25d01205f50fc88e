use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Posts a message to the given channel. Returns the number of subscribers that received it;
/// subscribers that are still busy with a previous message miss this one.
///
/// Ref: <https://redis.io/docs/latest/commands/publish/>
#[derive(Debug, PartialEq)]
pub struct Publish {
    pub channel: String,
    pub message: Bytes,
}

impl Executable for Publish {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let receivers = session.publish(&self.channel, self.message);
        Ok(Frame::Integer(receivers as i64))
    }
}

impl TryFrom<&mut CommandParser> for Publish {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let channel = parser.next_string()?;
        let message = parser.next_bytes()?;

        Ok(Self { channel, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[tokio::test]
    async fn counts_receivers() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("PUBLISH")),
            Frame::Bulk(Bytes::from("news")),
            Frame::Bulk(Bytes::from("hello")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Publish(Publish {
                channel: "news".to_string(),
                message: Bytes::from("hello"),
            })
        );

        let (mut session, _) = Session::for_tests();
        let mut subscriber = session.context().broker.subscribe("news");

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert_eq!(subscriber.receiver.recv().await, Some(Bytes::from("hello")));
    }

    #[test]
    fn nobody_listening() {
        let (mut session, _) = Session::for_tests();
        let cmd = Publish {
            channel: "news".to_string(),
            message: Bytes::from("hello"),
        };

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(0));
    }
}
