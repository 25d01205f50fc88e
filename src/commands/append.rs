use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// If key already exists and is a string, this command appends the value at the end of the string.
/// If key does not exist it is created and set as an empty string, so APPEND will be similar to
/// SET in this special case.
///
/// Ref: <https://redis.io/docs/latest/commands/append>
#[derive(Debug, PartialEq)]
pub struct Append {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Append {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let len = session
            .context()
            .store
            .write()
            .append(&self.key, &self.value);

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Append {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn when_key_does_not_exists() {
        let (mut session, _) = Session::for_tests();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("APPEND")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("baz")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Append(Append {
                key: String::from("foo"),
                value: Bytes::from("baz")
            })
        );

        let res = cmd.exec(&mut session).unwrap();

        assert_eq!(res, Frame::Integer(3));
        assert_eq!(
            session.context().store.read().get("foo"),
            Some(&Bytes::from("baz"))
        );
    }

    #[test]
    fn when_key_exists() {
        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("hello"));

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("APPEND")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("world")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let res = cmd.exec(&mut session).unwrap();

        assert_eq!(res, Frame::Integer(10));
        assert_eq!(
            session.context().store.read().get("key1"),
            Some(&Bytes::from("helloworld"))
        );
    }
}
