use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Increments the number stored at key by increment.
///
/// Ref: <https://redis.io/docs/latest/commands/incrby/>
#[derive(Debug, PartialEq)]
pub struct IncrBy {
    pub key: String,
    pub increment: i64,
}

impl Executable for IncrBy {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let res = session
            .context()
            .store
            .write()
            .incr_by(&self.key, self.increment);

        match res {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(e) => Ok(Frame::error(format!("ERR {}", e))),
        }
    }
}

impl TryFrom<&mut CommandParser> for IncrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let increment = parser.next_integer()?;

        Ok(Self { key, increment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    #[test]
    fn existing_key() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("INCRBY")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("10")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::IncrBy(IncrBy {
                key: "key1".to_string(),
                increment: 10,
            })
        );

        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("5"));

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(15));
    }

    #[test]
    fn negative_increment() {
        let (mut session, _) = Session::for_tests();
        let cmd = IncrBy {
            key: "key1".to_string(),
            increment: -3,
        };

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(-3));
    }

    #[test]
    fn increment_is_not_an_integer() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("INCRBY")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("ten")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(err.to_string(), "value is not an integer or out of range");
    }
}
