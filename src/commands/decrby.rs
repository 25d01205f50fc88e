use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::store::StoreError;
use crate::Error;

/// Decrements the number stored at key by decrement.
///
/// Ref: <https://redis.io/docs/latest/commands/decrby/>
#[derive(Debug, PartialEq)]
pub struct DecrBy {
    pub key: String,
    pub decrement: i64,
}

impl Executable for DecrBy {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let res = match self.decrement.checked_neg() {
            Some(increment) => session.context().store.write().incr_by(&self.key, increment),
            None => Err(StoreError::Overflow),
        };

        match res {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(e) => Ok(Frame::error(format!("ERR {}", e))),
        }
    }
}

impl TryFrom<&mut CommandParser> for DecrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let decrement = parser.next_integer()?;

        Ok(Self { key, decrement })
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
            Frame::Bulk(Bytes::from("DECRBY")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("3")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::DecrBy(DecrBy {
                key: "key1".to_string(),
                decrement: 3,
            })
        );

        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("10"));

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(7));
    }

    #[test]
    fn decrement_cannot_be_negated() {
        let (mut session, _) = Session::for_tests();
        let cmd = DecrBy {
            key: "key1".to_string(),
            decrement: i64::MIN,
        };

        assert_eq!(
            cmd.exec(&mut session).unwrap(),
            Frame::Error("ERR increment or decrement would overflow".to_string())
        );
        assert_eq!(session.context().store.read().get("key1"), None);
    }
}
