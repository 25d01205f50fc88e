use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Set key to hold the string value. If key already holds a value, it is overwritten and any
/// previous time to live associated with the key is discarded.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Set {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        session.context().store.write().set(self.key, self.value);
        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Set {
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
    use crate::store::Ttl;
    use std::time::Duration;

    #[test]
    fn insert_key() {
        let (mut session, _) = Session::for_tests();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Set(Set {
                key: String::from("key1"),
                value: Bytes::from("1")
            })
        );

        let res = cmd.exec(&mut session).unwrap();

        assert_eq!(res, Frame::Simple("OK".to_string()));
        assert_eq!(
            session.context().store.read().get("key1"),
            Some(&Bytes::from("1"))
        );
    }

    #[test]
    fn overwrite_drops_the_deadline() {
        let (mut session, _) = Session::for_tests();
        {
            let mut state = session.context().store.write();
            state.set(String::from("key1"), Bytes::from("1"));
            state.expire("key1", Duration::from_secs(60));
        }

        let cmd = Set {
            key: String::from("key1"),
            value: Bytes::from("2"),
        };
        cmd.exec(&mut session).unwrap();

        let mut state = session.context().store.write();
        assert_eq!(state.get("key1"), Some(&Bytes::from("2")));
        assert_eq!(state.ttl("key1"), Ttl::NoExpiry);
    }
}
