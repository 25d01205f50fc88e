use std::time::{Duration, SystemTime};

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Set a timeout on a string key. The deadline is only looked at by TTL: the key stays readable
/// until a TTL call finds it expired. A negative timeout puts the deadline in the past, so the
/// next TTL deletes the key.
///
/// Ref: <https://redis.io/docs/latest/commands/expire/>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: String,
    pub seconds: i64,
}

impl Executable for Expire {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let now = SystemTime::now();
        let offset = Duration::from_secs(self.seconds.unsigned_abs());
        let deadline = if self.seconds < 0 {
            now.checked_sub(offset)
        } else {
            now.checked_add(offset)
        };

        let set = match deadline {
            Some(deadline) => session
                .context()
                .store
                .write()
                .expire_at(&self.key, deadline),
            None => false,
        };

        Ok(Frame::Integer(set as i64))
    }
}

impl TryFrom<&mut CommandParser> for Expire {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let seconds = parser.next_integer()?;

        Ok(Self { key, seconds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::Ttl;
    use bytes::Bytes;

    #[test]
    fn existing_string_key() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("EXPIRE")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("100")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Expire(Expire {
                key: "key1".to_string(),
                seconds: 100,
            })
        );

        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("1"));

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert!(matches!(
            session.context().store.write().ttl("key1"),
            Ttl::Remaining(_)
        ));
    }

    #[test]
    fn missing_key() {
        let (mut session, _) = Session::for_tests();
        let cmd = Expire {
            key: "key1".to_string(),
            seconds: 100,
        };

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(0));
        assert_eq!(session.context().store.read().expirations(), 0);
    }

    #[test]
    fn negative_seconds_expire_the_key() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("EXPIRE")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("-5")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("1"));

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert_eq!(session.context().store.write().ttl("key1"), Ttl::Expired);
        assert!(!session.context().store.read().exists("key1"));
    }
}
