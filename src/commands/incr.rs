use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Increments the number stored at key by one.
///
/// Ref: <https://redis.io/docs/latest/commands/incr/>
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: String,
}

impl Executable for Incr {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let res = session.context().store.write().incr_by(&self.key, 1i64);

        match res {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(e) => Ok(Frame::error(format!("ERR {}", e))),
        }
    }
}

impl TryFrom<&mut CommandParser> for Incr {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
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
            Frame::Bulk(Bytes::from("INCR")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Incr(Incr {
                key: "key1".to_string()
            })
        );

        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("1"));

        let result = cmd.exec(&mut session).unwrap();

        assert_eq!(result, Frame::Integer(2));
        assert_eq!(
            session.context().store.read().get("key1"),
            Some(&Bytes::from("2"))
        );
    }

    #[test]
    fn non_existing_key() {
        let (mut session, _) = Session::for_tests();
        let cmd = Incr {
            key: "key1".to_string(),
        };

        let result = cmd.exec(&mut session).unwrap();

        assert_eq!(result, Frame::Integer(1));
        assert_eq!(
            session.context().store.read().get("key1"),
            Some(&Bytes::from("1"))
        );
    }

    #[test]
    fn invalid_key_type() {
        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("value"));

        let cmd = Incr {
            key: "key1".to_string(),
        };
        let result = cmd.exec(&mut session).unwrap();

        assert_eq!(
            result,
            Frame::Error("ERR value is not an integer or out of range".to_string())
        );
        assert_eq!(
            session.context().store.read().get("key1"),
            Some(&Bytes::from("value"))
        );
    }

    #[test]
    fn out_of_range() {
        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from("999223372036854775808"));

        let cmd = Incr {
            key: "key1".to_string(),
        };
        let result = cmd.exec(&mut session).unwrap();

        assert_eq!(
            result,
            Frame::Error("ERR value is not an integer or out of range".to_string())
        );
    }

    #[test]
    fn overflow() {
        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .set(String::from("key1"), Bytes::from(i64::MAX.to_string()));

        let cmd = Incr {
            key: "key1".to_string(),
        };
        let result = cmd.exec(&mut session).unwrap();

        assert_eq!(
            result,
            Frame::Error("ERR increment or decrement would overflow".to_string())
        );
    }
}
