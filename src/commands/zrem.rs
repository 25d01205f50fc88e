use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Removes the specified members from the sorted set stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/zrem/>
#[derive(Debug, PartialEq)]
pub struct ZRem {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for ZRem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let removed = session
            .context()
            .store
            .write()
            .zrem(&self.key, &self.members);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZRem {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_strings()?;

        Ok(Self { key, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    #[test]
    fn removes_present_members() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("ZREM")),
            Frame::Bulk(Bytes::from("zset")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("missing")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .zadd("zset", vec![(1.0, "a".to_string()), (2.0, "b".to_string())]);

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert_eq!(session.context().store.read().zscore("zset", "a"), None);
    }
}
