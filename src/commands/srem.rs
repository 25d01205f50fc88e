use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Remove the specified members from the set stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/srem/>
#[derive(Debug, PartialEq)]
pub struct SRem {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for SRem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let removed = session
            .context()
            .store
            .write()
            .srem(&self.key, &self.members);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for SRem {
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
            Frame::Bulk(Bytes::from("SREM")),
            Frame::Bulk(Bytes::from("set")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("z")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let (mut session, _) = Session::for_tests();
        session
            .context()
            .store
            .write()
            .sadd("set", vec!["a".to_string(), "b".to_string()]);

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));
        assert_eq!(
            session.context().store.read().set_members("set"),
            vec![&"b".to_string()]
        );
    }
}
