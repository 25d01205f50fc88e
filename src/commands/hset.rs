use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Sets field in the hash stored at key to value. Returns 1 when the field is new and 0 when an
/// existing field was overwritten.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct HSet {
    pub key: String,
    pub field: String,
    pub value: Bytes,
}

impl Executable for HSet {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let created = session
            .context()
            .store
            .write()
            .hset(&self.key, self.field, self.value);

        Ok(Frame::Integer(created as i64))
    }
}

impl TryFrom<&mut CommandParser> for HSet {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn new_then_updated_field() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HSET")),
            Frame::Bulk(Bytes::from("hash")),
            Frame::Bulk(Bytes::from("field")),
            Frame::Bulk(Bytes::from("1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::HSet(HSet {
                key: "hash".to_string(),
                field: "field".to_string(),
                value: Bytes::from("1"),
            })
        );

        let (mut session, _) = Session::for_tests();

        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(1));

        let cmd = HSet {
            key: "hash".to_string(),
            field: "field".to_string(),
            value: Bytes::from("2"),
        };
        assert_eq!(cmd.exec(&mut session).unwrap(), Frame::Integer(0));
        assert_eq!(
            session.context().store.read().hget("hash", "field"),
            Some(&Bytes::from("2"))
        );
    }

    #[test]
    fn multiple_pairs_are_rejected() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("HSET")),
            Frame::Bulk(Bytes::from("hash")),
            Frame::Bulk(Bytes::from("f1")),
            Frame::Bulk(Bytes::from("1")),
            Frame::Bulk(Bytes::from("f2")),
            Frame::Bulk(Bytes::from("2")),
        ]);

        assert_eq!(
            Command::try_from(frame).unwrap_err().to_string(),
            "wrong number of arguments for 'hset' command"
        );
    }
}
