use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns the values of all specified keys. For every key that does not hold a string value or
/// does not exist, the special value nil is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/mget/>
#[derive(Debug, PartialEq)]
pub struct Mget {
    pub keys: Vec<String>,
}

impl Executable for Mget {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let state = session.context().store.read();

        let values = self
            .keys
            .iter()
            .map(|key| match state.get(key) {
                Some(value) => Frame::Bulk(value.clone()),
                None => Frame::Null,
            })
            .collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Mget {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings()?;

        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    #[test]
    fn multiple_keys() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("MGET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("key2")),
            Frame::Bulk(Bytes::from("key3")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Mget(Mget {
                keys: vec![
                    "key1".to_string(),
                    "key2".to_string(),
                    "key3".to_string()
                ]
            })
        );

        let (mut session, _) = Session::for_tests();
        {
            let mut state = session.context().store.write();
            state.set(String::from("key1"), Bytes::from("1"));
            state.set(String::from("key3"), Bytes::from("3"));
        }

        let res = cmd.exec(&mut session).unwrap();

        assert_eq!(
            res,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("1")),
                Frame::Null,
                Frame::Bulk(Bytes::from("3")),
            ])
        );
    }
}
