use bytes::Bytes;
use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Sets the given keys to their respective values. MSET replaces existing values with new values,
/// just as regular SET.
///
/// Ref: <https://redis.io/docs/latest/commands/mset/>
#[derive(Debug, PartialEq)]
pub struct Mset {
    pub pairs: Vec<(String, Bytes)>,
}

impl Executable for Mset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let mut state = session.context().store.write();

        for (key, value) in self.pairs {
            state.set(key, value);
        }

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Mset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let mut pairs = vec![];

        for (key, value) in parser.remaining_bytes()?.into_iter().tuples() {
            let key = String::from_utf8(key.to_vec())?;
            pairs.push((key, value));
        }

        Ok(Self { pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn multiple_pairs() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("MSET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("1")),
            Frame::Bulk(Bytes::from("key2")),
            Frame::Bulk(Bytes::from("2")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Mset(Mset {
                pairs: vec![
                    ("key1".to_string(), Bytes::from("1")),
                    ("key2".to_string(), Bytes::from("2")),
                ]
            })
        );

        let (mut session, _) = Session::for_tests();
        let res = cmd.exec(&mut session).unwrap();

        assert_eq!(res, Frame::ok());
        let state = session.context().store.read();
        assert_eq!(state.get("key1"), Some(&Bytes::from("1")));
        assert_eq!(state.get("key2"), Some(&Bytes::from("2")));
    }

    #[test]
    fn odd_number_of_arguments() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("MSET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("1")),
            Frame::Bulk(Bytes::from("key2")),
        ]);

        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err.to_string(),
            "wrong number of arguments for 'mset' command"
        );
    }
}
