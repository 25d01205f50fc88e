use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Returns the specified range of members in the sorted set stored at key, ordered by score. The
/// indexes follow the LRANGE rules. With `WITHSCORES` every member is followed by its score.
///
/// Ref: <https://redis.io/docs/latest/commands/zrange/>
#[derive(Debug, PartialEq)]
pub struct ZRange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
    pub with_scores: bool,
}

impl Executable for ZRange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let state = session.context().store.read();
        let range = state.zrange(&self.key, self.start, self.stop);

        let mut frames = Vec::with_capacity(range.len() * if self.with_scores { 2 } else { 1 });
        for (member, score) in range {
            frames.push(Frame::bulk(member.clone()));
            if self.with_scores {
                frames.push(Frame::bulk(score.to_string()));
            }
        }

        Ok(Frame::Array(frames))
    }
}

impl TryFrom<&mut CommandParser> for ZRange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        let with_scores = match parser.remaining() {
            0 => false,
            _ => {
                let option = parser.next_string()?;
                if !option.eq_ignore_ascii_case("withscores") {
                    return Err(CommandParserError::Syntax.into());
                }
                true
            }
        };

        Ok(Self {
            key,
            start,
            stop,
            with_scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use bytes::Bytes;

    fn session_with_zset() -> Session {
        let (session, _) = Session::for_tests();
        session.context().store.write().zadd(
            "zset",
            vec![
                (3.0, "three".to_string()),
                (1.0, "one".to_string()),
                (2.0, "two".to_string()),
            ],
        );
        session
    }

    #[test]
    fn members_by_rank() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("ZRANGE")),
            Frame::Bulk(Bytes::from("zset")),
            Frame::Bulk(Bytes::from("0")),
            Frame::Bulk(Bytes::from("-1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::ZRange(ZRange {
                key: "zset".to_string(),
                start: 0,
                stop: -1,
                with_scores: false,
            })
        );

        let mut session = session_with_zset();

        assert_eq!(
            cmd.exec(&mut session).unwrap(),
            Frame::Array(vec![
                Frame::bulk("one"),
                Frame::bulk("two"),
                Frame::bulk("three"),
            ])
        );
    }

    #[test]
    fn with_scores() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("ZRANGE")),
            Frame::Bulk(Bytes::from("zset")),
            Frame::Bulk(Bytes::from("-2")),
            Frame::Bulk(Bytes::from("-1")),
            Frame::Bulk(Bytes::from("WithScores")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        let mut session = session_with_zset();

        assert_eq!(
            cmd.exec(&mut session).unwrap(),
            Frame::Array(vec![
                Frame::bulk("two"),
                Frame::bulk("2"),
                Frame::bulk("three"),
                Frame::bulk("3"),
            ])
        );
    }

    #[test]
    fn unknown_option() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("ZRANGE")),
            Frame::Bulk(Bytes::from("zset")),
            Frame::Bulk(Bytes::from("0")),
            Frame::Bulk(Bytes::from("-1")),
            Frame::Bulk(Bytes::from("REV")),
        ]);

        assert_eq!(
            Command::try_from(frame).unwrap_err().to_string(),
            "syntax error"
        );
    }
}
