use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Adds all the specified members with the specified scores to the sorted set stored at key.
/// Members that already exist get their score updated and are not counted in the reply.
///
/// Scores are read as integers. Rank order is score order, ties broken by member, so a score
/// update moves the member to its new rank.
///
/// Ref: <https://redis.io/docs/latest/commands/zadd/>
#[derive(Debug, PartialEq)]
pub struct ZAdd {
    pub key: String,
    pub members: Vec<(f64, String)>,
}

impl Executable for ZAdd {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let added = session
            .context()
            .store
            .write()
            .zadd(&self.key, self.members);

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZAdd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        let mut members = vec![];
        while parser.remaining() > 0 {
            let score = parser.next_integer()?;
            let member = parser.next_string()?;
            members.push((score as f64, member));
        }

        Ok(Self { key, members })
    }
}
