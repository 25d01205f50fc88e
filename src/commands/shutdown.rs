use tracing::{error, info};

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

/// Saves a snapshot and stops the server. When the save fails the server keeps running and the
/// error is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/shutdown/>
#[derive(Debug, PartialEq)]
pub struct Shutdown;

impl Executable for Shutdown {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let ctx = session.context();

        if let Err(e) = ctx.persistence.save_in_place() {
            error!(error = %e, "refusing to shut down, snapshot failed");
            return Ok(Frame::error(format!("ERR {}", e)));
        }

        info!("shutdown requested");
        ctx.shutdown.notify_one();

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Shutdown {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn saves_then_signals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.kvdis");
        let ctx = Context::new(&path, 6379);
        let (pushes, _) = mpsc::channel(1);
        let mut session = Session::new(Uuid::new_v4(), ctx.clone(), pushes);

        assert_eq!(Shutdown.exec(&mut session).unwrap(), Frame::ok());

        assert!(path.exists());
        // The permit is stored until the accept loop waits for it.
        tokio::time::timeout(std::time::Duration::from_secs(1), ctx.shutdown.notified())
            .await
            .unwrap();
    }
}
