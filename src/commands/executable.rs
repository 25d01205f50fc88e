use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

pub trait Executable {
    fn exec(self, session: &mut Session) -> Result<Frame, Error>;
}
