use std::fmt::Write;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

const SECTIONS: [&str; 6] = ["server", "clients", "memory", "persistence", "stats", "keyspace"];

/// Returns information and statistics about the server, as `name:value` lines grouped in
/// sections. With a section name only that section is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/info/>
#[derive(Debug, PartialEq)]
pub struct Info {
    pub section: Option<String>,
}

impl Executable for Info {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let section = self.section.map(|s| s.to_lowercase());
        let mut info = String::new();

        for name in SECTIONS {
            if section.as_deref().map_or(true, |s| s == name || s == "all") {
                if !info.is_empty() {
                    info.push_str("\r\n");
                }
                write_section(&mut info, name, session)?;
            }
        }

        Ok(Frame::bulk(info))
    }
}

fn write_section(info: &mut String, name: &str, session: &Session) -> std::fmt::Result {
    let ctx = session.context();

    match name {
        "server" => {
            write!(info, "# Server\r\n")?;
            write!(info, "kvdis_version:{}\r\n", env!("CARGO_PKG_VERSION"))?;
            write!(info, "uptime_in_seconds:{}\r\n", ctx.stats.uptime_secs())?;
            write!(info, "tcp_port:{}\r\n", ctx.port)?;
        }
        "clients" => {
            write!(info, "# Clients\r\n")?;
            write!(info, "connected_clients:{}\r\n", ctx.stats.connected_clients())?;
            write!(info, "pubsub_channels:{}\r\n", ctx.broker.channels())?;
        }
        "memory" => {
            write!(info, "# Memory\r\n")?;
            write!(info, "used_memory:{}\r\n", ctx.store.read().memory_usage())?;
        }
        "persistence" => {
            write!(info, "# Persistence\r\n")?;
            write!(info, "dirty:{}\r\n", ctx.persistence.is_dirty() as u8)?;
            write!(info, "last_save_time:{}\r\n", ctx.persistence.last_save())?;
            write!(info, "snapshot_path:{}\r\n", ctx.persistence.path().display())?;
        }
        "stats" => {
            write!(info, "# Stats\r\n")?;
            write!(
                info,
                "total_commands_processed:{}\r\n",
                ctx.stats.commands_processed()
            )?;
        }
        "keyspace" => {
            write!(info, "# Keyspace\r\n")?;
            let state = ctx.store.read();
            for (namespace, keys) in state.namespace_sizes() {
                write!(info, "{}:keys={}\r\n", namespace, keys)?;
            }
            write!(info, "expires:{}\r\n", state.expirations())?;
        }
        _ => {}
    }

    Ok(())
}

impl TryFrom<&mut CommandParser> for Info {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let section = match parser.remaining() {
            0 => None,
            _ => Some(parser.next_string()?),
        };

        Ok(Self { section })
    }
}
