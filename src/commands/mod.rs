pub mod append;
pub mod bgsave;
pub mod client;
pub mod dbsize;
pub mod decr;
pub mod decrby;
pub mod del;
pub mod discard;
pub mod exec;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod flushall;
pub mod get;
pub mod hdel;
pub mod hget;
pub mod hgetall;
pub mod hmget;
pub mod hmset;
pub mod hset;
pub mod incr;
pub mod incrby;
pub mod info;
pub mod keys;
pub mod llen;
pub mod lpop;
pub mod lpush;
pub mod lrange;
pub mod mget;
pub mod mset;
pub mod multi;
pub mod ping;
pub mod publish;
pub mod rpop;
pub mod rpush;
pub mod sadd;
pub mod save;
pub mod set;
pub mod shutdown;
pub mod sismember;
pub mod smembers;
pub mod srem;
pub mod subscribe;
pub mod ttl;
pub mod unsubscribe;
pub mod zadd;
pub mod zrange;
pub mod zrem;

use bytes::Bytes;
use std::{str, vec};
use strum_macros::AsRefStr;
use thiserror::Error as ThisError;
use tracing::debug;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::session::Session;
use crate::Error;

use append::Append;
use bgsave::BgSave;
use client::Client;
use dbsize::DBSize;
use decr::Decr;
use decrby::DecrBy;
use del::Del;
use discard::Discard;
use exec::Exec;
use exists::Exists;
use expire::Expire;
use flushall::FlushAll;
use get::Get;
use hdel::HDel;
use hget::HGet;
use hgetall::HGetAll;
use hmget::HMGet;
use hmset::HMSet;
use hset::HSet;
use incr::Incr;
use incrby::IncrBy;
use info::Info;
use keys::Keys;
use llen::LLen;
use lpop::LPop;
use lpush::LPush;
use lrange::LRange;
use mget::Mget;
use mset::Mset;
use multi::Multi;
use ping::Ping;
use publish::Publish;
use rpop::RPop;
use rpush::RPush;
use sadd::SAdd;
use save::Save;
use set::Set;
use shutdown::Shutdown;
use sismember::SIsMember;
use smembers::SMembers;
use srem::SRem;
use subscribe::Subscribe;
use ttl::Ttl;
use unsubscribe::Unsubscribe;
use zadd::ZAdd;
use zrange::ZRange;
use zrem::ZRem;

#[derive(Debug, PartialEq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    // Strings.
    Append(Append),
    Decr(Decr),
    DecrBy(DecrBy),
    Get(Get),
    Incr(Incr),
    IncrBy(IncrBy),
    Mget(Mget),
    Mset(Mset),
    Set(Set),

    // Keys.
    Del(Del),
    Exists(Exists),
    Expire(Expire),
    Keys(Keys),
    Ttl(Ttl),

    // Lists.
    LLen(LLen),
    LPop(LPop),
    LPush(LPush),
    LRange(LRange),
    RPop(RPop),
    RPush(RPush),

    // Hashes.
    HDel(HDel),
    HGet(HGet),
    HGetAll(HGetAll),
    HMGet(HMGet),
    HMSet(HMSet),
    HSet(HSet),

    // Sets.
    SAdd(SAdd),
    SIsMember(SIsMember),
    SMembers(SMembers),
    SRem(SRem),

    // Sorted sets.
    ZAdd(ZAdd),
    ZRange(ZRange),
    ZRem(ZRem),

    // Transactions.
    Discard(Discard),
    Exec(Exec),
    Multi(Multi),

    // Pub/sub.
    Publish(Publish),
    Subscribe(Subscribe),
    Unsubscribe(Unsubscribe),

    // Server.
    BgSave(BgSave),
    Client(Client),
    DBSize(DBSize),
    FlushAll(FlushAll),
    Info(Info),
    Ping(Ping),
    Save(Save),
    Shutdown(Shutdown),
}

impl Executable for Command {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match self {
            Command::Append(cmd) => cmd.exec(session),
            Command::BgSave(cmd) => cmd.exec(session),
            Command::Client(cmd) => cmd.exec(session),
            Command::DBSize(cmd) => cmd.exec(session),
            Command::Decr(cmd) => cmd.exec(session),
            Command::DecrBy(cmd) => cmd.exec(session),
            Command::Del(cmd) => cmd.exec(session),
            Command::Discard(cmd) => cmd.exec(session),
            Command::Exec(cmd) => cmd.exec(session),
            Command::Exists(cmd) => cmd.exec(session),
            Command::Expire(cmd) => cmd.exec(session),
            Command::FlushAll(cmd) => cmd.exec(session),
            Command::Get(cmd) => cmd.exec(session),
            Command::HDel(cmd) => cmd.exec(session),
            Command::HGet(cmd) => cmd.exec(session),
            Command::HGetAll(cmd) => cmd.exec(session),
            Command::HMGet(cmd) => cmd.exec(session),
            Command::HMSet(cmd) => cmd.exec(session),
            Command::HSet(cmd) => cmd.exec(session),
            Command::Incr(cmd) => cmd.exec(session),
            Command::IncrBy(cmd) => cmd.exec(session),
            Command::Info(cmd) => cmd.exec(session),
            Command::Keys(cmd) => cmd.exec(session),
            Command::LLen(cmd) => cmd.exec(session),
            Command::LPop(cmd) => cmd.exec(session),
            Command::LPush(cmd) => cmd.exec(session),
            Command::LRange(cmd) => cmd.exec(session),
            Command::Mget(cmd) => cmd.exec(session),
            Command::Mset(cmd) => cmd.exec(session),
            Command::Multi(cmd) => cmd.exec(session),
            Command::Ping(cmd) => cmd.exec(session),
            Command::Publish(cmd) => cmd.exec(session),
            Command::RPop(cmd) => cmd.exec(session),
            Command::RPush(cmd) => cmd.exec(session),
            Command::SAdd(cmd) => cmd.exec(session),
            Command::Save(cmd) => cmd.exec(session),
            Command::Set(cmd) => cmd.exec(session),
            Command::Shutdown(cmd) => cmd.exec(session),
            Command::SIsMember(cmd) => cmd.exec(session),
            Command::SMembers(cmd) => cmd.exec(session),
            Command::SRem(cmd) => cmd.exec(session),
            Command::Subscribe(cmd) => cmd.exec(session),
            Command::Ttl(cmd) => cmd.exec(session),
            Command::Unsubscribe(cmd) => cmd.exec(session),
            Command::ZAdd(cmd) => cmd.exec(session),
            Command::ZRange(cmd) => cmd.exec(session),
            Command::ZRem(cmd) => cmd.exec(session),
        }
    }
}

/// Number of frames a request may have, the command name included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
    /// `fixed` leading arguments followed by one or more pairs.
    Pairs { fixed: usize },
}

impl Arity {
    pub fn accepts(&self, len: usize) -> bool {
        match *self {
            Arity::Exact(n) => len == n,
            Arity::AtLeast(n) => len >= n,
            Arity::Between(min, max) => (min..=max).contains(&len),
            Arity::Pairs { fixed } => len >= fixed + 3 && (len - fixed - 1) % 2 == 0,
        }
    }
}

type Parse = fn(&mut CommandParser) -> Result<Command, Error>;

/// An entry of the command table.
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: Arity,
    /// Successful executions mark the store dirty for the background saver.
    pub write: bool,
    parse: Parse,
}

macro_rules! command {
    ($name:literal, $arity:expr, $write:literal, $variant:ident) => {
        CommandSpec {
            name: $name,
            arity: $arity,
            write: $write,
            parse: |parser| $variant::try_from(parser).map(Command::$variant),
        }
    };
}

static COMMANDS: &[CommandSpec] = &[
    command!("append", Arity::Exact(3), true, Append),
    command!("bgsave", Arity::Exact(1), false, BgSave),
    command!("client", Arity::AtLeast(2), false, Client),
    command!("dbsize", Arity::Exact(1), false, DBSize),
    command!("decr", Arity::Exact(2), true, Decr),
    command!("decrby", Arity::Exact(3), true, DecrBy),
    command!("del", Arity::AtLeast(2), true, Del),
    command!("discard", Arity::Exact(1), false, Discard),
    command!("exec", Arity::Exact(1), false, Exec),
    command!("exists", Arity::Exact(2), false, Exists),
    command!("expire", Arity::Exact(3), true, Expire),
    command!("flushall", Arity::Exact(1), true, FlushAll),
    command!("get", Arity::Exact(2), false, Get),
    command!("hdel", Arity::AtLeast(3), true, HDel),
    command!("hget", Arity::Exact(3), false, HGet),
    command!("hgetall", Arity::Exact(2), false, HGetAll),
    command!("hmget", Arity::AtLeast(3), false, HMGet),
    command!("hmset", Arity::Pairs { fixed: 1 }, true, HMSet),
    command!("hset", Arity::Exact(4), true, HSet),
    command!("incr", Arity::Exact(2), true, Incr),
    command!("incrby", Arity::Exact(3), true, IncrBy),
    command!("info", Arity::Between(1, 2), false, Info),
    command!("keys", Arity::Exact(2), false, Keys),
    command!("llen", Arity::Exact(2), false, LLen),
    command!("lpop", Arity::Exact(2), true, LPop),
    command!("lpush", Arity::AtLeast(3), true, LPush),
    command!("lrange", Arity::Exact(4), false, LRange),
    command!("mget", Arity::AtLeast(2), false, Mget),
    command!("mset", Arity::Pairs { fixed: 0 }, true, Mset),
    command!("multi", Arity::Exact(1), false, Multi),
    command!("ping", Arity::Between(1, 2), false, Ping),
    command!("publish", Arity::Exact(3), false, Publish),
    command!("rpop", Arity::Exact(2), true, RPop),
    command!("rpush", Arity::AtLeast(3), true, RPush),
    command!("sadd", Arity::AtLeast(3), true, SAdd),
    command!("save", Arity::Exact(1), false, Save),
    command!("set", Arity::Exact(3), true, Set),
    command!("shutdown", Arity::Exact(1), false, Shutdown),
    command!("sismember", Arity::Exact(3), false, SIsMember),
    command!("smembers", Arity::Exact(2), false, SMembers),
    command!("srem", Arity::AtLeast(3), true, SRem),
    command!("subscribe", Arity::AtLeast(2), false, Subscribe),
    command!("ttl", Arity::Exact(2), false, Ttl),
    command!("unsubscribe", Arity::AtLeast(1), false, Unsubscribe),
    command!("zadd", Arity::Pairs { fixed: 1 }, true, ZAdd),
    command!("zrange", Arity::Between(4, 5), false, ZRange),
    command!("zrem", Arity::AtLeast(3), true, ZRem),
];

/// Looks a command up by its lowercase name.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .binary_search_by(|spec| spec.name.cmp(name))
        .ok()
        .map(|index| &COMMANDS[index])
}

/// Whether the request is one of the commands that drive a transaction (`MULTI`, `EXEC` and
/// `DISCARD`), which are never queued.
pub fn controls_transaction(request: &Frame) -> bool {
    let name = match request {
        Frame::Array(parts) => match parts.first() {
            Some(Frame::Bulk(bytes)) => &bytes[..],
            Some(Frame::Simple(s)) => s.as_bytes(),
            _ => return false,
        },
        _ => return false,
    };

    ["multi", "exec", "discard"]
        .iter()
        .any(|verb| name.eq_ignore_ascii_case(verb.as_bytes()))
}

/// Runs one request against the session and returns the reply.
///
/// Failures never escape as `Err`: unknown commands, wrong arity, bad arguments and execution
/// errors all become error replies, and the connection stays usable.
pub fn dispatch(session: &mut Session, request: Frame) -> Frame {
    let (spec, cmd) = match parse(request) {
        Ok(parsed) => parsed,
        Err(e) => return Frame::error(format!("ERR {}", e)),
    };

    debug!(command = cmd.as_ref(), "executing command");
    session.context().stats.command_processed();

    match cmd.exec(session) {
        Ok(reply) => {
            if spec.write && !reply.is_error() {
                session.context().persistence.mark_dirty();
            }
            reply
        }
        Err(e) => Frame::error(format!("ERR {}", e)),
    }
}

fn parse(request: Frame) -> Result<(&'static CommandSpec, Command), Error> {
    // Clients send commands to the server as RESP arrays.
    let frames = match request {
        Frame::Array(array) => array,
        frame => {
            return Err(CommandParserError::InvalidFrame {
                expected: "array".to_string(),
                actual: frame,
            }
            .into())
        }
    };

    let parser = &mut CommandParser {
        parts: frames.into_iter(),
    };

    let command_name = parser.parse_command_name()?;

    let spec = lookup(&command_name).ok_or(CommandParserError::UnknownCommand {
        command: command_name,
    })?;

    if !spec.arity.accepts(parser.remaining() + 1) {
        return Err(CommandParserError::WrongArity {
            command: spec.name.to_string(),
        }
        .into());
    }

    let cmd = (spec.parse)(parser)?;
    Ok((spec, cmd))
}

impl TryFrom<Frame> for Command {
    type Error = Error;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        parse(frame).map(|(_, cmd)| cmd)
    }
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_lowercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Number of frames left to consume.
    fn remaining(&self) -> usize {
        self.parts.len()
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(string) => string
                .parse::<i64>()
                .map_err(|_| CommandParserError::InvalidInteger),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(CommandParserError::InvalidInteger),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Consumes every remaining frame as a string.
    fn remaining_strings(&mut self) -> Result<Vec<String>, CommandParserError> {
        let mut strings = Vec::with_capacity(self.remaining());
        while self.remaining() > 0 {
            strings.push(self.next_string()?);
        }
        Ok(strings)
    }

    /// Consumes every remaining frame as raw bytes.
    fn remaining_bytes(&mut self) -> Result<Vec<Bytes>, CommandParserError> {
        let mut values = Vec::with_capacity(self.remaining());
        while self.remaining() > 0 {
            values.push(self.next_bytes()?);
        }
        Ok(values)
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub(crate) enum CommandParserError {
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("wrong number of arguments for '{command}' command")]
    WrongArity { command: String },
    #[error("value is not an integer or out of range")]
    InvalidInteger,
    #[error("syntax error")]
    Syntax,
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}
