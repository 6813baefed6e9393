use regex::{Captures, Regex};
use super::error::Result;

/// A raw line, sorted into one of the shapes the bot reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    Ping { payload: &'a str },
    Join { nick: &'a str, channel: &'a str },
    Part { nick: &'a str, channel: &'a str },
    ChannelMessage { nick: &'a str, channel: &'a str, text: &'a str },
    PrivateMessage { nick: &'a str, text: &'a str },
    Unrecognized,
}

const PING: &str = r"^PING(?:\s+:?(?P<payload>.*))?$";
const PART: &str = r"^:(?P<nick>[^!\s]+)!\S+\s+PART\s+(?P<channel>[#&+!][^\s,:]+)";
const JOIN: &str = r"^:(?P<nick>[^!\s]+)!\S+\s+JOIN\s+:?(?P<channel>[#&+!][^\s,]+)";
const CHANMSG: &str = r"^:(?P<nick>[^!\s]+)!\S+\s+PRIVMSG\s+(?P<channel>[#&+!][^\s,:]+)\s+:(?P<text>[^\r\n]+)";
const PRIVMSG: &str = r"^:(?P<nick>[^!\s]+)!\S+\s+PRIVMSG\s+[^#&+!\s]\S*\s+:(?P<text>[^\r\n]+)";

/// Sorts raw protocol lines into `Event`s.
///
/// The rules are tried in a fixed order (ping, part, join, channel
/// message, private message) and the first match wins.
pub struct Classifier {
    ping: Regex,
    part: Regex,
    join: Regex,
    chanmsg: Regex,
    privmsg: Regex,
}

impl Classifier {

    pub fn new() -> Result<Classifier> {
        Ok(Classifier{
            ping: Regex::new(PING)?,
            part: Regex::new(PART)?,
            join: Regex::new(JOIN)?,
            chanmsg: Regex::new(CHANMSG)?,
            privmsg: Regex::new(PRIVMSG)?,
        })
    }

    pub fn classify<'a>(&self, line: &'a str) -> Event<'a> {
        if let Some(c) = self.ping.captures(line) {
            return Event::Ping{ payload: group(&c, "payload") };
        }
        if let Some(c) = self.part.captures(line) {
            return Event::Part{ nick: group(&c, "nick"), channel: group(&c, "channel") };
        }
        if let Some(c) = self.join.captures(line) {
            return Event::Join{ nick: group(&c, "nick"), channel: group(&c, "channel") };
        }
        if let Some(c) = self.chanmsg.captures(line) {
            return Event::ChannelMessage{
                nick: group(&c, "nick"),
                channel: group(&c, "channel"),
                text: group(&c, "text"),
            };
        }
        if let Some(c) = self.privmsg.captures(line) {
            return Event::PrivateMessage{ nick: group(&c, "nick"), text: group(&c, "text") };
        }
        Event::Unrecognized
    }

}

fn group<'a>(c: &Captures<'a>, name: &str) -> &'a str {
    c.name(name).map_or("", |m| m.as_str())
}

/// Where an outgoing message goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dest<'a> {
    Nick(&'a str),
    Chan(&'a str),
}

impl<'a> Dest<'a> {

    pub fn name(&self) -> &'a str {
        match *self {
            Dest::Nick(n) => n,
            Dest::Chan(c) => c,
        }
    }

}

pub struct Privmsg<'a> {
    pub dst: Dest<'a>,
    pub msg: &'a str,
}

impl<'a> Privmsg<'a> {

    pub fn new(dst: Dest<'a>, msg: &'a str) -> Privmsg<'a> {
        Privmsg{
            dst: dst,
            msg: msg,
        }
    }

    /// One wire line per line of `msg`, each terminated with CRLF.
    /// Blank lines are dropped since the server would reject them.
    pub fn format(&self) -> Vec<String> {
        self.msg.split(|c: char| c == '\r' || c == '\n')
            .filter(|l| !l.is_empty())
            .map(|l| format!("PRIVMSG {} :{}\r\n", self.dst.name(), l))
            .collect()
    }

}

pub fn pong(payload: &str) -> String {
    format!("PONG :{}\r\n", payload)
}
