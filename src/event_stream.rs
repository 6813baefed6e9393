use std::io;
use std::sync::Arc;
use super::address::Session;
use super::chat_log::ChatLog;
use super::commands::{Chain, HttpFetcher, Outbox, Reply};
use super::config::Config;
use super::error::{Error, Result};
use super::protocol::{Classifier, Dest, Event};
use super::transport::Transport;

pub const PM_REPLY: &str = "Sorry, I don't respond to PMs yet.";

/// Where the bot is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Connected,
    Reading,
    Closed,
}

/// Why the read loop ended.
#[derive(Debug)]
pub enum Closed {
    /// The server hung up.
    ByPeer,
    /// Reading from the connection failed.
    ReadFailed(io::Error),
}

/// What to do after handling a line.
enum Action {
    Continue,
    Stop(Closed),
}

/// A single-channel bot: reads lines from its transport one at a time,
/// logs the traffic, and offers channel messages to its command chain.
pub struct Bot<T: Transport> {
    session: Session,
    transport: T,
    log: ChatLog,
    chain: Chain,
    classifier: Classifier,
    state: State,
}

impl<T: Transport> Bot<T> {

    /// A bot with the standard command chain.
    pub fn new(config: &Config, transport: T) -> Result<Bot<T>> {
        let chain = Chain::standard(Arc::new(HttpFetcher::new(config.http_timeout)))?;
        Bot::with_chain(config, transport, chain)
    }

    pub fn with_chain(config: &Config, transport: T, chain: Chain) -> Result<Bot<T>> {
        config.validate()?;
        let log = ChatLog::open(&config.log_dir, config.debug)?;
        Ok(Bot{
            session: Session::new(&config.nick, &config.channel),
            transport: transport,
            log: log,
            chain: chain,
            classifier: Classifier::new()?,
            state: State::Idle,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Connects, joins the channel, and runs until the connection ends.
    pub fn start(&mut self) -> Result<Closed> {
        self.setup()?;
        self.run()
    }

    pub fn setup(&mut self) -> Result<()> {
        self.transport.connect()?;
        self.transport.join(self.session.channel())?;
        self.state = State::Connected;
        Ok(())
    }

    /// Reads and handles lines until the peer closes the connection or
    /// a read fails.  Failing to send is fatal and comes back as `Err`.
    pub fn run(&mut self) -> Result<Closed> {
        self.state = State::Reading;
        debug!("Entering receive loop.");
        loop {
            let handled = match self.transport.read_line() {
                Ok(ref line) if line.is_empty() => Ok(Action::Stop(Closed::ByPeer)),
                Ok(line) => self.handle_line(line.trim_end_matches(|c: char| c == '\r' || c == '\n')),
                Err(e) => Ok(Action::Stop(Closed::ReadFailed(e))),
            };
            let action = match handled {
                Ok(action) => action,
                Err(e) => {
                    error!("Send failed, closing: {}", e);
                    self.shut_down();
                    return Err(e);
                },
            };
            if let Action::Stop(closed) = action {
                match closed {
                    Closed::ByPeer => info!("Server closed connection."),
                    Closed::ReadFailed(ref e) => warn!("Read failed, treating connection as closed: {}", e),
                }
                self.shut_down();
                return Ok(closed);
            }
        }
    }

    fn shut_down(&mut self) {
        self.state = State::Closed;
        if let Err(e) = self.transport.close() {
            warn!("Error closing connection: {}", e);
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<Action> {
        match self.classifier.classify(line) {
            Event::Ping{ payload } => {
                self.transport.pong(payload)?;
            },
            Event::Join{ nick, channel } => {
                self.record(&format!("{} joined {}.", nick, channel));
            },
            Event::Part{ nick, channel } => {
                self.record(&format!("{} left {}.", nick, channel));
            },
            Event::ChannelMessage{ nick, text, .. } => {
                self.handle_channel_message(nick, text)?;
            },
            Event::PrivateMessage{ nick, text } => {
                self.handle_private_message(nick, text)?;
            },
            Event::Unrecognized => {
                debug!("Ignoring \"{}\".", line);
            },
        }
        Ok(Action::Continue)
    }

    fn handle_channel_message(&mut self, nick: &str, text: &str) -> Result<()> {
        let message = clean_message(text);
        match message {
            Message::Action(ref act) => self.record(&format!("* {} {}", nick, act)),
            Message::Said(ref said) => self.record(&format!("{}: {}", nick, said)),
        }

        let reply = {
            let mut speaker = Speaker{
                session: &self.session,
                transport: &mut self.transport,
                log: &mut self.log,
                failure: None,
            };
            let reply = self.chain.evaluate(&self.session, &mut speaker, nick, message.text());
            if let Some(e) = speaker.failure {
                return Err(Error::Io(e));
            }
            reply
        };
        if let Reply::Say(lines) = reply {
            for line in lines {
                self.say(&line)?;
            }
        }
        Ok(())
    }

    fn handle_private_message(&mut self, nick: &str, text: &str) -> Result<()> {
        self.record(&format!("PM <- {}: {}", nick, clean_message(text).text()));
        self.record(&format!("PM -> {}: {}", nick, PM_REPLY));
        self.transport.respond(PM_REPLY, Dest::Nick(nick))?;
        Ok(())
    }

    /// Logs and sends one line to the channel.
    fn say(&mut self, line: &str) -> Result<()> {
        let mut speaker = Speaker{
            session: &self.session,
            transport: &mut self.transport,
            log: &mut self.log,
            failure: None,
        };
        speaker.say(line);
        match speaker.failure {
            Some(e) => Err(Error::Io(e)),
            None => Ok(()),
        }
    }

    fn record(&mut self, message: &str) {
        record(&mut self.log, message)
    }

}

fn record(log: &mut ChatLog, message: &str) {
    if let Err(e) = log.log(message) {
        error!("Couldn't write to chat log in {}: {}", log.dir().display(), e);
    }
}

/// The bot's voice while a command runs.  Remembers the first failed
/// send so the loop can shut down once the command returns.
struct Speaker<'a, T: Transport> {
    session: &'a Session,
    transport: &'a mut T,
    log: &'a mut ChatLog,
    failure: Option<io::Error>,
}

impl<'a, T: Transport> Outbox for Speaker<'a, T> {

    fn say(&mut self, text: &str) {
        if self.failure.is_some() {
            return;
        }
        record(self.log, &format!("{}: {}", self.session.nick(), text));
        if let Err(e) = self.transport.respond(text, Dest::Chan(self.session.channel())) {
            self.failure = Some(e);
        }
    }

    fn log(&mut self, message: &str) {
        record(self.log, message)
    }

}

/// A channel message with surrounding whitespace and CTCP markers
/// removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Said(String),
    /// A `/me` action; holds what follows `ACTION`.
    Action(String),
}

impl Message {

    pub fn text(&self) -> &str {
        match *self {
            Message::Said(ref t) | Message::Action(ref t) => t,
        }
    }

}

pub fn clean_message(text: &str) -> Message {
    let text = text.trim();
    match text.strip_prefix("\u{1}ACTION") {
        Some(rest) => Message::Action(rest.replace('\u{1}', "").trim().to_string()),
        None => Message::Said(text.replace('\u{1}', "").trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages() {
        assert_eq!(clean_message("  bob: dance \r"), Message::Said("bob: dance".to_string()));
        assert_eq!(clean_message("\u{1}VERSION\u{1}"), Message::Said("VERSION".to_string()));
    }

    #[test]
    fn actions() {
        assert_eq!(clean_message("\u{1}ACTION waves\u{1}"), Message::Action("waves".to_string()));
        assert_eq!(clean_message("\u{1}ACTION waves at bob: hi\u{1}").text(), "waves at bob: hi");
        // Only the CTCP form counts.
        assert_eq!(clean_message("ACTION figures"), Message::Said("ACTION figures".to_string()));
    }
}
