//! The ordered chain of handlers that channel messages are offered to.

use std::sync::Arc;
use super::address::Session;
use super::error::Result;

pub mod builtin;
pub mod web;

pub use self::web::{Fetcher, HttpFetcher, Page};

/// What a single command made of a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Not for this command; offer the message to the next one.
    NotApplicable,
    /// Claim the message and send these lines, in order.
    Responses(Vec<String>),
    /// Claim the message.  The command already said (or logged)
    /// whatever it wanted to.
    HandledExternally,
}

impl Outcome {

    pub fn respond<S: Into<String>>(line: S) -> Outcome {
        Outcome::Responses(vec![line.into()])
    }

    pub fn nothing() -> Outcome {
        Outcome::NotApplicable
    }

}

/// What the whole chain made of a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Lines to send.  Empty when no command claimed the message.
    Say(Vec<String>),
    /// A command claimed the message and there is nothing left to send.
    Handled,
}

impl Reply {

    pub fn lines(&self) -> &[String] {
        match *self {
            Reply::Say(ref lines) => lines,
            Reply::Handled => &[],
        }
    }

}

/// Lets a command talk to the channel or write to the chat log itself.
pub trait Outbox {
    fn say(&mut self, text: &str);
    fn log(&mut self, message: &str);
}

/// A handler in the chain.
///
/// `try_handle` must return `Outcome::NotApplicable` for messages it
/// doesn't want, and must absorb its own lookup failures.
pub trait Command {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Outcome;
}

/// Name and description of a registered command, as listed by `help`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: Option<String>,
}

/// Everything a command can see while handling one message.
pub struct Context<'a> {
    session: &'a Session,
    catalog: &'a [CommandInfo],
    out: &'a mut dyn Outbox,
}

impl<'a> Context<'a> {

    pub fn new(session: &'a Session, catalog: &'a [CommandInfo], out: &'a mut dyn Outbox) -> Context<'a> {
        Context{
            session: session,
            catalog: catalog,
            out: out,
        }
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Every command in the chain, in evaluation order.
    pub fn catalog(&self) -> &'a [CommandInfo] {
        self.catalog
    }

    pub fn say(&mut self, text: &str) {
        self.out.say(text)
    }

    pub fn log(&mut self, message: &str) {
        self.out.log(message)
    }

}

/// Commands in the order they were registered.  The first one to
/// claim a message wins and the rest never see it.
pub struct Chain {
    commands: Vec<Box<dyn Command>>,
    catalog: Vec<CommandInfo>,
}

impl Chain {

    pub fn new(commands: Vec<Box<dyn Command>>) -> Chain {
        let catalog = commands.iter().map(|c| CommandInfo{
            name: c.name().to_string(),
            description: c.description().map(|d| d.to_string()),
        }).collect();
        Chain{
            commands: commands,
            catalog: catalog,
        }
    }

    /// help, dance, woodies, wiki, metar, twitter, fatpita, corgibomb.
    pub fn standard(fetcher: Arc<dyn Fetcher>) -> Result<Chain> {
        Ok(Chain::new(vec![
            Box::new(builtin::Help),
            Box::new(builtin::Dance),
            Box::new(builtin::Woodies),
            Box::new(web::Wiki::new(fetcher.clone())),
            Box::new(web::Metar::new(fetcher.clone())),
            Box::new(web::Twitter::new(fetcher.clone())),
            Box::new(web::Fatpita::new(fetcher.clone())),
            Box::new(web::Corgibomb::new(fetcher)?),
        ]))
    }

    pub fn catalog(&self) -> &[CommandInfo] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn evaluate(&mut self, session: &Session, out: &mut dyn Outbox, nick: &str, text: &str) -> Reply {
        let mut ctx = Context::new(session, &self.catalog, out);
        for command in self.commands.iter_mut() {
            match command.try_handle(&mut ctx, nick, text) {
                Outcome::NotApplicable => continue,
                Outcome::Responses(lines) => {
                    debug!("{} answered \"{}\" with {} line(s).", command.name(), text, lines.len());
                    return Reply::Say(lines);
                },
                Outcome::HandledExternally => {
                    debug!("{} handled \"{}\" itself.", command.name(), text);
                    return Reply::Handled;
                },
            }
        }
        debug!("No command claimed \"{}\".", text);
        Reply::Say(Vec::new())
    }

}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Collects whatever commands say or log.
    #[derive(Default)]
    pub struct Recorder {
        pub said: Vec<String>,
        pub logged: Vec<String>,
    }

    impl Outbox for Recorder {
        fn say(&mut self, text: &str) {
            self.said.push(text.to_string());
        }

        fn log(&mut self, message: &str) {
            self.logged.push(message.to_string());
        }
    }

    /// Runs a single command against `text` as if `nick` said it to a
    /// bot called "bob".
    pub fn run(command: &mut dyn Command, nick: &str, text: &str) -> (Outcome, Recorder) {
        let session = Session::new("bob", "#toast");
        let catalog = [CommandInfo{ name: command.name().to_string(), description: None }];
        let mut recorder = Recorder::default();
        let outcome = {
            let mut ctx = Context::new(&session, &catalog, &mut recorder);
            command.try_handle(&mut ctx, nick, text)
        };
        (outcome, recorder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::Recorder;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Claims anything containing `word` and counts how often it is asked.
    struct Spy {
        name: &'static str,
        word: &'static str,
        calls: Rc<Cell<usize>>,
        outcome: Outcome,
    }

    impl Spy {
        fn new(name: &'static str, word: &'static str, outcome: Outcome) -> (Spy, Rc<Cell<usize>>) {
            let calls = Rc::new(Cell::new(0));
            (Spy{ name: name, word: word, calls: calls.clone(), outcome: outcome }, calls)
        }
    }

    impl Command for Spy {
        fn name(&self) -> &str {
            self.name
        }

        fn try_handle(&mut self, _ctx: &mut Context<'_>, _nick: &str, text: &str) -> Outcome {
            self.calls.set(self.calls.get() + 1);
            if text.contains(self.word) {
                self.outcome.clone()
            } else {
                Outcome::NotApplicable
            }
        }
    }

    fn evaluate(chain: &mut Chain, text: &str) -> (Reply, Recorder) {
        let session = Session::new("bob", "#toast");
        let mut recorder = Recorder::default();
        let reply = chain.evaluate(&session, &mut recorder, "alice", text);
        (reply, recorder)
    }

    #[test]
    fn first_match_wins() {
        let (first, first_calls) = Spy::new("first", "x", Outcome::respond("first"));
        let (second, second_calls) = Spy::new("second", "x", Outcome::respond("second"));
        let mut chain = Chain::new(vec![Box::new(first), Box::new(second)]);

        let (reply, _) = evaluate(&mut chain, "x marks the spot");
        assert_eq!(reply, Reply::Say(vec!["first".to_string()]));
        assert_eq!(first_calls.get(), 1);
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn falls_through_until_claimed() {
        let (first, first_calls) = Spy::new("first", "nope", Outcome::respond("first"));
        let (second, second_calls) = Spy::new("second", "y", Outcome::HandledExternally);
        let (third, third_calls) = Spy::new("third", "y", Outcome::respond("third"));
        let mut chain = Chain::new(vec![Box::new(first), Box::new(second), Box::new(third)]);

        let (reply, _) = evaluate(&mut chain, "y");
        assert_eq!(reply, Reply::Handled);
        assert!(reply.lines().is_empty());
        assert_eq!((first_calls.get(), second_calls.get(), third_calls.get()), (1, 1, 0));
    }

    #[test]
    fn exhaustion_is_silent() {
        let (only, calls) = Spy::new("only", "z", Outcome::respond("z"));
        let mut chain = Chain::new(vec![Box::new(only)]);

        let (reply, recorder) = evaluate(&mut chain, "nothing here");
        assert_eq!(reply, Reply::Say(vec![]));
        assert_eq!(calls.get(), 1);
        assert!(recorder.said.is_empty());
        assert!(recorder.logged.is_empty());
    }

    #[test]
    fn empty_chain() {
        let mut chain = Chain::new(vec![]);
        assert!(chain.is_empty());
        assert_eq!(evaluate(&mut chain, "bob: help").0, Reply::Say(vec![]));
    }

    #[test]
    fn standard_order() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(|url: &str| -> Result<Page> {
            Err(crate::error::Error::fetch(url, "offline"))
        });
        let chain = Chain::standard(fetcher).unwrap();
        let names: Vec<_> = chain.catalog().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["help", "dance", "woodies", "wiki", "metar", "twitter", "fatpita", "corgibomb"]);
        assert_eq!(chain.len(), 8);
        assert!(chain.catalog().iter().all(|c| c.description.is_some()));
    }
}
