//! A small, extensible IRC bot that sits in one channel, keeps a daily
//! log of the traffic, and answers to a fixed chain of commands.
//!
//! # Example:
//! ```no_run
//! use toastbot::{Bot, Config, TcpTransport};
//!
//! let config = Config::new("toastbot", "#toastdriven");
//! let transport = TcpTransport::new(&config.server, config.port, &config.nick,
//!                                   config.username(), &config.realname);
//! let mut bot = Bot::new(&config, transport).expect("couldn't set up the bot");
//! match bot.start() {
//!     Ok(closed) => println!("done: {:?}", closed),
//!     Err(e) => eprintln!("fatal: {}", e),
//! }
//! ```
//!
//! Lines addressed to the bot start with its nick and one of `": "`,
//! `", "`, `"- "` or `" - "`, e.g. `toastbot: dance`.

pub mod address;
pub mod chat_log;
pub mod commands;
pub mod config;
pub mod error;
pub mod event_stream;
pub mod protocol;
pub mod transport;

pub use address::{Address, Session};
pub use chat_log::ChatLog;
pub use commands::{Chain, Command, Context, Outcome, Reply};
pub use config::Config;
pub use error::{Error, Result};
pub use event_stream::{Bot, Closed, State};
pub use transport::{TcpTransport, Transport};

#[macro_use]
extern crate log;
