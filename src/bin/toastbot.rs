use std::env;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Duration;
use toastbot::{Bot, Closed, Config, TcpTransport};

#[macro_use]
extern crate log;

fn usage(opts: &getopts::Options, program: &str) -> String {
    opts.usage(&format!("Usage: {} --nick NICK --chan CHANNEL [options]", program))
}

fn parse_config(args: &[String]) -> Result<Option<Config>, String> {
    let mut opts = getopts::Options::new();
    opts.optopt("n", "nick", "nickname", "NICK");
    opts.optopt("c", "chan", "channel to join", "CHAN");
    opts.optopt("", "host", "irc server hostname", "HOSTNAME");
    opts.optopt("", "port", "irc server port", "PORT");
    opts.optopt("", "user", "username sent at registration", "USER");
    opts.optopt("", "realname", "real name sent at registration", "NAME");
    opts.optopt("", "log-dir", "where to write the daily chat logs", "DIR");
    opts.optopt("", "timeout", "seconds to wait on a lookup", "SECS");
    opts.optflag("d", "debug", "verbose logging");
    opts.optflag("h", "help", "print this help");

    let program = args.first().map(|s| s.as_str()).unwrap_or("toastbot");
    let matches = opts.parse(&args[1.min(args.len())..]).map_err(|e| e.to_string())?;
    if matches.opt_present("help") {
        print!("{}", usage(&opts, program));
        return Ok(None);
    }

    let nick = matches.opt_str("nick").ok_or_else(|| format!("must provide --nick\n{}", usage(&opts, program)))?;
    let chan = matches.opt_str("chan").ok_or_else(|| format!("must provide --chan\n{}", usage(&opts, program)))?;
    let mut config = Config::new(&nick, &chan);
    if let Some(host) = matches.opt_str("host") {
        config.server = host;
    }
    if let Some(port) = matches.opt_str("port") {
        config.port = u16::from_str(&port).map_err(|e| format!("bad --port \"{}\": {}", port, e))?;
    }
    config.username = matches.opt_str("user");
    if let Some(realname) = matches.opt_str("realname") {
        config.realname = realname;
    }
    if let Some(dir) = matches.opt_str("log-dir") {
        config.log_dir = PathBuf::from(dir);
    }
    if let Some(secs) = matches.opt_str("timeout") {
        let secs = u64::from_str(&secs).map_err(|e| format!("bad --timeout \"{}\": {}", secs, e))?;
        config.http_timeout = Duration::from_secs(secs);
    }
    config.debug = matches.opt_present("debug");
    Ok(Some(config))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = match parse_config(&args) {
        Ok(Some(config)) => config,
        Ok(None) => return,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(2);
        },
    };

    let default_filter = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let transport = TcpTransport::new(&config.server, config.port, &config.nick,
                                      config.username(), &config.realname);
    let mut bot = match Bot::new(&config, transport) {
        Ok(bot) => bot,
        Err(e) => {
            error!("Couldn't start: {}", e);
            process::exit(1);
        },
    };

    match bot.start() {
        Ok(Closed::ByPeer) => info!("Connection closed by peer."),
        Ok(Closed::ReadFailed(e)) => info!("Connection closed: {}", e),
        Err(e) => {
            error!("Error talking to {}:{}: {}", config.server, config.port, e);
            process::exit(1);
        },
    }
}
