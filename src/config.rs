use std::env;
use std::path::PathBuf;
use std::time::Duration;
use super::error::{Error, Result};

pub const DEFAULT_SERVER: &str = "irc.freenode.net";
pub const DEFAULT_PORT: u16 = 6667;
pub const DEFAULT_REALNAME: &str = "ToastBot";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to bring a bot up.  Built once, before the
/// session starts, and only read afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub nick: String,
    pub channel: String,
    pub server: String,
    pub port: u16,
    /// Sent in `USER`; the nick is used when this is `None`.
    pub username: Option<String>,
    pub realname: String,
    pub debug: bool,
    pub log_dir: PathBuf,
    /// Upper bound on each lookup a command makes.
    pub http_timeout: Duration,
}

impl Config {

    /// A configuration for `nick` in `channel` with every other field
    /// at its default.
    pub fn new(nick: &str, channel: &str) -> Config {
        Config{
            nick: nick.to_string(),
            channel: channel.to_string(),
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            username: None,
            realname: DEFAULT_REALNAME.to_string(),
            debug: false,
            log_dir: default_log_dir(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nick.is_empty() {
            return Err(Error::Config("nick must not be empty".to_string()));
        }
        if self.nick.chars().any(char::is_whitespace) {
            return Err(Error::Config(format!("nick \"{}\" contains whitespace", self.nick)));
        }
        if self.channel.trim().is_empty() {
            return Err(Error::Config("channel must not be empty".to_string()));
        }
        Ok(())
    }

}

/// `logs/` next to the installed executable, or under the working
/// directory if that can't be determined.
pub fn default_log_dir() -> PathBuf {
    env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("toastbot", "#toastdriven");
        assert_eq!(config.server, "irc.freenode.net");
        assert_eq!(config.port, 6667);
        assert_eq!(config.realname, "ToastBot");
        assert!(!config.debug);
        assert!(config.log_dir.ends_with("logs"));
        assert_eq!(config.username(), "toastbot");
    }

    #[test]
    fn explicit_username_wins() {
        let mut config = Config::new("toastbot", "#toastdriven");
        config.username = Some("toast".to_string());
        assert_eq!(config.username(), "toast");
    }

    #[test]
    fn rejects_bad_identity() {
        assert!(Config::new("", "#chan").validate().is_err());
        assert!(Config::new("two words", "#chan").validate().is_err());
        assert!(Config::new("bob", " ").validate().is_err());
        assert!(Config::new("bob", "#chan").validate().is_ok());
    }
}
