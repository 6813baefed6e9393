use std::io;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The configuration can't be used to start a session.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Socket or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("bad pattern: {0}")]
    Regex(#[from] regex::Error),

    /// An outbound lookup made by a command failed.  Never escapes the
    /// command that made the request.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
}

impl Error {

    pub fn fetch<U: Into<String>, R: ToString>(url: U, reason: R) -> Error {
        Error::Fetch{
            url: url.into(),
            reason: reason.to_string(),
        }
    }

}
