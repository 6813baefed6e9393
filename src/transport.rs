use regex::Regex;
use std::io;
use std::io::prelude::*;
use std::net::{Shutdown, TcpStream};
use super::protocol::{self, Classifier, Dest, Event, Privmsg};

/// The connection the bot talks through.
///
/// `read_line` follows `BufRead::read_line`: the returned line still
/// carries its terminator, and an empty string means the peer closed
/// the connection.
pub trait Transport {
    fn connect(&mut self) -> io::Result<()>;
    fn join(&mut self, channel: &str) -> io::Result<()>;
    fn read_line(&mut self) -> io::Result<String>;
    fn pong(&mut self, payload: &str) -> io::Result<()>;
    fn respond(&mut self, text: &str, dest: Dest<'_>) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

/// A plain-text IRC connection over TCP.
pub struct TcpTransport {
    server: String,
    port: u16,
    nick: String,
    user: String,
    realname: String,
    reader: Option<io::BufReader<TcpStream>>,
    writer: Option<TcpStream>,
}

impl TcpTransport {

    pub fn new(server: &str, port: u16, nick: &str, user: &str, realname: &str) -> TcpTransport {
        TcpTransport{
            server: server.to_string(),
            port: port,
            nick: nick.to_string(),
            user: user.to_string(),
            realname: realname.to_string(),
            reader: None,
            writer: None,
        }
    }

    fn send(&mut self, line: &str) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(not_connected)?;
        debug!("Sending \"{}\"...", line.trim_end());
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    /// Reads until the server welcomes us, answering pings on the way.
    fn await_welcome(&mut self) -> io::Result<()> {
        let welcome = Regex::new(r"^:?[^\s]+\s+001\s").map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let classifier = Classifier::new().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "closed during registration"));
            }
            let line = line.trim_end();
            if welcome.is_match(line) {
                return Ok(());
            } else if let Event::Ping{ payload } = classifier.classify(line) {
                self.pong(payload)?;
            } else if line.starts_with("ERROR") {
                return Err(io::Error::new(io::ErrorKind::ConnectionAborted, line.to_string()));
            }
        }
    }

}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "not connected")
}

impl Transport for TcpTransport {

    fn connect(&mut self) -> io::Result<()> {
        debug!("Connecting to {}:{}...", self.server, self.port);
        let conn = TcpStream::connect((self.server.as_str(), self.port))?;
        let conn_copy = conn.try_clone()?;
        self.reader = Some(io::BufReader::new(conn));
        self.writer = Some(conn_copy);
        info!("Connected to {}:{}!", self.server, self.port);

        let nick_line = format!("NICK {}\r\n", self.nick);
        let user_line = format!("USER {} 0 * :{}\r\n", self.user, self.realname);
        self.send(&nick_line)?;
        self.send(&user_line)?;
        self.await_welcome()?;
        info!("Logged in as {}!", self.nick);
        Ok(())
    }

    fn join(&mut self, channel: &str) -> io::Result<()> {
        info!("Joining channel {}...", channel);
        self.send(&format!("JOIN {}\r\n", channel))
    }

    fn read_line(&mut self) -> io::Result<String> {
        let reader = self.reader.as_mut().ok_or_else(not_connected)?;
        let mut buf = Vec::new();
        reader.read_until(b'\n', &mut buf)?;
        let line = String::from_utf8_lossy(&buf).into_owned();
        debug!("Read \"{}\".", line.trim_end());
        Ok(line)
    }

    fn pong(&mut self, payload: &str) -> io::Result<()> {
        self.send(&protocol::pong(payload))
    }

    fn respond(&mut self, text: &str, dest: Dest<'_>) -> io::Result<()> {
        for line in Privmsg::new(dest, text).format() {
            self.send(&line)?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.writer.is_none() {
            return Ok(());
        }
        info!("Quitting from server...");
        if let Err(e) = self.send("QUIT :adios\r\n") {
            warn!("Error quitting: {:?}", e);
        }
        self.reader = None;
        match self.writer.take() {
            Some(w) => match w.shutdown(Shutdown::Both) {
                Err(ref e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
                other => other,
            },
            None => Ok(()),
        }
    }

}
