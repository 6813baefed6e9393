//! Commands that answer by looking something up on the web.
//!
//! Every lookup is blocking and bounded by the fetcher's timeout.  A
//! failed lookup is dealt with inside the command: it is logged, and
//! the channel sees at most an apology.

use regex::{Captures, Regex};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use super::{Command, Context, Outcome};
use crate::address::Address;
use crate::error::{Error, Result};

pub const USER_AGENT: &str = "Mozilla/4.0 (toastbot)";

const WIKI_SEARCH: &str = "https://en.wikipedia.org/w/index.php";
const METAR_STATIONS: &str = "https://tgftp.nws.noaa.gov/data/observations/metar/stations/";
const TWITTER_SEARCH: &str = "http://search.twitter.com/search.json";
const FATPITA: &str = "http://fatpita.net/";
const CORGI_TAG: &str = "http://www.tumblr.com/tagged/corgi";

/// A fetched page.  `url` is where the request ended up after
/// redirects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl Page {

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

}

/// Performs a GET.  Error statuses come back as a `Page`; only
/// transport failures are `Err`.
pub trait Fetcher: Send + Sync {
    fn get(&self, url: &str) -> Result<Page>;
}

impl<F> Fetcher for F where F: Fn(&str) -> Result<Page> + Send + Sync {
    fn get(&self, url: &str) -> Result<Page> {
        self(url)
    }
}

pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {

    pub fn new(timeout: Duration) -> HttpFetcher {
        HttpFetcher{
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build(),
        }
    }

}

impl Fetcher for HttpFetcher {

    fn get(&self, url: &str) -> Result<Page> {
        debug!("Fetching {}...", url);
        let resp = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(e) => return Err(Error::fetch(url, e)),
        };
        let status = resp.status();
        let final_url = resp.get_url().to_string();
        let body = resp.into_string().map_err(|e| Error::fetch(url, e))?;
        Ok(Page{
            status: status,
            url: final_url,
            body: body,
        })
    }

}

/// Fetches `url`, treating anything but a 2xx as a failure.
fn fetch_ok(fetcher: &dyn Fetcher, url: &str) -> Result<Page> {
    let page = fetcher.get(url)?;
    if page.is_success() {
        Ok(page)
    } else {
        Err(Error::fetch(url, format!("HTTP {}", page.status)))
    }
}

fn with_query(base: &str, key: &str, value: &str) -> Result<String> {
    Url::parse_with_params(base, &[(key, value)])
        .map(String::from)
        .map_err(|e| Error::fetch(base, e))
}

/// If `text` directly addresses the bot and then starts with `prefix`,
/// returns the argument: what follows `prefix` and a space, or the
/// whole addressed text when the word merely begins with `prefix`.
fn prefixed<'a>(ctx: &Context<'_>, text: &'a str, prefix: &str) -> Option<&'a str> {
    match ctx.session().resolve(text) {
        Address::Direct(rest) if rest.starts_with(prefix) => {
            Some(rest[prefix.len()..].strip_prefix(' ').unwrap_or(rest))
        },
        _ => None,
    }
}

/// Search Wikipedia and answer with the article it lands on.
pub struct Wiki {
    fetcher: Arc<dyn Fetcher>,
}

impl Wiki {

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Wiki {
        Wiki{ fetcher: fetcher }
    }

}

impl Command for Wiki {

    fn name(&self) -> &str {
        "wiki"
    }

    fn description(&self) -> Option<&str> {
        Some("Search Wikipedia for a topic.")
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Outcome {
        let terms = match prefixed(ctx, text, "wiki") {
            Some(terms) => terms,
            None => return Outcome::nothing(),
        };
        let page = with_query(WIKI_SEARCH, "search", terms)
            .and_then(|url| fetch_ok(&*self.fetcher, &url));
        match page {
            Ok(page) => Outcome::respond(format!("{}: {}", nick, page.url)),
            Err(e) => {
                warn!("{}", e);
                ctx.log(&format!("Failed to load wiki entry for '{}'.", terms));
                Outcome::HandledExternally
            },
        }
    }

}

/// Current METAR report for a weather station.
pub struct Metar {
    fetcher: Arc<dyn Fetcher>,
}

impl Metar {

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Metar {
        Metar{ fetcher: fetcher }
    }

}

impl Command for Metar {

    fn name(&self) -> &str {
        "metar"
    }

    fn description(&self) -> Option<&str> {
        Some("Fetch a NOAA METAR by station code.")
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Outcome {
        let station = match prefixed(ctx, text, "metar") {
            Some(station) => station,
            None => return Outcome::nothing(),
        };
        let report = if !station.is_empty() && station.chars().all(|c| c.is_ascii_alphanumeric()) {
            fetch_ok(&*self.fetcher, &format!("{}{}.TXT", METAR_STATIONS, station.to_uppercase()))
        } else {
            Err(Error::fetch(METAR_STATIONS, format!("bad station \"{}\"", station)))
        };
        match report {
            Ok(page) => Outcome::respond(format!("{}: {}", nick, page.body.replace('\r', "").replace('\n', " ").trim())),
            Err(e) => {
                warn!("{}", e);
                ctx.log(&format!("Failed to load metar entry for '{}'.", station));
                Outcome::respond(format!("{}: Sorry, couldn't find that station.", nick))
            },
        }
    }

}

#[derive(Deserialize)]
struct TwitterSearch {
    #[serde(default)]
    results: Vec<Tweet>,
}

#[derive(Deserialize)]
struct Tweet {
    from_user: String,
    text: String,
}

/// Most recent tweets matching a search.
pub struct Twitter {
    fetcher: Arc<dyn Fetcher>,
}

impl Twitter {

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Twitter {
        Twitter{ fetcher: fetcher }
    }

    fn search_url(terms: &str) -> Result<String> {
        let url = Url::parse_with_params(TWITTER_SEARCH, &[
            ("rpp", "5"),
            ("result_type", "recent"),
            ("q", terms),
        ]).map_err(|e| Error::fetch(TWITTER_SEARCH, e))?;
        Ok(url.into())
    }

}

impl Command for Twitter {

    fn name(&self) -> &str {
        "twitter"
    }

    fn description(&self) -> Option<&str> {
        Some("Search Twitter for a topic.")
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Outcome {
        let terms = match prefixed(ctx, text, "twitter") {
            Some(terms) => terms,
            None => return Outcome::nothing(),
        };
        let page = match Twitter::search_url(terms).and_then(|url| fetch_ok(&*self.fetcher, &url)) {
            Ok(page) => page,
            Err(e) => {
                warn!("{}", e);
                ctx.log(&format!("Failed to load twitter results for '{}'.", terms));
                ctx.say(&format!("{}: Sorry, Twitter isn't responding.", nick));
                return Outcome::HandledExternally;
            },
        };
        match serde_json::from_str::<TwitterSearch>(&page.body) {
            Ok(search) => {
                let mut lines = vec![format!("{}: Top 5 results - ", nick)];
                lines.extend(search.results.iter().take(5).map(|t| format!("  - @{}: {}", t.from_user, t.text)));
                Outcome::Responses(lines)
            },
            Err(e) => {
                warn!("Unreadable twitter response for '{}': {}", terms, e);
                ctx.log(&format!("FAIL WHALE for '{}'.", terms));
                ctx.say(&format!("{}: Twitter fail whale'd.", nick));
                Outcome::HandledExternally
            },
        }
    }

}

/// A random image, by way of the site's redirect.
pub struct Fatpita {
    fetcher: Arc<dyn Fetcher>,
}

impl Fatpita {

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Fatpita {
        Fatpita{ fetcher: fetcher }
    }

}

impl Command for Fatpita {

    fn name(&self) -> &str {
        "fatpita"
    }

    fn description(&self) -> Option<&str> {
        Some("Get a random fatpita image. For the lulz.")
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Outcome {
        if ctx.session().direct_command("fatpita", text).is_none() {
            return Outcome::nothing();
        }
        match fetch_ok(&*self.fetcher, FATPITA) {
            Ok(page) => Outcome::respond(format!("{}: {}", nick, page.url)),
            Err(e) => {
                warn!("{}", e);
                ctx.log("Failed to load random fatpita image.");
                Outcome::HandledExternally
            },
        }
    }

}

/// First corgi picture on the tag page.
pub struct Corgibomb {
    fetcher: Arc<dyn Fetcher>,
    tag: Regex,
    class: Regex,
    onclick: Regex,
    src: Regex,
}

/// Value of an attribute matched by `attribute`, whichever quotes it used.
fn quoted<'a>(c: &Captures<'a>) -> Option<&'a str> {
    c.get(1).or_else(|| c.get(2)).map(|m| m.as_str())
}

fn attribute(name: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r#"\s{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#, name))?)
}

impl Corgibomb {

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Result<Corgibomb> {
        Ok(Corgibomb{
            fetcher: fetcher,
            // An opening tag; quoted attribute values may contain `>`.
            tag: Regex::new(r#"<[A-Za-z][^>"']*(?:(?:"[^"]*"|'[^']*')[^>"']*)*>"#)?,
            class: attribute("class")?,
            onclick: attribute("onclick")?,
            src: Regex::new(r#"this\.src\s*=\s*(?:'([^']*)'|"([^"]*)")"#)?,
        })
    }

    /// The picture URL hidden in the first thumbnail's `onclick`.
    fn picture<'a>(&self, html: &'a str) -> Option<&'a str> {
        let tag = self.tag.find_iter(html).map(|m| m.as_str()).find(|tag| {
            self.class.captures(tag)
                .and_then(|c| quoted(&c))
                .map_or(false, |classes| classes.split_whitespace().any(|c| c == "image_thumbnail"))
        })?;
        let onclick = quoted(&self.onclick.captures(tag)?)?;
        quoted(&self.src.captures(onclick)?)
    }

}

impl Command for Corgibomb {

    fn name(&self) -> &str {
        "corgibomb"
    }

    fn description(&self) -> Option<&str> {
        Some("CORGI BOMB!")
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Outcome {
        if ctx.session().direct_command("corgibomb", text).is_none() {
            return Outcome::nothing();
        }
        let page = match fetch_ok(&*self.fetcher, CORGI_TAG) {
            Ok(page) => page,
            Err(e) => {
                warn!("{}", e);
                ctx.log("Failed to load corgibomb image.");
                return Outcome::HandledExternally;
            },
        };
        match self.picture(&page.body) {
            Some(pic) => Outcome::respond(format!("{}: {}", nick, pic)),
            None => Outcome::respond(format!("{}: Sorry, Tumblr is being crappy. No pic for you.", nick)),
        }
    }

}
