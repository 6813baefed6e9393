//! Deciding whether a line of chat is meant for the bot.

/// Appended to the nick to form the prefixes that address the bot.
/// Checked in this order.
pub const VARIANT_ENDINGS: [&str; 4] = [": ", ", ", "- ", " - "];

/// How a piece of text relates to the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address<'a> {
    /// Starts with an address prefix; holds the text with it removed.
    Direct(&'a str),
    /// Contains an address prefix somewhere past the start.
    Indirect(&'a str),
    NoMention(&'a str),
}

impl<'a> Address<'a> {

    pub fn text(&self) -> &'a str {
        match *self {
            Address::Direct(t) | Address::Indirect(t) | Address::NoMention(t) => t,
        }
    }

}

/// Who the bot is and where it talks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    nick: String,
    channel: String,
    variants: Vec<String>,
}

impl Session {

    pub fn new(nick: &str, channel: &str) -> Session {
        Session{
            nick: nick.to_string(),
            channel: channel.to_string(),
            variants: variants_for(nick),
        }
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn resolve<'a>(&self, text: &'a str) -> Address<'a> {
        resolve(text, &self.variants)
    }

    pub fn direct_command<'a>(&self, name: &str, text: &'a str) -> Option<&'a str> {
        direct_command(name, text, &self.variants)
    }

}

pub fn variants_for(nick: &str) -> Vec<String> {
    VARIANT_ENDINGS.iter().map(|ending| format!("{}{}", nick, ending)).collect()
}

/// Resolves `text` against `variants`.
///
/// The first variant that matches at all decides: a variant is tried
/// as a prefix and then as a substring before the next variant is
/// looked at.
pub fn resolve<'a, S: AsRef<str>>(text: &'a str, variants: &[S]) -> Address<'a> {
    for variant in variants.iter().map(|v| v.as_ref()) {
        if let Some(rest) = text.strip_prefix(variant) {
            return Address::Direct(rest);
        } else if text.contains(variant) {
            return Address::Indirect(text);
        }
    }
    Address::NoMention(text)
}

/// Returns the stripped text if `text` addresses the bot directly and
/// what follows the address is exactly `name`, ignoring case.
pub fn direct_command<'a, S: AsRef<str>>(name: &str, text: &'a str, variants: &[S]) -> Option<&'a str> {
    match resolve(text, variants) {
        Address::Direct(rest) if rest.to_lowercase() == name.to_lowercase() => Some(rest),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_follow_endings() {
        assert_eq!(variants_for("bob"), vec!["bob: ", "bob, ", "bob- ", "bob - "]);
        for nick in &["toastbot", "x", "a_b"] {
            let variants = variants_for(nick);
            assert_eq!(variants.len(), VARIANT_ENDINGS.len());
            for (variant, ending) in variants.iter().zip(VARIANT_ENDINGS.iter()) {
                assert_eq!(*variant, format!("{}{}", nick, ending));
            }
        }
    }

    #[test]
    fn direct() {
        let v = variants_for("bob");
        assert_eq!(resolve("bob: hello", &v), Address::Direct("hello"));
        assert_eq!(resolve("bob - hello", &v), Address::Direct("hello"));
        assert_eq!(resolve("bob: ", &v), Address::Direct(""));
    }

    #[test]
    fn indirect() {
        let v = variants_for("bob");
        assert_eq!(resolve("hey bob, you there", &v), Address::Indirect("hey bob, you there"));
    }

    #[test]
    fn no_mention() {
        let v = variants_for("bob");
        assert_eq!(resolve("random text", &v), Address::NoMention("random text"));
        assert_eq!(resolve("bobby: hi", &v), Address::NoMention("bobby: hi"));
        assert_eq!(resolve("bob hi", &v), Address::NoMention("bob hi"));
    }

    #[test]
    fn earlier_variant_decides() {
        let v = variants_for("bob");
        // "bob: " appears inside the text before "bob, " gets a chance
        // to match as a prefix.
        assert_eq!(resolve("bob, ask bob: things", &v),
                   Address::Indirect("bob, ask bob: things"));
        assert_eq!(resolve("bob, hi", &v), Address::Direct("hi"));
    }

    #[test]
    fn only_the_prefix_is_stripped() {
        let v = variants_for("bob");
        assert_eq!(resolve("bob: tell bob: hi", &v), Address::Direct("tell bob: hi"));
    }

    #[test]
    fn direct_commands() {
        let v = variants_for("bob");
        assert_eq!(direct_command("help", "bob: HELP", &v), Some("HELP"));
        assert_eq!(direct_command("help", "bob: help", &v), Some("help"));
        assert_eq!(direct_command("help", "bob: help me", &v), None);
        assert_eq!(direct_command("help", "bob: help ", &v), None);
        assert_eq!(direct_command("help", "help", &v), None);
        assert_eq!(direct_command("help", "so bob: help", &v), None);
    }

    #[test]
    fn session_wraps_variants() {
        let session = Session::new("bob", "#chan");
        assert_eq!(session.nick(), "bob");
        assert_eq!(session.channel(), "#chan");
        assert_eq!(session.variants()[0], "bob: ");
        assert_eq!(session.resolve("bob: hi").text(), "hi");
        assert_eq!(session.direct_command("dance", "bob, Dance"), Some("Dance"));
    }
}
