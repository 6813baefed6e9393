use super::{Command, Context, Outcome};

pub const WOODIES: &str = "U GUYZ R THE BEST AND GIVE ME A BILLION WOODIES A DAY! \
                           [https://code.djangoproject.com/ticket/7712#comment:2]";

pub const DANCE_MOVES: [&str; 4] = ["_O_", "\\O_", "_O/", "\\O/"];

/// Lists every command in the chain.
pub struct Help;

impl Command for Help {

    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> Option<&str> {
        Some("Provides a description of what I respond to.")
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Outcome {
        if ctx.session().direct_command("help", text).is_none() {
            return Outcome::nothing();
        }
        let mut lines = vec![format!("{}: Valid commands - ", nick)];
        lines.extend(ctx.catalog().iter().map(|c| {
            format!("  - {} = {}", c.name, c.description.as_deref().unwrap_or("No documentation."))
        }));
        Outcome::Responses(lines)
    }

}

pub struct Dance;

impl Command for Dance {

    fn name(&self) -> &str {
        "dance"
    }

    fn description(&self) -> Option<&str> {
        Some("Get down and funky.")
    }

    fn try_handle(&mut self, ctx: &mut Context<'_>, _nick: &str, text: &str) -> Outcome {
        match ctx.session().direct_command("dance", text) {
            Some(_) => Outcome::Responses(DANCE_MOVES.iter().map(|m| m.to_string()).collect()),
            None => Outcome::nothing(),
        }
    }

}

/// Answers any mention of woodies, addressed or not.
pub struct Woodies;

impl Command for Woodies {

    fn name(&self) -> &str {
        "woodies"
    }

    fn description(&self) -> Option<&str> {
        Some("Best quote on the internet.")
    }

    fn try_handle(&mut self, _ctx: &mut Context<'_>, _nick: &str, text: &str) -> Outcome {
        if text.contains("woodies") {
            Outcome::respond(WOODIES)
        } else {
            Outcome::nothing()
        }
    }

}
