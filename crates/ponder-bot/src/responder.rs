//! Chat and housekeeping replies: tells, operator commands, challenges and
//! the login script.

use tracing::info;

use crate::game::GameLifecycle;

/// Server settings applied right after logging in.
const SETUP_COMMANDS: &[&str] = &[
    "set style 12",
    "set autoflag 1",
    "set mailmess 1",
    "set automail 1",
    "set pgn 0",
    "set shout 0",
    "set seek 0",
    "set bell 0",
    "set cshout 0",
    "set tshout 0",
    "-ch 4",
    "-ch 53",
    "-ch 50",
    "-ch 1",
    "-ch 2",
    "set kibitz 0",
];

#[derive(Debug, Clone)]
pub struct ResponderSettings {
    pub operator: Option<String>,
    /// Handles whose tells get no answer.
    pub ignore: Vec<String>,
    pub default_answer: String,
    pub auto_accept: bool,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            operator: None,
            ignore: vec!["ROBOadmin".to_string()],
            default_answer: "I am only a chess program.".to_string(),
            auto_accept: true,
        }
    }
}

pub struct Responder {
    settings: ResponderSettings,
}

impl Responder {
    pub fn new(settings: ResponderSettings) -> Self {
        Self { settings }
    }

    pub fn operator(&self) -> Option<&str> {
        self.settings.operator.as_deref()
    }

    /// Lines to send in reply to a tell.
    pub fn on_tell(&self, sender: &str, words: &[String], games: &mut GameLifecycle) -> Vec<String> {
        if let Some(operator) = self.operator().filter(|op| op.eq_ignore_ascii_case(sender)) {
            return match words.first().map(String::as_str) {
                Some("last") => {
                    info!("Operator asked to quit after this game");
                    games.request_quit();
                    vec![format!("tell {operator} I'll quit after next game's end.")]
                }
                Some(first) if first.starts_with('!') => {
                    let command = words.join(" ")[1..].to_string();
                    info!(command = %command, "Operator command");
                    vec![format!("tell {operator} Ok."), command]
                }
                _ => Vec::new(),
            };
        }

        if self
            .settings
            .ignore
            .iter()
            .any(|handle| handle.eq_ignore_ascii_case(sender))
        {
            return Vec::new();
        }

        vec![format!("tell {sender} {}", self.settings.default_answer)]
    }

    pub fn on_challenge(&self) -> Option<String> {
        self.settings.auto_accept.then(|| "accept".to_string())
    }

    /// Message for the operator when a game starts.
    pub fn game_start_notice(
        &self,
        games_played: u32,
        color: char,
        games_won: u32,
    ) -> Option<String> {
        self.operator().map(|operator| {
            format!(
                "tell {operator} New game ({games_played}) started with color {color} ({games_won} won)"
            )
        })
    }
}

/// Handle, password, then the server settings, ending with `finger` so the
/// server tells us our exact handle.
pub fn login_script(handle: &str, password: &str) -> Vec<String> {
    let mut lines = vec![handle.to_string(), password.to_string(), String::new()];
    lines.extend(SETUP_COMMANDS.iter().map(|s| s.to_string()));
    lines.push("finger".to_string());
    lines
}
