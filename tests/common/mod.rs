use ponder_bot::channel::ScriptedChannel;
use ponder_bot::engine::{EngineSession, EngineSettings};
use ponder_bot::{Bot, BotConfig};

pub type TestBot = Bot<ScriptedChannel, ScriptedChannel>;

/// GuestABCD (white) against PonderBot (black), 2 12 blitz.
pub const CREATING: &str = "Creating: GuestABCD (1500) PonderBot (1650) rated blitz 2 12";

pub const START: &str = "<12> rnbqkbnr pppppppp -------- -------- -------- -------- PPPPPPPP RNBQKBNR W -1 1 1 1 1 0 7 GuestABCD PonderBot -1 2 12 39 39 120 120 1 none (0:00) none 0 0 0";

pub const AFTER_E4: &str = "<12> rnbqkbnr pppppppp -------- -------- ----P--- -------- PPPP-PPP RNBQKBNR B 4 1 1 1 1 0 7 GuestABCD PonderBot 1 2 12 39 39 118 120 1 P/e2-e4 (0:02) e4 0 1 0";

pub const AFTER_E5: &str = "<12> rnbqkbnr pppp-ppp -------- ----p--- ----P--- -------- PPPP-PPP RNBQKBNR W 4 1 1 1 1 0 7 GuestABCD PonderBot -1 2 12 39 39 118 117 2 P/e7-e5 (0:03) e5 0 1 0";

pub const AFTER_NF3: &str = "<12> rnbqkbnr pppp-ppp -------- ----p--- ----P--- -----N-- PPPP-PPP RNBQKB-R B -1 1 1 1 1 1 7 GuestABCD PonderBot 1 2 12 39 39 116 117 2 N/g1-f3 (0:02) Nf3 0 1 0";

pub const AFTER_NC3: &str = "<12> rnbqkbnr pppp-ppp -------- ----p--- ----P--- --N----- PPPP-PPP R-BQKBNR B -1 1 1 1 1 1 7 GuestABCD PonderBot 1 2 12 39 39 116 117 2 N/b1-c3 (0:02) Nc3 0 1 0";

/// Copy of `record` with the whitespace token at `index` replaced.
pub fn replace_token(record: &str, index: usize, value: &str) -> String {
    let mut tokens: Vec<&str> = record.split_whitespace().collect();
    tokens[index] = value;
    tokens.join(" ")
}

pub fn config() -> BotConfig {
    BotConfig {
        handle: "PonderBot".to_string(),
        seeks: vec!["seek 2 12 f".to_string()],
        ..BotConfig::default()
    }
}

/// A bot whose engine will print `engine_lines`, in order, as it is asked.
pub fn bot_with(config: BotConfig, engine_lines: &[&str]) -> TestBot {
    let engine = EngineSession::new(
        ScriptedChannel::with_lines(engine_lines.iter().copied()),
        EngineSettings::default(),
    );
    Bot::new(&config, engine, ScriptedChannel::new())
}

pub fn bot(engine_lines: &[&str]) -> TestBot {
    bot_with(config(), engine_lines)
}

/// Feed lines to the bot, panicking on any error.
pub async fn feed(bot: &mut TestBot, lines: &[&str]) {
    for line in lines {
        bot.handle_line(line).await.unwrap();
    }
}

/// Lines the bot has written to the engine since the last call.
pub fn engine_sent(bot: &mut TestBot) -> Vec<String> {
    bot.engine_mut().io_mut().take_sent()
}

/// Lines the bot has written to the server since the last call.
pub fn server_sent(bot: &mut TestBot) -> Vec<String> {
    bot.server_mut().take_sent()
}
