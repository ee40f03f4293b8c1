//! Bot configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::EngineSettings;
use crate::error::BotError;
use crate::game::LifecycleSettings;
use crate::responder::ResponderSettings;

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Path to the UCI engine binary
    pub engine_path: PathBuf,

    /// Engine hash table size in MB
    pub engine_hash_mb: u32,

    /// Extra `setoption` pairs from `ENGINE_OPTIONS=Name=Value;Name=Value`
    pub engine_options: Vec<(String, String)>,

    pub handle: String,
    pub password: String,
    pub host: String,
    pub port: u16,

    /// Wrapper such as `timeseal`; plain TCP when unset
    pub timeseal_path: Option<PathBuf>,

    /// Handle allowed to send `last` and `!command` tells
    pub operator: Option<String>,

    /// 0 for unlimited
    pub max_games: u32,

    pub seeks: Vec<String>,
    pub ponder: bool,
    pub auto_accept: bool,
    pub restart_on_new: bool,
    pub quit_on_lose: bool,
    pub default_answer: String,
    pub ignore: Vec<String>,

    /// Engine option fed with the rating-based bias
    pub bias_option: String,
    pub bias_factor: f64,
    pub default_rating_diff: i32,

    /// Server command used to broadcast the PV; `None` disables it
    pub pv_command: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        let lifecycle = LifecycleSettings::default();
        let responder = ResponderSettings::default();
        Self {
            engine_path: PathBuf::new(),
            engine_hash_mb: EngineSettings::default().hash_mb,
            engine_options: Vec::new(),
            handle: String::new(),
            password: String::new(),
            host: "freechess.org".to_string(),
            port: 5000,
            timeseal_path: None,
            operator: None,
            max_games: lifecycle.max_games,
            seeks: vec![
                "seek 1 0 f".to_string(),
                "seek 2 0 f".to_string(),
                "seek 3 0 f".to_string(),
            ],
            ponder: true,
            auto_accept: responder.auto_accept,
            restart_on_new: lifecycle.restart_on_new,
            quit_on_lose: lifecycle.quit_on_loss,
            default_answer: responder.default_answer,
            ignore: responder.ignore,
            bias_option: lifecycle.bias_option,
            bias_factor: lifecycle.bias_factor,
            default_rating_diff: lifecycle.default_rating_diff,
            pv_command: Some("whisper".to_string()),
        }
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, BotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let engine_path = lookup("ENGINE_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| BotError::Config("ENGINE_PATH not set".into()))?;
        let handle =
            lookup("ICS_HANDLE").ok_or_else(|| BotError::Config("ICS_HANDLE not set".into()))?;

        let operator = lookup("OPERATOR").filter(|s| !s.is_empty());
        let default_answer = lookup("DEFAULT_ANSWER").unwrap_or_else(|| match &operator {
            Some(op) => format!(
                "I am only a chess program. Contact {op} if you have any problem."
            ),
            None => defaults.default_answer.clone(),
        });

        Ok(Self {
            engine_path,
            engine_hash_mb: parsed(&lookup, "ENGINE_HASH_MB", defaults.engine_hash_mb)?,
            engine_options: match lookup("ENGINE_OPTIONS") {
                Some(raw) => parse_options(&raw)?,
                None => defaults.engine_options,
            },
            handle,
            password: lookup("ICS_PASSWORD").unwrap_or_default(),
            host: lookup("ICS_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "ICS_PORT", defaults.port)?,
            timeseal_path: lookup("TIMESEAL_PATH")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            operator,
            max_games: parsed(&lookup, "MAX_GAMES", defaults.max_games)?,
            seeks: lookup("SEEKS")
                .map(|raw| split_list(&raw, ';'))
                .unwrap_or(defaults.seeks),
            ponder: flag(&lookup, "PONDER", defaults.ponder)?,
            auto_accept: flag(&lookup, "AUTO_ACCEPT", defaults.auto_accept)?,
            restart_on_new: flag(&lookup, "RESTART_ON_NEW", defaults.restart_on_new)?,
            quit_on_lose: flag(&lookup, "QUIT_ON_LOSE", defaults.quit_on_lose)?,
            default_answer,
            ignore: lookup("IGNORE")
                .map(|raw| split_list(&raw, ','))
                .unwrap_or(defaults.ignore),
            bias_option: lookup("BIAS_OPTION").unwrap_or(defaults.bias_option),
            bias_factor: parsed(&lookup, "BIAS_FACTOR", defaults.bias_factor)?,
            default_rating_diff: parsed(
                &lookup,
                "DEFAULT_RATING_DIFF",
                defaults.default_rating_diff,
            )?,
            pv_command: match lookup("PV_COMMAND") {
                Some(cmd) if cmd.trim().is_empty() => None,
                Some(cmd) => Some(cmd.trim().to_string()),
                None => defaults.pv_command,
            },
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            hash_mb: self.engine_hash_mb,
            options: self.engine_options.clone(),
        }
    }

    pub fn lifecycle_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            max_games: self.max_games,
            restart_on_new: self.restart_on_new,
            quit_on_loss: self.quit_on_lose,
            bias_option: self.bias_option.clone(),
            bias_factor: self.bias_factor,
            default_rating_diff: self.default_rating_diff,
        }
    }

    pub fn responder_settings(&self) -> ResponderSettings {
        ResponderSettings {
            operator: self.operator.clone(),
            ignore: self.ignore.clone(),
            default_answer: self.default_answer.clone(),
            auto_accept: self.auto_accept,
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, BotError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BotError::Config(format!("{key} has an invalid value: {raw:?}"))),
        None => Ok(default),
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, BotError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(BotError::Config(format!("{key} must be a boolean, got {v:?}"))),
        },
    }
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `Threads=2;MultiPV=1` into name/value pairs.
fn parse_options(raw: &str) -> Result<Vec<(String, String)>, BotError> {
    split_list(raw, ';')
        .into_iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => Ok((name.trim().to_string(), value.trim().to_string())),
            None => Err(BotError::Config(format!(
                "ENGINE_OPTIONS entry {pair:?} is not Name=Value"
            ))),
        })
        .collect()
}
