//! Ponder Bot
//!
//! Plays on an ICS server with a local UCI engine, pondering while the
//! opponent thinks.

use ponder_bot::channel::LineIo;
use ponder_bot::engine::{EngineProcess, EngineSession};
use ponder_bot::server::ServerConnection;
use ponder_bot::{Bot, BotConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = BotConfig::load()?;
    info!(
        engine = %config.engine_path.display(),
        handle = %config.handle,
        host = %config.host,
        port = config.port,
        ponder = config.ponder,
        "Bot config loaded"
    );

    let mut engine = EngineSession::new(
        EngineProcess::spawn(&config.engine_path)?,
        config.engine_settings(),
    );
    engine.start().await?;
    info!("Engine ready");

    let server = match &config.timeseal_path {
        Some(wrapper) => ServerConnection::spawn_wrapper(wrapper, &config.host, config.port)?,
        None => ServerConnection::connect(&config.host, config.port).await?,
    };
    if let Some(pid) = server.wrapper_pid() {
        info!(pid, "Wrapper process started");
    }

    run(Bot::new(&config, engine, server)).await
}

async fn run<S: LineIo>(mut bot: Bot<EngineProcess, S>) -> anyhow::Result<()> {
    bot.login().await?;

    let outcome = tokio::select! {
        result = bot.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            Ok(())
        }
    };

    if let Err(e) = bot.shutdown().await {
        error!(error = %e, "Engine did not take quit");
    }
    info!(
        played = bot.games().games_played(),
        won = bot.games().games_won(),
        "Bot stopped"
    );
    Ok(outcome?)
}
