mod cache;
mod cli;
mod config;
mod error;
mod feed;
mod loader;
mod server;
mod session;
mod state;
mod storage;
mod template;
mod widget;

use std::process::ExitCode;

use anyhow::Result;
use cli::Args;
use server::Server;
use state::State;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn set_up_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_regex(false)
                .with_default_directive(Level::INFO.into())
                .with_env_var("FCLITE_LOG")
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    set_up_logging();

    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();

        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Could not listen for Ctrl-C: {e:#}");
                return;
            }

            info!("Shutting down");
            cancel.cancel();
        }
    });

    let server = match start().await {
        Ok(server) => server,

        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.serve(cancel).await {
        error!("{e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn start() -> Result<Server> {
    let mut args = Args::parse();
    let config_paths = args
        .config_path
        .take()
        .into_iter()
        .chain(["./fclite.toml".into(), "/etc/fclite.toml".into()])
        .collect::<Vec<_>>();
    let mut config = config::load(&config_paths)?;
    config.update(args);
    let state = State::new(config).await?;

    Server::new(state).await
}
