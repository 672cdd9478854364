use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;
use crate::http::AppState;

#[derive(Args)]
pub struct ServeArgs {
    /// Directory holding the faqbot data (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Address to listen on (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, _output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Invalid path: {}", e))?;

    let config = Config::load_initialized(&root)?;
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    let state = AppState::from_config(&root, &config)?;
    crate::http::run_server(state, &host, port).await
}
