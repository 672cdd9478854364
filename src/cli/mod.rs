mod ask;
mod init;
mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "faqbot")]
#[command(about = "Chat webhook that answers from stored Q&A, with a language model fallback")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize faqbot in a directory
    Init(init::InitArgs),

    /// Run the webhook and record management server
    Serve(serve::ServeArgs),

    /// Answer a single question the way the webhook would
    Ask(ask::AskArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let output = OutputConfig {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init(args) => init::run(args, output),
            Commands::Serve(args) => serve::run(args, output).await,
            Commands::Ask(args) => ask::run(args, output).await,
        }
    }
}

/// Output configuration passed to all commands
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}
