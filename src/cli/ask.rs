use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;
use crate::http::AppState;

#[derive(Args)]
pub struct AskArgs {
    /// Question to answer
    question: String,

    /// Directory holding the faqbot data (defaults to current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    question: &'a str,
    answer: &'a str,
}

pub async fn run(args: AskArgs, output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let config = Config::load_initialized(&root)?;
    let state = AppState::from_config(&root, &config)?;

    let answer = state
        .responder
        .respond(&args.question)
        .await
        .context("Failed to look up stored answers")?;

    if output.json {
        let json_output = AskOutput {
            question: &args.question,
            answer: &answer,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else {
        println!("{answer}");
    }

    Ok(())
}
