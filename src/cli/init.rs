use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::OutputConfig;
use crate::config::Config;
use crate::storage::SqliteRecordStore;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite existing configuration and records
    #[arg(long)]
    force: bool,
}

/// Files created by `init`
#[derive(Serialize)]
struct Layout {
    config: PathBuf,
    database: PathBuf,
    uploads: PathBuf,
}

#[derive(Serialize)]
struct InitOutput<'a> {
    status: &'static str,
    path: &'a Path,
    #[serde(flatten)]
    layout: &'a Layout,
}

pub fn run(args: InitArgs, output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;
    let data_dir = Config::data_dir(&root);

    if Config::config_path(&root).exists() && !args.force {
        bail!(
            "faqbot already initialized in {}. Use --force to reinitialize.",
            data_dir.display()
        );
    }

    let layout = create_layout(&root, args.force)?;
    ignore_data_dir(&root)?;

    if output.json {
        let json_output = InitOutput {
            status: "initialized",
            path: &data_dir,
            layout: &layout,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!(
            "{} faqbot initialized in {}",
            "✓".green(),
            data_dir.display()
        );
        println!("  Config:   {}", layout.config.display());
        println!("  Database: {}", layout.database.display());
        println!("  Uploads:  {}", layout.uploads.display());
        println!(
            "\nRun {} and point the Twilio webhook at /chatgpt.",
            "faqbot serve".cyan()
        );
        println!("Set {} for language model answers.", "OPENAI_API_KEY".cyan());
    }

    Ok(())
}

/// Write the default config, an empty record table and the uploads directory.
/// With `reset`, an existing database is replaced by an empty one.
fn create_layout(root: &Path, reset: bool) -> Result<Layout> {
    let data_dir = Config::data_dir(root);
    let config = Config::default();

    let config_path = Config::config_path(root);
    config.save(&config_path)?;

    let db_path = config.storage.database_path(&data_dir);
    if reset && db_path.exists() {
        std::fs::remove_file(&db_path)
            .with_context(|| format!("Failed to remove database: {}", db_path.display()))?;
    }
    SqliteRecordStore::open(&db_path)
        .with_context(|| format!("Failed to create database: {}", db_path.display()))?;

    let uploads = config.storage.uploads_path(&data_dir);
    std::fs::create_dir_all(&uploads)
        .with_context(|| format!("Failed to create uploads directory: {}", uploads.display()))?;

    Ok(Layout {
        config: config_path,
        database: db_path,
        uploads,
    })
}

/// Keep records and uploads out of an existing git ignore list
fn ignore_data_dir(root: &Path) -> Result<()> {
    let gitignore = root.join(".gitignore");
    if !gitignore.exists() {
        return Ok(());
    }

    let content = std::fs::read_to_string(&gitignore)?;
    if content.lines().any(|line| line.trim_end_matches('/') == ".faqbot") {
        return Ok(());
    }

    let mut file = std::fs::OpenOptions::new().append(true).open(&gitignore)?;
    writeln!(file, "\n# faqbot data\n.faqbot/")?;
    Ok(())
}
