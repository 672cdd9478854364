//! HTTP server for faqbot.
//!
//! Serves the Twilio messaging webhook plus the HTML pages operators use to
//! add, view, edit, and delete stored question/answer records.

mod form;
mod handlers;
mod pages;
mod twiml;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::completion::{Completer, OpenAiCompleter};
use crate::config::Config;
use crate::responder::Responder;
use crate::storage::{RecordStore, SqliteRecordStore};
use crate::uploads::BlobStore;

use self::pages::Pages;

/// Shared application state for HTTP handlers
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub responder: Responder,
    pub blobs: BlobStore,
    pages: Pages,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        completer: Arc<dyn Completer>,
        blobs: BlobStore,
    ) -> Result<Self> {
        Ok(Self {
            responder: Responder::new(store.clone(), completer),
            store,
            blobs,
            pages: Pages::new()?,
        })
    }

    /// Wire up the store, completer and blob store described by `config`
    pub fn from_config(root: &Path, config: &Config) -> Result<Self> {
        let data_dir = Config::data_dir(root);
        let db_path = config.storage.database_path(&data_dir);
        let store = SqliteRecordStore::open(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        let completer = OpenAiCompleter::from_config(&config.completion);
        if !completer.has_credential() {
            tracing::warn!(
                "No completion API key configured; unmatched questions will get the fallback answer"
            );
        }

        let blobs = BlobStore::new(config.storage.uploads_path(&data_dir));

        Self::new(Arc::new(store), Arc::new(completer), blobs)
    }
}

/// Run the HTTP server on the given address
pub async fn run_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = handlers::router(Arc::new(state));

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!("faqbot HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
